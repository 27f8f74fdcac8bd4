use anyhow::{Context, Result};
use serde::Serialize;
use ski_game::{GameSession, SkiConfig};

use super::policy::PlayerPolicy;

/// Outcome of one automated run.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub seed: u64,
    pub strategy: String,
    pub turns: u64,
    pub level: u64,
    pub meters: u64,
    pub jumps: f64,
    pub yetis_melted: u32,
    /// Final score when the run ended, otherwise the uninjured score so far.
    pub score: i64,
    pub ending: Option<String>,
    pub hit_turn_cap: bool,
}

/// Per-strategy averages across every seed.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyAggregate {
    pub strategy: String,
    pub runs: usize,
    pub mean_score: f64,
    pub best_score: i64,
    pub mean_turns: f64,
    pub mean_meters: f64,
    pub mean_melts: f64,
    pub capped_runs: usize,
}

/// Drive one session with `policy` until it ends or reaches `max_turns` ticks.
pub fn run_policy(
    policy: &mut dyn PlayerPolicy,
    config: &SkiConfig,
    seed: u64,
    max_turns: u64,
    verbose: bool,
) -> Result<RunRecord> {
    let mut session = GameSession::with_config(config.clone(), Some(seed))
        .with_context(|| format!("failed to start session for seed {seed}"))?;

    while !session.is_ended() && session.player().turns_taken() < max_turns {
        let command = policy.next_command(&session);
        let result = session
            .submit_command(command)
            .with_context(|| format!("seed {seed}: submitting {command:?}"))?;
        for row in &result.rows {
            log::trace!("[{} seed {seed}] {row}", policy.name());
        }
        if let Some(message) = result.message.as_deref() {
            log::debug!("[{} seed {seed}] {message}", policy.name());
        }
    }

    let record = record_for(policy.name(), &session);
    if verbose {
        println!(
            "  {} seed {}: {} turns, {} m, score {}{}",
            record.strategy,
            record.seed,
            record.turns,
            record.meters,
            record.score,
            if record.hit_turn_cap { " (turn cap)" } else { "" }
        );
    }
    Ok(record)
}

fn record_for(strategy: &str, session: &GameSession) -> RunRecord {
    let summary = session.summary();
    let hit_turn_cap = !session.is_ended();
    RunRecord {
        seed: summary.seed.unwrap_or_default(),
        strategy: strategy.to_string(),
        turns: summary.turns,
        level: summary.level,
        meters: summary.meters,
        jumps: summary.jumps,
        yetis_melted: summary.yetis_melted,
        score: summary
            .final_score
            .unwrap_or_else(|| session.player().final_score(0)),
        ending: session.accident().map(ski_game::Accident::message),
        hit_turn_cap,
    }
}

/// Group records by strategy, preserving first-seen order.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn aggregate_runs(records: &[RunRecord]) -> Vec<StrategyAggregate> {
    let mut order: Vec<&str> = Vec::new();
    for record in records {
        if !order.contains(&record.strategy.as_str()) {
            order.push(&record.strategy);
        }
    }

    order
        .into_iter()
        .map(|strategy| {
            let runs: Vec<&RunRecord> = records
                .iter()
                .filter(|r| r.strategy == strategy)
                .collect();
            let n = runs.len() as f64;
            StrategyAggregate {
                strategy: strategy.to_string(),
                runs: runs.len(),
                mean_score: runs.iter().map(|r| r.score as f64).sum::<f64>() / n,
                best_score: runs.iter().map(|r| r.score).max().unwrap_or_default(),
                mean_turns: runs.iter().map(|r| r.turns as f64).sum::<f64>() / n,
                mean_meters: runs.iter().map(|r| r.meters as f64).sum::<f64>() / n,
                mean_melts: runs.iter().map(|r| f64::from(r.yetis_melted)).sum::<f64>() / n,
                capped_runs: runs.iter().filter(|r| r.hit_turn_cap).count(),
            }
        })
        .collect()
}
