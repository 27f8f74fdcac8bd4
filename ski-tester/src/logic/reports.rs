use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use super::{RunRecord, StrategyAggregate};

#[derive(Serialize)]
struct JsonReport<'a> {
    runs: &'a [RunRecord],
    strategies: &'a [StrategyAggregate],
}

pub fn generate_console_report(
    writer: &mut dyn Write,
    records: &[RunRecord],
    aggregates: &[StrategyAggregate],
    total_duration: Duration,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "📊 Ski Run Summary".bright_cyan().bold())?;
    writeln!(writer, "{}", "==================".cyan())?;
    writeln!(writer, "Total runs: {}", records.len())?;
    let capped = records.iter().filter(|r| r.hit_turn_cap).count();
    writeln!(writer, "Ended by accident: {}", (records.len() - capped).to_string().red())?;
    writeln!(writer, "Reached turn cap: {}", capped.to_string().green())?;
    writeln!(writer, "Simulation time: {total_duration:?}")?;
    writeln!(writer)?;

    for agg in aggregates {
        writeln!(writer, "{}", agg.strategy.bold())?;
        writeln!(
            writer,
            "   Runs: {} ({} reached the turn cap)",
            agg.runs, agg.capped_runs
        )?;
        writeln!(
            writer,
            "   Score: mean {:.1}, best {}",
            agg.mean_score,
            agg.best_score.to_string().green()
        )?;
        writeln!(
            writer,
            "   Turns: {:.1}  Meters: {:.1}  Yetis melted: {:.2}",
            agg.mean_turns, agg.mean_meters, agg.mean_melts
        )?;
        writeln!(writer)?;
    }

    if let Some(best) = records.iter().max_by_key(|r| r.score) {
        writeln!(writer, "{}", "🏆 Best Run".bright_yellow().bold())?;
        writeln!(writer, "{}", "===========".yellow())?;
        writeln!(
            writer,
            "{} seed {}: {} points over {} m",
            best.strategy.green(),
            best.seed,
            best.score,
            best.meters
        )?;
        if let Some(ending) = &best.ending {
            writeln!(writer, "   {ending}")?;
        }
    }
    Ok(())
}

pub fn generate_json_report(
    writer: &mut dyn Write,
    records: &[RunRecord],
    aggregates: &[StrategyAggregate],
) -> Result<()> {
    let report = JsonReport {
        runs: records,
        strategies: aggregates,
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

pub fn generate_markdown_report(
    writer: &mut dyn Write,
    records: &[RunRecord],
    aggregates: &[StrategyAggregate],
) -> Result<()> {
    writeln!(writer, "# Ski Run Results\n")?;

    writeln!(writer, "## Strategies\n")?;
    writeln!(
        writer,
        "| Strategy | Runs | Mean score | Best score | Mean turns | Mean meters | Capped |"
    )?;
    writeln!(writer, "|---|---|---|---|---|---|---|")?;
    for agg in aggregates {
        writeln!(
            writer,
            "| {} | {} | {:.1} | {} | {:.1} | {:.1} | {} |",
            agg.strategy,
            agg.runs,
            agg.mean_score,
            agg.best_score,
            agg.mean_turns,
            agg.mean_meters,
            agg.capped_runs
        )?;
    }

    writeln!(writer, "\n## Runs\n")?;
    writeln!(writer, "| Strategy | Seed | Turns | Meters | Melts | Score | Ending |")?;
    writeln!(writer, "|---|---|---|---|---|---|---|")?;
    for r in records {
        let ending = if r.hit_turn_cap {
            "_turn cap_"
        } else {
            r.ending.as_deref().unwrap_or("-")
        };
        writeln!(
            writer,
            "| {} | {} | {} | {} | {} | {} | {} |",
            r.strategy, r.seed, r.turns, r.meters, r.yetis_melted, r.score, ending
        )?;
    }
    Ok(())
}
