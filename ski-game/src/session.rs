//! Turn controller: turns one command into a sequence of world ticks.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, SkiConfig};
use crate::player::{Accident, AccidentKind, Command, Outcome, Player};
use crate::random::{RandomSource, SeededRandom};
use crate::slope::{EntityEvent, Slope};
use crate::terrain::RowCell;

/// Errors surfaced by session construction and command submission.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("the run has already ended; start a new session")]
    Ended,
}

/// Where the controller is in a run.
///
/// Between calls a session is always `AwaitingCommand` or `Ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    #[default]
    AwaitingCommand,
    /// Held only inside [`GameSession::submit_command`] while airborne ticks
    /// resolve; tagged on the trace log of each of those ticks.
    Jumping,
    Ended,
}

/// One line of user input: a single command or a numeric repeat count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    /// Issue this many blank "keep skiing" turns back to back.
    Repeat(u32),
}

impl Input {
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if let Ok(count) = trimmed.parse::<u32>() {
            return Self::Repeat(count);
        }
        Self::Command(
            trimmed
                .chars()
                .next()
                .map_or(Command::KeepSkiing, Command::from_char),
        )
    }
}

/// Everything the presentation layer needs after one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TurnResult {
    /// One rendered row per simulated tick (several while airborne).
    pub rows: Vec<String>,
    pub ended: bool,
    pub final_score: Option<i64>,
    pub message: Option<String>,
    pub events: Vec<EntityEvent>,
    pub accident: Option<Accident>,
}

impl TurnResult {
    fn absorb(&mut self, other: Self) {
        self.rows.extend(other.rows);
        self.events.extend(other.events);
        self.ended |= other.ended;
        if other.final_score.is_some() {
            self.final_score = other.final_score;
        }
        if other.message.is_some() {
            self.message = other.message;
        }
        if other.accident.is_some() {
            self.accident = other.accident;
        }
    }
}

/// Compact run statistics for reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub seed: Option<u64>,
    pub phase: TurnPhase,
    pub level: u64,
    pub turns: u64,
    pub meters: u64,
    pub jumps: f64,
    pub yetis_melted: u32,
    pub final_score: Option<i64>,
    pub ending: Option<AccidentKind>,
}

/// A single game: one slope, one player and the random source driving both.
#[derive(Debug, Clone)]
pub struct GameSession<R = SeededRandom> {
    slope: Slope,
    player: Player,
    rng: R,
    seed: Option<u64>,
    phase: TurnPhase,
    accident: Option<Accident>,
}

/// Start a session with default tuning on a slope of the given length.
///
/// # Errors
///
/// Returns [`SessionError::Config`] when `slope_length` is zero.
pub fn new_session(slope_length: usize, seed: Option<u64>) -> Result<GameSession, SessionError> {
    GameSession::with_config(SkiConfig::with_slope_length(slope_length), seed)
}

impl GameSession<SeededRandom> {
    /// Seeded session; picks a fresh seed when none is supplied.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] when the configuration is invalid.
    pub fn with_config(config: SkiConfig, seed: Option<u64>) -> Result<Self, SessionError> {
        let rng = seed.map_or_else(SeededRandom::from_entropy_seed, SeededRandom::new);
        let seed = rng.seed();
        let mut session = Self::with_source(&config, rng)?;
        session.seed = Some(seed);
        Ok(session)
    }
}

impl<R: RandomSource> GameSession<R> {
    /// Session driven by an arbitrary random source.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] when the configuration is invalid.
    pub fn with_source(config: &SkiConfig, rng: R) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self {
            slope: Slope::new(&config.slope),
            player: Player::new(&config.player, &config.scoring),
            rng,
            seed: None,
            phase: TurnPhase::AwaitingCommand,
            accident: None,
        })
    }

    #[must_use]
    pub const fn slope(&self) -> &Slope {
        &self.slope
    }

    #[must_use]
    pub const fn player(&self) -> &Player {
        &self.player
    }

    #[must_use]
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Never [`TurnPhase::Jumping`]: a jump resolves within the call that starts it.
    #[must_use]
    pub const fn phase(&self) -> TurnPhase {
        self.phase
    }

    #[must_use]
    pub const fn is_ended(&self) -> bool {
        matches!(self.phase, TurnPhase::Ended)
    }

    /// The accident that ended the run, once it has ended.
    #[must_use]
    pub const fn accident(&self) -> Option<&Accident> {
        self.accident.as_ref()
    }

    #[must_use]
    pub fn render_row(&self) -> Vec<RowCell> {
        self.slope.render_row()
    }

    /// Run one command to completion, including any jump it starts.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Ended`] once an accident has ended the run.
    pub fn submit_command(
        &mut self,
        command: impl Into<Command>,
    ) -> Result<TurnResult, SessionError> {
        if self.is_ended() {
            return Err(SessionError::Ended);
        }
        let command = command.into();
        let mut result = TurnResult::default();

        let outcome = self
            .player
            .interpret_command(command, &mut self.slope, &mut self.rng);
        if let Outcome::Ended(accident) = outcome {
            result.rows.push(self.slope.snapshot());
            self.finish(accident, &mut result);
            return Ok(result);
        }

        self.tick(&mut result);
        if self.player.is_jumping() {
            self.phase = TurnPhase::Jumping;
            while self.player.is_jumping() {
                self.tick(&mut result);
            }
        }

        match self.player.check_obstacles(&self.slope, &mut self.rng) {
            Outcome::Ended(accident) => self.finish(accident, &mut result),
            Outcome::Continue => {
                self.phase = TurnPhase::AwaitingCommand;
                result.events = self.slope.take_events();
                result.message = event_message(&result.events);
            }
        }
        Ok(result)
    }

    /// Issue `count` blank turns, stopping early if the run ends.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Ended`] if the run had already ended.
    pub fn submit_repeat(&mut self, count: u32) -> Result<TurnResult, SessionError> {
        if self.is_ended() {
            return Err(SessionError::Ended);
        }
        let mut combined = TurnResult::default();
        for _ in 0..count {
            let result = self.submit_command(Command::KeepSkiing)?;
            combined.absorb(result);
            if combined.ended {
                break;
            }
        }
        Ok(combined)
    }

    /// Parse and submit one line of raw input.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Ended`] if the run had already ended.
    pub fn submit_line(&mut self, line: &str) -> Result<TurnResult, SessionError> {
        match Input::parse(line) {
            Input::Command(command) => self.submit_command(command),
            Input::Repeat(count) => self.submit_repeat(count),
        }
    }

    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            seed: self.seed,
            phase: self.phase,
            level: self.slope.level_num(),
            turns: self.player.turns_taken(),
            meters: self.player.meters_travelled(),
            jumps: self.player.num_jumps_attempted(),
            yetis_melted: self.player.num_snowmen_melted(),
            final_score: self.accident.as_ref().map(|a| a.score),
            ending: self.accident.as_ref().map(|a| a.kind),
        }
    }

    fn tick(&mut self, result: &mut TurnResult) {
        let melted = self.slope.resolve_entities(&mut self.rng);
        self.player.record_melts(melted);
        self.slope
            .advance_level(self.player.player_speed(), &mut self.rng);
        self.player.advance_turn();
        log::trace!(
            "Tick {:?} | level {} jump_count {}",
            self.phase,
            self.slope.level_num(),
            self.player.jump_count()
        );
        result.rows.push(self.slope.snapshot());
    }

    fn finish(&mut self, accident: Accident, result: &mut TurnResult) {
        log::info!(
            "Run ended | level {} score {} ({})",
            self.slope.level_num(),
            accident.score,
            accident.message()
        );
        self.phase = TurnPhase::Ended;
        result.events = self.slope.take_events();
        result.ended = true;
        result.final_score = Some(accident.score);
        result.message = Some(accident.message());
        result.accident = Some(accident.clone());
        self.accident = Some(accident);
    }
}

fn event_message(events: &[EntityEvent]) -> Option<String> {
    if events.is_empty() {
        return None;
    }
    Some(
        events
            .iter()
            .map(|event| event.message())
            .collect::<Vec<_>>()
            .join(" "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::FixedRandom;

    fn quiet_session(length: usize) -> GameSession<FixedRandom> {
        GameSession::with_source(
            &SkiConfig::with_slope_length(length),
            FixedRandom::floor().with_percent(false),
        )
        .unwrap()
    }

    #[test]
    fn input_parsing_handles_repeats_blanks_and_case() {
        assert_eq!(Input::parse("5"), Input::Repeat(5));
        assert_eq!(Input::parse(" 12 \n"), Input::Repeat(12));
        assert_eq!(Input::parse(""), Input::Command(Command::KeepSkiing));
        assert_eq!(Input::parse("J"), Input::Command(Command::Jump));
        assert_eq!(Input::parse("left"), Input::Command(Command::Left));
        assert_eq!(Input::parse("-3"), Input::Command(Command::KeepSkiing));
    }

    #[test]
    fn new_session_rejects_empty_slope() {
        assert!(matches!(
            new_session(0, Some(1)),
            Err(SessionError::Config(ConfigError::SlopeLength { length: 0 }))
        ));
        let session = new_session(70, Some(9)).unwrap();
        assert_eq!(session.seed(), Some(9));
        assert_eq!(session.slope().length(), 70);
        assert!(new_session(70, None).unwrap().seed().is_some());
    }

    #[test]
    fn blank_turn_advances_one_level() {
        let mut session = quiet_session(10);
        let result = session.submit_command(' ').unwrap();
        assert_eq!(result.rows.len(), 1);
        assert!(!result.ended);
        assert_eq!(session.phase(), TurnPhase::AwaitingCommand);
        assert_eq!(session.slope().level_num(), 1);
        assert_eq!(session.player().meters_travelled(), 1);
        assert_eq!(result.rows[0], session.slope().snapshot());
    }

    #[test]
    fn jump_resolves_every_airborne_tick_in_one_call() {
        let mut session = quiet_session(10);
        let result = session.submit_command('J').unwrap();
        assert_eq!(result.rows.len(), 5);
        assert_eq!(session.player().jump_count(), -1);
        assert!((session.player().num_jumps_attempted() - 1.0).abs() < f64::EPSILON);
        assert_eq!(session.phase(), TurnPhase::AwaitingCommand);
    }

    #[test]
    fn jumping_phase_never_outlives_the_call() {
        let mut session = quiet_session(10);
        for command in ['J', 'H', 'J', ' '] {
            let result = session.submit_command(command).unwrap();
            assert!(!result.ended);
            assert!(!session.player().is_jumping());
            assert_ne!(session.phase(), TurnPhase::Jumping);
            assert_eq!(session.summary().phase, TurnPhase::AwaitingCommand);
        }
    }

    #[test]
    fn backfire_ends_session_and_blocks_further_input() {
        let mut session = GameSession::with_source(
            &SkiConfig::default(),
            FixedRandom::floor().with_percent(true),
        )
        .unwrap();
        let result = session.submit_command('i').unwrap();
        assert!(result.ended);
        assert_eq!(
            result.accident.as_ref().map(|a| a.kind),
            Some(AccidentKind::IcbmBackfire)
        );
        assert_eq!(result.final_score, Some(0));
        assert_eq!(session.slope().level_num(), 0);
        assert!(session.is_ended());
        assert!(matches!(
            session.submit_command('r'),
            Err(SessionError::Ended)
        ));
        assert!(matches!(session.submit_repeat(3), Err(SessionError::Ended)));
        assert_eq!(session.summary().ending, Some(AccidentKind::IcbmBackfire));
    }

    #[test]
    fn repeat_stops_when_run_ends() {
        let mut cfg = SkiConfig::with_slope_length(20);
        cfg.slope.prob_yeti_appearance = 100.0;
        cfg.slope.prob_yeti_melt = 0.0;
        cfg.slope.prob_skis_melt_yeti = 0.0;
        cfg.slope.prob_tree = [0.0; 4];
        cfg.slope.prob_ice = [0.0; 4];
        cfg.slope.prob_ground = [0.0; 4];
        let mut session = GameSession::with_source(&cfg, FixedRandom::with_uniform(0.5)).unwrap();

        let result = session.submit_line("50").unwrap();
        assert!(result.ended);
        assert!(result.rows.len() < 50);
        assert_eq!(
            result.accident.map(|a| a.kind),
            Some(AccidentKind::CaughtByYeti)
        );
        assert!(
            result
                .events
                .iter()
                .any(|e| matches!(e, EntityEvent::YetiAppeared { .. }))
        );
        assert!(session.is_ended());
    }

    #[test]
    fn repeat_of_zero_is_a_no_op() {
        let mut session = quiet_session(10);
        let result = session.submit_repeat(0).unwrap();
        assert!(result.rows.is_empty());
        assert_eq!(session.slope().level_num(), 0);
    }

    #[test]
    fn summary_and_turn_result_serialize() {
        let mut session = quiet_session(12);
        let result = session.submit_line("3").unwrap();
        assert_eq!(result.rows.len(), 3);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["ended"], false);
        let summary = serde_json::to_value(session.summary()).unwrap();
        assert_eq!(summary["level"], 3);
        assert_eq!(summary["phase"], "awaiting_command");
    }
}
