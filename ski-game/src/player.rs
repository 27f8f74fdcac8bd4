//! Player bookkeeping, command interpretation and accident scoring.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{PlayerConfig, ScoreConfig};
use crate::constants::{
    HOP_ATTEMPT_CREDIT, INJURY_MESSAGES, JUMP_ATTEMPT_CREDIT, MODERATE_INJURY, SEVERE_INJURY,
    SLIGHT_INJURY,
};
use crate::random::RandomSource;
use crate::slope::Slope;
use crate::terrain::TerrainCell;

/// One player command. Input is case-insensitive; anything unrecognized
/// (including a blank line) means "keep skiing".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Right,
    Left,
    Jump,
    Hop,
    Teleport,
    LaunchIcbm,
    SummonDemon,
    #[default]
    KeepSkiing,
}

impl Command {
    pub const ALL: [Self; 8] = [
        Self::Right,
        Self::Left,
        Self::Jump,
        Self::Hop,
        Self::Teleport,
        Self::LaunchIcbm,
        Self::SummonDemon,
        Self::KeepSkiing,
    ];

    #[must_use]
    pub const fn from_char(c: char) -> Self {
        match c.to_ascii_uppercase() {
            'R' => Self::Right,
            'L' => Self::Left,
            'J' => Self::Jump,
            'H' => Self::Hop,
            'T' => Self::Teleport,
            'I' => Self::LaunchIcbm,
            'D' => Self::SummonDemon,
            _ => Self::KeepSkiing,
        }
    }

    /// Canonical input key; blank for [`Command::KeepSkiing`].
    #[must_use]
    pub const fn key(self) -> Option<char> {
        match self {
            Self::Right => Some('r'),
            Self::Left => Some('l'),
            Self::Jump => Some('j'),
            Self::Hop => Some('h'),
            Self::Teleport => Some('t'),
            Self::LaunchIcbm => Some('i'),
            Self::SummonDemon => Some('d'),
            Self::KeepSkiing => None,
        }
    }
}

impl From<char> for Command {
    fn from(c: char) -> Self {
        Self::from_char(c)
    }
}

/// Base injury level of an accident before the random component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Slight,
    Moderate,
    Severe,
}

impl Severity {
    #[must_use]
    pub const fn base(self) -> i64 {
        match self {
            Self::Slight => SLIGHT_INJURY,
            Self::Moderate => MODERATE_INJURY,
            Self::Severe => SEVERE_INJURY,
        }
    }
}

/// Every way a run can end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccidentKind {
    BadLanding,
    HitTree,
    FellOnGround,
    SlippedOnIce,
    CaughtByYeti,
    BadTeleport,
    IcbmBackfire,
    SpellBackfire,
}

impl AccidentKind {
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::BadLanding | Self::SlippedOnIce | Self::BadTeleport => Severity::Slight,
            Self::FellOnGround | Self::CaughtByYeti | Self::SpellBackfire => Severity::Moderate,
            Self::HitTree | Self::IcbmBackfire => Severity::Severe,
        }
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::BadLanding => "Whoops! A bad landing!",
            Self::HitTree => "Oh no! You hit a tree!",
            Self::FellOnGround => "You fell on the ground!",
            Self::SlippedOnIce => "Oops! You took a bad fall on the ice!",
            Self::CaughtByYeti => "Yikes! The Yeti's got you!",
            Self::BadTeleport => "You materialized 25 feet in the air!",
            Self::IcbmBackfire => "Nuclear blast in your immediate vicinity!",
            Self::SpellBackfire => "The spell backfired and the Fire Demon turned on you!",
        }
    }
}

impl fmt::Display for AccidentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A resolved, terminal accident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accident {
    pub kind: AccidentKind,
    /// Index into the injury table (0 = unhurt, 11 = killed).
    pub degree: i64,
    pub injury: String,
    pub score: i64,
}

impl Accident {
    /// Cause and injury as one line.
    #[must_use]
    pub fn message(&self) -> String {
        format!("{} {}", self.kind.message(), self.injury)
    }
}

/// Result of a command or obstacle check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Continue,
    Ended(Accident),
}

impl Outcome {
    #[must_use]
    pub const fn is_ended(&self) -> bool {
        matches!(self, Self::Ended(_))
    }
}

/// Per-session player state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    player_speed: i64,
    jump_count: i64,
    meters_travelled: u64,
    num_jumps_attempted: f64,
    num_snowmen_melted: u32,
    turns_taken: u64,
    landed_this_turn: bool,
    cfg: PlayerConfig,
    scoring: ScoreConfig,
}

impl Player {
    #[must_use]
    pub fn new(cfg: &PlayerConfig, scoring: &ScoreConfig) -> Self {
        Self {
            player_speed: 0,
            jump_count: -1,
            meters_travelled: 0,
            num_jumps_attempted: 0.0,
            num_snowmen_melted: 0,
            turns_taken: 0,
            landed_this_turn: false,
            cfg: cfg.clone(),
            scoring: scoring.clone(),
        }
    }

    #[must_use]
    pub const fn player_speed(&self) -> i64 {
        self.player_speed
    }

    /// Remaining airborne ticks; `-1` when on the ground.
    #[must_use]
    pub const fn jump_count(&self) -> i64 {
        self.jump_count
    }

    #[must_use]
    pub const fn is_jumping(&self) -> bool {
        self.jump_count >= 0
    }

    #[must_use]
    pub const fn meters_travelled(&self) -> u64 {
        self.meters_travelled
    }

    #[must_use]
    pub const fn num_jumps_attempted(&self) -> f64 {
        self.num_jumps_attempted
    }

    #[must_use]
    pub const fn num_snowmen_melted(&self) -> u32 {
        self.num_snowmen_melted
    }

    #[must_use]
    pub const fn turns_taken(&self) -> u64 {
        self.turns_taken
    }

    /// True when the most recent [`Player::advance_turn`] ended a jump.
    #[must_use]
    pub const fn landed_this_turn(&self) -> bool {
        self.landed_this_turn
    }

    pub const fn record_melts(&mut self, melted: u32) {
        self.num_snowmen_melted = self.num_snowmen_melted.saturating_add(melted);
    }

    /// Apply one command to the player and the slope.
    pub fn interpret_command(
        &mut self,
        command: Command,
        slope: &mut Slope,
        rng: &mut impl RandomSource,
    ) -> Outcome {
        match command {
            Command::Right => {
                if slope.player_terrain() != TerrainCell::Ice
                    && self.player_speed < self.cfg.max_speed
                {
                    self.player_speed += 1;
                }
            }
            Command::Left => {
                if slope.player_terrain() != TerrainCell::Ice
                    && self.player_speed > -self.cfg.max_speed
                {
                    self.player_speed -= 1;
                }
            }
            Command::Jump => {
                self.jump_count = rng
                    .random(0, self.cfg.jump_random_turns)
                    .saturating_add(self.cfg.jump_base_turns);
                self.num_jumps_attempted += JUMP_ATTEMPT_CREDIT;
            }
            Command::Hop => {
                self.jump_count = rng
                    .random(0, self.cfg.hop_random_turns)
                    .saturating_add(self.cfg.hop_base_turns);
                self.num_jumps_attempted += HOP_ATTEMPT_CREDIT;
            }
            Command::Teleport => {
                if rng.percent(self.cfg.prob_bad_teleport) {
                    return self.accident(AccidentKind::BadTeleport, rng);
                }
                let pos = slope.teleport(rng);
                slope.set_player_pos(pos);
            }
            Command::LaunchIcbm => {
                if rng.percent(self.cfg.prob_bad_icbm) {
                    return self.accident(AccidentKind::IcbmBackfire, rng);
                }
                slope.launch_icbm(slope.player_pos());
            }
            Command::SummonDemon => {
                if rng.percent(self.cfg.prob_bad_spell) {
                    return self.accident(AccidentKind::SpellBackfire, rng);
                }
                let pos = slope.teleport(rng);
                slope.summon_demon(pos);
            }
            Command::KeepSkiing => {}
        }
        Outcome::Continue
    }

    /// Check the hazards under the player once a turn is complete; only the
    /// first matching hazard can fire.
    pub fn check_obstacles(&self, slope: &Slope, rng: &mut impl RandomSource) -> Outcome {
        let terrain = slope.player_terrain();
        let kind = if self.landed_this_turn && rng.percent(self.cfg.prob_bad_landing) {
            Some(AccidentKind::BadLanding)
        } else if terrain == TerrainCell::Tree && rng.percent(self.cfg.prob_hit_tree) {
            Some(AccidentKind::HitTree)
        } else if terrain == TerrainCell::Ground && rng.percent(self.cfg.prob_fall_on_ground) {
            Some(AccidentKind::FellOnGround)
        } else if terrain == TerrainCell::Ice && rng.percent(self.cfg.prob_slip_on_ice) {
            Some(AccidentKind::SlippedOnIce)
        } else if slope.near_player(slope.yeti_pos(), 1) {
            Some(AccidentKind::CaughtByYeti)
        } else {
            None
        };

        match kind {
            Some(kind) => self.accident(kind, rng),
            None => Outcome::Continue,
        }
    }

    /// Travel bookkeeping for one tick.
    pub const fn advance_turn(&mut self) {
        self.meters_travelled += self.player_speed.unsigned_abs() + 1;
        self.turns_taken += 1;
        self.landed_this_turn = false;
        if self.jump_count >= 0 {
            self.jump_count -= 1;
            self.landed_this_turn = self.jump_count < 0;
        }
    }

    fn accident(&self, kind: AccidentKind, rng: &mut impl RandomSource) -> Outcome {
        Outcome::Ended(self.resolve_accident(kind, rng))
    }

    /// Roll the injury degree for an accident and compute the final score.
    pub fn resolve_accident(&self, kind: AccidentKind, rng: &mut impl RandomSource) -> Accident {
        let max_degree = i64::try_from(INJURY_MESSAGES.len()).unwrap_or(1) - 1;
        let degree = (kind.severity().base() + rng.random(0, self.cfg.injury_randomness - 1))
            .clamp(0, max_degree);
        let injury = usize::try_from(degree)
            .ok()
            .and_then(|idx| INJURY_MESSAGES.get(idx))
            .copied()
            .unwrap_or_default()
            .to_string();
        let score = self.final_score(degree);
        log::info!(
            "Accident | {kind:?} degree {degree} score {score} after {} m",
            self.meters_travelled
        );
        Accident {
            kind,
            degree,
            injury,
            score,
        }
    }

    /// Score for the run so far given an injury degree; never negative.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn final_score(&self, degree: i64) -> i64 {
        let s = &self.scoring;
        let raw = self.meters_travelled as f64 * s.points_per_meter
            + self.num_jumps_attempted * s.points_per_jump
            + f64::from(self.num_snowmen_melted) * s.points_per_melted_yeti
            + degree as f64 * s.points_per_injury_degree;
        raw.max(0.0).floor() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SlopeConfig;
    use crate::random::{FixedRandom, SeededRandom};

    fn fixtures(length: usize) -> (Player, Slope) {
        let slope = Slope::new(&SlopeConfig {
            length,
            ..SlopeConfig::default()
        });
        let player = Player::new(&PlayerConfig::default(), &ScoreConfig::default());
        (player, slope)
    }

    #[test]
    fn commands_parse_case_insensitively() {
        assert_eq!(Command::from('r'), Command::Right);
        assert_eq!(Command::from('R'), Command::Right);
        assert_eq!(Command::from('i'), Command::LaunchIcbm);
        assert_eq!(Command::from('D'), Command::SummonDemon);
        assert_eq!(Command::from('?'), Command::KeepSkiing);
        assert_eq!(Command::from(' '), Command::KeepSkiing);
        for command in Command::ALL {
            if let Some(key) = command.key() {
                assert_eq!(Command::from(key), command);
            }
        }
    }

    #[test]
    fn steering_is_capped_and_blocked_on_ice() {
        let (mut player, mut slope) = fixtures(20);
        let mut rng = FixedRandom::floor().with_percent(false);
        for _ in 0..8 {
            player.interpret_command(Command::Right, &mut slope, &mut rng);
        }
        assert_eq!(player.player_speed(), 5);
        for _ in 0..12 {
            player.interpret_command(Command::Left, &mut slope, &mut rng);
        }
        assert_eq!(player.player_speed(), -5);

        slope.set_terrain(slope.player_pos(), TerrainCell::Ice);
        player.interpret_command(Command::Right, &mut slope, &mut rng);
        assert_eq!(player.player_speed(), -5);
    }

    #[test]
    fn jump_and_hop_durations_follow_ranges() {
        let (mut player, mut slope) = fixtures(20);
        let mut low = FixedRandom::floor();
        player.interpret_command(Command::Jump, &mut slope, &mut low);
        assert_eq!(player.jump_count(), 4);
        player.interpret_command(Command::Hop, &mut slope, &mut low);
        assert_eq!(player.jump_count(), 2);
        assert!((player.num_jumps_attempted() - 1.5).abs() < f64::EPSILON);

        let mut high = FixedRandom::with_uniform(0.999);
        player.interpret_command(Command::Jump, &mut slope, &mut high);
        assert_eq!(player.jump_count(), 8);
        player.interpret_command(Command::Hop, &mut slope, &mut high);
        assert_eq!(player.jump_count(), 3);
    }

    #[test]
    fn jump_counts_down_to_landing() {
        let (mut player, mut slope) = fixtures(10);
        let mut rng = FixedRandom::floor().with_percent(false);
        player.interpret_command(Command::Jump, &mut slope, &mut rng);
        let mut ticks = 0;
        while player.is_jumping() {
            assert!(!player.landed_this_turn());
            player.advance_turn();
            ticks += 1;
        }
        assert_eq!(ticks, 5);
        assert_eq!(player.jump_count(), -1);
        assert!(player.landed_this_turn());
        player.advance_turn();
        assert!(!player.landed_this_turn());
    }

    #[test]
    fn advance_turn_accumulates_distance() {
        let (mut player, mut slope) = fixtures(10);
        let mut rng = FixedRandom::floor();
        player.advance_turn();
        assert_eq!(player.meters_travelled(), 1);
        player.interpret_command(Command::Left, &mut slope, &mut rng);
        player.interpret_command(Command::Left, &mut slope, &mut rng);
        player.advance_turn();
        assert_eq!(player.meters_travelled(), 4);
        assert_eq!(player.turns_taken(), 2);
    }

    #[test]
    fn weapons_and_teleport_succeed_when_rolls_fail() {
        let (mut player, mut slope) = fixtures(30);
        let mut rng = FixedRandom::with_uniform(0.5).with_percent(false);
        assert_eq!(
            player.interpret_command(Command::Teleport, &mut slope, &mut rng),
            Outcome::Continue
        );
        assert_eq!(slope.player_pos(), 15);

        slope.set_player_pos(3);
        player.interpret_command(Command::LaunchIcbm, &mut slope, &mut rng);
        assert_eq!(slope.icbm_pos(), Some(3));

        player.interpret_command(Command::SummonDemon, &mut slope, &mut rng);
        assert_eq!(slope.demon_pos(), Some(15));
    }

    #[test]
    fn weapons_and_teleport_backfire_when_rolls_succeed() {
        let (mut player, mut slope) = fixtures(30);
        let mut rng = FixedRandom::floor().with_percent(true);
        for (command, kind) in [
            (Command::Teleport, AccidentKind::BadTeleport),
            (Command::LaunchIcbm, AccidentKind::IcbmBackfire),
            (Command::SummonDemon, AccidentKind::SpellBackfire),
        ] {
            match player.interpret_command(command, &mut slope, &mut rng) {
                Outcome::Ended(accident) => assert_eq!(accident.kind, kind),
                Outcome::Continue => panic!("{command:?} should backfire"),
            }
        }
        assert_eq!(slope.icbm_pos(), None);
        assert_eq!(slope.demon_pos(), None);
    }

    #[test]
    fn obstacle_priority_prefers_bad_landing_then_terrain() {
        let (mut player, mut slope) = fixtures(10);
        let mut always = FixedRandom::floor().with_percent(true);
        let mut quiet = FixedRandom::floor().with_percent(false);

        slope.set_terrain(slope.player_pos(), TerrainCell::Tree);
        player.interpret_command(Command::Hop, &mut slope, &mut quiet);
        while player.is_jumping() {
            player.advance_turn();
        }
        match player.check_obstacles(&slope, &mut always) {
            Outcome::Ended(accident) => assert_eq!(accident.kind, AccidentKind::BadLanding),
            Outcome::Continue => panic!("expected landing accident"),
        }

        player.advance_turn();
        match player.check_obstacles(&slope, &mut always) {
            Outcome::Ended(accident) => assert_eq!(accident.kind, AccidentKind::HitTree),
            Outcome::Continue => panic!("expected tree accident"),
        }

        for (cell, kind) in [
            (TerrainCell::Ground, AccidentKind::FellOnGround),
            (TerrainCell::Ice, AccidentKind::SlippedOnIce),
        ] {
            slope.set_terrain(slope.player_pos(), cell);
            match player.check_obstacles(&slope, &mut always) {
                Outcome::Ended(accident) => assert_eq!(accident.kind, kind),
                Outcome::Continue => panic!("expected {kind:?}"),
            }
        }

        assert_eq!(player.check_obstacles(&slope, &mut quiet), Outcome::Continue);
    }

    #[test]
    fn adjacent_yeti_always_catches_player() {
        let (player, mut slope) = fixtures(10);
        let mut quiet = FixedRandom::floor().with_percent(false);
        slope.set_yeti_pos(Some(slope.player_pos() + 1));
        match player.check_obstacles(&slope, &mut quiet) {
            Outcome::Ended(accident) => {
                assert_eq!(accident.kind, AccidentKind::CaughtByYeti);
                assert_eq!(accident.degree, 3);
                assert!(accident.message().starts_with("Yikes!"));
            }
            Outcome::Continue => panic!("expected yeti accident"),
        }
        slope.set_yeti_pos(Some(slope.player_pos() + 2));
        assert_eq!(player.check_obstacles(&slope, &mut quiet), Outcome::Continue);
    }

    #[test]
    fn accident_degree_is_clamped_to_injury_table() {
        let (player, _) = fixtures(10);
        let mut worst = FixedRandom::with_uniform(0.999);
        let accident = player.resolve_accident(AccidentKind::HitTree, &mut worst);
        assert_eq!(accident.degree, 10);
        assert_eq!(accident.injury, INJURY_MESSAGES[10]);

        let mut best = FixedRandom::floor();
        let accident = player.resolve_accident(AccidentKind::SlippedOnIce, &mut best);
        assert_eq!(accident.degree, 0);
        assert_eq!(accident.injury, "However, you escaped injury!");

        let harsh = Player::new(
            &PlayerConfig {
                injury_randomness: 40,
                ..PlayerConfig::default()
            },
            &ScoreConfig::default(),
        );
        let accident = harsh.resolve_accident(AccidentKind::HitTree, &mut worst);
        assert_eq!(accident.degree, 11);
        assert!(accident.injury.contains("killed"));
    }

    #[test]
    fn score_combines_counters_and_never_goes_negative() {
        let (mut player, mut slope) = fixtures(10);
        let mut rng = FixedRandom::floor();
        for _ in 0..3 {
            player.interpret_command(Command::Right, &mut slope, &mut rng);
        }
        for _ in 0..10 {
            player.advance_turn();
        }
        player.interpret_command(Command::Jump, &mut slope, &mut rng);
        player.interpret_command(Command::Hop, &mut slope, &mut rng);
        player.record_melts(2);
        // 40 m + 1.5 jumps * 20 + 2 melts * 100 - 2 * 40
        assert_eq!(player.final_score(2), 40 + 30 + 200 - 80);

        let fresh = Player::new(&PlayerConfig::default(), &ScoreConfig::default());
        assert_eq!(fresh.final_score(11), 0);

        let mut seeded = SeededRandom::new(5);
        for degree in 0..12 {
            assert!(fresh.final_score(degree) >= 0);
            let accident = fresh.resolve_accident(AccidentKind::CaughtByYeti, &mut seeded);
            assert!(accident.score >= 0);
        }
    }
}
