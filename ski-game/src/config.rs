//! Tunable configuration for slopes, players and scoring.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_SLOPE_LENGTH, DEMON_SPEED, HOP_BASE_TURNS, HOP_RANDOM_TURNS, ICBM_RANGE, ICBM_SPEED,
    INITIAL_PROB_GROUND, INITIAL_PROB_ICE, INITIAL_PROB_TREE, INITIAL_PROB_YETI_APPEARANCE,
    INJURY_RANDOMNESS, JUMP_BASE_TURNS, JUMP_RANDOM_TURNS, LEVEL_MULTIPLIER, MAX_AIRBORNE_TURNS,
    MAX_HORIZONTAL_PLAYER_SPEED, MIN_YETI_APPEARANCE_DISTANCE, NEIGHBORHOOD_SIZE,
    POINTS_PER_INJURY_DEGREE, POINTS_PER_JUMP, POINTS_PER_MELTED_YETI, POINTS_PER_METER,
    PROB_BAD_ICBM, PROB_BAD_LANDING, PROB_BAD_SPELL, PROB_BAD_TELEPORT, PROB_DEMON_DEPARTS,
    PROB_FALL_ON_GROUND, PROB_HIT_TREE, PROB_SKIS_MELT_YETI, PROB_SLIP_ON_ICE, PROB_YETI_MELT,
};

/// Errors raised when configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("slope length must be positive (got {length})")]
    SlopeLength { length: usize },
    #[error("{field} must be a finite, non-negative percentage (got {value})")]
    Probability { field: &'static str, value: f64 },
    #[error("level multiplier must be finite and positive (got {value})")]
    LevelMultiplier { value: f64 },
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: i64,
        value: i64,
    },
    #[error("{field} can keep the player airborne for {value} turns (max {max})")]
    AirborneTooLong {
        field: &'static str,
        max: i64,
        value: i64,
    },
}

/// Complete simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SkiConfig {
    #[serde(default)]
    pub slope: SlopeConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub scoring: ScoreConfig,
}

impl SkiConfig {
    /// Default configuration with a custom slope length.
    #[must_use]
    pub fn with_slope_length(length: usize) -> Self {
        let mut cfg = Self::default();
        cfg.slope.length = length;
        cfg
    }

    /// Parse a (possibly partial) JSON document and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value violates
    /// [`SkiConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, crate::SessionError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every invariant the simulation relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.slope.validate()?;
        self.player.validate()
    }
}

/// Terrain growth and entity tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlopeConfig {
    pub length: usize,
    pub prob_tree: [f64; NEIGHBORHOOD_SIZE],
    pub prob_ice: [f64; NEIGHBORHOOD_SIZE],
    pub prob_ground: [f64; NEIGHBORHOOD_SIZE],
    pub prob_yeti_appearance: f64,
    pub level_multiplier: f64,
    pub min_yeti_appearance_distance: i64,
    pub prob_skis_melt_yeti: f64,
    pub prob_yeti_melt: f64,
    pub icbm_speed: i64,
    pub icbm_range: i64,
    pub demon_speed: i64,
    pub prob_demon_departs: f64,
    /// Reproduce the historical rule where the ground channel grew ice.
    pub ground_grows_as_ice: bool,
}

impl Default for SlopeConfig {
    fn default() -> Self {
        Self {
            length: DEFAULT_SLOPE_LENGTH,
            prob_tree: INITIAL_PROB_TREE,
            prob_ice: INITIAL_PROB_ICE,
            prob_ground: INITIAL_PROB_GROUND,
            prob_yeti_appearance: INITIAL_PROB_YETI_APPEARANCE,
            level_multiplier: LEVEL_MULTIPLIER,
            min_yeti_appearance_distance: MIN_YETI_APPEARANCE_DISTANCE,
            prob_skis_melt_yeti: PROB_SKIS_MELT_YETI,
            prob_yeti_melt: PROB_YETI_MELT,
            icbm_speed: ICBM_SPEED,
            icbm_range: ICBM_RANGE,
            demon_speed: DEMON_SPEED,
            prob_demon_departs: PROB_DEMON_DEPARTS,
            ground_grows_as_ice: false,
        }
    }
}

impl SlopeConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.length == 0 {
            return Err(ConfigError::SlopeLength {
                length: self.length,
            });
        }
        for (field, vector) in [
            ("prob_tree", &self.prob_tree),
            ("prob_ice", &self.prob_ice),
            ("prob_ground", &self.prob_ground),
        ] {
            for value in vector {
                check_probability(field, *value)?;
            }
        }
        check_probability("prob_yeti_appearance", self.prob_yeti_appearance)?;
        check_probability("prob_skis_melt_yeti", self.prob_skis_melt_yeti)?;
        check_probability("prob_yeti_melt", self.prob_yeti_melt)?;
        check_probability("prob_demon_departs", self.prob_demon_departs)?;
        if !self.level_multiplier.is_finite() || self.level_multiplier <= 0.0 {
            return Err(ConfigError::LevelMultiplier {
                value: self.level_multiplier,
            });
        }
        check_min("min_yeti_appearance_distance", self.min_yeti_appearance_distance, 0)?;
        check_min("icbm_speed", self.icbm_speed, 0)?;
        check_min("icbm_range", self.icbm_range, 0)?;
        check_min("demon_speed", self.demon_speed, 0)
    }
}

/// Player movement and mishap tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_speed: i64,
    pub jump_base_turns: i64,
    pub jump_random_turns: i64,
    pub hop_base_turns: i64,
    pub hop_random_turns: i64,
    pub prob_bad_teleport: f64,
    pub prob_bad_icbm: f64,
    pub prob_bad_spell: f64,
    pub prob_bad_landing: f64,
    pub prob_hit_tree: f64,
    pub prob_fall_on_ground: f64,
    pub prob_slip_on_ice: f64,
    pub injury_randomness: i64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_speed: MAX_HORIZONTAL_PLAYER_SPEED,
            jump_base_turns: JUMP_BASE_TURNS,
            jump_random_turns: JUMP_RANDOM_TURNS,
            hop_base_turns: HOP_BASE_TURNS,
            hop_random_turns: HOP_RANDOM_TURNS,
            prob_bad_teleport: PROB_BAD_TELEPORT,
            prob_bad_icbm: PROB_BAD_ICBM,
            prob_bad_spell: PROB_BAD_SPELL,
            prob_bad_landing: PROB_BAD_LANDING,
            prob_hit_tree: PROB_HIT_TREE,
            prob_fall_on_ground: PROB_FALL_ON_GROUND,
            prob_slip_on_ice: PROB_SLIP_ON_ICE,
            injury_randomness: INJURY_RANDOMNESS,
        }
    }
}

impl PlayerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_min("max_speed", self.max_speed, 0)?;
        check_min("jump_base_turns", self.jump_base_turns, 0)?;
        check_min("jump_random_turns", self.jump_random_turns, 1)?;
        check_min("hop_base_turns", self.hop_base_turns, 0)?;
        check_min("hop_random_turns", self.hop_random_turns, 1)?;
        check_min("injury_randomness", self.injury_randomness, 1)?;
        check_airborne("jump", self.jump_base_turns, self.jump_random_turns)?;
        check_airborne("hop", self.hop_base_turns, self.hop_random_turns)?;
        for (field, value) in [
            ("prob_bad_teleport", self.prob_bad_teleport),
            ("prob_bad_icbm", self.prob_bad_icbm),
            ("prob_bad_spell", self.prob_bad_spell),
            ("prob_bad_landing", self.prob_bad_landing),
            ("prob_hit_tree", self.prob_hit_tree),
            ("prob_fall_on_ground", self.prob_fall_on_ground),
            ("prob_slip_on_ice", self.prob_slip_on_ice),
        ] {
            check_probability(field, value)?;
        }
        Ok(())
    }
}

/// Point values used when an accident ends the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    pub points_per_meter: f64,
    pub points_per_jump: f64,
    pub points_per_melted_yeti: f64,
    pub points_per_injury_degree: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            points_per_meter: POINTS_PER_METER,
            points_per_jump: POINTS_PER_JUMP,
            points_per_melted_yeti: POINTS_PER_MELTED_YETI,
            points_per_injury_degree: POINTS_PER_INJURY_DEGREE,
        }
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Probability { field, value })
    }
}

/// Longest possible airtime is `base + random - 1` ticks after the command tick.
const fn check_airborne(field: &'static str, base: i64, random: i64) -> Result<(), ConfigError> {
    let value = base.saturating_add(random - 1);
    if value > MAX_AIRBORNE_TURNS {
        return Err(ConfigError::AirborneTooLong {
            field,
            max: MAX_AIRBORNE_TURNS,
            value,
        });
    }
    Ok(())
}

const fn check_min(field: &'static str, value: i64, min: i64) -> Result<(), ConfigError> {
    if value < min {
        return Err(ConfigError::MinViolation { field, min, value });
    }
    Ok(())
}
