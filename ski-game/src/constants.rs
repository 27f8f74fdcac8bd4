//! Centralized balance and tuning constants for the ski simulation.
//!
//! These values define the default difficulty curve. Configuration files may
//! override any of them through [`crate::config::SkiConfig`]; the serde default
//! functions all resolve back to this module.

// Slope shape --------------------------------------------------------------
pub(crate) const DEFAULT_SLOPE_LENGTH: usize = 70;
pub(crate) const NEIGHBORHOOD_SIZE: usize = 4;

// Terrain growth (percent, indexed by matching neighbor count) -------------
pub(crate) const INITIAL_PROB_TREE: [f64; NEIGHBORHOOD_SIZE] = [0.1, 30.0, 70.0, 90.0];
pub(crate) const INITIAL_PROB_ICE: [f64; NEIGHBORHOOD_SIZE] = [0.05, 20.0, 50.0, 80.0];
pub(crate) const INITIAL_PROB_GROUND: [f64; NEIGHBORHOOD_SIZE] = [0.05, 20.0, 40.0, 70.0];
pub(crate) const LEVEL_MULTIPLIER: f64 = 1.01;

// Yeti and weapons ---------------------------------------------------------
pub(crate) const INITIAL_PROB_YETI_APPEARANCE: f64 = 0.5;
pub(crate) const MIN_YETI_APPEARANCE_DISTANCE: i64 = 3;
pub(crate) const PROB_SKIS_MELT_YETI: f64 = 20.0;
pub(crate) const PROB_YETI_MELT: f64 = 1.0;
pub(crate) const ICBM_SPEED: i64 = 3;
pub(crate) const ICBM_RANGE: i64 = 2;
pub(crate) const DEMON_SPEED: i64 = 1;
pub(crate) const PROB_DEMON_DEPARTS: f64 = 25.0;

// Player -------------------------------------------------------------------
pub(crate) const MAX_HORIZONTAL_PLAYER_SPEED: i64 = 5;
pub(crate) const JUMP_BASE_TURNS: i64 = 4;
pub(crate) const JUMP_RANDOM_TURNS: i64 = 5;
pub(crate) const HOP_BASE_TURNS: i64 = 2;
pub(crate) const HOP_RANDOM_TURNS: i64 = 2;
pub(crate) const MAX_AIRBORNE_TURNS: i64 = 1_000;
pub(crate) const JUMP_ATTEMPT_CREDIT: f64 = 1.0;
pub(crate) const HOP_ATTEMPT_CREDIT: f64 = 0.5;

// Mishaps (percent) --------------------------------------------------------
pub(crate) const PROB_BAD_TELEPORT: f64 = 10.0;
pub(crate) const PROB_BAD_ICBM: f64 = 30.0;
pub(crate) const PROB_BAD_SPELL: f64 = 10.0;
pub(crate) const PROB_BAD_LANDING: f64 = 3.0;
pub(crate) const PROB_HIT_TREE: f64 = 25.0;
pub(crate) const PROB_FALL_ON_GROUND: f64 = 10.0;
pub(crate) const PROB_SLIP_ON_ICE: f64 = 2.0;

// Injuries -----------------------------------------------------------------
pub(crate) const SLIGHT_INJURY: i64 = 0;
pub(crate) const MODERATE_INJURY: i64 = 3;
pub(crate) const SEVERE_INJURY: i64 = 6;
pub(crate) const INJURY_RANDOMNESS: i64 = 6;

pub(crate) const INJURY_MESSAGES: [&str; 12] = [
    "However, you escaped injury!",
    "But you weren't hurt at all!",
    "But you only got a few scratches.",
    "You received some cuts and bruises.",
    "You wind up with a concussion and some contusions.",
    "You now have a broken rib.",
    "Your left arm has been fractured.",
    "You suffered a broken ankle.",
    "You have a broken arm and a broken leg.",
    "You have four broken limbs and a cut!",
    "You broke every bone in your body!",
    "I'm sorry to tell you that you have been killed....",
];

// Scoring ------------------------------------------------------------------
pub(crate) const POINTS_PER_METER: f64 = 1.0;
pub(crate) const POINTS_PER_JUMP: f64 = 20.0;
pub(crate) const POINTS_PER_MELTED_YETI: f64 = 100.0;
pub(crate) const POINTS_PER_INJURY_DEGREE: f64 = -40.0;

// Percent rolls ------------------------------------------------------------
pub(crate) const PERCENT_DRAW_SPAN: i64 = 9_999;
pub(crate) const PERCENT_DRAW_SCALE: f64 = 100.0;
