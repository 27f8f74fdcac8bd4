//! Ski Game Engine
//!
//! Platform-agnostic core of the one-dimensional downhill ski game: a wrapping
//! row of evolving terrain, a player steering across it, a Yeti in pursuit and
//! the weapons used to fight it off. This crate owns every rule and the turn
//! loop; presentation (prompts, row printing) belongs to the caller.

pub mod config;
pub mod constants;
pub mod player;
pub mod random;
pub mod session;
pub mod slope;
pub mod terrain;

// Re-export commonly used types
pub use config::{ConfigError, PlayerConfig, ScoreConfig, SkiConfig, SlopeConfig};
pub use player::{Accident, AccidentKind, Command, Outcome, Player, Severity};
pub use random::{FixedRandom, RandomSource, SeededRandom};
pub use session::{
    GameSession, Input, SessionError, SessionSummary, TurnPhase, TurnResult, new_session,
};
pub use slope::{EntityEvent, MeltCause, Slope};
pub use terrain::{EntityMarker, RowCell, TerrainCell, row_to_string};
