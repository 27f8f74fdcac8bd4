pub mod policy;
pub mod reports;
pub mod seeds;
pub mod simulation;

pub use policy::{GameplayStrategy, ScriptedPolicy};
pub use seeds::resolve_seed_inputs;
pub use simulation::{RunRecord, StrategyAggregate, aggregate_runs, run_policy};
