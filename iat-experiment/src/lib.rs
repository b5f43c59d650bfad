pub mod config;
pub mod engine;
pub mod sequence;
pub use config::{ConfigError, ExperimentConfig};
pub use engine::{Engine, Presentation, ResponseOutcome, RunState, RunStatus};
pub use sequence::materialize_trials;
