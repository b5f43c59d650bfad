pub mod manual;
pub mod timer;

pub use manual::ManualTimer;
pub use timer::{HighPrecisionTimer, Timer, nanos_to_ms};
