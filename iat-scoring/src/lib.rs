pub mod band;
pub mod score;
pub mod summary;

pub use band::{Band, BandThresholds};
pub use score::{InsufficientData, ScoreResult, compute_result, compute_result_for};
pub use summary::{BlockSummary, block_summaries};
