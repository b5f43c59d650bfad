use crate::block::Side;
use crate::category::CategoryId;
use serde::{Deserialize, Serialize};

/// One presentation instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trial {
    pub text: String,
    pub category: CategoryId,
}

impl Trial {
    pub fn new(text: impl Into<String>, category: CategoryId) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }
}

/// Recorded result per key press: to be scored/exported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// 1-based block number
    pub block: usize,
    /// 1-based trial number within the block
    pub trial: usize,
    pub stimulus: String,
    pub category: CategoryId,
    pub is_critical: bool,
    pub side: Side,
    pub correct: bool,
    /// Recorded while error feedback was showing for this trial
    pub retry: bool,
    /// Stimulus onset to key press
    pub rt_ms: f64,
}
