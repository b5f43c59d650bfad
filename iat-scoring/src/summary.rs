use crate::score::mean;
use iat_core::Response;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-block tally for the raw-data view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSummary {
    pub block: usize,
    pub is_critical: bool,
    pub recorded: usize,
    pub errors: usize,
    pub retries: usize,
    /// Over correct responses only; `None` if there were none
    pub mean_rt_ms: Option<f64>,
}

/// One summary per block that has at least one recorded response, in block order.
pub fn block_summaries(responses: &[Response]) -> Vec<BlockSummary> {
    let mut by_block: BTreeMap<usize, Vec<&Response>> = BTreeMap::new();
    for response in responses {
        by_block.entry(response.block).or_default().push(response);
    }

    by_block
        .into_iter()
        .map(|(block, rows)| {
            let correct_rts: Vec<f64> = rows.iter().filter(|r| r.correct).map(|r| r.rt_ms).collect();
            BlockSummary {
                block,
                is_critical: rows.iter().any(|r| r.is_critical),
                recorded: rows.len(),
                errors: rows.iter().filter(|r| !r.correct).count(),
                retries: rows.iter().filter(|r| r.retry).count(),
                mean_rt_ms: mean(&correct_rts),
            }
        })
        .collect()
}
