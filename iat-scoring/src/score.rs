use crate::band::{Band, BandThresholds};
use iat_core::{CriticalPair, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// A critical block mean is undefined, so no effect can be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InsufficientData {
    /// Both critical blocks are known but at least one has no correct
    /// responses. Counts are correct critical responses per block.
    #[error(
        "not enough data to compute a result \
         (correct critical responses: congruent {congruent_trials}, incongruent {incongruent_trials})"
    )]
    EmptyBlock {
        congruent_trials: usize,
        incongruent_trials: usize,
    },
    /// Fewer than two critical blocks appear in the log, so the congruent and
    /// incongruent blocks cannot be told apart.
    #[error(
        "not enough data to compute a result \
         ({blocks} of 2 critical blocks answered, {correct_trials} correct critical responses)"
    )]
    MissingBlock { blocks: usize, correct_trials: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub congruent_block: usize,
    pub incongruent_block: usize,
    pub congruent_mean_ms: f64,
    pub incongruent_mean_ms: f64,
    /// incongruent mean minus congruent mean
    pub effect_ms: f64,
    pub congruent_trials: usize,
    pub incongruent_trials: usize,
    pub band: Band,
}

impl ScoreResult {
    pub fn band_with(&self, thresholds: &BandThresholds) -> Band {
        Band::classify(self.effect_ms, thresholds)
    }
}

/// Scores a run, taking the two critical blocks in order of block number:
/// the first is congruent, the second incongruent.
pub fn compute_result(responses: &[Response]) -> Result<ScoreResult, InsufficientData> {
    let mut critical: Vec<usize> = responses
        .iter()
        .filter(|r| r.is_critical)
        .map(|r| r.block)
        .collect();
    critical.sort_unstable();
    critical.dedup();

    match critical.as_slice() {
        [congruent, incongruent, ..] => compute_result_for(
            responses,
            CriticalPair {
                congruent: *congruent,
                incongruent: *incongruent,
            },
        ),
        _ => {
            debug!(blocks = critical.len(), "critical blocks missing from the log");
            Err(InsufficientData::MissingBlock {
                blocks: critical.len(),
                correct_trials: critical.iter().map(|&b| rts(responses, b).len()).sum(),
            })
        }
    }
}

/// Scores a run against block numbers taken from the configuration.
pub fn compute_result_for(
    responses: &[Response],
    pair: CriticalPair,
) -> Result<ScoreResult, InsufficientData> {
    let congruent = rts(responses, pair.congruent);
    let incongruent = rts(responses, pair.incongruent);

    let (Some(congruent_mean_ms), Some(incongruent_mean_ms)) = (mean(&congruent), mean(&incongruent))
    else {
        debug!(
            congruent = congruent.len(),
            incongruent = incongruent.len(),
            "insufficient data for scoring"
        );
        return Err(InsufficientData::EmptyBlock {
            congruent_trials: congruent.len(),
            incongruent_trials: incongruent.len(),
        });
    };

    let effect_ms = incongruent_mean_ms - congruent_mean_ms;
    Ok(ScoreResult {
        congruent_block: pair.congruent,
        incongruent_block: pair.incongruent,
        congruent_mean_ms,
        incongruent_mean_ms,
        effect_ms,
        congruent_trials: congruent.len(),
        incongruent_trials: incongruent.len(),
        band: Band::classify(effect_ms, &BandThresholds::default()),
    })
}

fn rts(responses: &[Response], block: usize) -> Vec<f64> {
    responses
        .iter()
        .filter(|r| r.is_critical && r.correct && r.block == block)
        .map(|r| r.rt_ms)
        .collect()
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
