use crate::config::ExperimentConfig;
use iat_core::{BlockSpec, Trial};
use rand::Rng;
use rand::seq::SliceRandom;

/// Builds the trial list for one block instantiation.
///
/// Every item of every `stimuli` category goes into a pool. The pool is
/// shuffled and appended until there are at least `block.trials` entries,
/// then the list is cut to exactly `block.trials`. Each full cycle shows every
/// item once, so small pools are not starved and large ones are not repeated
/// before being exhausted.
pub fn materialize_trials<R: Rng + ?Sized>(
    config: &ExperimentConfig,
    block: &BlockSpec,
    rng: &mut R,
) -> Vec<Trial> {
    let pool: Vec<Trial> = block
        .stimuli
        .iter()
        .filter_map(|id| config.category(id))
        .flat_map(|category| {
            category
                .items
                .iter()
                .map(|text| Trial::new(text.clone(), category.id.clone()))
        })
        .collect();
    assert!(!pool.is_empty(), "validated blocks always have stimuli");

    let mut trials = Vec::with_capacity(block.trials + pool.len());
    while trials.len() < block.trials {
        let mut cycle = pool.clone();
        cycle.shuffle(rng);
        trials.extend(cycle);
    }
    trials.truncate(block.trials);
    trials
}
