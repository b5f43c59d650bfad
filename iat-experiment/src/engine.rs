use super::config::ExperimentConfig;
use super::sequence::materialize_trials;
use iat_core::{BlockSpec, CategoryId, Response, Side, Trial};
use iat_timing::{Timer, nanos_to_ms};
use rand::Rng;
use tracing::{debug, info, trace};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RunStatus {
    #[default]
    NotStarted,
    Running,
    Finished,
}

/// What a key press did
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// Not running or clock disarmed; nothing recorded
    Ignored,
    /// Correct, next trial of the same block is up
    Correct,
    /// Wrong side; the same stimulus stays up with error feedback
    Incorrect,
    /// Correct on the last trial of a block. Block numbers are 1-based.
    BlockComplete { completed: usize, next: usize },
    /// Correct on the last trial of the last block
    Finished,
}

/// The mutable session. Owned by exactly one engine and rebuilt on restart.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    pub status: RunStatus,
    pub block_index: usize,
    pub trial_index: usize,
    pub trials: Vec<Trial>,
    pub show_feedback: bool,
    /// Stimulus onset on the engine's timer; `None` while disarmed
    pub armed_at: Option<u64>,
    pub responses: Vec<Response>,
}

/// Everything the presentation layer needs to draw the current trial
#[derive(Debug, Clone, PartialEq)]
pub struct Presentation<'a> {
    /// 1-based
    pub block_number: usize,
    pub block_total: usize,
    /// 1-based
    pub trial_number: usize,
    pub trial_total: usize,
    pub is_practice: bool,
    pub is_critical: bool,
    pub left_categories: &'a [CategoryId],
    pub right_categories: &'a [CategoryId],
    pub left_labels: Vec<&'a str>,
    pub right_labels: Vec<&'a str>,
    pub stimulus_text: &'a str,
    pub show_error_feedback: bool,
}

/// The IAT block/trial state machine.
///
/// `NotStarted -> Running(block, trial) -> ... -> Finished`, with an
/// error-feedback sub-state while a wrong answer waits for correction.
pub struct Engine<T, R>
where
    T: Timer,
    R: Rng,
{
    config: ExperimentConfig,
    timer: T,
    rng: R,
    run: RunState,
}

impl<T, R> Engine<T, R>
where
    T: Timer,
    R: Rng,
{
    pub fn new(config: ExperimentConfig, timer: T, rng: R) -> Self {
        Self {
            config,
            timer,
            rng,
            run: RunState::default(),
        }
    }

    /// Fresh run: previous responses are discarded, block 0 is shuffled and
    /// the clock is armed for its first trial.
    pub fn start(&mut self) {
        self.run = RunState {
            status: RunStatus::Running,
            ..RunState::default()
        };
        self.prepare_block(0);
        self.arm();
        info!(
            blocks = self.config.block_count(),
            trials = self.config.total_trials(),
            "experiment started"
        );
    }

    /// Drops the whole run. Safe in any state.
    pub fn reset(&mut self) {
        if self.run.status != RunStatus::NotStarted {
            info!(recorded = self.run.responses.len(), "run discarded");
        }
        self.run = RunState::default();
    }

    /// Records a key press for the current trial.
    ///
    /// The first attempt at a trial is always recorded. While error feedback
    /// is up, further wrong presses are not recorded again; the final correct
    /// press is, flagged as a retry.
    pub fn submit_response(&mut self, side: Side) -> ResponseOutcome {
        if self.run.status != RunStatus::Running {
            trace!(?side, "response ignored: not running");
            return ResponseOutcome::Ignored;
        }
        let Some(armed_at) = self.run.armed_at.take() else {
            trace!(?side, "response ignored: clock disarmed");
            return ResponseOutcome::Ignored;
        };

        let rt_ms = nanos_to_ms(self.timer.now().saturating_sub(armed_at));
        let block = self.config.block(self.run.block_index);
        let trial = &self.run.trials[self.run.trial_index];
        let correct = block.accepts(side, &trial.category);
        let retry = self.run.show_feedback;

        if correct || !retry {
            let response = Response {
                block: self.run.block_index + 1,
                trial: self.run.trial_index + 1,
                stimulus: trial.text.clone(),
                category: trial.category.clone(),
                is_critical: block.is_critical(),
                side,
                correct,
                retry,
                rt_ms,
            };
            trace!(
                block = response.block,
                trial = response.trial,
                correct,
                retry,
                rt_ms,
                "response recorded"
            );
            self.run.responses.push(response);
        }

        if !correct {
            self.run.show_feedback = true;
            return ResponseOutcome::Incorrect;
        }

        self.run.show_feedback = false;
        self.advance()
    }

    /// The trial to draw now. Arms the clock if it is disarmed, which marks
    /// stimulus onset (or the onset of a retry after an error).
    pub fn current_presentation(&mut self) -> Option<Presentation<'_>> {
        if self.run.status != RunStatus::Running {
            return None;
        }
        if self.run.armed_at.is_none() {
            self.arm();
        }

        let block = self.config.block(self.run.block_index);
        let trial = &self.run.trials[self.run.trial_index];
        Some(Presentation {
            block_number: self.run.block_index + 1,
            block_total: self.config.block_count(),
            trial_number: self.run.trial_index + 1,
            trial_total: self.run.trials.len(),
            is_practice: block.is_practice(),
            is_critical: block.is_critical(),
            left_categories: &block.left,
            right_categories: &block.right,
            left_labels: self.config.labels(&block.left),
            right_labels: self.config.labels(&block.right),
            stimulus_text: &trial.text,
            show_error_feedback: self.run.show_feedback,
        })
    }

    pub fn is_finished(&self) -> bool {
        self.run.status == RunStatus::Finished
    }

    pub fn status(&self) -> RunStatus {
        self.run.status
    }

    /// Responses recorded so far, in order
    pub fn results(&self) -> &[Response] {
        &self.run.responses
    }

    pub fn run_state(&self) -> &RunState {
        &self.run
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn current_block(&self) -> Option<&BlockSpec> {
        (self.run.status == RunStatus::Running).then(|| self.config.block(self.run.block_index))
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    fn advance(&mut self) -> ResponseOutcome {
        self.run.trial_index += 1;
        if self.run.trial_index < self.run.trials.len() {
            return ResponseOutcome::Correct;
        }

        let completed = self.run.block_index + 1;
        self.run.block_index += 1;
        if self.run.block_index >= self.config.block_count() {
            self.run.status = RunStatus::Finished;
            self.run.trials.clear();
            self.run.trial_index = 0;
            info!(recorded = self.run.responses.len(), "experiment finished");
            return ResponseOutcome::Finished;
        }

        self.prepare_block(self.run.block_index);
        debug!(completed, next = completed + 1, "block complete");
        ResponseOutcome::BlockComplete {
            completed,
            next: completed + 1,
        }
    }

    fn prepare_block(&mut self, index: usize) {
        let block = self.config.block(index);
        self.run.trials = materialize_trials(&self.config, block, &mut self.rng);
        self.run.trial_index = 0;
        self.run.block_index = index;
        debug_assert_eq!(self.run.trials.len(), block.trials);
        debug!(
            block = index + 1,
            trials = self.run.trials.len(),
            critical = block.is_critical(),
            "block prepared"
        );
    }

    fn arm(&mut self) {
        debug_assert!(self.run.armed_at.is_none(), "clock armed twice");
        self.run.armed_at = Some(self.timer.now());
    }
}
