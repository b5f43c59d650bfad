use crate::display::TerminalRenderer;
use crate::input::{Input, KeyMap, Line, LineSource};
use anyhow::{Context, Result};
use iat_core::Response;
use iat_experiment::{Engine, ResponseOutcome};
use iat_scoring::{BlockSummary, ScoreResult, block_summaries, compute_result_for};
use iat_timing::Timer;
use rand::Rng;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Countdown between blocks, in whole seconds
    pub pause_secs: u64,
    /// Where to write the raw data of each finished run
    pub export: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum RunEnd {
    Completed,
    Quit,
}

/// Raw data of one finished run, as written by `--export`
#[derive(Serialize)]
struct RunExport<'a> {
    score: Option<&'a ScoreResult>,
    blocks: &'a [BlockSummary],
    responses: &'a [Response],
}

/// Line-oriented front end: owns the engine, reads one key per line and
/// renders whatever the engine exposes.
pub struct Session<T, R, I, W>
where
    T: Timer,
    R: Rng,
    I: LineSource,
    W: Write,
{
    engine: Engine<T, R>,
    renderer: TerminalRenderer<W>,
    input: I,
    keys: KeyMap,
    options: SessionOptions,
    /// When the last inter-block countdown ended
    resumed_at_ns: u64,
}

impl<T, R, I, W> Session<T, R, I, W>
where
    T: Timer,
    R: Rng,
    I: LineSource,
    W: Write,
{
    pub fn new(
        engine: Engine<T, R>,
        renderer: TerminalRenderer<W>,
        input: I,
        keys: KeyMap,
        options: SessionOptions,
    ) -> Self {
        Self {
            engine,
            renderer,
            input,
            keys,
            options,
            resumed_at_ns: 0,
        }
    }

    #[cfg(test)]
    pub fn engine(&self) -> &Engine<T, R> {
        &self.engine
    }

    #[cfg(test)]
    pub fn into_renderer(self) -> TerminalRenderer<W> {
        self.renderer
    }

    /// Welcome, run, debrief, optionally restart. Returns on quit or end of input.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.renderer
                .render_welcome_screen(self.engine.config().block_count())?;
            if self.read_line()?.is_none() {
                return Ok(());
            }

            self.engine.start();
            if self.run_trials()? == RunEnd::Quit {
                info!(recorded = self.engine.results().len(), "participant quit");
                self.engine.reset();
                return Ok(());
            }
            self.debrief()?;

            self.renderer.render_restart_prompt()?;
            match self.read_line()? {
                Some(answer) if answer.trim().eq_ignore_ascii_case("y") => self.engine.reset(),
                _ => return Ok(()),
            }
        }
    }

    fn run_trials(&mut self) -> Result<RunEnd> {
        while !self.engine.is_finished() {
            let Some(presentation) = self.engine.current_presentation() else {
                break;
            };
            self.renderer.render_trial_screen(&presentation)?;

            let Some(line) = self.read_response_line()? else {
                return Ok(RunEnd::Quit);
            };
            match self.keys.parse(&line) {
                Input::Quit => return Ok(RunEnd::Quit),
                Input::Unknown => continue,
                Input::Respond(side) => {
                    if let ResponseOutcome::BlockComplete { completed, next } =
                        self.engine.submit_response(side)
                    {
                        self.pause(completed, next)?;
                    }
                }
            }
        }
        Ok(RunEnd::Completed)
    }

    // The next trial is not presented until the countdown ends, so the clock
    // stays disarmed. Lines typed meanwhile are dropped by `read_response_line`.
    fn pause(&mut self, completed: usize, next: usize) -> Result<()> {
        self.renderer.render_pause(completed, next)?;
        for remaining in (1..=self.options.pause_secs).rev() {
            self.renderer.render_countdown(remaining)?;
            self.engine.timer().sleep(Duration::from_secs(1));
        }
        self.resumed_at_ns = self.engine.timer().now();
        Ok(())
    }

    fn debrief(&mut self) -> Result<()> {
        let responses = self.engine.results();
        let score = compute_result_for(responses, self.engine.config().critical_pair());
        let summaries = block_summaries(responses);

        match &score {
            Ok(result) => info!(
                effect_ms = result.effect_ms,
                band = ?result.band,
                "run scored"
            ),
            Err(err) => warn!(%err, "run could not be scored"),
        }
        self.renderer.render_debrief_screen(&score, &summaries)?;

        if let Some(path) = &self.options.export {
            let export = RunExport {
                score: score.as_ref().ok(),
                blocks: &summaries,
                responses,
            };
            let file = File::create(path)
                .with_context(|| format!("failed to create export file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &export)
                .with_context(|| format!("failed to write export file {}", path.display()))?;
            writer.flush()?;
            info!(path = %path.display(), rows = responses.len(), "raw data exported");
        }
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let line = self.input.next_line().context("failed to read input")?;
        Ok(line.map(|line| line.text))
    }

    /// Like `read_line`, but skips lines that arrived before the last pause ended.
    fn read_response_line(&mut self) -> Result<Option<String>> {
        loop {
            match self.input.next_line().context("failed to read input")? {
                Some(Line { text, at_ns }) if at_ns < self.resumed_at_ns => {
                    debug!(line = text.trim(), at_ns, "dropped input typed during pause");
                }
                line => return Ok(line.map(|line| line.text)),
            }
        }
    }
}
