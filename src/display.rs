use crate::input::KeyMap;
use anyhow::Result;
use iat_experiment::Presentation;
use iat_scoring::{BlockSummary, InsufficientData, ScoreResult};
use std::io::Write;

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const BLUE: &str = "\x1b[34m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

const DISCLAIMER: &str = "Note: this is a simplified demonstration. Terminal input timing \
     is not precise enough for the results to have any scientific validity.";

/// Draws engine state as plain text. Holds no experiment state of its own.
pub struct TerminalRenderer<W: Write> {
    out: W,
    color: bool,
    keys: KeyMap,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, color: bool, keys: KeyMap) -> Self {
        Self { out, color, keys }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, code: &'static str, text: &str) -> String {
        if self.color {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    pub fn render_welcome_screen(&mut self, blocks: usize) -> Result<()> {
        let title = self.paint(BOLD, "Implicit Association Test (IAT)");
        writeln!(self.out, "\n{title}\n")?;
        writeln!(
            self.out,
            "Words will appear in the middle of the screen. Sort each one into the\n\
             category on the left or on the right as quickly as you can."
        )?;
        writeln!(self.out)?;
        writeln!(self.out, "  - type '{}' + Enter for the LEFT category", self.keys.left)?;
        writeln!(self.out, "  - type '{}' + Enter for the RIGHT category", self.keys.right)?;
        writeln!(self.out, "  - type 'q' + Enter to quit")?;
        writeln!(self.out)?;
        writeln!(
            self.out,
            "Try to be fast and accurate. After a mistake a red X appears and you\n\
             have to give the correct answer to continue. There are {blocks} blocks."
        )?;
        writeln!(self.out, "\nPress Enter to start.")?;
        self.out.flush()?;
        Ok(())
    }

    pub fn render_trial_screen(&mut self, p: &Presentation<'_>) -> Result<()> {
        let kind = if p.is_critical { "" } else { " (practice)" };
        writeln!(
            self.out,
            "\nBlock {} of {}{kind} - trial {}/{}",
            p.block_number, p.block_total, p.trial_number, p.trial_total
        )?;

        let left = self.paint(GREEN, &p.left_labels.join(" / "));
        let right = self.paint(BLUE, &p.right_labels.join(" / "));
        writeln!(
            self.out,
            "[{}] {left}    |    {right} [{}]",
            self.keys.left, self.keys.right
        )?;

        let stimulus = self.paint(BOLD, p.stimulus_text);
        writeln!(self.out, "\n        {stimulus}\n")?;

        if p.show_error_feedback {
            let cross = self.paint(RED, "X");
            writeln!(self.out, "        {cross}")?;
        }
        write!(self.out, "> ")?;
        self.out.flush()?;
        Ok(())
    }

    pub fn render_pause(&mut self, completed: usize, next: usize) -> Result<()> {
        writeln!(self.out, "\nBlock {completed} done. Block {next} starts shortly...")?;
        self.out.flush()?;
        Ok(())
    }

    pub fn render_countdown(&mut self, remaining: u64) -> Result<()> {
        writeln!(self.out, "  {remaining}")?;
        self.out.flush()?;
        Ok(())
    }

    pub fn render_debrief_screen(
        &mut self,
        score: &Result<ScoreResult, InsufficientData>,
        summaries: &[BlockSummary],
    ) -> Result<()> {
        let title = self.paint(BOLD, "Test result");
        writeln!(self.out, "\n{title}\n")?;

        match score {
            Ok(result) => {
                writeln!(
                    self.out,
                    "Mean reaction time block {} (congruent):   {:.0} ms",
                    result.congruent_block, result.congruent_mean_ms
                )?;
                writeln!(
                    self.out,
                    "Mean reaction time block {} (incongruent): {:.0} ms",
                    result.incongruent_block, result.incongruent_mean_ms
                )?;
                writeln!(self.out, "IAT effect (difference): {:.0} ms", result.effect_ms)?;
                writeln!(self.out, "\nYour result suggests a {}.", result.band.description())?;
                writeln!(self.out, "\n{DISCLAIMER}")?;
            }
            Err(err) => {
                let msg = self.paint(RED, "Not enough data was collected to compute a result.");
                writeln!(self.out, "{msg} Please try again.")?;
                writeln!(self.out, "({err})")?;
            }
        }

        if !summaries.is_empty() {
            writeln!(self.out, "\nblock  critical  recorded  errors  retries  mean rt")?;
            for s in summaries {
                let mean = s
                    .mean_rt_ms
                    .map_or_else(|| "-".to_string(), |ms| format!("{ms:.0} ms"));
                writeln!(
                    self.out,
                    "{:>5}  {:>8}  {:>8}  {:>6}  {:>7}  {mean}",
                    s.block,
                    if s.is_critical { "yes" } else { "no" },
                    s.recorded,
                    s.errors,
                    s.retries
                )?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    pub fn render_restart_prompt(&mut self) -> Result<()> {
        write!(self.out, "\nRestart the test? [y/N] ")?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iat_core::CategoryId;
    use iat_scoring::Band;

    fn renderer() -> TerminalRenderer<Vec<u8>> {
        TerminalRenderer::new(Vec::new(), false, KeyMap::default())
    }

    fn text(r: TerminalRenderer<Vec<u8>>) -> String {
        String::from_utf8(r.into_inner()).unwrap()
    }

    #[test]
    fn trial_screen_shows_labels_stimulus_and_feedback() {
        let left = [CategoryId::new("ki_partner"), CategoryId::new("chance")];
        let right = [CategoryId::new("ki_ersatz"), CategoryId::new("gefahr")];
        let p = Presentation {
            block_number: 4,
            block_total: 7,
            trial_number: 3,
            trial_total: 32,
            is_practice: false,
            is_critical: true,
            left_categories: &left,
            right_categories: &right,
            left_labels: vec!["KI als Partner", "Chance"],
            right_labels: vec!["KI als Ersatz", "Gefahr"],
            stimulus_text: "Fortschritt",
            show_error_feedback: true,
        };
        let mut r = renderer();
        r.render_trial_screen(&p).unwrap();
        let out = text(r);
        assert!(out.contains("Block 4 of 7 - trial 3/32"));
        assert!(!out.contains("practice"));
        assert!(out.contains("[e] KI als Partner / Chance"));
        assert!(out.contains("KI als Ersatz / Gefahr [i]"));
        assert!(out.contains("Fortschritt"));
        assert!(out.contains("X"));
    }

    #[test]
    fn debrief_reports_effect_or_insufficient_data() {
        let ok = Ok(ScoreResult {
            congruent_block: 4,
            incongruent_block: 7,
            congruent_mean_ms: 650.0,
            incongruent_mean_ms: 950.0,
            effect_ms: 300.0,
            congruent_trials: 2,
            incongruent_trials: 2,
            band: Band::Strong,
        });
        let mut r = renderer();
        r.render_debrief_screen(&ok, &[]).unwrap();
        let out = text(r);
        assert!(out.contains("IAT effect (difference): 300 ms"));
        assert!(out.contains(Band::Strong.description()));

        let err = Err(InsufficientData::EmptyBlock {
            congruent_trials: 0,
            incongruent_trials: 3,
        });
        let mut r = renderer();
        r.render_debrief_screen(&err, &[]).unwrap();
        assert!(text(r).contains("Not enough data"));
    }

    #[test]
    fn color_is_optional() {
        let mut r = TerminalRenderer::new(Vec::new(), true, KeyMap::default());
        r.render_welcome_screen(7).unwrap();
        let out = text(r);
        assert!(out.contains(BOLD));
        assert!(out.contains("There are 7 blocks"));
    }
}
