use iat_core::Side;
use iat_timing::Timer;
use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver};
use std::thread;

/// A line typed by the participant
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Respond(Side),
    Quit,
    Unknown,
}

/// Physical keys for the two response sides
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyMap {
    pub left: char,
    pub right: char,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            left: 'e',
            right: 'i',
        }
    }
}

impl KeyMap {
    pub fn parse(&self, line: &str) -> Input {
        let line = line.trim();
        let mut chars = line.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return if line.eq_ignore_ascii_case("quit") {
                Input::Quit
            } else {
                Input::Unknown
            };
        };
        let c = c.to_ascii_lowercase();
        if c == self.left.to_ascii_lowercase() {
            Input::Respond(Side::Left)
        } else if c == self.right.to_ascii_lowercase() {
            Input::Respond(Side::Right)
        } else if c == 'q' {
            Input::Quit
        } else {
            Input::Unknown
        }
    }
}

/// One line of input with the clock reading at which it arrived
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub at_ns: u64,
}

pub trait LineSource {
    /// Next line, or `None` at end of input.
    fn next_line(&mut self) -> io::Result<Option<Line>>;
}

/// Reads lines on a background thread and stamps each one when it arrives,
/// so lines typed while nobody was reading keep their real arrival time.
pub struct ThreadedLines {
    rx: Receiver<io::Result<Line>>,
}

impl ThreadedLines {
    pub fn spawn<B, T>(mut reader: B, timer: T) -> io::Result<Self>
    where
        B: BufRead + Send + 'static,
        T: Timer + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("iat-input".into())
            .spawn(move || {
                loop {
                    let mut text = String::new();
                    let line = match reader.read_line(&mut text) {
                        Ok(0) => break,
                        Ok(_) => Ok(Line {
                            text,
                            at_ns: timer.now(),
                        }),
                        Err(err) => Err(err),
                    };
                    let failed = line.is_err();
                    if tx.send(line).is_err() || failed {
                        break;
                    }
                }
            })?;
        Ok(Self { rx })
    }
}

impl LineSource for ThreadedLines {
    fn next_line(&mut self) -> io::Result<Option<Line>> {
        // A closed channel means the reader hit end of input.
        match self.rx.recv() {
            Ok(line) => line.map(Some),
            Err(_) => Ok(None),
        }
    }
}
