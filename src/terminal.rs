//! Line-based terminal implementation of [`Interactive`].
//!
//! Choices are listed with 1-based numbers. An empty line or end of input
//! cancels the question; anything unparsable asks again.

use std::io::{self, BufRead, Write};

use crate::data::Interactive;

/// Answers loader questions on a text stream.
pub struct TerminalUi<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl TerminalUi<io::StdinLock<'static>, io::Stderr> {
    /// Read from stdin; prompts go to stderr so stdout stays machine readable.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalUi<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consume the terminal and return the output sink.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Read one trimmed line; `None` on end of input, empty line or I/O error.
    fn read_answer(&mut self) -> Option<String> {
        if let Err(e) = self.output.flush() {
            log::warn!("terminal: flush failed: {}", e);
        }
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                let answer = line.trim();
                (!answer.is_empty()).then(|| answer.to_string())
            }
            Err(e) => {
                log::warn!("terminal: read failed: {}", e);
                None
            }
        }
    }

    fn say(&mut self, text: &str) -> Option<()> {
        writeln!(self.output, "{}", text).ok()
    }
}

impl<R: BufRead, W: Write> Interactive for TerminalUi<R, W> {
    fn choose(&mut self, prompt: &str, options: &[String]) -> Option<usize> {
        self.say(prompt)?;
        for (i, option) in options.iter().enumerate() {
            self.say(&format!("  {}) {}", i + 1, option))?;
        }
        loop {
            write!(self.output, "[1-{}]> ", options.len()).ok()?;
            let answer = self.read_answer()?;
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Some(n - 1),
                _ => self.say(&format!("'{}' is not one of the options", answer))?,
            }
        }
    }

    fn enter_integer(&mut self, prompt: &str, min: i64, max: i64) -> Option<i64> {
        loop {
            write!(self.output, "{} [{}-{}]> ", prompt, min, max).ok()?;
            let answer = self.read_answer()?;
            match answer.parse::<i64>() {
                Ok(v) if (min..=max).contains(&v) => return Some(v),
                _ => self.say(&format!("enter a whole number between {} and {}", min, max))?,
            }
        }
    }
}
