//! Line-based terminal prompts.

use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

use parking_lot::Mutex;
use provkit_files::Confirm;
use tracing::warn;

use crate::error::InputResult;

/// Free-text questions with a default answer.
pub trait AskString {
    fn ask_string(&self, message: &str, default: &str) -> String;
}

/// Prompts over any reader/writer pair.
pub struct Prompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }

    /// Ask a yes/no question.
    ///
    /// An empty answer or end of input gives `default`. Anything other than
    /// y/yes/n/no is rejected and the question is asked again.
    pub fn confirm(&mut self, text: &str, default: bool) -> InputResult<bool> {
        let hint = if default { "[y]" } else { "[n]" };
        loop {
            write!(self.writer, "[?] {} {} ", text, hint)?;
            self.writer.flush()?;

            let Some(response) = self.read_response()? else {
                return Ok(default);
            };
            match response.trim().to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.writer, "Response not understood.")?,
            }
        }
    }

    /// Ask for a line of text, falling back to `default` when nothing is typed.
    pub fn ask_string(&mut self, text: &str, default: &str) -> InputResult<String> {
        if default.is_empty() {
            write!(self.writer, "[?] {} ", text)?;
        } else {
            write!(self.writer, "[?] {} [{}] ", text, default)?;
        }
        self.writer.flush()?;

        Ok(match self.read_response()? {
            Some(response) if !response.is_empty() => response,
            _ => default.to_string(),
        })
    }

    /// Guard a dangerous action behind typing `required` exactly.
    ///
    /// Only the exact text confirms; n/no declines and end of input declines.
    pub fn warn_prompt(&mut self, text: &str, required: &str) -> InputResult<bool> {
        loop {
            write!(self.writer, "[!!] {} [type n or '{}'] ", text, required)?;
            self.writer.flush()?;

            let Some(response) = self.read_response()? else {
                return Ok(false);
            };
            if response == required {
                return Ok(true);
            }
            if matches!(response.to_lowercase().as_str(), "n" | "no") {
                return Ok(false);
            }
            writeln!(
                self.writer,
                "Response not understood. Please type \"n\" or \"{}\"",
                required
            )?;
        }
    }

    fn read_response(&mut self) -> InputResult<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Prompts on the process's stdin and stdout.
pub struct Terminal {
    prompter: Mutex<Prompter<BufReader<Stdin>, Stdout>>,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            prompter: Mutex::new(Prompter::new(BufReader::new(io::stdin()), io::stdout())),
        }
    }

    pub fn warn_prompt(&self, text: &str, required: &str) -> InputResult<bool> {
        self.prompter.lock().warn_prompt(text, required)
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Confirm for Terminal {
    fn confirm(&self, message: &str, default: bool) -> bool {
        match self.prompter.lock().confirm(message, default) {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Failed to read confirmation: {}", e);
                default
            }
        }
    }
}

impl AskString for Terminal {
    fn ask_string(&self, message: &str, default: &str) -> String {
        match self.prompter.lock().ask_string(message, default) {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Failed to read answer: {}", e);
                default.to_string()
            }
        }
    }
}
