//! Line-oriented prompts over an injectable reader and writer.
//!
//! Every interaction point in the menus goes through [`Console`]: numbered
//! choices, free-text prompts, validated prompts, y/N confirmations and the
//! "Press Enter" pause. End of input never crashes a prompt; it cancels.

use std::fmt::Display;
use std::io::{BufRead, Write};

use chrono::Local;
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::Color;
use crossterm::terminal::{Clear, ClearType};
use gcp_vm_manager_core::config::VERSION;
use gcp_vm_manager_core::error::{Error, Result};

use crate::menus::style::OutputStyle;

pub const NOT_A_NUMBER: &str = "Please enter a number.";
pub const OUT_OF_RANGE: &str = "Invalid choice. Please try again.";

/// Why a menu choice was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceError {
    NotANumber,
    OutOfRange,
}

impl ChoiceError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ChoiceError::NotANumber => NOT_A_NUMBER,
            ChoiceError::OutOfRange => OUT_OF_RANGE,
        }
    }
}

/// Parses a menu choice in `0..=max`.
///
/// # Errors
///
/// [`ChoiceError::NotANumber`] for non-integers, [`ChoiceError::OutOfRange`]
/// for integers (negative ones included) outside the menu.
pub fn parse_choice(input: &str, max: usize) -> std::result::Result<usize, ChoiceError> {
    let value: i64 = input
        .trim()
        .parse()
        .map_err(|_| ChoiceError::NotANumber)?;

    usize::try_from(value)
        .ok()
        .filter(|choice| *choice <= max)
        .ok_or(ChoiceError::OutOfRange)
}

pub struct Console<I, O> {
    input: I,
    output: O,
    style: OutputStyle,
}

impl<I: BufRead, O: Write> Console<I, O> {
    pub fn new(input: I, output: O, style: OutputStyle) -> Self {
        Self {
            input,
            output,
            style,
        }
    }

    #[must_use]
    pub fn style(&self) -> OutputStyle {
        self.style
    }

    pub fn into_output(self) -> O {
        self.output
    }

    pub fn println(&mut self, text: impl Display) -> Result<()> {
        writeln!(self.output, "{text}").map_err(Error::stdio)
    }

    pub fn blank_line(&mut self) -> Result<()> {
        self.println("")
    }

    pub fn colored(&mut self, text: impl Display, color: Color) -> Result<()> {
        let painted = self.style.paint(text, color);
        self.println(painted)
    }

    pub fn title(&mut self, text: impl Display) -> Result<()> {
        let painted = self.style.bold(text, Color::Cyan);
        self.println(painted)
    }

    pub fn success(&mut self, text: impl Display) -> Result<()> {
        self.colored(text, Color::Green)
    }

    pub fn warning(&mut self, text: impl Display) -> Result<()> {
        self.colored(text, Color::Yellow)
    }

    pub fn error(&mut self, text: impl Display) -> Result<()> {
        self.colored(text, Color::Red)
    }

    /// Prints `prompt` and reads one line. `None` at end of input.
    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}").map_err(Error::stdio)?;
        self.output.flush().map_err(Error::stdio)?;

        let mut input = String::new();
        let read = self.input.read_line(&mut input).map_err(Error::stdio)?;
        if read == 0 {
            self.blank_line()?;
            return Ok(None);
        }

        Ok(Some(input.trim().to_string()))
    }

    /// Like [`Console::read_line`], with `default` used for blank input.
    pub fn read_line_or(&mut self, prompt: &str, default: &str) -> Result<Option<String>> {
        let prompt = format!("{prompt} [{default}]: ");
        Ok(self.read_line(&prompt)?.map(|value| {
            if value.is_empty() {
                default.to_string()
            } else {
                value
            }
        }))
    }

    /// Reads a menu choice in `0..=max`, re-prompting until it is valid.
    ///
    /// End of input counts as 0, which always means back or cancel.
    pub fn read_choice(&mut self, max: usize) -> Result<usize> {
        let prompt = self
            .style
            .paint(format!("Enter your choice (0-{max}): "), Color::Cyan);
        loop {
            let Some(input) = self.read_line(&prompt)? else {
                return Ok(0);
            };

            match parse_choice(&input, max) {
                Ok(choice) => return Ok(choice),
                Err(e) => self.error(e.message())?,
            }
        }
    }

    /// Re-prompts until `validate` accepts the input. `None` at end of input.
    pub fn read_validated<T>(
        &mut self,
        prompt: &str,
        validate: impl Fn(&str) -> Result<T>,
    ) -> Result<Option<T>> {
        loop {
            let Some(input) = self.read_line(prompt)? else {
                return Ok(None);
            };

            match validate(&input) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => self.error(e)?,
            }
        }
    }

    /// `(y/N)` confirmation. Anything but `y`/`yes` is a no.
    pub fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = self.read_line(&format!("{prompt} (y/N): "))?;
        Ok(matches!(
            answer.map(|answer| answer.to_lowercase()).as_deref(),
            Some("y" | "yes")
        ))
    }

    pub fn pause(&mut self) -> Result<()> {
        self.read_line("\nPress Enter to continue...")?;
        Ok(())
    }

    /// Clears the screen and prints the title and current time.
    pub fn header(&mut self) -> Result<()> {
        queue!(self.output, Clear(ClearType::All), MoveTo(0, 0)).map_err(Error::stdio)?;

        let rule = "=".repeat(60);
        let title = format!("GCP VM MANAGER v{VERSION}");
        let now = Local::now().format("%Y-%m-%d %H:%M:%S");

        self.title(&rule)?;
        self.title(format!("{title:^60}"))?;
        self.title(&rule)?;
        self.colored(format!("Current time: {now}"), Color::Blue)?;
        self.blank_line()
    }

    /// Numbered `1)`..`N)` options followed by `0) back`.
    pub fn options<S: Display>(&mut self, options: &[S], back: &str) -> Result<()> {
        for (index, option) in options.iter().enumerate() {
            self.println(format!("{}) {option}", index + 1))?;
        }
        self.println(format!("0) {back}"))
    }

    /// A titled section separator.
    pub fn section(&mut self, text: impl Display) -> Result<()> {
        self.blank_line()?;
        self.title(text)?;
        self.println("-".repeat(60))
    }
}
