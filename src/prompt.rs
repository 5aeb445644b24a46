//! "Fix the error?" prompt shown when the edited document does not parse.

use crate::error::{Error, Result};
use dialoguer::{theme::ColorfulTheme, Confirm};
use std::io::{BufRead, Write};

/// Asks whether to reopen the editor after a decode failure.
pub trait RetryPrompt {
    /// `true` to edit again, `false` to abort.
    fn ask_retry(&mut self, error: &str) -> Result<bool>;
}

impl<P: RetryPrompt + ?Sized> RetryPrompt for &mut P {
    fn ask_retry(&mut self, error: &str) -> Result<bool> {
        (**self).ask_retry(error)
    }
}

impl<P: RetryPrompt + ?Sized> RetryPrompt for Box<P> {
    fn ask_retry(&mut self, error: &str) -> Result<bool> {
        (**self).ask_retry(error)
    }
}

/// Interpret one answer. `None` means the answer was not understood.
pub fn parse_answer(input: &str) -> Option<bool> {
    match input.trim() {
        "y" | "Y" | "yes" | "Yes" | "YES" => Some(true),
        "n" | "N" | "no" | "No" | "NO" => Some(false),
        _ => None,
    }
}

/// Line-oriented prompt over any reader/writer pair.
///
/// Unrecognised answers are rejected and the question is asked again, with
/// no limit on the number of attempts. End of input counts as "no".
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> RetryPrompt for LinePrompt<R, W> {
    fn ask_retry(&mut self, error: &str) -> Result<bool> {
        writeln!(self.output, "❌ {}", error).map_err(|e| Error::io("failed to write prompt", e))?;

        loop {
            write!(self.output, "Do you want to fix the error? (y/n): ")
                .and_then(|_| self.output.flush())
                .map_err(|e| Error::io("failed to write prompt", e))?;

            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .map_err(|e| Error::io("failed to read answer", e))?;
            if read == 0 {
                return Ok(false);
            }

            match parse_answer(&line) {
                Some(answer) => return Ok(answer),
                None => writeln!(self.output, "⚠️  Invalid input. Please enter 'y' or 'n'.")
                    .map_err(|e| Error::io("failed to write prompt", e))?,
            }
        }
    }
}

/// Interactive terminal prompt.
///
/// No default is set, so dialoguer keeps waiting until the operator gives
/// an explicit yes or no.
#[derive(Debug, Default)]
pub struct ConfirmPrompt;

impl RetryPrompt for ConfirmPrompt {
    fn ask_retry(&mut self, error: &str) -> Result<bool> {
        eprintln!("❌ {}", error);
        let theme = ColorfulTheme::default();
        Confirm::with_theme(&theme)
            .with_prompt("Do you want to fix the error?")
            .interact()
            .map_err(|e| Error::io("failed to read answer", std::io::Error::other(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ask(input: &str) -> (bool, String) {
        let mut prompt = LinePrompt::new(Cursor::new(input.to_string()), Vec::new());
        let answer = prompt.ask_retry("bad yaml").unwrap();
        (answer, String::from_utf8(prompt.into_output()).unwrap())
    }

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("y\n"), Some(true));
        assert_eq!(parse_answer(" Y "), Some(true));
        assert_eq!(parse_answer("no"), Some(false));
        assert_eq!(parse_answer("N"), Some(false));
        assert_eq!(parse_answer(""), None);
        assert_eq!(parse_answer("maybe"), None);
    }

    #[test]
    fn test_yes_and_no() {
        assert!(ask("y\n").0);
        assert!(!ask("n\n").0);
    }

    #[test]
    fn test_reprompts_on_invalid_input() {
        let (answer, output) = ask("maybe\n\nwhat\ny\n");

        assert!(answer);
        assert_eq!(output.matches("Invalid input").count(), 3);
        assert_eq!(output.matches("Do you want to fix the error?").count(), 4);
        assert!(output.contains("bad yaml"));
    }

    #[test]
    fn test_eof_aborts() {
        let (answer, output) = ask("hmm\n");
        assert!(!answer);
        assert_eq!(output.matches("Invalid input").count(), 1);
    }
}
