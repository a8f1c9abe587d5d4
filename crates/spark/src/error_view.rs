//! Rendering of command failures.
//!
//! [`Command::show_error`](crate::Command::show_error) hands the failure and
//! its message to an [`ErrorView`]. The default [`CliErrorView`] prints a red
//! badge followed by the message, and in verbose mode the chain of causes.

use crate::output::{Color, Output};
use crate::translate::Translator;
use std::io;
use std::rc::Rc;

/// Renders a failure for the user.
pub trait ErrorView {
    fn render(&self, error: &anyhow::Error, message: &str) -> io::Result<()>;
}

/// Plain terminal rendering of an error and its causes.
pub struct CliErrorView {
    output: Rc<dyn Output>,
    translator: Rc<dyn Translator>,
    verbose: bool,
}

impl CliErrorView {
    pub fn new(output: Rc<dyn Output>, translator: Rc<dyn Translator>) -> Self {
        Self {
            output,
            translator,
            verbose: false,
        }
    }

    /// Also list the source chain below the message.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl ErrorView for CliErrorView {
    fn render(&self, error: &anyhow::Error, message: &str) -> io::Result<()> {
        self.output.write("[Error]", Some(Color::Red))?;
        self.output.write(message, None)?;

        let causes: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
        if self.verbose && !causes.is_empty() {
            self.output.new_line()?;
            self.output.write(
                &self.translator.translate("CLI.errorCausedBy"),
                Some(Color::Yellow),
            )?;
            for (i, cause) in causes.iter().enumerate() {
                self.output.write(&format!("  {}: {}", i, cause), None)?;
            }
        }

        self.output.new_line()
    }
}
