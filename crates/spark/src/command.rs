//! The command contract.
//!
//! A command is a unit of CLI functionality: it describes itself with
//! [`CommandMetadata`] and does its work in [`Command::execute`]. Delegation,
//! help and error reporting are provided by the trait on top of the
//! [`CommandContext`] the command was constructed with.
//!
//! # Implementing a command
//!
//! ```rust
//! use spark::{Command, CommandContext, CommandMetadata, CommandResult};
//!
//! struct ClearCache {
//!     meta: CommandMetadata,
//!     ctx: CommandContext,
//! }
//!
//! impl ClearCache {
//!     fn new(ctx: CommandContext) -> Self {
//!         let meta = CommandMetadata::new("Housekeeping", "cache:clear")
//!             .description("Clears the current system caches.");
//!         Self { meta, ctx }
//!     }
//! }
//!
//! impl Command for ClearCache {
//!     fn metadata(&self) -> &CommandMetadata {
//!         &self.meta
//!     }
//!
//!     fn context(&self) -> &CommandContext {
//!         &self.ctx
//!     }
//!
//!     fn execute(&mut self, _params: &[String]) -> CommandResult {
//!         self.logger().info("cache cleared");
//!         Ok(serde_json::Value::Null)
//!     }
//! }
//! ```
//!
//! # Parameters and delegation
//!
//! [`Command::call`] forwards `[name, params...]` to the dispatcher, so a
//! delegated command sees its own name as the first parameter. Commands run
//! straight from the command line receive only the user's parameters.

use crate::dispatch::{DispatchError, Dispatcher};
use crate::error_view::{CliErrorView, ErrorView};
use crate::help::{render_help, HelpConfig};
use crate::logger::Logger;
use crate::metadata::{CommandMetadata, MetaValue};
use crate::output::Output;
use crate::translate::Translator;
use serde_json::Value;
use std::fmt;
use std::io;
use std::rc::Rc;

/// What a command's `execute` produces.
///
/// The value is passed back unchanged to whoever dispatched the command;
/// commands with nothing to report return `Value::Null`.
pub type CommandResult = Result<Value, anyhow::Error>;

/// Capabilities injected into every command instance.
///
/// All handles are shared and owned by the runner; a command only borrows
/// them for the duration of one invocation.
#[derive(Clone)]
pub struct CommandContext {
    /// Logger exposed to the command.
    pub logger: Rc<dyn Logger>,
    /// Runs sibling commands for [`Command::call`].
    pub dispatcher: Rc<dyn Dispatcher>,
    /// Where help and errors are written.
    pub output: Rc<dyn Output>,
    /// Resolves help headings and messages.
    pub translator: Rc<dyn Translator>,
    /// Renders failures passed to [`Command::show_error`].
    pub error_view: Rc<dyn ErrorView>,
    /// Layout of help output.
    pub help: HelpConfig,
}

impl CommandContext {
    /// Creates a context with a [`CliErrorView`] and the default help layout.
    pub fn new(
        logger: Rc<dyn Logger>,
        dispatcher: Rc<dyn Dispatcher>,
        output: Rc<dyn Output>,
        translator: Rc<dyn Translator>,
    ) -> Self {
        let error_view = Rc::new(CliErrorView::new(output.clone(), translator.clone()));
        Self {
            logger,
            dispatcher,
            output,
            translator,
            error_view,
            help: HelpConfig::default(),
        }
    }

    pub fn with_error_view(mut self, error_view: Rc<dyn ErrorView>) -> Self {
        self.error_view = error_view;
        self
    }

    pub fn with_help_config(mut self, help: HelpConfig) -> Self {
        self.help = help;
        self
    }
}

impl fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("help", &self.help)
            .finish_non_exhaustive()
    }
}

/// A runnable, self-describing command.
pub trait Command {
    /// The command's descriptive metadata.
    fn metadata(&self) -> &CommandMetadata;

    /// The capabilities the command was constructed with.
    fn context(&self) -> &CommandContext;

    /// Runs the command.
    fn execute(&mut self, params: &[String]) -> CommandResult;

    /// The injected logger.
    fn logger(&self) -> &dyn Logger {
        self.context().logger.as_ref()
    }

    /// Runs another command through the dispatcher.
    ///
    /// The command name is prepended to `params` before dispatch. Failures
    /// from the dispatcher, including unknown commands, are returned as-is.
    fn call(&self, command: &str, params: &[String]) -> Result<Value, DispatchError> {
        let mut forwarded = Vec::with_capacity(params.len() + 1);
        forwarded.push(command.to_string());
        forwarded.extend_from_slice(params);

        tracing::debug!(
            caller = %self.metadata().name,
            callee = command,
            "delegating to command"
        );
        self.context().dispatcher.run(command, &forwarded)
    }

    /// Renders a failure through the error view.
    ///
    /// Never fails: if the view itself cannot write, that is logged and
    /// dropped.
    fn show_error(&self, error: &anyhow::Error) {
        let message = error.to_string();
        if let Err(err) = self.context().error_view.render(error, &message) {
            tracing::warn!(
                command = %self.metadata().name,
                error = %err,
                "failed to render error view"
            );
        }
    }

    /// Writes the help text for this command.
    fn show_help(&self) -> io::Result<()> {
        let ctx = self.context();
        render_help(
            self.metadata(),
            ctx.output.as_ref(),
            ctx.translator.as_ref(),
            &ctx.help,
        )
    }

    /// Reads a metadata field by name; unknown or unset fields are `None`.
    fn get(&self, field: &str) -> MetaValue<'_> {
        self.metadata().get(field)
    }

    /// Returns `true` if the metadata field is set and non-empty.
    fn has(&self, field: &str) -> bool {
        self.metadata().has(field)
    }
}
