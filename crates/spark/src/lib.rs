//! Command contract, dispatch and help rendering for framework CLIs.
//!
//! `spark` provides the pieces a framework's command line is built from:
//!
//! - **[`Command`]**: the trait every concrete command implements. A command
//!   describes itself with [`CommandMetadata`] and runs in
//!   [`execute`](Command::execute); delegation, help and error reporting come
//!   for free.
//! - **[`Dispatcher`]**: runs commands by name. [`Commands`] is the bundled
//!   registry; commands reach it through [`Command::call`].
//! - **Help rendering**: [`Command::show_help`] lays out usage, description,
//!   arguments and options as aligned, colored columns.
//!
//! # Capabilities
//!
//! Commands never touch globals. Everything they need arrives in a
//! [`CommandContext`]:
//!
//! | Field        | Trait          | Bundled implementations                      |
//! |--------------|----------------|----------------------------------------------|
//! | `logger`     | [`Logger`]     | [`TracingLogger`], [`MemoryLogger`]          |
//! | `dispatcher` | [`Dispatcher`] | [`Commands`]                                 |
//! | `output`     | [`Output`]     | [`ConsoleOutput`], [`BufferOutput`]          |
//! | `translator` | [`Translator`] | [`Messages`], any `Fn(&str) -> String`       |
//! | `error_view` | [`ErrorView`]  | [`CliErrorView`]                             |
//!
//! # Example
//!
//! ```rust
//! use spark::{BufferOutput, Command, CommandContext, CommandMetadata, CommandResult, Commands};
//! use std::rc::Rc;
//!
//! struct Greet {
//!     meta: CommandMetadata,
//!     ctx: CommandContext,
//! }
//!
//! impl Command for Greet {
//!     fn metadata(&self) -> &CommandMetadata {
//!         &self.meta
//!     }
//!
//!     fn context(&self) -> &CommandContext {
//!         &self.ctx
//!     }
//!
//!     fn execute(&mut self, params: &[String]) -> CommandResult {
//!         let who = params.first().map(String::as_str).unwrap_or("world");
//!         self.ctx.output.write(&format!("Hello, {}!", who), None)?;
//!         Ok(serde_json::Value::Null)
//!     }
//! }
//!
//! let output = Rc::new(BufferOutput::new());
//! let commands = Commands::builder()
//!     .output(output.clone())
//!     .command(|ctx| {
//!         let meta = CommandMetadata::new("Demo", "greet").argument("who", "Who to greet");
//!         Box::new(Greet { meta, ctx })
//!     })
//!     .build()?;
//!
//! commands.run("greet", &["spark".to_string()])?;
//! assert_eq!(output.contents(), "Hello, spark!");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod builtin;
mod command;
mod config;
mod dispatch;
mod error_view;
pub mod help;
mod logger;
mod metadata;
mod output;
pub mod translate;

pub use builtin::{HelpCommand, ListCommand};
pub use command::{Command, CommandContext, CommandResult};
pub use config::{Config, SetupError};
pub use dispatch::{
    group_summaries, suggest, CommandFactory, CommandSummary, Commands, CommandsBuilder,
    DispatchError, Dispatcher,
};
pub use error_view::{CliErrorView, ErrorView};
pub use help::{pad, render_help, HelpConfig};
pub use logger::{Logger, MemoryLogger, TracingLogger};
pub use metadata::{CommandMetadata, Entries, MetaValue};
pub use output::{BufferOutput, Color, ColorMode, ColorParseError, ConsoleOutput, Output, TextMode};
pub use translate::{Messages, Translator};

pub use tracing::Level;
