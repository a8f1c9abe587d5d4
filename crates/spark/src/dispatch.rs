//! Command dispatch.
//!
//! [`Dispatcher`] is the capability a command uses to run its siblings.
//! [`Commands`] is the in-memory registry that implements it: commands are
//! registered as factories, discovered once at build time, and instantiated
//! fresh for every run.
//!
//! ```rust,ignore
//! let commands = Commands::builder()
//!     .command(|ctx| Box::new(MakeModel::new(ctx)))
//!     .command(|ctx| Box::new(ClearCache::new(ctx)))
//!     .build()?;
//!
//! match commands.run("make:model", &params) {
//!     Ok(_) => {}
//!     Err(err) => commands.report(&err)?,
//! }
//! ```
//!
//! Commands hold the registry through a weak handle, so a registry can be
//! dropped while commands built from it are still alive; their delegations
//! then fail with [`DispatchError::Closed`].

use crate::builtin::{HelpCommand, ListCommand};
use crate::command::{Command, CommandContext};
use crate::config::{Config, SetupError};
use crate::error_view::{CliErrorView, ErrorView};
use crate::help::HelpConfig;
use crate::logger::{Logger, TracingLogger};
use crate::output::{Color, ConsoleOutput, Output};
use crate::translate::{self, Messages, Translator};
use serde_json::Value;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::rc::{Rc, Weak};

/// Runs commands by name.
pub trait Dispatcher {
    /// Resolves `command` and executes it with `params`.
    fn run(&self, command: &str, params: &[String]) -> Result<Value, DispatchError>;

    /// Shows the help text of `command`.
    fn show_help(&self, command: &str) -> Result<(), DispatchError> {
        Err(DispatchError::NotFound {
            name: command.to_string(),
            alternatives: Vec::new(),
        })
    }

    /// Describes every command this dispatcher can run.
    fn summaries(&self) -> Vec<CommandSummary> {
        Vec::new()
    }
}

/// Errors from dispatching a command.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No command is registered under this name.
    #[error("command \"{name}\" not found")]
    NotFound {
        name: String,
        /// Similar registered names, sorted.
        alternatives: Vec<String>,
    },

    /// The command ran and failed.
    #[error("command \"{name}\" failed: {source}")]
    Execution {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// Writing to the output failed.
    #[error("output error: {0}")]
    Output(#[from] io::Error),

    /// The registry behind a command's dispatcher handle was dropped.
    #[error("command registry is no longer available")]
    Closed,
}

/// Identity of a registered command, as shown in listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSummary {
    pub name: String,
    pub group: String,
    pub description: Option<String>,
}

/// Builds a fresh command instance from the injected context.
pub type CommandFactory = Box<dyn Fn(CommandContext) -> Box<dyn Command>>;

/// The dispatcher handed to commands: a non-owning handle to the registry.
struct RegistryHandle(Weak<Commands>);

impl Dispatcher for RegistryHandle {
    fn run(&self, command: &str, params: &[String]) -> Result<Value, DispatchError> {
        self.0
            .upgrade()
            .ok_or(DispatchError::Closed)?
            .run(command, params)
    }

    fn show_help(&self, command: &str) -> Result<(), DispatchError> {
        self.0
            .upgrade()
            .ok_or(DispatchError::Closed)?
            .show_help(command)
    }

    fn summaries(&self) -> Vec<CommandSummary> {
        self.0
            .upgrade()
            .map(|commands| commands.summaries())
            .unwrap_or_default()
    }
}

struct Registered {
    summary: CommandSummary,
    factory: CommandFactory,
}

/// An in-memory command registry and runner.
pub struct Commands {
    registry: BTreeMap<String, Registered>,
    context: CommandContext,
    depth: Cell<usize>,
}

impl Commands {
    pub fn builder() -> CommandsBuilder {
        CommandsBuilder::new()
    }

    /// Returns `true` if a command is registered under `name`.
    pub fn has(&self, name: &str) -> bool {
        self.registry.contains_key(name)
    }

    /// All registered commands, sorted by name.
    pub fn summaries(&self) -> Vec<CommandSummary> {
        self.registry.values().map(|r| r.summary.clone()).collect()
    }

    /// Registered commands by group, groups and commands sorted by name.
    pub fn grouped(&self) -> BTreeMap<String, Vec<CommandSummary>> {
        group_summaries(self.summaries())
    }

    /// The context injected into every command built by this registry.
    pub fn context(&self) -> &CommandContext {
        &self.context
    }

    /// Builds a fresh instance of `name`.
    pub fn instantiate(&self, name: &str) -> Option<Box<dyn Command>> {
        self.registry
            .get(name)
            .map(|registered| (registered.factory)(self.context.clone()))
    }

    /// Registered names similar to `name`.
    ///
    /// A name qualifies when its edit distance to `name` is at most a third
    /// of its length, or when it contains `name`. Results are sorted
    /// case-insensitively.
    pub fn alternatives(&self, name: &str) -> Vec<String> {
        suggest(name, self.registry.keys().map(String::as_str))
    }

    /// Runs `name` with `params`, returning whatever the command produced.
    pub fn run(&self, name: &str, params: &[String]) -> Result<Value, DispatchError> {
        let mut command = self.instantiate(name).ok_or_else(|| {
            tracing::debug!(command = name, "command not found");
            DispatchError::NotFound {
                name: name.to_string(),
                alternatives: self.alternatives(name),
            }
        })?;

        let guard = DepthGuard::enter(&self.depth);
        tracing::debug!(command = name, depth = guard.depth(), params = ?params, "running command");

        let result = command.execute(params);
        drop(guard);

        result.map_err(|source| {
            tracing::debug!(command = name, error = %source, "command failed");
            DispatchError::Execution {
                name: name.to_string(),
                source,
            }
        })
    }

    /// Number of commands currently executing on this registry.
    ///
    /// 0 between runs; grows by one per nested [`Command::call`].
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// Writes the help text of `name`.
    pub fn show_help(&self, name: &str) -> Result<(), DispatchError> {
        let command = self.instantiate(name).ok_or_else(|| DispatchError::NotFound {
            name: name.to_string(),
            alternatives: self.alternatives(name),
        })?;
        command.show_help()?;
        Ok(())
    }

    /// Tells the user about a failed dispatch.
    ///
    /// Unknown commands get a not-found message plus any alternatives;
    /// everything else goes through the error view.
    pub fn report(&self, error: &DispatchError) -> io::Result<()> {
        let output = self.context.output.as_ref();
        let translator = self.context.translator.as_ref();

        match error {
            DispatchError::NotFound { name, alternatives } => {
                output.write(
                    &translator.format(translate::COMMAND_NOT_FOUND, &[name.as_str()]),
                    Some(Color::Red),
                )?;
                if !alternatives.is_empty() {
                    let key = if alternatives.len() == 1 {
                        translate::ALT_COMMAND_SINGULAR
                    } else {
                        translate::ALT_COMMAND_PLURAL
                    };
                    output.new_line()?;
                    output.write(&translator.translate(key), None)?;
                    for alternative in alternatives {
                        output.write(&format!("    {}", alternative), None)?;
                    }
                }
                Ok(())
            }
            DispatchError::Execution { source, .. } => {
                // A delegated dispatch failed inside the command; report the root failure.
                if let Some(inner) = source.downcast_ref::<DispatchError>() {
                    return self.report(inner);
                }
                self.context
                    .error_view
                    .render(source, &source.to_string())
            }
            DispatchError::Output(err) => {
                let message = error.to_string();
                let error = anyhow::Error::new(io::Error::new(err.kind(), err.to_string()))
                    .context(message.clone());
                self.context.error_view.render(&error, &message)
            }
            DispatchError::Closed => {
                let message = error.to_string();
                self.context
                    .error_view
                    .render(&anyhow::Error::msg(message.clone()), &message)
            }
        }
    }
}

/// Counts one level of command execution for as long as it lives, so the
/// depth is restored even when a command panics.
struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
}

impl<'a> DepthGuard<'a> {
    fn enter(depth: &'a Cell<usize>) -> Self {
        depth.set(depth.get() + 1);
        Self { depth }
    }

    fn depth(&self) -> usize {
        self.depth.get()
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get() - 1);
    }
}

impl Dispatcher for Commands {
    fn run(&self, command: &str, params: &[String]) -> Result<Value, DispatchError> {
        Commands::run(self, command, params)
    }

    fn show_help(&self, command: &str) -> Result<(), DispatchError> {
        Commands::show_help(self, command)
    }

    fn summaries(&self) -> Vec<CommandSummary> {
        Commands::summaries(self)
    }
}

impl fmt::Debug for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Commands")
            .field("commands", &self.registry.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Groups summaries by their group name, sorting each group by command name.
pub fn group_summaries(
    summaries: impl IntoIterator<Item = CommandSummary>,
) -> BTreeMap<String, Vec<CommandSummary>> {
    let mut groups: BTreeMap<String, Vec<CommandSummary>> = BTreeMap::new();
    for summary in summaries {
        groups.entry(summary.group.clone()).or_default().push(summary);
    }
    for commands in groups.values_mut() {
        commands.sort_by(|a, b| a.name.cmp(&b.name));
    }
    groups
}

/// Suggests names from `candidates` that look like `input`.
pub fn suggest<'a>(input: &str, candidates: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut found: Vec<String> = candidates
        .into_iter()
        .filter(|candidate| {
            levenshtein(input, candidate) * 3 <= candidate.chars().count()
                || candidate.contains(input)
        })
        .map(String::from)
        .collect();
    found.sort_by_key(|name| name.to_lowercase());
    found
}

/// Levenshtein distance between two strings, by characters.
fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let n = b_chars.len();

    let mut prev_row: Vec<usize> = (0..=n).collect();
    let mut curr_row = vec![0usize; n + 1];

    for (i, a_ch) in a_chars.iter().enumerate() {
        curr_row[0] = i + 1;
        for (j, b_ch) in b_chars.iter().enumerate() {
            let cost = if a_ch == b_ch { 0 } else { 1 };
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[n]
}

fn builtin_factories() -> Vec<CommandFactory> {
    let help: CommandFactory =
        Box::new(|ctx: CommandContext| Box::new(HelpCommand::new(ctx)) as Box<dyn Command>);
    let list: CommandFactory =
        Box::new(|ctx: CommandContext| Box::new(ListCommand::new(ctx)) as Box<dyn Command>);
    vec![help, list]
}

/// Builder for [`Commands`].
///
/// Unset capabilities fall back to a [`TracingLogger`], a [`ConsoleOutput`]
/// with automatic color detection, the English [`Messages`] and a
/// [`CliErrorView`]. The built-in `help` and `list` commands are registered
/// unless disabled with [`builtins(false)`](Self::builtins).
pub struct CommandsBuilder {
    factories: Vec<CommandFactory>,
    logger: Option<Rc<dyn Logger>>,
    output: Option<Rc<dyn Output>>,
    translator: Option<Rc<dyn Translator>>,
    error_view: Option<Rc<dyn ErrorView>>,
    help: HelpConfig,
    verbose_errors: bool,
    builtins: bool,
}

impl Default for CommandsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandsBuilder {
    pub fn new() -> Self {
        Self {
            factories: Vec::new(),
            logger: None,
            output: None,
            translator: None,
            error_view: None,
            help: HelpConfig::default(),
            verbose_errors: false,
            builtins: true,
        }
    }

    /// Registers a command factory.
    ///
    /// The factory is called once at build time to discover the command's
    /// metadata, then once per run.
    pub fn command<F>(mut self, factory: F) -> Self
    where
        F: Fn(CommandContext) -> Box<dyn Command> + 'static,
    {
        self.factories.push(Box::new(factory));
        self
    }

    pub fn logger(mut self, logger: Rc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn output(mut self, output: Rc<dyn Output>) -> Self {
        self.output = Some(output);
        self
    }

    pub fn translator(mut self, translator: Rc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn error_view(mut self, error_view: Rc<dyn ErrorView>) -> Self {
        self.error_view = Some(error_view);
        self
    }

    pub fn help_config(mut self, help: HelpConfig) -> Self {
        self.help = help;
        self
    }

    /// Show cause chains in the default error view.
    pub fn verbose_errors(mut self, verbose: bool) -> Self {
        self.verbose_errors = verbose;
        self
    }

    /// Whether to register the built-in `help` and `list` commands.
    pub fn builtins(mut self, enabled: bool) -> Self {
        self.builtins = enabled;
        self
    }

    /// Applies a [`Config`]: console colors, error verbosity, help layout and
    /// an optional message catalog overlay.
    pub fn config(mut self, config: &Config) -> Result<Self, SetupError> {
        self.output = Some(Rc::new(ConsoleOutput::new(config.color)));
        self.verbose_errors = config.verbose_errors;
        self.help = config.help.clone();
        if let Some(path) = &config.messages {
            let messages = Messages::english().merge(Messages::load(path)?);
            self.translator = Some(Rc::new(messages));
        }
        Ok(self)
    }

    /// Discovers every registered command and assembles the registry.
    pub fn build(self) -> Result<Rc<Commands>, SetupError> {
        let logger = self
            .logger
            .unwrap_or_else(|| Rc::new(TracingLogger) as Rc<dyn Logger>);
        let output = self
            .output
            .unwrap_or_else(|| Rc::new(ConsoleOutput::default()) as Rc<dyn Output>);
        let translator = self
            .translator
            .unwrap_or_else(|| Rc::new(Messages::english()) as Rc<dyn Translator>);
        let error_view = self.error_view.unwrap_or_else(|| {
            Rc::new(CliErrorView::new(output.clone(), translator.clone()).verbose(self.verbose_errors))
                as Rc<dyn ErrorView>
        });

        let factories = if self.builtins {
            let mut all = builtin_factories();
            all.extend(self.factories);
            all
        } else {
            self.factories
        };

        let help = self.help;
        let mut duplicate = None;
        let commands = Rc::new_cyclic(|weak: &Weak<Commands>| {
            let dispatcher: Rc<dyn Dispatcher> = Rc::new(RegistryHandle(weak.clone()));
            let context = CommandContext::new(logger, dispatcher, output, translator)
                .with_error_view(error_view)
                .with_help_config(help);

            let mut registry = BTreeMap::new();
            for factory in factories {
                let meta = factory(context.clone()).metadata().clone();
                if registry.contains_key(&meta.name) {
                    duplicate.get_or_insert_with(|| meta.name.clone());
                    continue;
                }
                let summary = CommandSummary {
                    description: meta.summary().map(String::from),
                    name: meta.name.clone(),
                    group: meta.group,
                };
                registry.insert(meta.name, Registered { summary, factory });
            }

            Commands {
                registry,
                context,
                depth: Cell::new(0),
            }
        });

        match duplicate {
            Some(name) => Err(SetupError::DuplicateCommand(name)),
            None => {
                tracing::debug!(count = commands.registry.len(), "commands discovered");
                Ok(commands)
            }
        }
    }
}
