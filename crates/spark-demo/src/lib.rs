//! Demo commands for the `spark` binary.
//!
//! Each command is an ordinary [`Command`] implementation; [`register`] adds
//! them all to a [`CommandsBuilder`], and [`invoke`] runs one parsed command
//! line against the built registry.

use anyhow::{anyhow, bail};
use serde_json::{json, Value};
use spark::{
    Color, Command, CommandContext, CommandMetadata, CommandResult, Commands, CommandsBuilder,
};
use std::io;

// ============================================================================
// REGISTRATION
// ============================================================================

/// Registers every demo command.
pub fn register(builder: CommandsBuilder) -> CommandsBuilder {
    builder
        .command(|ctx| Box::new(MakeModel::new(ctx)))
        .command(|ctx| Box::new(ClearCache::new(ctx)))
        .command(|ctx| Box::new(Refresh::new(ctx)))
        .command(|ctx| Box::new(Seed::new(ctx)))
}

/// Runs one command line.
///
/// With no command the registry is listed; with `help` set the command's help
/// is shown instead of running it. Failures are reported through the
/// registry's output. Returns `true` when the command succeeded.
pub fn invoke(
    commands: &Commands,
    command: Option<&str>,
    params: &[String],
    help: bool,
) -> io::Result<bool> {
    let result = match command {
        None if help => commands.show_help("help"),
        None => commands.run("list", &[]).map(drop),
        Some(name) if help => commands.show_help(name),
        Some(name) => commands.run(name, params).map(|value| {
            tracing::debug!(command = name, result = %value, "command finished");
        }),
    };

    match result {
        Ok(()) => Ok(true),
        Err(err) => {
            commands.report(&err)?;
            Ok(false)
        }
    }
}

/// Splits raw parameters into positionals and `--flag[=value]` options.
///
/// A delegated command receives its own name first; `name` is skipped when
/// it leads the list.
fn split_params<'a>(name: &str, params: &'a [String]) -> (Vec<&'a str>, Vec<(&'a str, &'a str)>) {
    let params = match params.first() {
        Some(first) if first == name => &params[1..],
        _ => params,
    };

    let mut positional = Vec::new();
    let mut options = Vec::new();
    for param in params {
        match param.strip_prefix("--") {
            Some(flag) => options.push(flag.split_once('=').unwrap_or((flag, ""))),
            None => positional.push(param.as_str()),
        }
    }
    (positional, options)
}

/// `snake_case` plural table name for a model class name.
fn table_name(model: &str) -> String {
    let mut table = String::with_capacity(model.len() + 1);
    for (i, ch) in model.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                table.push('_');
            }
            table.extend(ch.to_lowercase());
        } else {
            table.push(ch);
        }
    }
    table.push('s');
    table
}

// ============================================================================
// COMMANDS
// ============================================================================

/// `make:model <name> [--table=<table>] [--force]`
pub struct MakeModel {
    meta: CommandMetadata,
    ctx: CommandContext,
}

impl MakeModel {
    pub fn new(ctx: CommandContext) -> Self {
        let meta = CommandMetadata::new("Generators", "make:model")
            .description("Creates a new model class.")
            .argument("name", "Model class name")
            .option("--table", "Table name [default: plural of the model name]")
            .option("--force", "Overwrite an existing model");
        Self { meta, ctx }
    }
}

impl Command for MakeModel {
    fn metadata(&self) -> &CommandMetadata {
        &self.meta
    }

    fn context(&self) -> &CommandContext {
        &self.ctx
    }

    fn execute(&mut self, params: &[String]) -> CommandResult {
        let (positional, options) = split_params(&self.meta.name, params);
        let Some(name) = positional.first().copied() else {
            self.show_help()?;
            bail!("missing required argument: name");
        };

        let mut table = table_name(name);
        let mut force = false;
        for (flag, value) in options {
            match flag {
                "table" if !value.is_empty() => table = value.to_string(),
                "force" => force = true,
                other => return Err(anyhow!("unknown option: --{}", other)),
            }
        }

        self.logger().info(&format!("generating model {}", name));
        let output = &self.ctx.output;
        output.write(
            &format!(
                "{} {} (table: {})",
                output.color("Model created:", Color::Green),
                name,
                table
            ),
            None,
        )?;

        Ok(json!({ "model": name, "table": table, "force": force }))
    }
}

/// `cache:clear`
pub struct ClearCache {
    meta: CommandMetadata,
    ctx: CommandContext,
}

impl ClearCache {
    pub fn new(ctx: CommandContext) -> Self {
        let meta = CommandMetadata::new("Housekeeping", "cache:clear")
            .description("Clears the current system caches.");
        Self { meta, ctx }
    }
}

impl Command for ClearCache {
    fn metadata(&self) -> &CommandMetadata {
        &self.meta
    }

    fn context(&self) -> &CommandContext {
        &self.ctx
    }

    fn execute(&mut self, _params: &[String]) -> CommandResult {
        self.logger().debug("clearing caches");
        self.ctx.output.write("Caches cleared.", Some(Color::Green))?;
        Ok(Value::Bool(true))
    }
}

/// `app:refresh`: clears caches by delegating to `cache:clear`.
pub struct Refresh {
    meta: CommandMetadata,
    ctx: CommandContext,
}

impl Refresh {
    pub fn new(ctx: CommandContext) -> Self {
        let meta = CommandMetadata::new("Housekeeping", "app:refresh")
            .description("Refreshes the application state.");
        Self { meta, ctx }
    }
}

impl Command for Refresh {
    fn metadata(&self) -> &CommandMetadata {
        &self.meta
    }

    fn context(&self) -> &CommandContext {
        &self.ctx
    }

    fn execute(&mut self, _params: &[String]) -> CommandResult {
        let cleared = self.call("cache:clear", &[])?;
        self.ctx.output.write("Application refreshed.", None)?;
        Ok(json!({ "cache_cleared": cleared }))
    }
}

/// `db:seed [--class=<seeder>]`: there is never a database, so the seeder
/// failure is shown through the error view and the command reports nothing
/// seeded.
pub struct Seed {
    meta: CommandMetadata,
    ctx: CommandContext,
}

impl Seed {
    pub fn new(ctx: CommandContext) -> Self {
        let meta = CommandMetadata::new("Database", "db:seed")
            .usage("db:seed [--class=<seeder>]")
            .description("Seeds the database with records.")
            .option("--class", "The seeder class to run");
        Self { meta, ctx }
    }
}

impl Command for Seed {
    fn metadata(&self) -> &CommandMetadata {
        &self.meta
    }

    fn context(&self) -> &CommandContext {
        &self.ctx
    }

    fn execute(&mut self, params: &[String]) -> CommandResult {
        let (_, options) = split_params(&self.meta.name, params);
        let class = options
            .iter()
            .find(|(flag, _)| *flag == "class")
            .map(|(_, value)| *value)
            .unwrap_or("DatabaseSeeder");

        let err = anyhow!("no database connection is configured")
            .context(format!("seeder {} could not run", class));
        self.show_error(&err);
        Ok(json!({ "class": class, "seeded": false }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_params() {
        let params = strings(&["User", "--table=people", "--force"]);
        let (positional, options) = split_params("make:model", &params);

        assert_eq!(positional, vec!["User"]);
        assert_eq!(options, vec![("table", "people"), ("force", "")]);
    }

    #[test]
    fn test_split_params_skips_delegated_name() {
        let params = strings(&["make:model", "User"]);
        let (positional, _) = split_params("make:model", &params);
        assert_eq!(positional, vec!["User"]);
    }

    #[test]
    fn test_table_name() {
        assert_eq!(table_name("User"), "users");
        assert_eq!(table_name("BlogPost"), "blog_posts");
        assert_eq!(table_name("tag"), "tags");
    }
}
