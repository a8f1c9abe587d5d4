//! Commands every registry ships with.

use crate::command::{Command, CommandContext, CommandResult};
use crate::dispatch::group_summaries;
use crate::help::pad;
use crate::metadata::CommandMetadata;
use serde_json::{json, Value};
use unicode_width::UnicodeWidthStr;

const GROUP: &str = "Spark";

/// `help [command_name]`: shows the help text of another command.
#[derive(Debug)]
pub struct HelpCommand {
    meta: CommandMetadata,
    ctx: CommandContext,
}

impl HelpCommand {
    pub fn new(ctx: CommandContext) -> Self {
        let translator = ctx.translator.clone();
        let meta = CommandMetadata::new(GROUP, "help")
            .usage("help [<command_name>]")
            .description(translator.translate("CLI.helpCommand"))
            .argument("command_name", translator.translate("CLI.helpCommandName"));
        Self { meta, ctx }
    }
}

impl Command for HelpCommand {
    fn metadata(&self) -> &CommandMetadata {
        &self.meta
    }

    fn context(&self) -> &CommandContext {
        &self.ctx
    }

    fn execute(&mut self, params: &[String]) -> CommandResult {
        // Delegated through `call`, the first parameter is this command's name.
        let params = match params.first() {
            Some(first) if *first == self.meta.name => &params[1..],
            _ => params,
        };
        let name = params.first().map(String::as_str).unwrap_or("help");
        self.ctx.dispatcher.show_help(name)?;
        Ok(Value::Null)
    }
}

/// `list [--simple]`: lists the registered commands by group.
#[derive(Debug)]
pub struct ListCommand {
    meta: CommandMetadata,
    ctx: CommandContext,
}

impl ListCommand {
    pub fn new(ctx: CommandContext) -> Self {
        let translator = ctx.translator.clone();
        let meta = CommandMetadata::new(GROUP, "list")
            .usage("list [--simple]")
            .description(translator.translate("CLI.listCommands"))
            .option("--simple", translator.translate("CLI.listSimple"));
        Self { meta, ctx }
    }

    fn list_simple(&self) -> std::io::Result<Vec<String>> {
        let names: Vec<String> = self
            .ctx
            .dispatcher
            .summaries()
            .into_iter()
            .map(|summary| summary.name)
            .collect();
        for name in &names {
            self.ctx.output.write(name, None)?;
        }
        Ok(names)
    }

    fn list_full(&self) -> std::io::Result<Vec<String>> {
        let output = self.ctx.output.as_ref();
        let help = &self.ctx.help;
        let groups = group_summaries(self.ctx.dispatcher.summaries());

        let width = groups
            .values()
            .flatten()
            .map(|summary| summary.name.width())
            .max()
            .unwrap_or(0);

        let mut names = Vec::new();
        for (i, (group, commands)) in groups.iter().enumerate() {
            if i > 0 {
                output.new_line()?;
            }
            output.write(group, Some(help.heading_color))?;
            for summary in commands {
                let name = pad(&summary.name, width, help.extra, help.indent);
                let row = format!(
                    "{}{}",
                    output.color(&name, help.item_color),
                    summary.description.as_deref().unwrap_or_default()
                );
                output.write(&row, None)?;
                names.push(summary.name.clone());
            }
        }
        Ok(names)
    }
}

impl Command for ListCommand {
    fn metadata(&self) -> &CommandMetadata {
        &self.meta
    }

    fn context(&self) -> &CommandContext {
        &self.ctx
    }

    fn execute(&mut self, params: &[String]) -> CommandResult {
        let names = if params.iter().any(|p| p == "--simple") {
            self.list_simple()?
        } else {
            self.list_full()?
        };
        Ok(json!(names))
    }
}
