use anyhow::anyhow;
use serde_json::{json, Value};
use spark::{
    BufferOutput, Command, CommandContext, CommandMetadata, CommandResult, Commands,
    DispatchError, Level, MemoryLogger, Messages, SetupError,
};
use std::cell::RefCell;
use std::rc::Rc;

// ============================================================================
// Test commands
// ============================================================================

struct Echo {
    meta: CommandMetadata,
    ctx: CommandContext,
}

impl Echo {
    fn new(ctx: CommandContext) -> Self {
        let meta = CommandMetadata::new("Demo", "echo")
            .description("Echoes its parameters.")
            .argument("words", "Words to echo");
        Self { meta, ctx }
    }
}

impl Command for Echo {
    fn metadata(&self) -> &CommandMetadata {
        &self.meta
    }

    fn context(&self) -> &CommandContext {
        &self.ctx
    }

    fn execute(&mut self, params: &[String]) -> CommandResult {
        self.ctx.output.write(&params.join(" "), None)?;
        Ok(json!(params))
    }
}

/// Delegates to `echo` and returns what it returned.
struct Relay {
    meta: CommandMetadata,
    ctx: CommandContext,
}

impl Relay {
    fn new(ctx: CommandContext) -> Self {
        let meta = CommandMetadata::new("Demo", "relay").description("Calls echo.");
        Self { meta, ctx }
    }
}

impl Command for Relay {
    fn metadata(&self) -> &CommandMetadata {
        &self.meta
    }

    fn context(&self) -> &CommandContext {
        &self.ctx
    }

    fn execute(&mut self, params: &[String]) -> CommandResult {
        self.logger().info("relaying");
        Ok(self.call("echo", params)?)
    }
}

/// Calls a command that does not exist.
struct Broken {
    meta: CommandMetadata,
    ctx: CommandContext,
}

impl Command for Broken {
    fn metadata(&self) -> &CommandMetadata {
        &self.meta
    }

    fn context(&self) -> &CommandContext {
        &self.ctx
    }

    fn execute(&mut self, _params: &[String]) -> CommandResult {
        Ok(self.call("ecko", &[])?)
    }
}

/// Fails, and reports the failure itself.
struct Seed {
    meta: CommandMetadata,
    ctx: CommandContext,
}

impl Command for Seed {
    fn metadata(&self) -> &CommandMetadata {
        &self.meta
    }

    fn context(&self) -> &CommandContext {
        &self.ctx
    }

    fn execute(&mut self, _params: &[String]) -> CommandResult {
        let err = anyhow!("seeder class not found");
        self.show_error(&err);
        Err(err)
    }
}

/// Shows the help of `list` through the built-in `help` command.
struct AskHelp {
    meta: CommandMetadata,
    ctx: CommandContext,
}

impl Command for AskHelp {
    fn metadata(&self) -> &CommandMetadata {
        &self.meta
    }

    fn context(&self) -> &CommandContext {
        &self.ctx
    }

    fn execute(&mut self, _params: &[String]) -> CommandResult {
        Ok(self.call("help", &strings(&["list"]))?)
    }
}

/// Panics while executing.
struct Explode {
    meta: CommandMetadata,
    ctx: CommandContext,
}

impl Command for Explode {
    fn metadata(&self) -> &CommandMetadata {
        &self.meta
    }

    fn context(&self) -> &CommandContext {
        &self.ctx
    }

    fn execute(&mut self, _params: &[String]) -> CommandResult {
        panic!("exploded");
    }
}

struct Harness {
    commands: Rc<Commands>,
    output: Rc<BufferOutput>,
    logger: Rc<MemoryLogger>,
}

fn harness() -> Harness {
    let output = Rc::new(BufferOutput::new());
    let logger = Rc::new(MemoryLogger::new());
    let commands = Commands::builder()
        .output(output.clone())
        .logger(logger.clone())
        .command(|ctx| Box::new(Echo::new(ctx)))
        .command(|ctx| Box::new(Relay::new(ctx)))
        .command(|ctx| {
            Box::new(Broken {
                meta: CommandMetadata::new("Demo", "broken"),
                ctx,
            })
        })
        .command(|ctx| {
            Box::new(Seed {
                meta: CommandMetadata::new("Database", "db:seed")
                    .description("Runs the specified seeder."),
                ctx,
            })
        })
        .build()
        .unwrap();
    Harness {
        commands,
        output,
        logger,
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Dispatch
// ============================================================================

#[test]
fn test_run_passes_params_and_returns_value() {
    let h = harness();
    let value = h.commands.run("echo", &strings(&["a", "b"])).unwrap();

    assert_eq!(value, json!(["a", "b"]));
    assert_eq!(h.output.lines(), vec!["a b"]);
}

#[test]
fn test_call_prepends_name_through_registry() {
    let h = harness();
    let value = h.commands.run("relay", &strings(&["x"])).unwrap();

    assert_eq!(value, json!(["echo", "x"]));
    assert_eq!(h.output.lines(), vec!["echo x"]);
    assert_eq!(h.logger.messages(Level::INFO), vec!["relaying"]);
}

#[test]
fn test_unknown_command_has_alternatives() {
    let h = harness();
    let err = h.commands.run("ecko", &[]).unwrap_err();

    match err {
        DispatchError::NotFound { name, alternatives } => {
            assert_eq!(name, "ecko");
            assert_eq!(alternatives, vec!["echo"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_delegation_failure_propagates() {
    let h = harness();
    let err = h.commands.run("broken", &[]).unwrap_err();

    let DispatchError::Execution { name, source } = err else {
        panic!("expected execution error");
    };
    assert_eq!(name, "broken");
    assert!(matches!(
        source.downcast_ref::<DispatchError>(),
        Some(DispatchError::NotFound { name, .. }) if name == "ecko"
    ));
}

#[test]
fn test_report_unwraps_delegated_not_found() {
    let h = harness();
    let err = h.commands.run("broken", &[]).unwrap_err();
    h.commands.report(&err).unwrap();

    assert_eq!(
        h.output.lines(),
        vec![
            "Command \"ecko\" not found.",
            "",
            "Did you mean this?",
            "    echo",
        ]
    );
}

#[test]
fn test_report_plural_alternatives() {
    let h = harness();
    let err = h.commands.run("e", &[]).unwrap_err();
    h.commands.report(&err).unwrap();

    let lines = h.output.lines();
    assert_eq!(lines[2], "Did you mean one of these?");
    assert!(lines.contains(&"    echo".to_string()));
}

#[test]
fn test_report_without_alternatives() {
    let h = harness();
    let err = h.commands.run("serve", &[]).unwrap_err();
    h.commands.report(&err).unwrap();

    assert_eq!(h.output.lines(), vec!["Command \"serve\" not found."]);
}

#[test]
fn test_show_error_inside_command() {
    let h = harness();
    let err = h.commands.run("db:seed", &[]).unwrap_err();

    assert!(matches!(err, DispatchError::Execution { .. }));
    assert_eq!(
        h.output.lines(),
        vec!["[Error]", "seeder class not found", ""]
    );
}

#[test]
fn test_fresh_instance_per_run() {
    thread_local! {
        static BUILT: RefCell<usize> = const { RefCell::new(0) };
    }

    let commands = Commands::builder()
        .output(Rc::new(BufferOutput::new()))
        .builtins(false)
        .command(|ctx| {
            BUILT.with(|b| *b.borrow_mut() += 1);
            Box::new(Echo::new(ctx))
        })
        .build()
        .unwrap();

    // One instance for discovery, then one per run.
    assert_eq!(BUILT.with(|b| *b.borrow()), 1);
    commands.run("echo", &[]).unwrap();
    commands.run("echo", &[]).unwrap();
    assert_eq!(BUILT.with(|b| *b.borrow()), 3);
}

#[test]
fn test_dropped_registry_closes_handles() {
    let h = harness();
    let relay = h.commands.instantiate("relay").unwrap();
    drop(h.commands);

    let err = relay.call("echo", &[]).unwrap_err();
    assert!(matches!(err, DispatchError::Closed));
}

#[test]
fn test_depth_restored_after_panic() {
    let commands = Commands::builder()
        .output(Rc::new(BufferOutput::new()))
        .command(|ctx| {
            Box::new(Explode {
                meta: CommandMetadata::new("Demo", "explode"),
                ctx,
            })
        })
        .build()
        .unwrap();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        commands.run("explode", &[])
    }));

    assert!(result.is_err());
    assert_eq!(commands.depth(), 0);
    commands.run("list", &strings(&["--simple"])).unwrap();
    assert_eq!(commands.depth(), 0);
}

#[test]
fn test_report_output_error_keeps_source() {
    let output = Rc::new(BufferOutput::new());
    let commands = Commands::builder()
        .output(output.clone())
        .verbose_errors(true)
        .build()
        .unwrap();

    let err = DispatchError::Output(std::io::Error::new(
        std::io::ErrorKind::BrokenPipe,
        "pipe closed",
    ));
    commands.report(&err).unwrap();

    assert_eq!(
        output.lines(),
        vec![
            "[Error]",
            "output error: pipe closed",
            "",
            "Caused by:",
            "  0: pipe closed",
            "",
        ]
    );
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_duplicate_names_rejected() {
    let result = Commands::builder()
        .output(Rc::new(BufferOutput::new()))
        .command(|ctx| Box::new(Echo::new(ctx)))
        .command(|ctx| Box::new(Echo::new(ctx)))
        .build();

    match result {
        Err(SetupError::DuplicateCommand(name)) => assert_eq!(name, "echo"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_summaries_sorted_and_grouped() {
    let h = harness();
    let names: Vec<_> = h
        .commands
        .summaries()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(
        names,
        vec!["broken", "db:seed", "echo", "help", "list", "relay"]
    );

    let groups = h.commands.grouped();
    let keys: Vec<_> = groups.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["Database", "Demo", "Spark"]);
    assert_eq!(
        groups["Database"][0].description.as_deref(),
        Some("Runs the specified seeder.")
    );
}

#[test]
fn test_has_and_instantiate() {
    let h = harness();
    assert!(h.commands.has("echo"));
    assert!(!h.commands.has("ecko"));

    let echo = h.commands.instantiate("echo").unwrap();
    assert_eq!(echo.get("group").as_str(), Some("Demo"));
    assert!(h.commands.instantiate("ecko").is_none());
}

// ============================================================================
// Built-in commands
// ============================================================================

#[test]
fn test_help_command_shows_target_help() {
    let h = harness();
    h.commands.run("help", &strings(&["echo"])).unwrap();

    assert_eq!(
        h.output.lines(),
        vec![
            "Usage:",
            "  echo [arguments]",
            "",
            "Description:",
            "  Echoes its parameters.",
            "",
            "Arguments:",
            "  words  Words to echo",
        ]
    );
}

#[test]
fn test_help_command_defaults_to_itself() {
    let h = harness();
    h.commands.run("help", &[]).unwrap();

    let lines = h.output.lines();
    assert_eq!(lines[1], "  help [<command_name>]");
    assert_eq!(
        lines.last().map(String::as_str),
        Some("  command_name  The command name [default: \"help\"]")
    );
}

#[test]
fn test_help_command_through_call() {
    let output = Rc::new(BufferOutput::new());
    let commands = Commands::builder()
        .output(output.clone())
        .command(|ctx| {
            Box::new(AskHelp {
                meta: CommandMetadata::new("Demo", "ask"),
                ctx,
            })
        })
        .build()
        .unwrap();

    commands.run("ask", &[]).unwrap();

    let lines = output.lines();
    assert_eq!(lines[0], "Usage:");
    assert_eq!(lines[1], "  list [--simple]");
}

#[test]
fn test_help_command_through_call_defaults_to_itself() {
    let h = harness();
    let relay = h.commands.instantiate("relay").unwrap();
    relay.call("help", &[]).unwrap();

    assert_eq!(h.output.lines()[1], "  help [<command_name>]");
}

#[test]
fn test_help_command_unknown_target() {
    let h = harness();
    let err = h.commands.run("help", &strings(&["ecko"])).unwrap_err();
    h.commands.report(&err).unwrap();

    assert_eq!(h.output.lines()[0], "Command \"ecko\" not found.");
}

#[test]
fn test_list_full() {
    let h = harness();
    let value = h.commands.run("list", &[]).unwrap();

    assert_eq!(
        value,
        json!(["db:seed", "broken", "echo", "relay", "help", "list"])
    );
    assert_eq!(
        h.output.lines(),
        vec![
            "Database",
            "  db:seed  Runs the specified seeder.",
            "",
            "Demo",
            "  broken   ",
            "  echo     Echoes its parameters.",
            "  relay    Calls echo.",
            "",
            "Spark",
            "  help     Displays basic usage information.",
            "  list     Lists the available commands.",
        ]
    );
}

#[test]
fn test_list_simple() {
    let h = harness();
    h.commands.run("list", &strings(&["--simple"])).unwrap();

    assert_eq!(
        h.output.lines(),
        vec!["broken", "db:seed", "echo", "help", "list", "relay"]
    );
}

#[test]
fn test_translated_builtins() {
    let output = Rc::new(BufferOutput::new());
    let messages =
        Messages::english().merge(Messages::from_yaml("CLI:\n  helpUsage: Uso\n").unwrap());
    let commands = Commands::builder()
        .output(output.clone())
        .translator(Rc::new(messages))
        .build()
        .unwrap();

    commands.show_help("list").unwrap();
    assert_eq!(output.lines()[0], "Uso");
    assert_eq!(output.lines()[1], "  list [--simple]");
}

#[test]
fn test_value_null_for_help() {
    let h = harness();
    assert_eq!(h.commands.run("help", &[]).unwrap(), Value::Null);
}
