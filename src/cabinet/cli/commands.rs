//! # CLI Layer
//!
//! One client of the cabinet library. This is the only place that touches
//! stdout/stderr, parses arguments, installs the tracing subscriber or decides
//! exit codes.
//!
//! - `run()`: parses the command line, builds the context, dispatches
//! - `init_context()`: resolves configuration and opens the store once
//! - `dispatch()`: the single name-to-handler table shared by one-shot
//!   subcommands and the interactive shell
//! - `handle_*()`: call the API and print the `CmdResult`

use super::args::{Cli, Commands, FieldArgs, GlobalOptions, ShellLine};
use super::render::{print_messages, print_records, print_selection};
use cabinet::api::CabinetApi;
use cabinet::commands::{CmdResult, FileFormat};
use cabinet::config::CabinetConfig;
use cabinet::error::{CabinetError, Result};
use cabinet::model::RecordFields;
use cabinet::store::{open_store, RecordStore};
use clap::{CommandFactory, Parser};
use directories::ProjectDirs;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::{EnvFilter, LevelFilter, Targets};
use tracing_subscriber::prelude::*;

const LOG_FILENAME: &str = "cabinet.log";
const AUDIT_TARGET: &str = "cabinet::audit";

struct AppContext {
    api: CabinetApi<Box<dyn RecordStore>>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli.options)?;
    let _guard = setup_logging(&config)?;
    let mut ctx = init_context(&config)?;

    match cli.command {
        Some(command) => dispatch(&mut ctx, command),
        None => run_shell(&mut ctx),
    }
}

fn config_dir(options: &GlobalOptions) -> PathBuf {
    if let Some(dir) = &options.config_dir {
        return dir.clone();
    }
    ProjectDirs::from("com", "cabinet", "cabinet")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `cabinet.json` first, then command-line flags on top.
fn resolve_config(options: &GlobalOptions) -> Result<CabinetConfig> {
    let mut config = CabinetConfig::load(config_dir(options))?;

    if let Some(storage) = &options.storage {
        config.storage = storage.parse()?;
    }
    if let Some(rules) = &options.validation_rules {
        config.validation_rules = rules.parse()?;
    }
    if let Some(rules_file) = &options.rules_file {
        config.rules_file = Some(rules_file.clone());
    }
    if let Some(data_file) = &options.data_file {
        config.data_file = data_file.clone();
    }
    config.use_stopwatch |= options.use_stopwatch;
    config.use_logger |= options.use_logger;

    Ok(config)
}

/// Installs the subscriber: warnings (and stopwatch readings when enabled) on
/// stderr, plus the audit trail in `cabinet.log` beside the data file when the
/// logger is on. The returned guard must outlive every store call.
fn setup_logging(config: &CabinetConfig) -> Result<Option<WorkerGuard>> {
    let mut directives = String::from("warn");
    if config.use_stopwatch {
        directives.push_str(",cabinet::meter=info");
    }
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directives));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(env_filter);

    let (file_layer, guard) = if config.use_logger {
        let log_dir = log_dir(config.data_path());
        fs::create_dir_all(&log_dir)?;
        let file_appender = tracing_appender::rolling::never(&log_dir, LOG_FILENAME);
        let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking_file)
            .with_ansi(false)
            .with_filter(Targets::new().with_target(AUDIT_TARGET, LevelFilter::INFO));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| CabinetError::Config(format!("failed to install logger: {}", e)))?;

    tracing::debug!(storage = %config.storage, rules = %config.validation_rules, "logging initialized");
    Ok(guard)
}

fn log_dir(data_file: &Path) -> PathBuf {
    match data_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn init_context(config: &CabinetConfig) -> Result<AppContext> {
    let store = open_store(config)?;
    Ok(AppContext {
        api: CabinetApi::new(store),
    })
}

fn dispatch(ctx: &mut AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::Create { fields } => handle_create(ctx, fields),
        Commands::Edit { id, fields } => handle_edit(ctx, &id, fields),
        Commands::Remove { id } => handle_remove(ctx, &id),
        Commands::List => handle_list(ctx),
        Commands::Find { field, value } => handle_find(ctx, &field, &value),
        Commands::Delete { query } => handle_delete(ctx, &query.join(" ")),
        Commands::Update { query } => handle_update(ctx, &query.join(" ")),
        Commands::Select { query } => handle_select(ctx, &query.join(" ")),
        Commands::Stat => handle_stat(ctx),
        Commands::Purge => handle_purge(ctx),
        Commands::Export {
            path,
            format,
            force,
        } => handle_export(ctx, &path, format, force),
        Commands::Import { path, format } => handle_import(ctx, &path, format),
        Commands::Generate {
            path,
            format,
            start_id,
            count,
        } => handle_generate(ctx, &path, format, start_id, count),
    }
}

fn parse_fields(args: FieldArgs) -> Result<RecordFields> {
    RecordFields::parse(
        &args.first_name,
        &args.last_name,
        &args.date_of_birth,
        &args.age,
        &args.salary,
        &args.gender,
    )
}

fn parse_format(format: Option<String>) -> Result<Option<FileFormat>> {
    format.map(|f| f.parse()).transpose()
}

fn print_result(result: &CmdResult) {
    if result.columns.is_empty() {
        print_records(&result.listed_records);
    } else {
        print_selection(&result.listed_records, &result.columns);
    }
    print_messages(&result.messages);
}

fn handle_create(ctx: &mut AppContext, fields: FieldArgs) -> Result<()> {
    let result = ctx.api.create(parse_fields(fields)?)?;
    print_result(&result);
    Ok(())
}

fn handle_edit(ctx: &mut AppContext, id: &str, fields: FieldArgs) -> Result<()> {
    let result = ctx.api.edit(id, parse_fields(fields)?)?;
    print_result(&result);
    Ok(())
}

fn handle_remove(ctx: &mut AppContext, id: &str) -> Result<()> {
    let result = ctx.api.remove(id)?;
    print_result(&result);
    Ok(())
}

fn handle_list(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.list()?;
    print_result(&result);
    Ok(())
}

fn handle_find(ctx: &mut AppContext, field: &str, value: &str) -> Result<()> {
    let result = ctx.api.find(field, value)?;
    print_result(&result);
    Ok(())
}

fn handle_delete(ctx: &mut AppContext, query: &str) -> Result<()> {
    let result = ctx.api.delete(query)?;
    print_result(&result);
    Ok(())
}

fn handle_update(ctx: &mut AppContext, query: &str) -> Result<()> {
    let result = ctx.api.update(query)?;
    print_result(&result);
    Ok(())
}

fn handle_select(ctx: &mut AppContext, query: &str) -> Result<()> {
    let result = ctx.api.select(query)?;
    print_result(&result);
    Ok(())
}

fn handle_stat(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.stat()?;
    print_result(&result);
    Ok(())
}

fn handle_purge(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.purge()?;
    print_result(&result);
    Ok(())
}

fn handle_export(
    ctx: &mut AppContext,
    path: &Path,
    format: Option<String>,
    force: bool,
) -> Result<()> {
    let result = ctx.api.export(parse_format(format)?, path, force)?;
    print_result(&result);
    Ok(())
}

fn handle_import(ctx: &mut AppContext, path: &Path, format: Option<String>) -> Result<()> {
    let result = ctx.api.import(parse_format(format)?, path)?;
    print_result(&result);
    Ok(())
}

fn handle_generate(
    ctx: &mut AppContext,
    path: &Path,
    format: Option<String>,
    start_id: u32,
    count: usize,
) -> Result<()> {
    let result = ctx.api.generate(parse_format(format)?, path, start_id, count)?;
    print_result(&result);
    Ok(())
}

/// What the shell should do with one input line.
#[derive(Debug)]
enum ShellAction {
    Skip,
    Exit,
    Help,
    Unknown(String),
    Invalid(String),
    Run(Commands),
}

fn parse_shell_line(line: &str) -> ShellAction {
    let words = match split_words(line) {
        Ok(words) => words,
        Err(message) => return ShellAction::Invalid(message),
    };
    let Some(name) = words.first() else {
        return ShellAction::Skip;
    };

    match name.to_ascii_lowercase().as_str() {
        "exit" | "quit" => return ShellAction::Exit,
        "help" | "?" => return ShellAction::Help,
        _ => {}
    }

    let known = ShellLine::command()
        .get_subcommands()
        .any(|sub| sub.get_name() == name || sub.get_all_aliases().any(|a| a == name));
    if !known {
        return ShellAction::Unknown(name.clone());
    }

    match ShellLine::try_parse_from(&words) {
        Ok(line) => ShellAction::Run(line.command),
        Err(e) => ShellAction::Invalid(e.to_string()),
    }
}

/// Splits on whitespace, keeping double-quoted runs together.
fn split_words(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                in_word = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if in_quotes {
        return Err("unterminated quote".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

fn run_shell(ctx: &mut AppContext) -> Result<()> {
    println!("Cabinet shell. Type 'help' for commands, 'exit' to leave.");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        match parse_shell_line(&line?) {
            ShellAction::Skip => {}
            ShellAction::Exit => break,
            ShellAction::Help => {
                let _ = ShellLine::command().print_help();
                println!();
            }
            ShellAction::Unknown(name) => {
                println!(
                    "There is no '{}' command. Type 'help' to see the commands.",
                    name
                );
            }
            ShellAction::Invalid(message) => print!("{}", message),
            ShellAction::Run(command) => {
                let name = command.name();
                if let Err(e) = dispatch(ctx, command) {
                    eprintln!("{}: {}", name, e);
                }
            }
        }
    }
    Ok(())
}
