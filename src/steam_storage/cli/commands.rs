use super::print::{
    print_compat, print_listing, print_messages, print_optimise_header, print_optimise_skipped,
};
use super::setup::{print_grouped_help, print_help_for_command, Cli, Commands};
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::Parser;
use std::io::{self, BufRead, Write};
use steam_storage::api::StorageApi;
use steam_storage::config::{resolve_config_path, StorageConfig};
use steam_storage::error::{Result, StorageError};
use steam_storage::store::fs::FileStore;

struct AppContext {
    api: StorageApi<FileStore>,
}

pub fn run() -> Result<()> {
    let cli = parse_cli();
    crate::init_tracing(cli.verbose);

    match &cli.command {
        None => {
            print_grouped_help();
            return Ok(());
        }
        Some(Commands::Help { command }) => return handle_help(command.as_deref()),
        Some(_) => {}
    }

    let mut ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::List { libraries }) => handle_list(&ctx, &libraries),
        Some(Commands::Move { game, library }) => handle_move(&mut ctx, game, library),
        Some(Commands::Delete { game, yes }) => handle_delete(&mut ctx, game, yes),
        Some(Commands::Optimise {
            source,
            destination,
            reserve,
            dry_run,
        }) => handle_optimise(&mut ctx, source, destination, reserve, dry_run),
        Some(Commands::Compat) => handle_compat(&ctx),
        Some(Commands::Help { .. }) | None => Ok(()),
    }
}

/// Like `Cli::parse`, but an unknown command gets our own message and the grouped help.
fn parse_cli() -> Cli {
    let err = match Cli::try_parse() {
        Ok(cli) => return cli,
        Err(err) => err,
    };

    let first_arg = std::env::args().nth(1);
    let unknown = match err.kind() {
        ErrorKind::InvalidSubcommand => context_string(&err, ContextKind::InvalidSubcommand),
        ErrorKind::UnknownArgument => context_string(&err, ContextKind::InvalidArg)
            .filter(|arg| first_arg.as_deref() == Some(arg.as_str())),
        _ => None,
    };

    match unknown {
        Some(name) => {
            println!("Command {} not found.", name);
            println!();
            print_grouped_help();
            std::process::exit(2);
        }
        None => err.exit(),
    }
}

fn context_string(err: &clap::Error, kind: ContextKind) -> Option<String> {
    match err.get(kind) {
        Some(ContextValue::String(s)) => Some(s.clone()),
        _ => None,
    }
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let path = resolve_config_path(cli.config.as_deref())?;
    let config = StorageConfig::load(&path)?;
    let api = StorageApi::open(FileStore::new(), &config)?;
    Ok(AppContext { api })
}

fn handle_list(ctx: &AppContext, libraries: &[String]) -> Result<()> {
    let result = ctx.api.list(libraries)?;
    print_listing(&result.volumes, &result.titles);
    print_messages(&result.messages);
    Ok(())
}

fn handle_move(ctx: &mut AppContext, game: Option<String>, library: Option<String>) -> Result<()> {
    let game = arg_or_prompt(game, "game (app id or name)")?;
    let library = arg_or_prompt(library, &library_prompt(ctx, "destination library"))?;

    let result = ctx.api.move_title(&game, &library)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_delete(ctx: &mut AppContext, game: Option<String>, yes: bool) -> Result<()> {
    let game = arg_or_prompt(game, "game (app id or name)")?;

    let registry = ctx.api.registry();
    let index = registry.resolve(&game)?;
    let (label, volume) = registry
        .get(index)
        .map(|t| (t.label(), t.volume.clone()))
        .ok_or_else(|| StorageError::TitleNotFound(game.clone()))?;

    if !yes && !confirm(&format!("Delete {label} and its game files from {volume}?"))? {
        println!("Cancelled.");
        return Ok(());
    }

    let result = ctx.api.delete_title(&game)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_optimise(
    ctx: &mut AppContext,
    source: Option<String>,
    destination: Option<String>,
    reserve: Option<f64>,
    dry_run: bool,
) -> Result<()> {
    let source = arg_or_prompt(source, &library_prompt(ctx, "source library"))?;
    let destination = arg_or_prompt(destination, &library_prompt(ctx, "destination library"))?;
    if let Some(r) = reserve {
        if !r.is_finite() || r < 0.0 {
            return Err(StorageError::Config(format!(
                "--reserve must be a non-negative number of GB, got {r}"
            )));
        }
    }

    let result = ctx.api.optimise(&source, &destination, reserve, dry_run)?;
    if let Some(report) = &result.optimise {
        print_optimise_header(report);
        print_optimise_skipped(report);
    }
    print_messages(&result.messages);

    match &result.optimise {
        Some(report) if report.interrupted => Err(StorageError::Interrupted(format!(
            "a game was left split between {} and {}",
            report.source, report.destination
        ))),
        _ => Ok(()),
    }
}

fn handle_compat(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.compat()?;
    print_compat(&result.compat);
    print_messages(&result.messages);
    Ok(())
}

fn handle_help(command: Option<&str>) -> Result<()> {
    match command {
        Some(cmd) => print_help_for_command(cmd),
        None => print_grouped_help(),
    }
    Ok(())
}

fn library_prompt(ctx: &AppContext, what: &str) -> String {
    let ids: Vec<&str> = ctx.api.volumes().iter().map(|v| v.id.as_str()).collect();
    format!("{} [{}]", what, ids.join(", "))
}

fn arg_or_prompt(value: Option<String>, what: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => prompt(what),
    }
}

fn prompt(what: &str) -> Result<String> {
    let line = read_answer(&format!("Enter {what}: "))?;
    let answer = line.trim();
    if answer.is_empty() {
        return Err(StorageError::Prompt(format!("no {what} given")));
    }
    Ok(answer.to_string())
}

fn confirm(question: &str) -> Result<bool> {
    let line = read_answer(&format!("{question} [y/N] "))?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn read_answer(text: &str) -> Result<String> {
    print!("{text}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}
