use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "steam-storage",
    bin_name = "steam-storage",
    version,
    disable_help_flag = true,
    disable_help_subcommand = true
)]
#[command(about = "Move, prune and rebalance Steam games across library drives", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to the configuration file
    #[arg(long, global = true, value_name = "PATH", help_heading = "Options")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

/// Command group definitions for help output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandGroup {
    Library,
    Game,
    Misc,
}

impl CommandGroup {
    pub fn heading(&self) -> &'static str {
        match self {
            CommandGroup::Library => "Library Commands:",
            CommandGroup::Game => "Game Commands:",
            CommandGroup::Misc => "Miscellaneous:",
        }
    }

    pub fn for_command(name: &str) -> Option<Self> {
        match name {
            "list" | "compat" => Some(CommandGroup::Library),
            "move" | "delete" | "optimise" => Some(CommandGroup::Game),
            "help" => Some(CommandGroup::Misc),
            _ => None,
        }
    }

    pub fn all() -> &'static [CommandGroup] {
        &[CommandGroup::Library, CommandGroup::Game, CommandGroup::Misc]
    }
}

/// Returns the custom grouped help output as a string
pub fn get_grouped_help() -> String {
    let cmd = Cli::command();
    let version = cmd.get_version().unwrap_or("unknown");

    let mut output = String::new();
    output.push_str(&format!("steam-storage {version}\n"));
    output.push_str("Move, prune and rebalance Steam games across library drives\n");
    output.push('\n');
    output.push_str("Usage: steam-storage [OPTIONS] <COMMAND> [ARGS]\n");

    let subcommands: Vec<_> = cmd.get_subcommands().collect();

    for group in CommandGroup::all() {
        let group_cmds: Vec<_> = subcommands
            .iter()
            .filter(|sc| {
                !sc.is_hide_set() && CommandGroup::for_command(sc.get_name()) == Some(*group)
            })
            .collect();

        if !group_cmds.is_empty() {
            output.push('\n');
            output.push_str(&format!("{}\n", group.heading()));
            for sc in group_cmds {
                let flags = match (sc.get_short_flag(), sc.get_long_flag()) {
                    (Some(s), Some(l)) => format!("-{s}, --{l}"),
                    _ => String::new(),
                };
                let about = sc.get_about().map(|s| s.to_string()).unwrap_or_default();
                output.push_str(&format!("  {:<10} {:<16} {}\n", sc.get_name(), flags, about));
            }
        }
    }

    output.push('\n');
    output.push_str("Options:\n");
    output.push_str("      --config <PATH>  Path to the configuration file\n");
    output.push_str("  -v, --verbose        Verbose output\n");
    output.push_str("  -V, --version        Print version\n");
    output.push('\n');
    output.push_str("Missing arguments are asked for interactively.\n");

    output
}

pub fn print_grouped_help() {
    print!("{}", get_grouped_help());
}

/// Prints help for a command by name, accepting its flag forms too (`-m`, `--move`).
pub fn print_help_for_command(name: &str) {
    let mut cmd = Cli::command();
    let wanted = name.trim_start_matches('-');

    for subcmd in cmd.get_subcommands_mut() {
        let matches = subcmd.get_name() == wanted
            || subcmd.get_long_flag() == Some(wanted)
            || (wanted.chars().count() == 1 && subcmd.get_short_flag() == wanted.chars().next())
            || subcmd.get_all_aliases().any(|a| a == wanted);
        if matches {
            let help = subcmd.render_help();
            print!("{}", help);
            return;
        }
    }

    println!("Command {} not found.", name);
    println!();
    print_grouped_help();
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List libraries, their free space and installed games
    #[command(short_flag = 'l', long_flag = "list", display_order = 1)]
    List {
        /// Only these libraries (default: all)
        #[arg(value_name = "LIBRARY")]
        libraries: Vec<String>,
    },

    /// Move a game to another library
    #[command(short_flag = 'm', long_flag = "move", display_order = 2)]
    Move {
        /// App id or exact name of the game
        game: Option<String>,

        /// Destination library
        library: Option<String>,
    },

    /// Delete a game and its files
    #[command(short_flag = 'd', long_flag = "delete", display_order = 3)]
    Delete {
        /// App id or exact name of the game
        game: Option<String>,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Fill a library with the largest games that fit
    #[command(
        short_flag = 'o',
        long_flag = "optimise",
        alias = "optimize",
        long_flag_alias = "optimize",
        display_order = 4
    )]
    Optimise {
        /// Library to take games from
        source: Option<String>,

        /// Library to fill
        destination: Option<String>,

        /// GB to keep free on the destination (default: from config)
        #[arg(long, value_name = "GB")]
        reserve: Option<f64>,

        /// Show what would be moved without moving anything
        #[arg(long)]
        dry_run: bool,
    },

    /// List Proton compatibility data and whether its game is installed
    #[command(short_flag = 'c', long_flag = "compat", display_order = 5)]
    Compat,

    /// Print help for steam-storage or a command
    #[command(short_flag = 'h', long_flag = "help", display_order = 6)]
    Help {
        /// Command to get help for
        command: Option<String>,
    },
}
