//! # CLI Behavior
//!
//! This is **one possible UI client** for steam-storage, not the application itself.
//! The CLI is the only place that knows about terminal I/O, exit codes and output formatting.
//!
//! For the overall architecture, see the crate-level documentation of the library.
//!
//! ## Command Forms
//!
//! Every command can be given by name or as a flag: `steam-storage move`, `-m` and `--move`
//! are the same thing. Running with no command prints the help; an unknown command prints
//! `Command <x> not found.` followed by the help and exits with status 2.
//!
//! ## Interactive Fallback
//!
//! Positional arguments are optional. Whatever is missing (the game, a library) is asked
//! for on stdin, so `steam-storage -m` walks through a move. `delete` always asks for
//! confirmation unless `--yes` is given.
//!
//! ## Configuration Lookup
//!
//! `--config <PATH>`, then `$STEAM_STORAGE_CONFIG`, then `./steam_storage.json`, then the
//! per-user config directory. `help` works without any configuration.
//!
//! ## Exit Status
//!
//! - `0`: success, or a cancelled delete
//! - `1`: any error, printed as `Error: <message>` on stderr
//! - `2`: unknown command or invalid arguments

mod commands;
mod print;
pub mod setup;

pub use commands::run;
