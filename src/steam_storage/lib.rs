//! # steam-storage Architecture
//!
//! steam-storage manages installed Steam games spread over several library drives: it lists
//! them, moves them between libraries, deletes them, and rebalances space by filling a
//! destination library with the largest games that fit.
//!
//! Like any tool that moves gigabytes around, most of the interesting code is about what
//! happens when a move stops halfway. The core is a library with a thin CLI on top.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, prompts, formats output                │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Owns store, libraries and the discovered registry        │
//! │  - Returns structured Result types                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - relocate, delete, optimise, list, compat                 │
//! │  - No I/O assumptions beyond the store trait                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Abstract LibraryStore trait                              │
//! │  - FileStore (production), InMemoryStore (testing)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Libraries on disk
//!
//! Each configured library is a `steamapps` directory. It holds one `appmanifest_<id>.acf`
//! per installed game and the game files under `common/<installdir>`. Everything the tool
//! knows about a game comes from its manifest (see [`manifest`]); nothing is cached
//! between runs.
//!
//! ## Testing Strategy
//!
//! 1. **Commands** (`commands/*.rs`): the bulk of the tests, against `InMemoryStore`
//!    with injected failures for the partial-move paths.
//! 2. **Store** (`store/fs.rs`): real temp directories.
//! 3. **CLI** (`tests/`): the built binary against temp library trees.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Business logic for each command
//! - [`registry`]: Discovery and lookup of installed games
//! - [`manifest`]: `.acf` reader
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: Libraries, titles and size units
//! - [`config`]: Configuration file loading
//! - [`error`]: Error types
//! - `cli`: Argument parsing, prompting and printing for the binary (not part of the lib API)

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod manifest;
pub mod model;
pub mod registry;
pub mod store;
