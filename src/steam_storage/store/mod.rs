//! # Storage Layer
//!
//! Every file-system touch goes through the [`LibraryStore`] trait so the relocation and
//! optimisation logic can be exercised without real disks.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: the real thing. Renames when possible and falls back to
//!   copy-then-remove when a move crosses devices (different drives are the whole point
//!   of this tool).
//! - [`memory::InMemoryStore`]: simulated libraries with configurable free space and
//!   injectable failures, used by the command tests.
//!
//! ## Library Layout
//!
//! ```text
//! <library>/
//! ├── appmanifest_220.acf     # one manifest per installed game
//! ├── appmanifest_400.acf
//! └── common/
//!     ├── Half-Life 2/        # install directory, named by the manifest's "installdir"
//!     └── Portal/
//! ```
//!
//! All methods take the [`Volume`] they operate on; the store never decides which library
//! a game belongs to, that is the registry's job.

use crate::error::Result;
use crate::model::Volume;

pub mod fs;
pub mod memory;

/// Abstract interface over the libraries' directory trees.
pub trait LibraryStore {
    /// File names of every manifest directly inside the library root.
    fn list_manifests(&self, volume: &Volume) -> Result<Vec<String>>;

    fn read_manifest(&self, volume: &Volume, manifest_name: &str) -> Result<String>;

    fn manifest_exists(&self, volume: &Volume, manifest_name: &str) -> bool;

    fn install_dir_exists(&self, volume: &Volume, install_dir: &str) -> bool;

    /// Move a manifest between library roots.
    fn move_manifest(&mut self, manifest_name: &str, from: &Volume, to: &Volume) -> Result<()>;

    /// Move `common/<install_dir>` between libraries, creating `common/` if needed.
    fn move_install_dir(&mut self, install_dir: &str, from: &Volume, to: &Volume) -> Result<()>;

    fn remove_manifest(&mut self, volume: &Volume, manifest_name: &str) -> Result<()>;

    /// Recursively remove `common/<install_dir>`.
    fn remove_install_dir(&mut self, volume: &Volume, install_dir: &str) -> Result<()>;

    /// Bytes available to the current user on the library's file system.
    fn free_bytes(&self, volume: &Volume) -> Result<u64>;

    /// Names of the sub-directories of an arbitrary directory (compat data listing).
    fn list_subdirs(&self, path: &std::path::Path) -> Result<Vec<String>>;
}
