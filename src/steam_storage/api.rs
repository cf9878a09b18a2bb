//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single entry point
//! for every steam-storage operation, whatever the front end.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Owns the session state**: the store, the configured libraries and the registry
//!   discovered when it was opened
//! - **Dispatches** to the appropriate command function
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It does no printing, prompting or formatting. Those belong to the CLI.
//!
//! ## Generic Over LibraryStore
//!
//! `StorageApi<S: LibraryStore>` is generic over the storage backend:
//! - Production: `StorageApi<FileStore>`
//! - Testing: `StorageApi<InMemoryStore>`
//!
//! ## Registry Lifetime
//!
//! Discovery runs once in [`StorageApi::open`]. Moves and deletes keep the registry in step
//! with what they changed, so a session can run several operations without rescanning.
//! [`StorageApi::rediscover`] rebuilds it from disk.

use crate::commands::{self, CmdResult};
use crate::config::StorageConfig;
use crate::error::Result;
use crate::model::VolumeSet;
use crate::registry::{self, Registry};
use crate::store::LibraryStore;
use std::path::PathBuf;

pub struct StorageApi<S: LibraryStore> {
    store: S,
    volumes: VolumeSet,
    compat_dirs: Vec<(String, PathBuf)>,
    reserve_gb: f64,
    registry: Registry,
}

impl<S: LibraryStore> StorageApi<S> {
    /// Build the volume set from `config` and discover every installed title.
    pub fn open(store: S, config: &StorageConfig) -> Result<Self> {
        let volumes = config.volumes();
        let registry = registry::discover(&store, &volumes)?;
        tracing::debug!(
            libraries = volumes.len(),
            titles = registry.len(),
            "discovery finished"
        );
        Ok(Self {
            store,
            volumes,
            compat_dirs: config.compat_data.clone(),
            reserve_gb: config.reserve_gb,
            registry,
        })
    }

    pub fn list<I: AsRef<str>>(&self, libraries: &[I]) -> Result<CmdResult> {
        let filter: Vec<String> = libraries.iter().map(|l| l.as_ref().to_string()).collect();
        commands::list::run(&self.store, &self.volumes, &self.registry, &filter)
    }

    pub fn move_title(&mut self, query: &str, destination: &str) -> Result<CmdResult> {
        commands::relocate::run(
            &mut self.store,
            &self.volumes,
            &mut self.registry,
            query,
            destination,
        )
    }

    pub fn delete_title(&mut self, query: &str) -> Result<CmdResult> {
        commands::delete::run(&mut self.store, &self.volumes, &mut self.registry, query)
    }

    /// Uses the configured reserve unless `reserve_gb` overrides it.
    pub fn optimise(
        &mut self,
        source: &str,
        destination: &str,
        reserve_gb: Option<f64>,
        dry_run: bool,
    ) -> Result<CmdResult> {
        commands::optimise::run(
            &mut self.store,
            &self.volumes,
            &mut self.registry,
            source,
            destination,
            reserve_gb.unwrap_or(self.reserve_gb),
            dry_run,
        )
    }

    pub fn compat(&self) -> Result<CmdResult> {
        commands::compat::run(&self.store, &self.compat_dirs, &self.registry)
    }

    pub fn rediscover(&mut self) -> Result<()> {
        self.registry = registry::discover(&self.store, &self.volumes)?;
        Ok(())
    }

    pub fn volumes(&self) -> &VolumeSet {
        &self.volumes
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
