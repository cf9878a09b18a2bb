use super::LibraryStore;
use crate::error::{Result, StorageError};
use crate::manifest::is_manifest_file;
use crate::model::Volume;
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone)]
struct MemLibrary {
    manifests: BTreeMap<String, String>,
    /// install dir name -> bytes on disk
    install_dirs: BTreeMap<String, u64>,
    free_bytes: u64,
}

/// Operations that should fail on the next (and every following) attempt.
#[derive(Debug, Default, Clone, Copy)]
pub struct Failures {
    pub manifest_moves: bool,
    pub install_moves: bool,
    pub manifest_removals: bool,
    pub install_removals: bool,
}

/// Simulated libraries keyed by path. Moving game files transfers their size from the
/// destination's free space to the source's.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    libraries: HashMap<PathBuf, MemLibrary>,
    subdirs: HashMap<PathBuf, Vec<String>>,
    pub failures: Failures,
}

fn injected(what: &str) -> StorageError {
    StorageError::Io(io::Error::other(format!("injected failure: {what}")))
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_library(&mut self, volume: &Volume, free_bytes: u64) {
        self.libraries.insert(
            volume.path.clone(),
            MemLibrary {
                free_bytes,
                ..MemLibrary::default()
            },
        );
    }

    pub fn add_manifest(&mut self, volume: &Volume, manifest_name: &str, text: &str) {
        self.library_mut_or_default(volume)
            .manifests
            .insert(manifest_name.to_string(), text.to_string());
    }

    pub fn add_install_dir(&mut self, volume: &Volume, install_dir: &str, bytes: u64) {
        self.library_mut_or_default(volume)
            .install_dirs
            .insert(install_dir.to_string(), bytes);
    }

    pub fn add_subdirs(&mut self, path: impl Into<PathBuf>, names: &[&str]) {
        self.subdirs
            .insert(path.into(), names.iter().map(|n| n.to_string()).collect());
    }

    pub fn manifest_text(&self, volume: &Volume, manifest_name: &str) -> Option<&str> {
        self.libraries
            .get(&volume.path)
            .and_then(|lib| lib.manifests.get(manifest_name))
            .map(String::as_str)
    }

    fn library_mut_or_default(&mut self, volume: &Volume) -> &mut MemLibrary {
        self.libraries.entry(volume.path.clone()).or_default()
    }

    fn library(&self, volume: &Volume) -> Result<&MemLibrary> {
        self.libraries.get(&volume.path).ok_or_else(|| {
            StorageError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no library at {}", volume.path.display()),
            ))
        })
    }

    fn library_mut(&mut self, volume: &Volume) -> Result<&mut MemLibrary> {
        self.libraries.get_mut(&volume.path).ok_or_else(|| {
            StorageError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no library at {}", volume.path.display()),
            ))
        })
    }
}

fn not_found(what: &str) -> StorageError {
    StorageError::Io(io::Error::new(io::ErrorKind::NotFound, what.to_string()))
}

fn already_exists(what: &str) -> StorageError {
    StorageError::Io(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("{what} already exists"),
    ))
}

impl LibraryStore for InMemoryStore {
    fn list_manifests(&self, volume: &Volume) -> Result<Vec<String>> {
        let lib = self
            .libraries
            .get(&volume.path)
            .ok_or_else(|| StorageError::VolumeUnreadable {
                volume: volume.id.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such library"),
            })?;
        Ok(lib
            .manifests
            .keys()
            .filter(|name| is_manifest_file(name))
            .cloned()
            .collect())
    }

    fn read_manifest(&self, volume: &Volume, manifest_name: &str) -> Result<String> {
        self.library(volume)?
            .manifests
            .get(manifest_name)
            .cloned()
            .ok_or_else(|| not_found(manifest_name))
    }

    fn manifest_exists(&self, volume: &Volume, manifest_name: &str) -> bool {
        self.libraries
            .get(&volume.path)
            .is_some_and(|lib| lib.manifests.contains_key(manifest_name))
    }

    fn install_dir_exists(&self, volume: &Volume, install_dir: &str) -> bool {
        self.libraries
            .get(&volume.path)
            .is_some_and(|lib| lib.install_dirs.contains_key(install_dir))
    }

    fn move_manifest(&mut self, manifest_name: &str, from: &Volume, to: &Volume) -> Result<()> {
        if self.failures.manifest_moves {
            return Err(injected("manifest move"));
        }
        if self.manifest_exists(to, manifest_name) {
            return Err(already_exists(manifest_name));
        }
        self.library(to)?;
        let text = self
            .library_mut(from)?
            .manifests
            .remove(manifest_name)
            .ok_or_else(|| not_found(manifest_name))?;
        self.library_mut(to)?
            .manifests
            .insert(manifest_name.to_string(), text);
        Ok(())
    }

    fn move_install_dir(&mut self, install_dir: &str, from: &Volume, to: &Volume) -> Result<()> {
        if self.failures.install_moves {
            return Err(injected("install directory move"));
        }
        if self.install_dir_exists(to, install_dir) {
            return Err(already_exists(install_dir));
        }
        let size = *self
            .library(from)?
            .install_dirs
            .get(install_dir)
            .ok_or_else(|| not_found(install_dir))?;
        let dest = self.library(to)?;
        if dest.free_bytes < size {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::StorageFull,
                "no space left on device",
            )));
        }

        let src = self.library_mut(from)?;
        src.install_dirs.remove(install_dir);
        src.free_bytes += size;
        let dest = self.library_mut(to)?;
        dest.install_dirs.insert(install_dir.to_string(), size);
        dest.free_bytes -= size;
        Ok(())
    }

    fn remove_manifest(&mut self, volume: &Volume, manifest_name: &str) -> Result<()> {
        if self.failures.manifest_removals {
            return Err(injected("manifest removal"));
        }
        self.library_mut(volume)?
            .manifests
            .remove(manifest_name)
            .map(|_| ())
            .ok_or_else(|| not_found(manifest_name))
    }

    fn remove_install_dir(&mut self, volume: &Volume, install_dir: &str) -> Result<()> {
        if self.failures.install_removals {
            return Err(injected("install directory removal"));
        }
        let lib = self.library_mut(volume)?;
        if let Some(size) = lib.install_dirs.remove(install_dir) {
            lib.free_bytes += size;
        }
        Ok(())
    }

    fn free_bytes(&self, volume: &Volume) -> Result<u64> {
        Ok(self.library(volume)?.free_bytes)
    }

    fn list_subdirs(&self, path: &Path) -> Result<Vec<String>> {
        let mut names = self
            .subdirs
            .get(path)
            .cloned()
            .ok_or_else(|| not_found(&path.display().to_string()))?;
        names.sort();
        Ok(names)
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::{VolumeSet, BYTES_PER_GB};

    /// Renders a minimal but realistic appmanifest.
    pub fn manifest_text(app_id: &str, name: &str, install_dir: &str, size_bytes: u64) -> String {
        format!(
            "\"AppState\"\n{{\n\t\"appid\"\t\t\"{app_id}\"\n\t\"Universe\"\t\t\"1\"\n\t\"name\"\t\t\"{name}\"\n\t\"StateFlags\"\t\t\"4\"\n\t\"installdir\"\t\t\"{install_dir}\"\n\t\"SizeOnDisk\"\t\t\"{size_bytes}\"\n\t\"InstalledDepots\"\n\t{{\n\t}}\n}}\n"
        )
    }

    pub fn manifest_name(app_id: &str) -> String {
        format!("appmanifest_{app_id}.acf")
    }

    /// Builder for a set of simulated libraries. Library paths are `/lib/<id>`.
    pub struct LibraryFixture {
        pub store: InMemoryStore,
        volumes: Vec<Volume>,
    }

    impl Default for LibraryFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl LibraryFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
                volumes: Vec::new(),
            }
        }

        pub fn library(mut self, id: &str, free_gb: u64) -> Self {
            let volume = Volume::new(id, format!("/lib/{id}"));
            self.store.add_library(&volume, free_gb * BYTES_PER_GB);
            self.volumes.push(volume);
            self
        }

        /// Installs a game whose install dir is named after it.
        pub fn game(self, library: &str, app_id: &str, name: &str, size_gb: u64) -> Self {
            self.game_bytes(library, app_id, name, size_gb * BYTES_PER_GB)
        }

        pub fn game_bytes(mut self, library: &str, app_id: &str, name: &str, bytes: u64) -> Self {
            let volume = self.volume(library);
            self.store.add_manifest(
                &volume,
                &manifest_name(app_id),
                &manifest_text(app_id, name, name, bytes),
            );
            self.store.add_install_dir(&volume, name, bytes);
            self
        }

        pub fn raw_manifest(mut self, library: &str, file_name: &str, text: &str) -> Self {
            let volume = self.volume(library);
            self.store.add_manifest(&volume, file_name, text);
            self
        }

        pub fn volume(&self, id: &str) -> Volume {
            self.volumes
                .iter()
                .find(|v| v.id == id)
                .cloned()
                .unwrap_or_else(|| panic!("fixture has no library {id}"))
        }

        pub fn volumes(&self) -> VolumeSet {
            VolumeSet::new(self.volumes.clone())
        }

        pub fn build(self) -> (InMemoryStore, VolumeSet) {
            let volumes = self.volumes();
            (self.store, volumes)
        }
    }
}
