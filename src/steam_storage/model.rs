use crate::error::{Result, StorageError};
use crate::manifest::{Manifest, KEY_APP_ID, KEY_INSTALL_DIR, KEY_NAME, KEY_SIZE_ON_DISK};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

pub const BYTES_PER_GB: u64 = 1_000_000_000;

/// Directory under each library that holds the installed game files.
pub const COMMON_DIR: &str = "common";

pub fn bytes_to_gb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GB as f64
}

/// Signed variant used for budgets, which may go negative when the reserve exceeds free space.
pub fn signed_bytes_to_gb(bytes: i64) -> f64 {
    bytes as f64 / BYTES_PER_GB as f64
}

pub fn gb_to_bytes(gb: f64) -> u64 {
    if gb.is_finite() && gb > 0.0 {
        (gb * BYTES_PER_GB as f64).round() as u64
    } else {
        0
    }
}

/// A configured Steam library (`steamapps` directory).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Volume {
    pub id: String,
    pub path: PathBuf,
}

impl Volume {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into().to_lowercase(),
            path: path.into(),
        }
    }

    pub fn manifest_path(&self, manifest_name: &str) -> PathBuf {
        self.path.join(manifest_name)
    }

    pub fn common_dir(&self) -> PathBuf {
        self.path.join(COMMON_DIR)
    }

    pub fn install_path(&self, install_dir: &str) -> PathBuf {
        self.common_dir().join(install_dir)
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// The libraries known to this run, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct VolumeSet {
    volumes: Vec<Volume>,
}

impl VolumeSet {
    pub fn new(volumes: Vec<Volume>) -> Self {
        Self { volumes }
    }

    /// Case-insensitive lookup by identifier.
    pub fn get(&self, id: &str) -> Option<&Volume> {
        let wanted = id.trim().to_lowercase();
        self.volumes.iter().find(|v| v.id == wanted)
    }

    pub fn require(&self, id: &str) -> Result<&Volume> {
        self.get(id)
            .ok_or_else(|| StorageError::UnknownVolume(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Volume> {
        self.volumes.iter()
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }
}

/// One installed game: a manifest in a library root plus `common/<installdir>`.
#[derive(Debug, Clone)]
pub struct Title {
    /// Library holding the manifest.
    pub volume: String,
    pub manifest: Manifest,
    /// Library holding the install directory, when an interrupted move left it elsewhere.
    pub split_from: Option<String>,
}

impl Title {
    pub fn new(volume: impl Into<String>, manifest: Manifest) -> Self {
        Self {
            volume: volume.into(),
            manifest,
            split_from: None,
        }
    }

    pub fn manifest_name(&self) -> &str {
        self.manifest.file_name()
    }

    pub fn app_id(&self) -> Option<&str> {
        self.manifest.get(KEY_APP_ID)
    }

    pub fn name(&self) -> Option<&str> {
        self.manifest.get(KEY_NAME)
    }

    pub fn install_dir(&self) -> Result<&str> {
        self.manifest.require(KEY_INSTALL_DIR)
    }

    pub fn size_on_disk(&self) -> Result<u64> {
        self.manifest.require_u64(KEY_SIZE_ON_DISK)
    }

    /// Library that currently holds the game files.
    pub fn install_volume(&self) -> &str {
        self.split_from.as_deref().unwrap_or(&self.volume)
    }

    pub fn is_split(&self) -> bool {
        self.split_from.is_some()
    }

    pub fn matches(&self, query: &str) -> bool {
        self.app_id() == Some(query) || self.name() == Some(query)
    }

    /// Short human label, e.g. `Half-Life 2 (220)`.
    pub fn label(&self) -> String {
        match (self.name(), self.app_id()) {
            (Some(name), Some(id)) => format!("{} ({})", name, id),
            (Some(name), None) => name.to_string(),
            (None, Some(id)) => id.to_string(),
            (None, None) => self.manifest_name().to_string(),
        }
    }
}

/// Serializable listing row for a title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleSummary {
    pub app_id: Option<String>,
    pub name: Option<String>,
    pub volume: String,
    pub size_bytes: Option<u64>,
    pub split_from: Option<String>,
}

impl From<&Title> for TitleSummary {
    fn from(title: &Title) -> Self {
        Self {
            app_id: title.app_id().map(str::to_string),
            name: title.name().map(str::to_string),
            volume: title.volume.clone(),
            size_bytes: title.size_on_disk().ok(),
            split_from: title.split_from.clone(),
        }
    }
}

/// Free space snapshot for one library.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeUsage {
    pub id: String,
    pub path: PathBuf,
    pub free_bytes: u64,
}
