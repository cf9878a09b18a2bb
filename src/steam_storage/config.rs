use crate::error::{Result, StorageError};
use crate::model::{Volume, VolumeSet};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "STEAM_STORAGE_CONFIG";
pub const LOCAL_CONFIG_FILE: &str = "steam_storage.json";
const CONFIG_FILENAME: &str = "config.json";

/// On-disk shape of the configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    libraries: BTreeMap<String, String>,
    #[serde(default)]
    compat_data: BTreeMap<String, String>,
    reserve: Option<f64>,
}

/// Validated configuration: library ids are lowercased and paths have `~` expanded.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageConfig {
    pub libraries: Vec<(String, PathBuf)>,
    pub compat_data: Vec<(String, PathBuf)>,
    /// Gigabytes to leave free on a destination when optimising.
    pub reserve_gb: f64,
}

impl StorageConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            StorageError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), "loading config");
        Self::from_json(&content)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(text)?;

        if raw.libraries.is_empty() {
            return Err(StorageError::Config(
                "at least one library must be listed under \"libraries\"".to_string(),
            ));
        }
        let reserve_gb = match raw.reserve {
            None => {
                return Err(StorageError::Config(
                    "\"reserve\" (GB to keep free) is required".to_string(),
                ))
            }
            Some(r) if !r.is_finite() || r < 0.0 => {
                return Err(StorageError::Config(format!(
                    "\"reserve\" must be a non-negative number, got {r}"
                )))
            }
            Some(r) => r,
        };

        Ok(Self {
            libraries: normalize("libraries", raw.libraries)?,
            compat_data: normalize("compat_data", raw.compat_data)?,
            reserve_gb,
        })
    }

    pub fn volumes(&self) -> VolumeSet {
        VolumeSet::new(
            self.libraries
                .iter()
                .map(|(id, path)| Volume::new(id.as_str(), path.clone()))
                .collect(),
        )
    }
}

fn normalize(section: &str, entries: BTreeMap<String, String>) -> Result<Vec<(String, PathBuf)>> {
    let mut out: Vec<(String, PathBuf)> = Vec::with_capacity(entries.len());
    for (id, path) in entries {
        let id = id.trim().to_lowercase();
        if id.is_empty() {
            return Err(StorageError::Config(format!(
                "empty name in \"{section}\""
            )));
        }
        if out.iter().any(|(existing, _)| *existing == id) {
            return Err(StorageError::Config(format!(
                "\"{id}\" is listed twice in \"{section}\" (names are case-insensitive)"
            )));
        }
        out.push((id, expand_tilde(&path)));
    }
    Ok(out)
}

/// Replaces a leading `~` with the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let rest = if path == "~" {
        Some("")
    } else {
        path.strip_prefix("~/")
    };
    match (rest, BaseDirs::new()) {
        (Some(rest), Some(dirs)) => dirs.home_dir().join(rest),
        _ => PathBuf::from(path),
    }
}

/// Where to read the configuration from: the explicit flag, then `$STEAM_STORAGE_CONFIG`,
/// then `./steam_storage.json`, then the per-user config directory.
pub fn resolve_config_path(flag: Option<&Path>) -> Result<PathBuf> {
    let env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let user = ProjectDirs::from("", "", "steam-storage")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME));
    resolve_with(flag, env, Path::new(LOCAL_CONFIG_FILE), user).ok_or_else(|| {
        StorageError::Config(format!(
            "no config file found; pass --config or set {CONFIG_ENV}"
        ))
    })
}

fn resolve_with(
    flag: Option<&Path>,
    env: Option<PathBuf>,
    local: &Path,
    user: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = flag {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env.filter(|p| !p.as_os_str().is_empty()) {
        return Some(path);
    }
    if local.is_file() {
        return Some(local.to_path_buf());
    }
    user
}
