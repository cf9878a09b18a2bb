//! Moving a game between libraries.
//!
//! A move is two steps, manifest first and game files second. They are not atomic, so the
//! failure of the second step is reported as [`StorageError::PartialRelocation`] and the
//! registry is updated to describe the split it left behind. Each step is skipped when it
//! is already done, which makes re-running an interrupted move finish it.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, StorageError};
use crate::model::VolumeSet;
use crate::registry::Registry;
use crate::store::LibraryStore;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relocated {
    Moved,
    AlreadyThere,
}

/// Move the title at `index` so both its manifest and its game files live on `destination`.
pub fn relocate<S: LibraryStore>(
    store: &mut S,
    volumes: &VolumeSet,
    registry: &mut Registry,
    index: usize,
    destination: &str,
) -> Result<Relocated> {
    let dest = volumes.require(destination)?;
    let title = registry
        .get(index)
        .ok_or_else(|| StorageError::TitleNotFound(format!("#{index}")))?;
    let label = title.label();
    let manifest_name = title.manifest_name().to_string();
    let install_dir = title.install_dir()?.to_string();
    let manifest_vol = volumes.require(&title.volume)?;
    let dir_vol = volumes.require(title.install_volume())?;

    let manifest_in_place = manifest_vol.id == dest.id;
    let dir_in_place = dir_vol.id == dest.id;
    if manifest_in_place && dir_in_place {
        return Ok(Relocated::AlreadyThere);
    }

    if !manifest_in_place && store.manifest_exists(dest, &manifest_name) {
        return Err(StorageError::DestinationOccupied {
            title: label,
            path: dest.manifest_path(&manifest_name),
        });
    }
    if !dir_in_place && store.install_dir_exists(dest, &install_dir) {
        return Err(StorageError::DestinationOccupied {
            title: label,
            path: dest.install_path(&install_dir),
        });
    }
    // The game files must exist before the manifest leaves.
    if !dir_in_place && !store.install_dir_exists(dir_vol, &install_dir) {
        return Err(StorageError::Relocation {
            title: label,
            source: io::Error::new(
                io::ErrorKind::NotFound,
                format!(
                    "game files not found at {}",
                    dir_vol.install_path(&install_dir).display()
                ),
            ),
        });
    }

    if !manifest_in_place {
        store
            .move_manifest(&manifest_name, manifest_vol, dest)
            .map_err(|e| StorageError::Relocation {
                title: label.clone(),
                source: e.into_io(),
            })?;
    }

    if !dir_in_place {
        if let Err(e) = store.move_install_dir(&install_dir, dir_vol, dest) {
            tracing::warn!(
                title = %label,
                manifest_on = %dest.id,
                install_dir_on = %dir_vol.id,
                error = %e,
                "game files did not follow the manifest"
            );
            if let Some(title) = registry.get_mut(index) {
                title.volume = dest.id.clone();
                title.split_from = Some(dir_vol.id.clone());
            }
            return Err(StorageError::PartialRelocation {
                title: label,
                manifest_on: dest.id.clone(),
                install_dir_on: dir_vol.id.clone(),
                source: e.into_io(),
            });
        }
    }

    if let Some(title) = registry.get_mut(index) {
        title.volume = dest.id.clone();
        title.split_from = None;
    }
    tracing::info!(title = %label, from = %manifest_vol.id, to = %dest.id, "relocated");
    Ok(Relocated::Moved)
}

pub fn run<S: LibraryStore>(
    store: &mut S,
    volumes: &VolumeSet,
    registry: &mut Registry,
    query: &str,
    destination: &str,
) -> Result<CmdResult> {
    let index = registry.resolve(query)?;
    let dest = volumes.require(destination)?.id.clone();
    let (label, from) = match registry.get(index) {
        Some(title) => (title.label(), title.volume.clone()),
        None => return Err(StorageError::TitleNotFound(query.to_string())),
    };

    let mut result = CmdResult::default();
    match relocate(store, volumes, registry, index, &dest)? {
        Relocated::Moved => result.add_message(CmdMessage::success(format!(
            "Moved {} from {} to {}",
            label, from, dest
        ))),
        Relocated::AlreadyThere => {
            result.add_message(CmdMessage::info(format!("{} is already on {}", label, dest)))
        }
    }
    Ok(result)
}
