use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, StorageError};
use crate::model::{Title, VolumeSet};
use crate::registry::Registry;
use crate::store::LibraryStore;

/// Remove the manifest, then the game files, then forget the title.
///
/// The install directory name is read before anything is touched so a broken manifest
/// cannot leave orphaned files behind.
pub fn delete<S: LibraryStore>(
    store: &mut S,
    volumes: &VolumeSet,
    registry: &mut Registry,
    index: usize,
) -> Result<Title> {
    let title = registry
        .get(index)
        .ok_or_else(|| StorageError::TitleNotFound(format!("#{index}")))?;
    let label = title.label();
    let manifest_name = title.manifest_name().to_string();
    let install_dir = title.install_dir()?.to_string();
    let manifest_vol = volumes.require(&title.volume)?;
    let dir_vol = volumes.require(title.install_volume())?;

    store
        .remove_manifest(manifest_vol, &manifest_name)
        .map_err(|e| StorageError::Deletion {
            title: label.clone(),
            source: e.into_io(),
        })?;
    let removed = registry.remove(index);

    if let Err(e) = store.remove_install_dir(dir_vol, &install_dir) {
        let path = dir_vol.install_path(&install_dir);
        tracing::warn!(title = %label, path = %path.display(), error = %e, "game files left behind");
        return Err(StorageError::PartialDeletion {
            title: label,
            path,
            source: e.into_io(),
        });
    }

    tracing::info!(title = %label, library = %dir_vol.id, "deleted");
    Ok(removed)
}

pub fn run<S: LibraryStore>(
    store: &mut S,
    volumes: &VolumeSet,
    registry: &mut Registry,
    query: &str,
) -> Result<CmdResult> {
    let index = registry.resolve(query)?;
    let removed = delete(store, volumes, registry, index)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Deleted {} from {}",
        removed.label(),
        removed.volume
    )));
    Ok(result)
}
