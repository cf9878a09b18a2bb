use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{TitleSummary, Volume, VolumeSet, VolumeUsage};
use crate::registry::Registry;
use crate::store::LibraryStore;

/// Free space and installed games for the requested libraries, or all of them.
pub fn run<S: LibraryStore>(
    store: &S,
    volumes: &VolumeSet,
    registry: &Registry,
    filter: &[String],
) -> Result<CmdResult> {
    let selected: Vec<&Volume> = if filter.is_empty() {
        volumes.iter().collect()
    } else {
        let mut picked: Vec<&Volume> = Vec::new();
        for id in filter {
            let volume = volumes.require(id)?;
            if !picked.iter().any(|v| v.id == volume.id) {
                picked.push(volume);
            }
        }
        picked
    };

    let mut usage = Vec::with_capacity(selected.len());
    for volume in &selected {
        usage.push(VolumeUsage {
            id: volume.id.clone(),
            path: volume.path.clone(),
            free_bytes: store.free_bytes(volume)?,
        });
    }

    let titles: Vec<TitleSummary> = selected
        .iter()
        .flat_map(|volume| registry.on_volume(&volume.id))
        .filter_map(|index| registry.get(index))
        .map(TitleSummary::from)
        .collect();

    let mut result = CmdResult::default();
    for issue in registry.issues() {
        if selected.iter().any(|v| v.id == issue.volume) {
            result.add_message(CmdMessage::warning(issue.to_string()));
        }
    }
    if titles.is_empty() {
        result.add_message(CmdMessage::info("No games installed."));
    }

    Ok(result.with_volumes(usage).with_titles(titles))
}
