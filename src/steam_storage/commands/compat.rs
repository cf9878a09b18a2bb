//! Proton keeps a prefix per game under `compatdata/<appid>`. Steam does not always remove
//! it when the game is uninstalled, so this listing marks which prefixes are orphaned.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::registry::Registry;
use crate::store::LibraryStore;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatEntry {
    pub library: String,
    pub app_id: String,
    pub installed: bool,
}

pub fn run<S: LibraryStore>(
    store: &S,
    compat_dirs: &[(String, PathBuf)],
    registry: &Registry,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    if compat_dirs.is_empty() {
        result.add_message(CmdMessage::info(
            "No compat_data directories are configured.",
        ));
        return Ok(result);
    }

    let mut entries = Vec::new();
    for (library, path) in compat_dirs {
        for app_id in store.list_subdirs(path)? {
            let installed = registry
                .titles()
                .iter()
                .any(|t| t.app_id() == Some(app_id.as_str()));
            entries.push(CompatEntry {
                library: library.clone(),
                app_id,
                installed,
            });
        }
    }

    let orphaned = entries.iter().filter(|e| !e.installed).count();
    if orphaned > 0 {
        result.add_message(CmdMessage::info(format!(
            "{orphaned} prefix{} without an installed game",
            if orphaned == 1 { "" } else { "es" }
        )));
    }
    Ok(result.with_compat(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::discover;
    use crate::store::memory::fixtures::LibraryFixture;

    #[test]
    fn marks_orphaned_prefixes() {
        let (mut store, volumes) = LibraryFixture::new()
            .library("main", 100)
            .game("main", "220", "Half-Life 2", 6)
            .build();
        store.add_subdirs("/compat/main", &["400", "220", "0"]);
        let registry = discover(&store, &volumes).unwrap();

        let dirs = vec![("main".to_string(), PathBuf::from("/compat/main"))];
        let result = run(&store, &dirs, &registry).unwrap();

        let rows: Vec<_> = result
            .compat
            .iter()
            .map(|e| (e.app_id.as_str(), e.installed))
            .collect();
        assert_eq!(rows, vec![("0", false), ("220", true), ("400", false)]);
        assert_eq!(result.messages[0].content, "2 prefixes without an installed game");
    }

    #[test]
    fn unreadable_directory_is_an_error() {
        let (store, volumes) = LibraryFixture::new().library("main", 100).build();
        let registry = discover(&store, &volumes).unwrap();
        let dirs = vec![("main".to_string(), PathBuf::from("/nowhere"))];
        assert!(run(&store, &dirs, &registry).is_err());
    }

    #[test]
    fn nothing_configured() {
        let (store, volumes) = LibraryFixture::new().library("main", 100).build();
        let registry = discover(&store, &volumes).unwrap();
        let result = run(&store, &[], &registry).unwrap();
        assert!(result.compat.is_empty());
        assert_eq!(result.messages.len(), 1);
    }
}
