//! # Title Registry
//!
//! The in-memory catalog of installed games, derived entirely from the manifests found on
//! disk. It is built once per run by [`discover`] and afterwards only changes through
//! relocation (a title's library is updated) and deletion (a title is removed).
//!
//! ## Ordering
//!
//! Titles are kept in library configuration order, then by manifest file name. Keeping
//! this deterministic matters for the optimiser, which breaks size ties by registry order.
//!
//! ## Failure isolation
//!
//! A library that cannot be listed aborts discovery: without it the catalog is wrong. A
//! single manifest that cannot be read is logged, recorded as a [`DiscoveryIssue`] and
//! skipped so one corrupt file cannot hide every other game.
//!
//! ## Split installs
//!
//! An interrupted move can leave a manifest on one library and its `common/<installdir>`
//! on another. After reading all manifests, every title whose install directory is missing
//! from its own library is looked up on the others; if found there, the title is marked
//! split so that the next move or delete operates on the right directory.

use crate::error::{Result, StorageError};
use crate::manifest::Manifest;
use crate::model::{Title, VolumeSet};
use crate::store::LibraryStore;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// The manifest could not be read; the game is not listed.
    UnreadableManifest(String),
    /// The manifest is here but its install directory lives on another library.
    SplitInstall { install_dir_on: String },
    /// No library holds the install directory named by the manifest.
    MissingInstallDir,
    /// The manifest has no `installdir` field, so its files cannot be located.
    NoInstallDir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryIssue {
    pub volume: String,
    pub manifest: String,
    pub kind: IssueKind,
}

impl fmt::Display for DiscoveryIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::UnreadableManifest(reason) => write!(
                f,
                "Skipped unreadable manifest {} on {}: {}",
                self.manifest, self.volume, reason
            ),
            IssueKind::SplitInstall { install_dir_on } => write!(
                f,
                "{} is split: manifest on {}, game files on {}. Move it again to repair.",
                self.manifest, self.volume, install_dir_on
            ),
            IssueKind::MissingInstallDir => write!(
                f,
                "{} on {} has no game files in any library",
                self.manifest, self.volume
            ),
            IssueKind::NoInstallDir => write!(
                f,
                "{} on {} does not name an install directory",
                self.manifest, self.volume
            ),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    titles: Vec<Title>,
    issues: Vec<DiscoveryIssue>,
}

/// Scan every library for manifests and build the catalog.
pub fn discover<S: LibraryStore>(store: &S, volumes: &VolumeSet) -> Result<Registry> {
    let mut registry = Registry::default();

    for volume in volumes.iter() {
        let names = store.list_manifests(volume)?;
        tracing::debug!(library = %volume.id, manifests = names.len(), "scanned library");

        for name in names {
            match store.read_manifest(volume, &name) {
                Ok(text) => registry
                    .titles
                    .push(Title::new(volume.id.clone(), Manifest::parse(&name, &text))),
                Err(e) => {
                    tracing::warn!(library = %volume.id, manifest = %name, error = %e, "skipping unreadable manifest");
                    registry.issues.push(DiscoveryIssue {
                        volume: volume.id.clone(),
                        manifest: name,
                        kind: IssueKind::UnreadableManifest(e.to_string()),
                    });
                }
            }
        }
    }

    detect_splits(store, volumes, &mut registry);
    Ok(registry)
}

fn detect_splits<S: LibraryStore>(store: &S, volumes: &VolumeSet, registry: &mut Registry) {
    let mut issues = Vec::new();

    for title in &mut registry.titles {
        let Some(home) = volumes.get(&title.volume) else {
            continue;
        };
        let install_dir = match title.install_dir() {
            Ok(dir) => dir.to_string(),
            Err(_) => {
                issues.push(DiscoveryIssue {
                    volume: title.volume.clone(),
                    manifest: title.manifest_name().to_string(),
                    kind: IssueKind::NoInstallDir,
                });
                continue;
            }
        };
        if store.install_dir_exists(home, &install_dir) {
            continue;
        }

        let elsewhere = volumes.iter().find(|other| {
            other.id != home.id
                && store.install_dir_exists(other, &install_dir)
                && !store.manifest_exists(other, title.manifest_name())
        });

        let kind = match elsewhere {
            Some(other) => {
                tracing::warn!(
                    title = %title.label(),
                    manifest_on = %home.id,
                    install_dir_on = %other.id,
                    "found split install"
                );
                title.split_from = Some(other.id.clone());
                IssueKind::SplitInstall {
                    install_dir_on: other.id.clone(),
                }
            }
            None => {
                tracing::warn!(title = %title.label(), library = %home.id, "install directory missing");
                IssueKind::MissingInstallDir
            }
        };
        issues.push(DiscoveryIssue {
            volume: title.volume.clone(),
            manifest: title.manifest_name().to_string(),
            kind,
        });
    }

    registry.issues.extend(issues);
}

impl Registry {
    pub fn titles(&self) -> &[Title] {
        &self.titles
    }

    pub fn issues(&self) -> &[DiscoveryIssue] {
        &self.issues
    }

    pub fn get(&self, index: usize) -> Option<&Title> {
        self.titles.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Title> {
        self.titles.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Indexes of every title whose appid or name equals `query`.
    pub fn find(&self, query: &str) -> Vec<usize> {
        let query = query.trim();
        self.titles
            .iter()
            .enumerate()
            .filter(|(_, t)| t.matches(query))
            .map(|(i, _)| i)
            .collect()
    }

    /// Exactly one match, or an error distinguishing "none" from "several".
    pub fn resolve(&self, query: &str) -> Result<usize> {
        let matches = self.find(query);
        match matches.as_slice() {
            [] => Err(StorageError::TitleNotFound(query.to_string())),
            [one] => Ok(*one),
            many => Err(StorageError::AmbiguousTitle {
                query: query.to_string(),
                candidates: many
                    .iter()
                    .map(|&i| format!("{} on {}", self.titles[i].label(), self.titles[i].volume))
                    .collect(),
            }),
        }
    }

    /// Indexes of the titles whose manifest lives on `volume`, in registry order.
    pub fn on_volume(&self, volume: &str) -> Vec<usize> {
        self.titles
            .iter()
            .enumerate()
            .filter(|(_, t)| t.volume == volume)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn remove(&mut self, index: usize) -> Title {
        self.titles.remove(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::{manifest_name, LibraryFixture};

    #[test]
    fn discovers_titles_in_library_then_file_order() {
        let (store, volumes) = LibraryFixture::new()
            .library("main", 100)
            .library("ssd", 100)
            .game("ssd", "70", "Half-Life", 1)
            .game("main", "400", "Portal", 5)
            .game("main", "220", "Half-Life 2", 6)
            .build();

        let registry = discover(&store, &volumes).unwrap();
        let labels: Vec<_> = registry.titles().iter().map(|t| t.label()).collect();
        assert_eq!(
            labels,
            vec!["Half-Life 2 (220)", "Portal (400)", "Half-Life (70)"]
        );
        assert!(registry.issues().is_empty());
    }

    #[test]
    fn unreadable_library_aborts_discovery() {
        let fixture = LibraryFixture::new().library("main", 100);
        let mut volumes: Vec<_> = fixture.volumes().iter().cloned().collect();
        volumes.push(crate::model::Volume::new("gone", "/lib/gone"));
        let err = discover(&fixture.store, &VolumeSet::new(volumes)).unwrap_err();
        assert!(matches!(err, StorageError::VolumeUnreadable { ref volume, .. } if volume == "gone"));
    }

    #[test]
    fn find_matches_id_and_name() {
        let (store, volumes) = LibraryFixture::new()
            .library("main", 100)
            .game("main", "220", "Half-Life 2", 6)
            .game("main", "400", "Portal", 5)
            .build();
        let registry = discover(&store, &volumes).unwrap();

        assert_eq!(registry.find("400"), vec![1]);
        assert_eq!(registry.find("Half-Life 2"), vec![0]);
        assert!(registry.find("Half").is_empty());
    }

    #[test]
    fn resolve_distinguishes_missing_and_ambiguous() {
        let (store, volumes) = LibraryFixture::new()
            .library("main", 100)
            .library("ssd", 100)
            .game("main", "12345", "Copy A", 1)
            .game("ssd", "12345", "Copy B", 1)
            .build();
        let registry = discover(&store, &volumes).unwrap();

        assert!(matches!(
            registry.resolve("99999"),
            Err(StorageError::TitleNotFound(_))
        ));
        match registry.resolve("12345") {
            Err(StorageError::AmbiguousTitle { candidates, .. }) => {
                assert_eq!(candidates.len(), 2);
                assert!(candidates[0].contains("main"));
                assert!(candidates[1].contains("ssd"));
            }
            other => panic!("expected ambiguity, got {:?}", other.map(|_| ())),
        }
        assert_eq!(registry.resolve("Copy B").unwrap(), 1);
    }

    #[test]
    fn titles_without_fields_are_kept_but_unmatchable() {
        let (store, volumes) = LibraryFixture::new()
            .library("main", 100)
            .raw_manifest("main", "appmanifest_9.acf", "garbage without quotes")
            .build();
        let registry = discover(&store, &volumes).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.find("9").is_empty());
        assert_eq!(registry.issues()[0].kind, IssueKind::NoInstallDir);
    }

    #[test]
    fn detects_split_install() {
        let fixture = LibraryFixture::new()
            .library("main", 100)
            .library("ssd", 100)
            .game("main", "220", "Half-Life 2", 6);
        let main = fixture.volume("main");
        let ssd = fixture.volume("ssd");
        let mut store = fixture.store.clone();
        let volumes = fixture.volumes();
        store
            .move_manifest(&manifest_name("220"), &main, &ssd)
            .unwrap();

        let registry = discover(&store, &volumes).unwrap();
        let title = &registry.titles()[0];
        assert_eq!(title.volume, "ssd");
        assert_eq!(title.split_from.as_deref(), Some("main"));
        assert_eq!(
            registry.issues()[0].kind,
            IssueKind::SplitInstall {
                install_dir_on: "main".into()
            }
        );
    }

    #[test]
    fn reports_missing_install_dir() {
        let fixture = LibraryFixture::new()
            .library("main", 100)
            .game("main", "220", "Half-Life 2", 6);
        let main = fixture.volume("main");
        let volumes = fixture.volumes();
        let mut store = fixture.store;
        store.remove_install_dir(&main, "Half-Life 2").unwrap();

        let registry = discover(&store, &volumes).unwrap();
        assert!(!registry.titles()[0].is_split());
        assert_eq!(registry.issues()[0].kind, IssueKind::MissingInstallDir);
    }

    #[test]
    fn on_volume_filters_by_manifest_library() {
        let (store, volumes) = LibraryFixture::new()
            .library("main", 100)
            .library("ssd", 100)
            .game("main", "1", "A", 1)
            .game("ssd", "2", "B", 1)
            .game("main", "3", "C", 1)
            .build();
        let registry = discover(&store, &volumes).unwrap();
        assert_eq!(registry.on_volume("main"), vec![0, 1]);
        assert_eq!(registry.on_volume("ssd"), vec![2]);
    }
}
