use super::LibraryStore;
use crate::error::{Result, StorageError};
use crate::manifest::is_manifest_file;
use crate::model::Volume;
use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Production store backed by the real directory trees.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileStore;

impl FileStore {
    pub fn new() -> Self {
        Self
    }
}

impl LibraryStore for FileStore {
    fn list_manifests(&self, volume: &Volume) -> Result<Vec<String>> {
        let unreadable = |source| StorageError::VolumeUnreadable {
            volume: volume.id.clone(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(&volume.path).map_err(unreadable)? {
            let entry = entry.map_err(unreadable)?;
            if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_manifest_file(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn read_manifest(&self, volume: &Volume, manifest_name: &str) -> Result<String> {
        Ok(fs::read_to_string(volume.manifest_path(manifest_name))?)
    }

    fn manifest_exists(&self, volume: &Volume, manifest_name: &str) -> bool {
        volume.manifest_path(manifest_name).is_file()
    }

    fn install_dir_exists(&self, volume: &Volume, install_dir: &str) -> bool {
        volume.install_path(install_dir).is_dir()
    }

    fn move_manifest(&mut self, manifest_name: &str, from: &Volume, to: &Volume) -> Result<()> {
        let src = from.manifest_path(manifest_name);
        let dst = to.manifest_path(manifest_name);
        tracing::debug!(src = %src.display(), dst = %dst.display(), "moving manifest");
        move_file(&src, &dst)?;
        Ok(())
    }

    fn move_install_dir(&mut self, install_dir: &str, from: &Volume, to: &Volume) -> Result<()> {
        let src = from.install_path(install_dir);
        let dst = to.install_path(install_dir);
        tracing::debug!(src = %src.display(), dst = %dst.display(), "moving install directory");
        fs::create_dir_all(to.common_dir())?;
        move_dir(&src, &dst)?;
        Ok(())
    }

    fn remove_manifest(&mut self, volume: &Volume, manifest_name: &str) -> Result<()> {
        let path = volume.manifest_path(manifest_name);
        tracing::debug!(path = %path.display(), "removing manifest");
        fs::remove_file(path)?;
        Ok(())
    }

    fn remove_install_dir(&mut self, volume: &Volume, install_dir: &str) -> Result<()> {
        let path = volume.install_path(install_dir);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "install directory already gone");
            return Ok(());
        }
        tracing::debug!(path = %path.display(), "removing install directory");
        fs::remove_dir_all(path)?;
        Ok(())
    }

    fn free_bytes(&self, volume: &Volume) -> Result<u64> {
        Ok(fs4::available_space(&volume.path)?)
    }

    fn list_subdirs(&self, path: &Path) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

fn refuse_existing(dst: &Path) -> io::Result<()> {
    if dst.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", dst.display()),
        ));
    }
    Ok(())
}

/// Rename, or copy then delete when the rename would cross file systems.
pub(crate) fn move_file(src: &Path, dst: &Path) -> io::Result<()> {
    refuse_existing(dst)?;
    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!(src = %src.display(), "rename crosses devices, copying file");
            copy_then_remove_file(src, dst)
        }
        Err(e) => Err(e),
    }
}

/// Rename, or copy the tree then delete it when the rename would cross file systems.
pub(crate) fn move_dir(src: &Path, dst: &Path) -> io::Result<()> {
    if !src.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a directory", src.display()),
        ));
    }
    refuse_existing(dst)?;
    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!(src = %src.display(), "rename crosses devices, copying tree");
            copy_then_remove_dir(src, dst)
        }
        Err(e) => Err(e),
    }
}

/// Copy `src` to `dst` and delete `src`. On any error only the source is left.
pub(crate) fn copy_then_remove_file(src: &Path, dst: &Path) -> io::Result<()> {
    refuse_existing(dst)?;
    if let Err(copy_err) = fs::copy(src, dst) {
        let _ = fs::remove_file(dst);
        return Err(copy_err);
    }
    if let Err(remove_err) = fs::remove_file(src) {
        // Keep exactly one copy: the source is still authoritative.
        let _ = fs::remove_file(dst);
        return Err(remove_err);
    }
    Ok(())
}

/// Copy the tree at `src` to `dst` and delete `src`.
///
/// A failed copy removes whatever reached `dst`. Once the copy is complete `dst` is
/// authoritative, so a source that cannot be deleted is only logged.
pub(crate) fn copy_then_remove_dir(src: &Path, dst: &Path) -> io::Result<()> {
    refuse_existing(dst)?;
    if let Err(copy_err) = copy_tree(src, dst) {
        if dst.exists() {
            if let Err(cleanup_err) = fs::remove_dir_all(dst) {
                tracing::warn!(
                    path = %dst.display(),
                    error = %cleanup_err,
                    "could not clean up partial copy"
                );
            }
        }
        return Err(copy_err);
    }
    if let Err(remove_err) = fs::remove_dir_all(src) {
        tracing::warn!(
            path = %src.display(),
            error = %remove_err,
            "copied game files but could not remove the original"
        );
    }
    Ok(())
}

/// Recreate the tree at `src` under `dst`. Symlinks are copied as links, never followed.
pub(crate) fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    for entry in WalkDir::new(src).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(io::Error::other)?;
        let to = dst.join(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir(&to)?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &to)?;
        } else {
            fs::copy(entry.path(), &to)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    let target = fs::read_link(from)?;
    std::os::unix::fs::symlink(target, to)
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to).map(|_| ())
}
