//! Destructive directory mirroring.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Mirror `origin` into `target`.
///
/// Directories are created, regular files copied (existing files
/// overwritten), and anything in `target` with no counterpart in
/// `origin` is deleted. Symlinks are not followed and not copied;
/// build contexts carry regular files only.
///
/// Not transactional: a failure leaves the target partially synced and
/// the caller re-mirrors.
pub fn mirror(origin: &Path, target: &Path) -> io::Result<()> {
    fs::create_dir_all(target)?;

    let mut keep: HashSet<PathBuf> = HashSet::new();
    for entry in WalkDir::new(origin).min_depth(1) {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(origin)
            .map_err(io::Error::other)?
            .to_path_buf();
        let dest = target.join(&relative);

        if entry.file_type().is_dir() {
            if dest.is_file() {
                fs::remove_file(&dest)?;
            }
            fs::create_dir_all(&dest)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            if dest.is_dir() {
                fs::remove_dir_all(&dest)?;
            }
            fs::copy(entry.path(), &dest)?;
        } else {
            continue;
        }
        keep.insert(relative);
    }

    // Collect target-only entries top-down, then delete bottom-up so
    // children go before their parents.
    let mut stale: Vec<(PathBuf, bool)> = Vec::new();
    for entry in WalkDir::new(target).min_depth(1) {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(target)
            .map_err(io::Error::other)?;
        if !keep.contains(relative) {
            stale.push((entry.path().to_path_buf(), entry.file_type().is_dir()));
        }
    }
    for (path, is_dir) in stale.iter().rev() {
        if *is_dir {
            if path.exists() {
                fs::remove_dir_all(path)?;
            }
        } else if path.exists() {
            fs::remove_file(path)?;
        }
    }

    Ok(())
}
