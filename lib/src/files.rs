use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Get a list of files (but not directories) under each of `paths`.
///
/// Roots that do not exist or are not directories are logged and skipped.
/// Results are absolute, in filesystem listing order per root. Symlinks to
/// files are kept; symlinked directories are not descended into.
pub fn enumerate_files<P: AsRef<Path>>(paths: &[P], recursive: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        let dir = path.as_ref();

        if !dir.exists() {
            log::warn!("The directory '{}' does not exist.", dir.display());
        } else if !dir.is_dir() {
            log::warn!("'{}' is not a directory.", dir.display());
        } else {
            match absolute(dir) {
                Ok(root) => files.extend(list_files(&root, recursive)),
                Err(e) => log::warn!("Could not resolve '{}': {}", dir.display(), e),
            }
        }
    }

    files
}

fn absolute(dir: &Path) -> std::io::Result<PathBuf> {
    if dir.is_absolute() {
        Ok(dir.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(dir))
    }
}

fn list_files(root: &Path, recursive: bool) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(root).min_depth(1);
    if !recursive {
        walker = walker.max_depth(1);
    }

    walker
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.into_path()),
            Err(e) => {
                log::warn!("Skipping unreadable entry under '{}': {}", root.display(), e);
                None
            }
        })
        // is_file() follows symlinks, so links to files count and broken links don't
        .filter(|path| path.is_file())
        .collect()
}
