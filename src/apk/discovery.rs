use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Extensions recognised as feature dumps
const DUMP_EXTENSIONS: &[&str] = &["json", "yml", "yaml"];

/// Expand the given paths into dump files.
///
/// Files are kept as given, in order. Directories are walked recursively
/// (hidden entries skipped) and their dumps appended in sorted order, so
/// the fold order is stable between runs.
pub fn find_dump_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut found = walk_dir(path);
            found.sort();
            debug!("Found {} dumps under {}", found.len(), path.display());
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }

    files
}

fn walk_dir(root: &Path) -> Vec<PathBuf> {
    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

    walker
        .flatten()
        .filter(|entry| entry.file_type().is_file() && is_dump(entry.path()))
        .map(|entry| {
            trace!("Dump candidate: {}", entry.path().display());
            entry.into_path()
        })
        .collect()
}

fn is_dump(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| DUMP_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}
