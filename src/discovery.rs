use crate::config::DiscoveryConfig;
use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Recursively collects candidate files under `root`, sorted by path.
///
/// An unreadable or non-directory root is an error. Entries below the root
/// that cannot be read are logged and skipped.
pub fn find_files(root: &Path, discovery: &DiscoveryConfig) -> Result<Vec<PathBuf>> {
    let metadata =
        fs::metadata(root).with_context(|| format!("Cannot access directory {:?}", root))?;
    if !metadata.is_dir() {
        anyhow::bail!("{} is not a directory", root.display());
    }

    let walk_dir = WalkDir::new(root).follow_links(discovery.follow_links);

    let mut files = Vec::new();
    for entry in walk_dir
        .into_iter()
        .filter_entry(|entry| !is_excluded_dir(entry, &discovery.exclude_dirs))
    {
        match entry {
            Ok(entry) if entry.file_type().is_file() => {
                if has_extension(entry.path(), &discovery.extensions) {
                    files.push(entry.into_path());
                }
            }
            Ok(_) => {}
            Err(err) => tracing::warn!("Skipping unreadable entry: {}", err),
        }
    }

    files.sort();
    Ok(files)
}

fn is_excluded_dir(entry: &DirEntry, exclude_dirs: &[String]) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| exclude_dirs.iter().any(|excluded| excluded == name))
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| extensions.iter().any(|wanted| wanted == ext))
}
