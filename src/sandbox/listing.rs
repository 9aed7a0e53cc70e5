//! Directory listing: immediate children of a resolved directory, with size and
//! timestamps, directories first and then by name.

use std::fs;
use std::io;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};
use super::root::{client_join, client_parent, Root};
use super::size::format_size;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EntryDescriptor {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
    pub size: u64,
    pub mod_time: DateTime<Utc>,
    /// Mirrors `mod_time`: creation time is not portable across filesystems.
    pub create_time: DateTime<Utc>,
    pub size_formatted: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryListing {
    pub current_path: String,
    pub parent_path: String,
    pub files: Vec<EntryDescriptor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    /// Files and directories with sizes.
    Full,
    /// Directories only, no size formatting.
    DirectoriesOnly,
}

/// List the directory at `requested` (root-relative; empty means "/").
pub fn list_directory(root: &Root, requested: &str, mode: ListMode) -> AppResult<DirectoryListing> {
    let requested = if requested.is_empty() { "/" } else { requested };
    let full_path = root.resolve(requested)?;

    let meta = fs::metadata(&full_path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => AppError::not_found("not_found", format!("Path not found: {}", requested)),
        _ => AppError::io("io_error", format!("Error reading {}: {}", requested, e)),
    })?;
    if !meta.is_dir() {
        return Err(AppError::not_a_directory("not_a_directory", format!("Path is not a directory: {}", requested)));
    }

    let current_path = root.client_path(&full_path);
    let rd = fs::read_dir(&full_path)
        .map_err(|e| AppError::io("io_error", format!("Error reading directory {}: {}", current_path, e)))?;

    let mut files = Vec::new();
    for entry in rd {
        let Ok(entry) = entry else { continue };
        let Ok(file_type) = entry.file_type() else { continue };
        let is_dir = file_type.is_dir();
        if mode == ListMode::DirectoriesOnly && !is_dir {
            continue;
        }
        // Entries that vanish or cannot be stat'ed between readdir and stat are omitted.
        let Ok(entry_meta) = entry.metadata() else { continue };
        let Ok(modified) = entry_meta.modified() else { continue };
        let mod_time: DateTime<Utc> = modified.into();

        let name = entry.file_name().to_string_lossy().into_owned();
        let (size, size_formatted) = match mode {
            ListMode::Full => {
                let size = if is_dir { 0 } else { entry_meta.len() };
                (size, format_size(size))
            }
            ListMode::DirectoriesOnly => (0, String::new()),
        };
        files.push(EntryDescriptor {
            path: client_join(&current_path, &name),
            name,
            is_dir,
            size,
            mod_time,
            create_time: mod_time,
            size_formatted,
        });
    }
    sort_entries(&mut files);

    let parent_path = client_parent(&current_path);
    debug!(current = %current_path, parent = %parent_path, count = files.len(), "listed directory");

    Ok(DirectoryListing { current_path, parent_path, files })
}

/// Directories before files; ascending byte order of the name within each group.
pub fn sort_entries(files: &mut [EntryDescriptor]) {
    files.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
}

#[cfg(test)]
#[path = "listing_tests.rs"]
mod listing_tests;
