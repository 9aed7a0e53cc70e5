//! Mutation operations: delete, rename, mkdir, move.
//! Each one resolves and contains its paths first, then issues a single filesystem
//! syscall sequence. Failures are surfaced immediately; nothing is retried.

use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::info;

use crate::error::{io_failure, AppError, AppResult};
use super::names::validate_entry_name;
use super::root::{client_join, Root};

/// Resolve for a mutating call: every resolution failure, escapes included, is a 400.
pub fn resolve_for_write(root: &Root, relative: &str) -> AppResult<PathBuf> {
    root.resolve(relative).map_err(|e| AppError::user("invalid_path", e.to_string()))
}

/// Recursively remove a file or directory tree. A missing target counts as deleted.
pub fn delete_entry(root: &Root, path: &str) -> AppResult<PathBuf> {
    let full_path = resolve_for_write(root, path)?;
    if root.is_root(&full_path) {
        return Err(AppError::user("invalid_path", "the root directory cannot be deleted"));
    }
    info!(path = %full_path.display(), "deleting");
    match fs::symlink_metadata(&full_path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(AppError::io("io_error", format!("Error deleting file: {}", e))),
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(&full_path).map_err(delete_failure)?,
        Ok(_) => fs::remove_file(&full_path).map_err(delete_failure)?,
    }
    Ok(full_path)
}

fn delete_failure(e: io::Error) -> AppError {
    AppError::io("io_error", format!("Error deleting file: {}", e))
}

/// Rename an entry in place. `new_name` is a bare name; the destination must not exist.
pub fn rename_entry(root: &Root, old_path: &str, new_name: &str) -> AppResult<PathBuf> {
    validate_entry_name(new_name, false)?;
    let old_full = resolve_for_write(root, old_path)?;
    if root.is_root(&old_full) {
        return Err(AppError::user("invalid_path", "the root directory cannot be renamed"));
    }
    let parent = old_full
        .parent()
        .ok_or_else(|| AppError::user("invalid_path", format!("Invalid old path: {}", old_path)))?;
    let new_full = parent.join(new_name);
    if !root.contains(&new_full) {
        return Err(AppError::user("invalid_path", format!("Invalid new path: {}", new_name)));
    }

    fs::symlink_metadata(&old_full).map_err(io_failure("Error renaming file"))?;
    if new_full == old_full {
        return Ok(new_full);
    }
    if fs::symlink_metadata(&new_full).is_ok() {
        return Err(AppError::conflict("destination_exists", format!("Destination already exists: {}", new_name)));
    }
    fs::rename(&old_full, &new_full).map_err(io_failure("Error renaming file"))?;
    info!(from = %old_full.display(), to = %new_full.display(), "renamed");
    Ok(new_full)
}

/// Create `path/name` and any missing ancestors. Idempotent.
pub fn make_directory(root: &Root, path: &str, name: &str) -> AppResult<PathBuf> {
    validate_entry_name(name, true)?;
    let full_path = resolve_for_write(root, &client_join(path, name))?;
    fs::create_dir_all(&full_path).map_err(io_failure("Error creating directory"))?;
    info!(path = %full_path.display(), "created directory");
    Ok(full_path)
}

/// Move `from` into the directory `to`, keeping its name. Never overwrites.
pub fn move_entry(root: &Root, from: &str, to: &str) -> AppResult<PathBuf> {
    let source = resolve_for_write(root, from)
        .map_err(|e| AppError::user("invalid_path", format!("Invalid source path: {}", e.message())))?;
    if root.is_root(&source) {
        return Err(AppError::user("invalid_path", "the root directory cannot be moved"));
    }
    let dest_dir = resolve_for_write(root, to)
        .map_err(|e| AppError::user("invalid_path", format!("Invalid destination path: {}", e.message())))?;
    let name = source
        .file_name()
        .ok_or_else(|| AppError::user("invalid_path", format!("Invalid source path: {}", from)))?;
    let target = dest_dir.join(name);
    if !root.contains(&target) {
        return Err(AppError::user("invalid_path", format!("Invalid destination path: {}", to)));
    }
    if target != source && target.starts_with(&source) {
        return Err(AppError::user("invalid_path", "a directory cannot be moved into itself"));
    }

    fs::symlink_metadata(&source).map_err(io_failure("Error moving file"))?;
    if fs::symlink_metadata(&target).is_ok() {
        return Err(AppError::conflict("destination_exists", "Destination already exists"));
    }
    // Same-filesystem rename only; EXDEV surfaces as an I/O error.
    fs::rename(&source, &target).map_err(io_failure("Error moving file"))?;
    info!(from = %source.display(), to = %target.display(), "moved");
    Ok(target)
}

#[cfg(test)]
#[path = "ops_tests.rs"]
mod ops_tests;
