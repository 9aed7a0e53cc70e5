//! Upload staging and placement.
//!
//! The multipart body is streamed chunk by chunk into a named temp file in the staging
//! directory; once the form is fully read the spooled file is renamed onto its
//! destination. A failed upload therefore never leaves a truncated destination file,
//! and dropping a `SpooledUpload` removes its temp file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use futures_util::{Stream, StreamExt};
use tempfile::{Builder, NamedTempFile, PersistError};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{io_failure, AppError, AppResult};
use super::names::upload_basename;
use super::ops::resolve_for_write;
use super::root::{client_join, Root};

const SPOOL_PREFIX: &str = ".filegate-upload-";

/// Form fields that accompany an uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadRequest {
    /// Root-relative target directory.
    pub path: String,
    pub overwrite: bool,
    pub create_path: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Stored(PathBuf),
    /// The destination exists and `overwrite` was not set.
    Conflict { filename: String },
}

#[derive(Debug)]
pub struct SpooledUpload {
    file: NamedTempFile,
    declared_name: String,
    len: u64,
}

impl SpooledUpload {
    pub fn declared_name(&self) -> &str { &self.declared_name }
    pub fn len(&self) -> u64 { self.len }
    pub fn is_empty(&self) -> bool { self.len == 0 }
    pub fn spool_path(&self) -> &Path { self.file.path() }
}

/// Temp file builder for spools. New uploads get `0666 & !umask`, like a plain create.
fn spool_builder() -> Builder<'static, 'static> {
    let mut builder = Builder::new();
    builder.prefix(SPOOL_PREFIX);
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder
}

/// Stream `chunks` into a fresh temp file under `staging_dir`.
/// A chunk error aborts the spool and is returned as is, so the caller decides its status.
pub async fn spool<S, B, E>(staging_dir: &Path, declared_name: &str, chunks: S) -> AppResult<SpooledUpload>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<AppError>,
{
    let file = spool_builder()
        .tempfile_in(staging_dir)
        .map_err(|e| AppError::io("io_error", format!("Error creating upload spool in {}: {}", staging_dir.display(), e)))?;
    let handle = file.reopen().map_err(|e| AppError::io("io_error", format!("Error opening upload spool: {}", e)))?;
    let mut out = tokio::fs::File::from_std(handle);

    let mut chunks = std::pin::pin!(chunks);
    let mut len: u64 = 0;
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.map_err(Into::<AppError>::into)?;
        let bytes = chunk.as_ref();
        if bytes.is_empty() {
            continue;
        }
        out.write_all(bytes)
            .await
            .map_err(|e| AppError::io("io_error", format!("Error copying file: {}", e)))?;
        len += bytes.len() as u64;
    }
    out.flush().await.map_err(|e| AppError::io("io_error", format!("Error copying file: {}", e)))?;
    debug!(spool = %file.path().display(), bytes = len, "spooled upload");

    Ok(SpooledUpload { file, declared_name: declared_name.to_string(), len })
}

/// Place a spooled upload at `<root>/<req.path>/<basename(declared name)>`.
pub fn store_upload(root: &Root, req: &UploadRequest, upload: SpooledUpload) -> AppResult<UploadOutcome> {
    let filename = upload_basename(&upload.declared_name)?;
    let target_dir = if req.path.is_empty() { "/" } else { req.path.as_str() };

    if req.create_path {
        let dir = resolve_for_write(root, target_dir)?;
        fs::create_dir_all(&dir)
            .map_err(|e| AppError::io("io_error", format!("Error creating directory structure: {}", e)))?;
    }

    let target = resolve_for_write(root, &client_join(target_dir, &filename))?;
    if !req.overwrite && fs::symlink_metadata(&target).is_ok() {
        return Ok(UploadOutcome::Conflict { filename });
    }

    if req.overwrite {
        // Replacing swaps the inode; keep the mode the existing file had.
        if let Ok(existing) = fs::metadata(&target) {
            upload
                .file
                .as_file()
                .set_permissions(existing.permissions())
                .map_err(io_failure("Error creating file"))?;
        }
    }

    let bytes = upload.len;
    if !place(upload.file, &target, req.overwrite)? {
        return Ok(UploadOutcome::Conflict { filename });
    }
    info!(path = %target.display(), bytes, overwrite = req.overwrite, "stored upload");
    Ok(UploadOutcome::Stored(target))
}

/// Rename the spool onto `target`. Returns false when a no-clobber rename found the
/// destination already present.
fn place(spool: NamedTempFile, target: &Path, overwrite: bool) -> AppResult<bool> {
    match persist(spool, target, overwrite) {
        Ok(()) => Ok(true),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) if is_cross_device(&e.error) => {
            debug!(spool = %e.file.path().display(), target = %target.display(), "staging dir on another device, copying");
            place_via_sibling(e.file.path(), target, overwrite)
        }
        Err(e) => Err(io_failure("Error creating file")(e.error)),
    }
}

/// Copy `src` into a temp file next to `target` and rename that into place.
/// Same return contract as `place`; the sibling temp file never outlives the call.
fn place_via_sibling(src: &Path, target: &Path, overwrite: bool) -> AppResult<bool> {
    let parent = target
        .parent()
        .ok_or_else(|| AppError::user("invalid_path", format!("Invalid target path: {}", target.display())))?;
    let mut local = spool_builder().tempfile_in(parent).map_err(io_failure("Error creating file"))?;
    let mut input = fs::File::open(src).map_err(io_failure("Error copying file"))?;
    io::copy(&mut input, local.as_file_mut()).map_err(io_failure("Error copying file"))?;
    let perms = input.metadata().map_err(io_failure("Error copying file"))?.permissions();
    local.as_file().set_permissions(perms).map_err(io_failure("Error copying file"))?;
    local.as_file().sync_all().map_err(io_failure("Error copying file"))?;
    match persist(local, target, overwrite) {
        Ok(()) => Ok(true),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(io_failure("Error creating file")(e.error)),
    }
}

fn persist(file: NamedTempFile, target: &Path, overwrite: bool) -> Result<(), PersistError> {
    if overwrite {
        file.persist(target).map(|_| ())
    } else {
        file.persist_noclobber(target).map(|_| ())
    }
}

#[cfg(unix)]
fn is_cross_device(err: &io::Error) -> bool { err.raw_os_error() == Some(libc::EXDEV) }

#[cfg(not(unix))]
fn is_cross_device(_err: &io::Error) -> bool { false }

#[cfg(test)]
#[path = "upload_tests.rs"]
mod upload_tests;
