//! The sandbox root and the path resolver.
//!
//! Every client path is root-relative ("/", "/docs/a.txt"). `Root::resolve` turns it
//! into an absolute host path and proves it lies at or below the root. Normalization
//! is lexical (no symlink resolution), matching how the host path allowlist works.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use path_absolutize::Absolutize;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("invalid path '{0}': {1}")]
    Malformed(String, String),
    #[error("path '{0}' is outside the root directory")]
    OutsideRoot(String),
}

/// Escapes are reported as 403 here; write paths go through `resolve_for_write`
/// which downgrades everything to 400.
impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Malformed(..) => AppError::user("invalid_path", err.to_string()),
            ResolveError::OutsideRoot(_) => AppError::forbidden("access_denied", err.to_string()),
        }
    }
}

/// Immutable, canonical root directory shared by all handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root {
    path: Arc<PathBuf>,
}

impl Root {
    /// Absolutize and canonicalize `dir`, which must be an existing directory.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let abs = dir
            .absolutize()
            .with_context(|| format!("Error getting absolute path for {}", dir.display()))?
            .to_path_buf();
        let canonical = std::fs::canonicalize(&abs)
            .with_context(|| format!("Error getting directory stats for {}", abs.display()))?;
        let meta = std::fs::metadata(&canonical)
            .with_context(|| format!("Error getting directory stats for {}", canonical.display()))?;
        if !meta.is_dir() {
            bail!("Root dir path must be a folder: {}", canonical.display());
        }
        Ok(Self { path: Arc::new(canonical) })
    }

    pub fn path(&self) -> &Path { self.path.as_path() }

    /// Resolve a root-relative client path to an absolute path beneath the root.
    ///
    /// Leading slashes are stripped first, so "/etc" means "<root>/etc" rather than
    /// overriding the root. `..` segments are collapsed lexically and the result must
    /// still start with the root component-wise.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, ResolveError> {
        if relative.contains('\u{0000}') {
            return Err(ResolveError::Malformed(relative.replace('\u{0000}', "\\0"), "NUL characters are not allowed".into()));
        }
        let trimmed = relative.trim_start_matches('/');
        let joined = self.path.join(trimmed);
        let abs = joined
            .absolutize()
            .map_err(|e| ResolveError::Malformed(relative.to_string(), e.to_string()))?
            .to_path_buf();
        if !self.contains(&abs) {
            return Err(ResolveError::OutsideRoot(relative.to_string()));
        }
        Ok(abs)
    }

    /// Component-wise descendant-or-self test; "/data-evil" is not inside "/data".
    pub fn contains(&self, candidate: &Path) -> bool {
        if cfg!(windows) {
            if candidate.components().next() != self.path.components().next() { return false; }
        }
        candidate.starts_with(self.path.as_path())
    }

    pub fn is_root(&self, candidate: &Path) -> bool { candidate == self.path.as_path() }

    /// Convert an absolute path beneath the root back into the client form ("/", "/a/b").
    pub fn client_path(&self, abs: &Path) -> String {
        let rel = match abs.strip_prefix(self.path.as_path()) {
            Ok(r) => r,
            Err(_) => return "/".to_string(),
        };
        let segments: Vec<String> = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        format!("/{}", segments.join("/"))
    }
}

/// Parent of a normalized client path. The root itself has the empty sentinel.
pub fn client_parent(client_path: &str) -> String {
    if client_path == "/" || client_path.is_empty() {
        return String::new();
    }
    match client_path.trim_end_matches('/').rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => client_path[..idx].to_string(),
    }
}

/// Join a client directory and a child name without touching the filesystem.
pub fn client_join(dir: &str, name: &str) -> String {
    format!("{}/{}", dir.trim_end_matches('/'), name.trim_start_matches('/'))
}

#[cfg(test)]
#[path = "root_tests.rs"]
mod root_tests;
