//! Startup checks and inventory logging for the root directory.

use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::config::ServerConfig;
use crate::sandbox::Root;

/// Log folder configuration as the very first thing on startup.
pub fn log_startup_folders(config: &ServerConfig, root: &Root) {
    let cwd = std::env::current_dir().ok();
    let exe = std::env::current_exe().ok();
    let user = whoami::username();
    info!(
        target: "startup",
        "filegate starting. root={:?}, listen={}, static_dir={:?}, staging_dir={:?}, cwd={:?}, exe={:?}, user={}",
        root.path(), config.listen_addr(), config.static_dir, config.staging_dir(), cwd, exe, user
    );
    let static_exists = config.static_dir.join("index.html").exists();
    let staging_exists = config.staging_dir().is_dir();
    info!(target: "startup", "Path existence: static_index_exists={}, staging_dir_exists={}", static_exists, staging_exists);
}

/// The root must be owned by the uid and gid this process runs as.
/// A sanity check against serving someone else's tree, not per-request access control.
#[cfg(unix)]
pub fn verify_root_owner(root: &Path) -> Result<()> {
    use anyhow::Context;
    use std::os::unix::fs::MetadataExt;

    let meta = std::fs::metadata(root)
        .with_context(|| format!("Error getting directory stats for {}", root.display()))?;
    info!(target: "startup", "Root dir stats UID: {}, GID: {}", meta.uid(), meta.gid());
    ensure_same_owner((meta.uid(), meta.gid()), process_ids(), root)
}

/// Real uid and gid of this process.
#[cfg(unix)]
fn process_ids() -> (u32, u32) {
    // SAFETY: getuid(2)/getgid(2) take no arguments, touch no memory and always succeed.
    unsafe { (libc::getuid(), libc::getgid()) }
}

#[cfg(not(unix))]
pub fn verify_root_owner(root: &Path) -> Result<()> {
    tracing::debug!(target: "startup", "ownership check skipped on this platform for {}", root.display());
    Ok(())
}

#[cfg_attr(not(unix), allow(dead_code))]
fn ensure_same_owner(owner: (u32, u32), current: (u32, u32), root: &Path) -> Result<()> {
    if owner != current {
        anyhow::bail!(
            "UID/GID {}:{} of user '{}' is not the same as the owner {}:{} of the root dir path {}",
            current.0, current.1, whoami::username(), owner.0, owner.1, root.display()
        );
    }
    Ok(())
}
