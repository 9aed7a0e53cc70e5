//! Server configuration from command-line flags with environment fallbacks.

use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_PORT: u16 = 8080;
/// Overall request body ceiling for uploads (10 GiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024 * 1024;

#[derive(Parser, Debug, Clone)]
#[command(name = "filegate", version, about = "Sandboxed HTTP file manager for a single directory tree")]
pub struct ServerConfig {
    /// Directory tree exposed to clients
    #[arg(short = 'r', long, env = "FILES_ROOT_DIR", default_value = ".")]
    pub root_dir: PathBuf,

    #[arg(short = 'p', long, env = "PORT", default_value_t = DEFAULT_PORT, help = "HTTP port")]
    pub port: u16,

    #[arg(short = 'b', long, env = "FILES_BIND", default_value = "0.0.0.0", help = "Bind address")]
    pub bind: String,

    /// Web client assets, served under /static with index.html at /
    #[arg(long, env = "FILES_STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Where upload bodies are spooled before being moved into place (default: system temp dir)
    #[arg(long, env = "FILES_UPLOAD_TMP")]
    pub upload_tmp: Option<PathBuf>,

    #[arg(long, env = "FILES_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES, help = "Maximum upload request size in bytes")]
    pub max_upload_bytes: u64,

    /// Serve even if the root directory is owned by another uid/gid
    #[arg(long, env = "FILES_SKIP_OWNER_CHECK")]
    pub skip_owner_check: bool,
}

impl ServerConfig {
    pub fn staging_dir(&self) -> PathBuf {
        self.upload_tmp.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn listen_addr(&self) -> String { format!("{}:{}", self.bind, self.port) }

    pub fn body_limit(&self) -> usize { usize::try_from(self.max_upload_bytes).unwrap_or(usize::MAX) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ServerConfig::try_parse_from(["filegate"]).unwrap();
        assert_eq!(cfg.root_dir, PathBuf::from("."));
        assert_eq!(cfg.static_dir, PathBuf::from("static"));
        assert!(cfg.max_upload_bytes > 0);
        assert_eq!(cfg.staging_dir(), cfg.upload_tmp.clone().unwrap_or_else(std::env::temp_dir));
    }

    #[test]
    fn flags_override() {
        let cfg = ServerConfig::try_parse_from([
            "filegate", "--root-dir", "/srv/files", "--port", "9000", "--bind", "127.0.0.1",
            "--upload-tmp", "/var/tmp/uploads", "--max-upload-bytes", "1024", "--skip-owner-check",
        ])
        .unwrap();
        assert_eq!(cfg.root_dir, PathBuf::from("/srv/files"));
        assert_eq!(cfg.listen_addr(), "127.0.0.1:9000");
        assert_eq!(cfg.staging_dir(), PathBuf::from("/var/tmp/uploads"));
        assert_eq!(cfg.body_limit(), 1024);
        assert!(cfg.skip_owner_check);
    }

    #[test]
    fn rejects_bad_port() {
        assert!(ServerConfig::try_parse_from(["filegate", "--port", "99999"]).is_err());
    }
}
