//!
//! filegate server binary
//! ----------------------
//! Command-line entry point. Configuration comes from flags with environment
//! fallbacks (see `filegate --help`).

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use filegate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,tower_http=info"))?;
    fmt().with_env_filter(filter).init();

    let config = ServerConfig::parse();

    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(
        target: "filegate",
        "filegate {} starting: RUST_LOG='{}', listen={}, root='{}'",
        env!("CARGO_PKG_VERSION"), rust_log, config.listen_addr(), config.root_dir.display()
    );

    filegate::server::run(config).await
}
