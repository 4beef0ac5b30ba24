use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use routefog_server::{load_manifest, router, ManifestService};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "routefog-server")]
#[command(about = "Serve route-table patches from a JSON route manifest", long_about = None)]
#[command(version)]
struct Cli {
    /// Route manifest JSON file ({ "version": ..., "routes": { id: record } })
    #[arg(long)]
    routes: PathBuf,

    /// Listen address
    #[arg(long, default_value = "127.0.0.1:8787")]
    addr: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let manifest = load_manifest(&cli.routes)?;
    info!(
        "serving {} route(s), manifest version {}",
        manifest.len(),
        manifest.version
    );

    let app = router(ManifestService::new(manifest));
    let listener = tokio::net::TcpListener::bind(cli.addr)
        .await
        .with_context(|| format!("bind {}", cli.addr))?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
