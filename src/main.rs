use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use upload_proxy::config::loader;
use upload_proxy::lifecycle::{signals, Shutdown};
use upload_proxy::observability;
use upload_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "upload-proxy")]
#[command(about = "Forwards uploads to remote storage with permissive CORS", long_about = None)]
struct Cli {
    /// Optional TOML config file; PROXY_* environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match loader::resolve(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("upload-proxy: {e}");
            std::process::exit(1);
        }
    };

    observability::logging::init(&config.observability);
    tracing::info!("upload-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address(),
        upstream = %config.upstream.origin,
        prefix = %config.upstream.public_prefix,
        connect_timeout_secs = config.timeouts.connect_secs,
        response_timeout_secs = config.timeouts.response_header_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => observability::metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let grace = Duration::from_secs(config.timeouts.shutdown_grace_secs);
    let server = HttpServer::new(config)?;
    let shutdown = Shutdown::new();
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        res = &mut server_task => {
            res??;
            return Ok(());
        }
        res = signals::wait_for_signal() => res?,
    }

    shutdown.trigger();
    match tokio::time::timeout(grace, server_task).await {
        Ok(res) => res??,
        Err(_) => tracing::warn!(grace_secs = grace.as_secs(), "Drain deadline passed, exiting"),
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
