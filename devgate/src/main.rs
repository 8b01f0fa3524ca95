mod args;

use args::Args;
use clap::Parser;
use devgate_server::Server;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = args.load_config()?;

    let _telemetry_guard = devgate_telemetry::init(config.telemetry.as_ref(), &args.log_level)?;

    let source = args
        .config
        .as_ref()
        .map_or_else(|| "built-in".to_string(), |path| path.display().to_string());
    let contexts: Vec<&str> = config.server.proxy.keys().map(String::as_str).collect();
    tracing::info!(
        config = %source,
        root = %config.server.root.display(),
        proxies = ?contexts,
        "starting devgate"
    );

    let server = Server::new(config)?;

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.cancel();
        }
    });

    server.serve(shutdown).await?;

    tracing::info!("devgate stopped");
    Ok(())
}

/// Resolve on Ctrl+C, or on `SIGTERM` where available
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
