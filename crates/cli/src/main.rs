use std::{path::PathBuf, sync::Arc, time::Duration};

use {
    clap::Parser,
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    warelay_config::RelayConfig,
    warelay_filter::ContactFilter,
    warelay_gateway::Pipeline,
    warelay_responder::ResponderClient,
    warelay_transport::connect_with_retry,
};

#[derive(Parser)]
#[command(name = "warelay", about = "WhatsApp relay to a remote response service")]
struct Cli {
    /// Explicit config file (otherwise `./warelay.toml`, then the user
    /// config dir, then defaults).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,

    /// Sidecar WebSocket endpoint (overrides config value).
    #[arg(long)]
    sidecar_url: Option<String>,

    /// Response service base URL (overrides config value).
    #[arg(long)]
    responder_url: Option<String>,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<RelayConfig> {
    let mut config = match &cli.config {
        Some(path) => warelay_config::load_config(path)?,
        None => warelay_config::discover_and_load(),
    };
    if let Some(url) = &cli.sidecar_url {
        config.transport.sidecar_url = url.clone();
    }
    if let Some(url) = &cli.responder_url {
        config.responder.base_url = url.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "warelay starting");

    let config = load_config(&cli)?;

    let filter = ContactFilter::new(&config.filter.included_only, &config.filter.excluded);
    info!(
        included_only = ?filter.included_only(),
        excluded = ?filter.excluded(),
        "contact filter configured"
    );

    let responder = ResponderClient::new(
        &config.responder.base_url,
        Duration::from_secs(config.responder.timeout_secs),
    )?;
    match responder.health().await {
        Ok(()) => info!(url = responder.base_url(), "response service reachable"),
        Err(e) => warn!(
            url = responder.base_url(),
            error = %e,
            "response service health check failed, continuing anyway"
        ),
    }

    let (handle, events) = connect_with_retry(
        &config.transport.sidecar_url,
        config.transport.connect_attempts,
    )
    .await?;
    info!(url = %config.transport.sidecar_url, "sidecar link established");

    let pipeline = Pipeline::new(
        filter,
        responder,
        Arc::new(handle.clone()),
        config.timing.clone(),
    );

    tokio::select! {
        () = pipeline.run(events) => {
            info!("sidecar link closed, exiting");
        },
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("interrupt received, shutting down");
            handle.shutdown();
        },
    }

    Ok(())
}
