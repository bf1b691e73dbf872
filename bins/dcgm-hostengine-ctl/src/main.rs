use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{error, info};

use dcgm_lifecycle::{LifecycleConfig, LifecycleManager, Mode, StandaloneConfig};

/// DCGM host engine lifecycle control
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path (YAML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Session mode: embedded, standalone or managed-child (overrides config)
    #[arg(short, long)]
    mode: Option<Mode>,

    /// Host engine address for standalone mode (overrides config)
    #[arg(short, long)]
    address: Option<String>,

    /// Treat the standalone address as a unix socket path
    #[arg(long)]
    unix_socket: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Run duration in seconds (for testing)
    #[arg(long)]
    run_duration: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = build_config(&args)?;

    let level = if args.debug {
        "debug"
    } else {
        config.log_level.as_str()
    };
    initialize_logging(level)?;

    info!("Starting DCGM host engine control {}", dcgm_lifecycle::VERSION);
    info!("Mode: {}, library: {}", config.mode, config.library.name);

    let mode = config.mode;
    let startup_args = config.startup_args();
    let manager = LifecycleManager::new(config.to_options());

    let session = tokio::task::spawn_blocking(move || manager.initialize(mode, startup_args.as_slice()))
        .await
        .context("Initialization task panicked")?;

    let session = match session {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to initialize {} session: {}", mode, e);
            return Err(anyhow!("Start failed: {}", e));
        }
    };
    info!("Session started (handle {})", session.handle());
    if let Some(child) = session.child() {
        info!(
            "Host engine child (PID: {}) listening on {}",
            child.pid(),
            child.socket_path().display()
        );
    }

    if let Some(duration) = args.run_duration {
        info!("Running for {} seconds (test mode)", duration);
        tokio::time::sleep(tokio::time::Duration::from_secs(duration)).await;
    } else if let Err(e) = wait_for_shutdown_signal().await {
        error!("{:#}", e);
    }

    info!("Shutting down session...");
    tokio::task::spawn_blocking(move || session.shutdown())
        .await
        .context("Shutdown task panicked")?
        .map_err(|e| anyhow!("Shutdown failed: {}", e))?;
    info!("Session shut down successfully");

    Ok(())
}

/// Config file if given, otherwise defaults; command line flags win.
fn build_config(args: &Args) -> Result<LifecycleConfig> {
    let mut config = match (&args.config, args.mode) {
        (Some(path), _) => LifecycleConfig::load_from_file(path)?,
        (None, Some(mode)) => LifecycleConfig::for_mode(mode),
        (None, None) => return Err(anyhow!("Either --config or --mode is required")),
    };

    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if let Some(address) = &args.address {
        config.standalone = Some(StandaloneConfig {
            address: address.clone(),
            address_is_unix_socket: u32::from(args.unix_socket),
        });
    }

    config.validate()?;
    Ok(config)
}

fn initialize_logging(level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .with_thread_ids(true)
        .init();

    Ok(())
}

async fn wait_for_shutdown_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;

    tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM signal");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT signal");
        }
    }
    Ok(())
}
