//! Overlay Window
//!
//! Maps a translucent overlay window and exits once the window manager
//! sends `WM_DELETE_WINDOW`.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use overlay_window::{Config, OverlayClient};

/// Command line options
#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    display: Option<String>,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut parsed = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    parsed.config = Some(args.next().context("--config needs a path")?.into());
                }
                "--display" | "-d" => {
                    parsed.display = Some(args.next().context("--display needs a target")?);
                }
                other => anyhow::bail!("Unknown argument: {}", other),
            }
        }
        Ok(parsed)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "overlay_window=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Overlay Window");

    let args = Args::parse(std::env::args().skip(1))?;

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().context("Failed to load configuration")?,
    };

    let target = config.display_target(args.display.as_deref(), std::env::var("DISPLAY").ok());
    let mut client = OverlayClient::connect(&target).context("Failed to connect to X server")?;
    client
        .setup_window(&config.window)
        .context("Failed to set up overlay window")?;

    // The worker takes the connection; nothing else touches it until join
    let consumed = tokio::task::spawn_blocking(move || client.run_until_close_requested())
        .await
        .context("Close-wait worker panicked")?
        .context("Lost the X server while waiting for close")?;

    info!("Overlay closed after {} events", consumed);
    Ok(())
}
