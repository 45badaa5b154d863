use anyhow::Result;
use hestia::addon::Addon;
use hestia::browser::ChromeLauncher;
use hestia::hass::HassClient;
use hestia::panel::PanelSession;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = hestia::Config::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    hestia::logging::init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Logging init failed: {}", e))?;

    info!("Hestia {} starting up", env!("APP_VERSION"));

    let launcher = ChromeLauncher::new(
        &config.panel.exec_path,
        Duration::from_millis(config.timeouts.poll_millis),
    );
    let panel = PanelSession::new(&config.panel, &config.timeouts, Box::new(launcher));
    let publisher =
        HassClient::new(&config.hass).map_err(|e| anyhow::anyhow!("Publisher init failed: {}", e))?;

    let mut addon = Addon::new(&config, panel, Box::new(publisher));

    addon
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Addon error: {}", e))?;

    info!("Shutdown complete");
    Ok(())
}
