use super::AppContext;
use crate::output::Output;
use color_eyre::Result;
use shelf_config::PathManager;
use shelf_relay::RelayState;
use std::path::PathBuf;
use tracing::info;

/// `--log-file` without a value logs to the default relay log location.
pub fn log_file_or_default(path: Option<PathBuf>) -> PathBuf {
    path.unwrap_or_else(|| PathManager::default().relay_log_file())
}

pub async fn run_serve(address: Option<String>, port: Option<u16>, output: &Output) -> Result<()> {
    let mut ctx = AppContext::load()?;
    if let Some(address) = address {
        ctx.config.server.address = address;
    }
    if let Some(port) = port {
        ctx.config.server.port = port;
    }

    let server = ctx.config.server.clone();
    let state = RelayState::from_config(&ctx.config, ctx.transport.clone());

    output.info(format!(
        "Relay listening on http://{}:{}/api/rss?username=<name>",
        server.address, server.port
    ));
    info!(
        address = %server.address,
        port = server.port,
        cache_max_age_secs = server.cache_max_age_secs,
        "Starting feed relay"
    );

    shelf_relay::build(&server, state)
        .launch()
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Relay server failed: {}", e))?;

    info!("Feed relay stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_log_file_is_kept() {
        let path = PathBuf::from("/tmp/relay.log");
        assert_eq!(log_file_or_default(Some(path.clone())), path);
        assert!(log_file_or_default(None).ends_with("cataboxd-relay.log"));
    }
}
