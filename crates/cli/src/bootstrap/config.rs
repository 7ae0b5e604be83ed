use ferrous_dnsmasq_domain::{CliOverrides, Config};
use tracing::info;

pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;
    Ok(config)
}

/// Logged once the subscriber is installed, since logging itself is
/// configured from the loaded file.
pub fn log_config(config_path: Option<&str>, config: &Config) {
    info!(
        config_file = config_path.unwrap_or("default"),
        pipe = %config.log_watch.pipe_path,
        query_timeout_ms = config.log_watch.query_timeout_ms,
        buffer_capacity = config.log_watch.buffer_capacity,
        leases = config.leases.enabled,
        lease_file = %config.leases.path,
        format = config.output.format.as_str(),
        "Configuration loaded"
    );
}
