//! Named server profiles and connection resolution

pub mod file;
pub mod profile;

pub use self::file::{config_file_path, load_config, save_config};
pub use self::profile::{Config, Profile};

use anyhow::{Context, Result};
use ostrichdb_client::{OstrichDBHttpClient, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
use std::time::Duration;
use url::Url;

/// Where requests go, resolved from flags, environment and profiles
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConnection {
    pub host: Url,
    pub timeout: Duration,
    /// Profile the host came from, if any
    pub profile: Option<String>,
}

impl ResolvedConnection {
    pub fn client(&self) -> Result<OstrichDBHttpClient> {
        OstrichDBHttpClient::with_timeout(self.host.clone(), self.timeout)
            .with_context(|| format!("Failed to create client for {}", self.host))
    }
}

/// Resolve the connection against the config file on disk.
pub fn resolve_connection(
    cli_host: Option<&str>,
    profile_name: Option<&str>,
) -> Result<ResolvedConnection> {
    resolve_connection_with(&load_config()?, cli_host, profile_name)
}

/// Priority: `--host` / `OSTRICHDB_HOST` > `--profile` > active profile >
/// `http://localhost:8042`. A named profile that does not exist is an error;
/// a missing active profile is not.
pub fn resolve_connection_with(
    config: &Config,
    cli_host: Option<&str>,
    profile_name: Option<&str>,
) -> Result<ResolvedConnection> {
    let named = match profile_name {
        Some(name) => Some((
            name.to_string(),
            config.get_profile(name).with_context(|| {
                format!(
                    "Profile '{}' not found. Use 'ost profile list' to see available profiles.",
                    name
                )
            })?,
        )),
        None => config
            .get_active_profile()
            .map(|p| (config.settings.active_profile.clone(), p)),
    };

    let timeout = named
        .as_ref()
        .and_then(|(_, p)| p.timeout_secs)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);

    let (host, profile) = match (cli_host, named) {
        (Some(host), _) => (host.to_string(), None),
        (None, Some((name, p))) => (p.host.clone(), Some(name)),
        (None, None) => (DEFAULT_ENDPOINT.to_string(), None),
    };

    let host = Url::parse(&host).with_context(|| format!("Invalid host URL: {}", host))?;
    Ok(ResolvedConnection {
        host,
        timeout,
        profile,
    })
}
