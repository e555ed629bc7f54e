use std::path::{Path, PathBuf};

use {tracing::{debug, warn}, warelay_filter::admission::parse_contact_list};

use crate::schema::RelayConfig;

/// Config file name, probed project-locally and in the user config dir.
const CONFIG_FILENAME: &str = "warelay.toml";

/// Load config from an explicit path.
pub fn load_config(path: &Path) -> anyhow::Result<RelayConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let config = toml::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))?;
    Ok(apply_env_overrides(config))
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./warelay.toml` (project-local)
/// 2. `~/.config/warelay/warelay.toml` (user-global)
///
/// Falls back to defaults when no file is found or it fails to parse; the
/// environment overrides apply either way.
#[must_use]
pub fn discover_and_load() -> RelayConfig {
    let config = match find_config_file() {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            match std::fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|raw| Ok(toml::from_str(&raw)?))
            {
                Ok(cfg) => cfg,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
                    RelayConfig::default()
                },
            }
        },
        None => {
            debug!("no config file found, using defaults");
            RelayConfig::default()
        },
    };
    apply_env_overrides(config)
}

fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.exists() {
        return Some(local);
    }

    if let Some(dirs) = directories::ProjectDirs::from("", "", "warelay") {
        let global = dirs.config_dir().join(CONFIG_FILENAME);
        if global.exists() {
            return Some(global);
        }
    }

    None
}

/// Apply the environment variables the deployment historically used. Set
/// variables replace the file values wholesale (an empty string clears the
/// corresponding list).
fn apply_env_overrides(config: RelayConfig) -> RelayConfig {
    apply_overrides(config, |key| std::env::var(key).ok())
}

fn apply_overrides<F>(mut config: RelayConfig, lookup: F) -> RelayConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup("INCLUDED_ONLY") {
        config.filter.included_only = parse_contact_list(&raw);
    }
    if let Some(raw) = lookup("EXCLUDED") {
        config.filter.excluded = parse_contact_list(&raw);
    }
    if let Some(url) = lookup("RESPONDER_URL") {
        if !url.is_empty() {
            config.responder.base_url = url;
        }
    }
    if let Some(url) = lookup("WARELAY_SIDECAR_URL") {
        if !url.is_empty() {
            config.transport.sidecar_url = url;
        }
    }
    config
}
