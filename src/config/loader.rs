//! Layered configuration loading with figment.
//!
//! Merge order, later wins:
//! 1. Compiled defaults
//! 2. The TOML file, when it exists
//! 3. `CHAT_INSIGHTS_*` environment variables (`CHAT_INSIGHTS_FRAGMENT_SIZE=300`)

use std::path::Path;

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use tracing::debug;

use super::Config;
use crate::utils::environment::CONFIG_PATH_ENV;

const ENV_PREFIX: &str = "CHAT_INSIGHTS_";

/// Environment overrides; the variable naming the config file itself is not a key
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).ignore(&[CONFIG_PATH_ENV.trim_start_matches(ENV_PREFIX)])
}

fn extract(figment: Figment, origin: &str) -> Result<Config> {
    let mut config: Config =
        figment.extract().with_context(|| format!("Failed to load configuration from {}", origin))?;
    config.expand_paths();
    config.validate().with_context(|| format!("Invalid configuration in {}", origin))?;
    Ok(config)
}

/// Load from `path` with environment overrides. A missing file leaves the defaults in place,
/// so the required keys must then come from the environment.
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    if path.exists() {
        debug!("Loading configuration from {}", path.display());
    } else {
        debug!("No configuration file at {}, using defaults and environment", path.display());
    }
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(env_provider());
    extract(figment, &path.display().to_string())
}

/// Load from the resolved config path (explicit, `$CHAT_INSIGHTS_CONFIG`, or the working
/// directory default)
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = crate::utils::resolve_config_path(explicit.map(Path::to_path_buf));
    load_config_from_path(&path)
}

/// Load from TOML text only, without environment overrides
pub fn load_config_from_str(toml_content: &str) -> Result<Config> {
    let figment =
        Figment::new().merge(Serialized::defaults(Config::default())).merge(Toml::string(toml_content));
    extract(figment, "inline TOML")
}
