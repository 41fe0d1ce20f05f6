use std::env;
use std::path::PathBuf;

/// Environment variable that points at the configuration file
pub const CONFIG_PATH_ENV: &str = "CHAT_INSIGHTS_CONFIG";

/// Configuration file looked up in the working directory when nothing else is given
pub const DEFAULT_CONFIG_FILENAME: &str = "chat-insights.toml";

/// Resolve the configuration file path.
///
/// An explicit path wins, then `$CHAT_INSIGHTS_CONFIG`, then `./chat-insights.toml`.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| env::var_os(CONFIG_PATH_ENV).filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILENAME))
}
