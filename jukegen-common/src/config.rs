//! Configuration loading and server URL resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Fallback when nothing else names the backend
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8001";

/// Environment variable consulted when no CLI override is given
pub const SERVER_URL_ENV: &str = "JUKEGEN_SERVER_URL";

/// Server URL resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. Compiled default (local loopback)
///
/// The returned URL never carries a trailing slash, so audio paths returned
/// by the backend (which start with `/`) can be appended directly.
pub fn resolve_server_url(cli_arg: Option<&str>) -> String {
    // Priority 1: Command-line argument
    if let Some(url) = cli_arg {
        if !url.trim().is_empty() {
            return normalize(url);
        }
    }

    // Priority 2: Environment variable
    if let Ok(url) = std::env::var(SERVER_URL_ENV) {
        if !url.trim().is_empty() {
            tracing::debug!("Server URL from {}", SERVER_URL_ENV);
            return normalize(&url);
        }
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = find_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(url) = config.get("server_url").and_then(|v| v.as_str()) {
                    tracing::debug!("Server URL from {}", config_path.display());
                    return normalize(url);
                }
            }
        }
    }

    // Priority 4: Compiled default
    DEFAULT_SERVER_URL.to_string()
}

fn normalize(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Locate the configuration file for the platform
fn find_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/jukegen/config.toml first, then /etc/jukegen/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("jukegen").join("config.toml"));
        let system_config = PathBuf::from("/etc/jukegen/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    }

    let path = dirs::config_dir()
        .map(|d| d.join("jukegen").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if path.exists() {
        Ok(path)
    } else {
        Err(Error::Config(format!("Config file not found: {:?}", path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_argument_takes_priority() {
        let url = resolve_server_url(Some("http://music-box:9000"));
        assert_eq!(url, "http://music-box:9000");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let url = resolve_server_url(Some("http://music-box:9000/"));
        assert_eq!(url, "http://music-box:9000");
    }

    #[test]
    fn blank_cli_argument_is_ignored() {
        // Falls through to env/config/default; the default is the loopback
        // address unless the environment overrides it in the test run.
        let url = resolve_server_url(Some("   "));
        assert!(!url.is_empty());
        assert!(!url.ends_with('/'));
    }
}
