//! Resolved configuration (§10.4): a config file at
//! `~/.config/mcp-agent-inspector/config.toml`, overridden by environment
//! variables, following the teacher's `Config::default_path` /
//! `Config::load` early-return-default pattern.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub port: u16,
    pub traces_dir: PathBuf,
    pub bind_address: IpAddr,
    pub external_workflow_url: Option<String>,
    /// Reserved for a legacy fallback path; parsed and stored but never
    /// read by any code in this crate.
    pub enable_patch: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: inspector_gateway::DEFAULT_PORT,
            traces_dir: inspector_export::default_traces_dir(),
            bind_address: IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
            external_workflow_url: None,
            enable_patch: false,
        }
    }
}

impl Config {
    /// `~/.config/mcp-agent-inspector/config.toml`. Returns `None` if the
    /// platform has no config directory (falls back to defaults).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mcp-agent-inspector").join("config.toml"))
    }

    /// Load from `path` if it exists, else fall back to defaults; then
    /// layer environment-variable overrides on top. A present-but-invalid
    /// file is an error — a missing one is not.
    pub fn load(path: Option<&std::path::Path>) -> anyhow::Result<Self> {
        let owned_path = path.map(PathBuf::from).or_else(Self::default_path);
        let mut config = match owned_path {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(&path)?;
                toml::from_str(&contents)?
            }
            _ => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("INSPECTOR_PORT") {
            if let Ok(port) = port.parse() {
                self.port = port;
            } else {
                tracing::warn!(value = %port, "ignoring unparseable INSPECTOR_PORT");
            }
        }
        if let Ok(traces_dir) = std::env::var("TRACES_DIR") {
            self.traces_dir = PathBuf::from(traces_dir);
        }
        if std::env::var("INSPECTOR_ENABLE_PATCH").is_ok() {
            self.enable_patch = true;
        }
    }
}

/// Whether `INSPECTOR_DEBUG` is set to a non-empty value (§10.2); purely a
/// logging-verbosity switch, not part of the persisted [`Config`].
pub fn debug_logging_requested() -> bool {
    std::env::var("INSPECTOR_DEBUG").map(|v| !v.is_empty()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load(Some(std::path::Path::new("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.port, inspector_gateway::DEFAULT_PORT);
    }

    #[test]
    fn env_var_overrides_port() {
        std::env::set_var("INSPECTOR_PORT", "9999");
        let config = Config::load(Some(std::path::Path::new("/nonexistent/config.toml"))).unwrap();
        std::env::remove_var("INSPECTOR_PORT");
        assert_eq!(config.port, 9999);
    }

    #[test]
    fn file_contents_parse_and_apply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "port = 8123\ntraces_dir = \"/tmp/traces\"\nbind_address = \"127.0.0.1\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.port, 8123);
        assert_eq!(config.traces_dir, PathBuf::from("/tmp/traces"));
    }
}
