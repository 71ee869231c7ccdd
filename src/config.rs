//! Portal configuration
//!
//! An optional TOML file provides the base values; CLI arguments and
//! environment variables (via clap) override them.

use clap::Parser;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::info;

/// E-Doc Transfer - demo document-transfer portal
#[derive(Parser, Debug, Clone)]
#[command(name = "edoc-transfer")]
#[command(about = "Demo document-transfer portal")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "EDOC_CONFIG", default_value = "edoc-transfer.toml")]
    pub config: String,

    /// Address to listen on (overrides config file)
    #[arg(long, env = "EDOC_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// One-time code issued by every OTP step (overrides config file)
    #[arg(long, env = "EDOC_DEMO_OTP")]
    pub demo_otp: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen address
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session id
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Idle time before a session is discarded
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DemoConfig {
    /// Code accepted by the phone and aadhaar OTP steps
    #[serde(default = "default_otp")]
    pub otp: String,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// Defaults
fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}
fn default_cookie_name() -> String {
    "edoc_session".to_string()
}
fn default_session_ttl() -> u64 {
    3600
}
fn default_otp() -> String {
    "123456".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            ttl_secs: default_session_ttl(),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self { otp: default_otp() }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults when the file is absent
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply CLI overrides
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(listen) = args.listen {
            self.server.listen = listen;
        }
        if let Some(otp) = &args.demo_otp {
            self.demo.otp = otp.clone();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let cookie = &self.session.cookie_name;
        if cookie.is_empty()
            || !cookie
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return Err(ConfigError::Invalid(format!(
                "session.cookie_name must be a non-empty token, got {:?}",
                cookie
            )));
        }
        if self.session.ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "session.ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.demo.otp.is_empty() || !self.demo.otp.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConfigError::Invalid(
                "demo.otp must be a non-empty string of digits".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Built directly so EDOC_* variables in the environment cannot leak in
    fn args(listen: Option<&str>, demo_otp: Option<&str>) -> Args {
        Args {
            config: "edoc-transfer.toml".to_string(),
            listen: listen.map(|addr| addr.parse().unwrap()),
            demo_otp: demo_otp.map(str::to_string),
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut config = Config::from_toml("[demo]\notp = \"111111\"\n").unwrap();
        config.apply_args(&args(Some("127.0.0.1:9000"), Some("222222")));

        assert_eq!(config.server.listen, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.demo.otp, "222222");
    }

    #[test]
    fn test_missing_overrides_keep_file_values() {
        let mut config = Config::from_toml("[demo]\notp = \"111111\"\n").unwrap();
        config.apply_args(&args(None, None));

        assert_eq!(config.demo.otp, "111111");
        assert_eq!(config.server.listen, default_listen());
    }

    #[test]
    fn test_cli_flags_parse() {
        let args = Args::try_parse_from([
            "edoc-transfer",
            "--config",
            "custom.toml",
            "--listen",
            "127.0.0.1:9000",
            "--demo-otp",
            "222222",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(args.config, "custom.toml");
        assert_eq!(args.listen, Some("127.0.0.1:9000".parse().unwrap()));
        assert_eq!(args.demo_otp.as_deref(), Some("222222"));
        assert_eq!(args.log_level, "debug");
    }
}
