//! TOML-based configuration for the banking client.
//!
//! Read from an explicit path (`--config`) or from the platform config file:
//! - Windows:  `%APPDATA%\BankClient\config.toml`
//! - Linux:    `~/.config/bankclient/config.toml`
//! - macOS:    `~/Library/Application Support/BankClient/config.toml`
//!
//! ```toml
//! [server]
//! host = "localhost"
//! port = 5000
//!
//! [invocation]
//! semantic = "at-least-once"   # maybe | at-least-once | at-most-once
//! timeout_ms = 1000
//! max_retries = -1             # negative = retry forever
//! receive_buffer_size = 1024
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Every field has a `#[serde(default = "...")]` helper, so a missing file, a
//! missing section or a missing key all fall back to the values above.

use std::net::ToSocketAddrs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::network::transport::{DEFAULT_RECEIVE_BUFFER_SIZE, DEFAULT_TIMEOUT};
use crate::infrastructure::network::{InvocationSemantic, Transport};

/// Error type for configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The values parsed but cannot be used.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub invocation: InvocationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the banking server listens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Delivery guarantee and retry policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvocationConfig {
    #[serde(default)]
    pub semantic: InvocationSemantic,
    /// Per-attempt read timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum number of send attempts.  Negative means unbounded.
    #[serde(default = "default_max_retries")]
    pub max_retries: i64,
    /// Size of the buffer each reply is read into, in bytes.
    #[serde(default = "default_receive_buffer_size")]
    pub receive_buffer_size: usize,
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` level or filter directive, used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_host() -> String {
    "localhost".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}
fn default_max_retries() -> i64 {
    -1
}
fn default_receive_buffer_size() -> usize {
    DEFAULT_RECEIVE_BUFFER_SIZE
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for InvocationConfig {
    fn default() -> Self {
        Self {
            semantic: InvocationSemantic::default(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            receive_buffer_size: default_receive_buffer_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ── Derived values ────────────────────────────────────────────────────────────

impl InvocationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The attempt limit, or `None` for unbounded (negative `max_retries`).
    /// Positive values beyond `u32::MAX` saturate.
    pub fn max_attempts(&self) -> Option<u32> {
        if self.max_retries < 0 {
            None
        } else {
            Some(u32::try_from(self.max_retries).unwrap_or(u32::MAX))
        }
    }

    /// Builds the transport these settings describe.
    pub fn transport(&self) -> Transport {
        Transport::new(self.semantic, self.timeout())
            .with_max_attempts(self.max_attempts())
            .with_receive_buffer_size(self.receive_buffer_size)
    }
}

impl ClientConfig {
    /// Checks that the values can actually be used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the server address does not
    /// resolve, or the timeout, attempt limit or buffer size is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.invocation.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout_ms must be greater than 0".into()));
        }
        if self.invocation.max_retries == 0 {
            return Err(ConfigError::Invalid(
                "max_retries must be positive, or negative for unbounded".into(),
            ));
        }
        if self.invocation.receive_buffer_size == 0 {
            return Err(ConfigError::Invalid(
                "receive_buffer_size must be greater than 0".into(),
            ));
        }
        let addr = (self.server.host.as_str(), self.server.port);
        let resolves = addr
            .to_socket_addrs()
            .map(|mut addrs| addrs.next().is_some())
            .unwrap_or(false);
        if !resolves {
            return Err(ConfigError::Invalid(format!(
                "server address {}:{} does not resolve",
                self.server.host, self.server.port
            )));
        }
        Ok(())
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the full path to the platform config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads the config from `path`, or from the platform config file when
/// `path` is `None`.
///
/// A missing file yields [`ClientConfig::default()`].  So does a missing
/// platform directory when no explicit path was given.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match config_file_path() {
            Ok(p) => p,
            Err(ConfigError::NoPlatformConfigDir) => return Ok(ClientConfig::default()),
            Err(e) => return Err(e),
        },
    };

    match std::fs::read_to_string(&path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientConfig::default()),
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &ClientConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config base directory, including the app folder.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("BankClient"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("bankclient"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("BankClient")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("bank_client_{tag}_{}_{nanos}", std::process::id()))
    }

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_defaults_match_documented_values() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.server.host, "localhost");
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.invocation.semantic, InvocationSemantic::AtLeastOnce);
        assert_eq!(cfg.invocation.timeout_ms, 1000);
        assert_eq!(cfg.invocation.max_retries, -1);
        assert_eq!(cfg.invocation.receive_buffer_size, 1024);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_negative_max_retries_means_unbounded() {
        let cfg = InvocationConfig::default();
        assert_eq!(cfg.max_attempts(), None);
        let bounded = InvocationConfig {
            max_retries: 5,
            ..Default::default()
        };
        assert_eq!(bounded.max_attempts(), Some(5));
    }

    #[test]
    fn test_huge_max_retries_saturates_instead_of_becoming_unbounded() {
        let cfg = InvocationConfig {
            max_retries: i64::from(u32::MAX) + 1,
            ..Default::default()
        };
        assert_eq!(cfg.max_attempts(), Some(u32::MAX));

        let cfg = InvocationConfig {
            max_retries: i64::MAX,
            ..Default::default()
        };
        assert_eq!(cfg.max_attempts(), Some(u32::MAX));
    }

    #[test]
    fn test_transport_reflects_invocation_settings() {
        let cfg = InvocationConfig {
            semantic: InvocationSemantic::Maybe,
            timeout_ms: 250,
            max_retries: 3,
            receive_buffer_size: 2048,
        };
        let transport = cfg.transport();
        assert_eq!(transport.semantic(), InvocationSemantic::Maybe);
        assert_eq!(transport.timeout(), Duration::from_millis(250));
        assert_eq!(transport.max_attempts(), Some(3));
    }

    // ── Parsing ───────────────────────────────────────────────────────────────

    #[test]
    fn test_empty_toml_uses_defaults() {
        let cfg: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, ClientConfig::default());
    }

    #[test]
    fn test_partial_invocation_section_overrides_only_given_keys() {
        // Arrange
        let text = r#"
            [invocation]
            semantic = "at-most-once"
            max_retries = 5
        "#;

        // Act
        let cfg: ClientConfig = toml::from_str(text).unwrap();

        // Assert
        assert_eq!(cfg.invocation.semantic, InvocationSemantic::AtMostOnce);
        assert_eq!(cfg.invocation.max_retries, 5);
        assert_eq!(cfg.invocation.timeout_ms, 1000);
        assert_eq!(cfg.server, ServerConfig::default());
    }

    #[test]
    fn test_unknown_semantic_is_a_parse_error() {
        let text = "[invocation]\nsemantic = \"exactly-once\"\n";
        assert!(toml::from_str::<ClientConfig>(text).is_err());
    }

    // ── Validation ────────────────────────────────────────────────────────────

    #[test]
    fn test_default_config_on_loopback_is_valid() {
        let mut cfg = ClientConfig::default();
        cfg.server.host = "127.0.0.1".into();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let mut cfg = ClientConfig::default();
        cfg.server.host = "127.0.0.1".into();
        cfg.invocation.timeout_ms = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_max_retries_is_invalid() {
        let mut cfg = ClientConfig::default();
        cfg.server.host = "127.0.0.1".into();
        cfg.invocation.max_retries = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_buffer_is_invalid() {
        let mut cfg = ClientConfig::default();
        cfg.server.host = "127.0.0.1".into();
        cfg.invocation.receive_buffer_size = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    // ── Load / save ───────────────────────────────────────────────────────────

    #[test]
    fn test_load_from_missing_explicit_path_returns_defaults() {
        let path = temp_dir("missing").join("config.toml");
        let cfg = load_config(Some(&path)).unwrap();
        assert_eq!(cfg, ClientConfig::default());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        // Arrange
        let dir = temp_dir("roundtrip");
        let path = dir.join("nested").join("config.toml");
        let mut cfg = ClientConfig::default();
        cfg.server.port = 6000;
        cfg.invocation.semantic = InvocationSemantic::Maybe;
        cfg.logging.level = "debug".into();

        // Act
        save_config(&cfg, &path).unwrap();
        let loaded = load_config(Some(&path)).unwrap();

        // Assert
        assert_eq!(loaded, cfg);

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let dir = temp_dir("malformed");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();

        let result = load_config(Some(&path));

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        if let Ok(path) = config_file_path() {
            assert!(path.ends_with("config.toml"));
        }
    }
}
