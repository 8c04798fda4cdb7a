//! Plugin runtime configuration.
//!
//! Loaded from a TOML file via [`ConfigLoader`](burnin::config::ConfigLoader)
//! or built programmatically with [`PluginConfig::new`]. The segment name is
//! deliberately not part of the file: the harness hands it to the plugin at
//! launch.
//!
//! ```toml
//! [shared]
//! log_level = "info"
//! service_name = "disk-burnin-01"
//!
//! [lifecycle]
//! delay_base_ms = 20
//! lock_timeout_ms = 5000
//! max_cycles = 0
//!
//! [labels]
//! write = "Write (MBytes):"
//! read = "Read (MBytes):"
//! verify = "Verify (MBytes):"
//! ```

use std::time::Duration;

use burnin::config::{ConfigError, SharedConfig};
use serde::{Deserialize, Serialize};

fn default_delay_base_ms() -> u64 {
    20
}

fn default_lock_timeout_ms() -> u64 {
    5000
}

fn default_write_label() -> String {
    "Write (MBytes):".to_string()
}

fn default_read_label() -> String {
    "Read (MBytes):".to_string()
}

fn default_verify_label() -> String {
    "Verify (MBytes):".to_string()
}

/// Timing and termination settings for the lifecycle controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Milliseconds of idle time per duty-cycle point below 100.
    ///
    /// The wait after each cycle is `(100 - duty_cycle) * delay_base_ms`.
    #[serde(default = "default_delay_base_ms")]
    pub delay_base_ms: u64,

    /// Milliseconds to wait for the region lock before giving up.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    /// Stop after this many completed cycles; `0` means run until told to
    /// stop.
    #[serde(default)]
    pub max_cycles: u32,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            delay_base_ms: default_delay_base_ms(),
            lock_timeout_ms: default_lock_timeout_ms(),
            max_cycles: 0,
        }
    }
}

impl LifecycleConfig {
    /// Lock acquisition timeout as a [`Duration`].
    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Idle time per duty-cycle point as a [`Duration`].
    pub const fn delay_base(&self) -> Duration {
        Duration::from_millis(self.delay_base_ms)
    }
}

/// Display labels published during interface initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Window title; defaults to the service name when absent.
    #[serde(default)]
    pub window_title: Option<String>,

    /// Label for the write-phase counter.
    #[serde(default = "default_write_label")]
    pub write: String,

    /// Label for the read-phase counter.
    #[serde(default = "default_read_label")]
    pub read: String,

    /// Label for the verify-phase counter.
    #[serde(default = "default_verify_label")]
    pub verify: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            window_title: None,
            write: default_write_label(),
            read: default_read_label(),
            verify: default_verify_label(),
        }
    }
}

/// Complete plugin configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Fields common to every plugin binary.
    pub shared: SharedConfig,

    /// Lifecycle timing and termination.
    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    /// Display labels.
    #[serde(default)]
    pub labels: LabelConfig,
}

impl PluginConfig {
    /// Configuration with defaults for everything but the service name.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            shared: SharedConfig {
                log_level: Default::default(),
                service_name: service_name.into(),
            },
            lifecycle: LifecycleConfig::default(),
            labels: LabelConfig::default(),
        }
    }

    /// Window title to publish, falling back to the service name.
    pub fn window_title(&self) -> &str {
        self.labels
            .window_title
            .as_deref()
            .unwrap_or(&self.shared.service_name)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - the shared section fails validation
    /// - `lock_timeout_ms` is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        if self.lifecycle.lock_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "lock_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burnin::config::LogLevel;

    #[test]
    fn minimal_toml_fills_defaults() {
        let config: PluginConfig = toml::from_str(
            r#"[shared]
service_name = "disk-burnin-01"
"#,
        )
        .unwrap();
        assert_eq!(config.shared.log_level, LogLevel::Info);
        assert_eq!(config.lifecycle.delay_base_ms, 20);
        assert_eq!(config.lifecycle.lock_timeout_ms, 5000);
        assert_eq!(config.lifecycle.max_cycles, 0);
        assert_eq!(config.labels.write, "Write (MBytes):");
        assert_eq!(config.labels.verify, "Verify (MBytes):");
        assert_eq!(config.window_title(), "disk-burnin-01");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn full_toml_overrides_everything() {
        let config: PluginConfig = toml::from_str(
            r#"[shared]
log_level = "debug"
service_name = "ssd-stress"

[lifecycle]
delay_base_ms = 5
lock_timeout_ms = 1000
max_cycles = 50

[labels]
window_title = "SSD Stress Test"
write = "Blocks written:"
read = "Blocks read:"
verify = "Blocks verified:"
"#,
        )
        .unwrap();
        assert_eq!(config.lifecycle.max_cycles, 50);
        assert_eq!(config.lifecycle.lock_timeout(), Duration::from_millis(1000));
        assert_eq!(config.lifecycle.delay_base(), Duration::from_millis(5));
        assert_eq!(config.window_title(), "SSD Stress Test");
        assert_eq!(config.labels.read, "Blocks read:");
    }

    #[test]
    fn load_reads_a_toml_file() {
        use std::io::Write;

        use burnin::config::ConfigLoader;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[shared]
log_level = "warn"
service_name = "disk-burnin-01"

[lifecycle]
max_cycles = 10
"#
        )
        .unwrap();

        let config = PluginConfig::load(file.path()).unwrap();
        assert_eq!(config.shared.log_level, LogLevel::Warn);
        assert_eq!(config.lifecycle.max_cycles, 10);

        assert!(matches!(
            PluginConfig::load(std::path::Path::new("/nonexistent/burnin.toml")),
            Err(ConfigError::FileNotFound)
        ));
    }

    #[test]
    fn zero_lock_timeout_is_rejected() {
        let mut config = PluginConfig::new("disk-burnin-01");
        config.lifecycle.lock_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("lock_timeout_ms"), "got: {err}");
    }

    #[test]
    fn empty_service_name_is_rejected() {
        let config = PluginConfig::new("");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
