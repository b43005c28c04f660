//! Monitor configuration: tracker address and polling cadences.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// All timing constants, in milliseconds.
///
/// The defaults mirror what the tracker's own status page uses; override
/// them through the config file only if the device firmware changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Cadence of the main status fetch.
    pub status_poll_ms: u64,
    /// Cadence of the download-list fetch.
    pub download_poll_ms: u64,
    /// Cadence of the reachability probe.
    pub connectivity_poll_ms: u64,
    /// How long a pressed control stays highlighted.
    pub button_feedback_ms: u64,
    /// Unconditional restore delay for a submitted control.
    pub form_reset_ms: u64,
    /// How long a notification stays fully visible.
    pub notification_visible_ms: u64,
    /// Exit-animation window before a notification is dropped.
    pub notification_exit_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            status_poll_ms: 2000,
            download_poll_ms: 10_000,
            connectivity_poll_ms: 1000,
            button_feedback_ms: 150,
            form_reset_ms: 3000,
            notification_visible_ms: 3000,
            notification_exit_ms: 300,
        }
    }
}

impl Timings {
    #[must_use]
    pub const fn status_poll(&self) -> Duration {
        Duration::from_millis(self.status_poll_ms)
    }

    #[must_use]
    pub const fn download_poll(&self) -> Duration {
        Duration::from_millis(self.download_poll_ms)
    }

    #[must_use]
    pub const fn connectivity_poll(&self) -> Duration {
        Duration::from_millis(self.connectivity_poll_ms)
    }

    #[must_use]
    pub const fn button_feedback(&self) -> Duration {
        Duration::from_millis(self.button_feedback_ms)
    }

    #[must_use]
    pub const fn form_reset(&self) -> Duration {
        Duration::from_millis(self.form_reset_ms)
    }

    #[must_use]
    pub const fn notification_visible(&self) -> Duration {
        Duration::from_millis(self.notification_visible_ms)
    }

    /// Full notification lifetime: visible window plus exit window.
    #[must_use]
    pub const fn notification_total(&self) -> Duration {
        Duration::from_millis(self.notification_visible_ms + self.notification_exit_ms)
    }
}

/// Complete monitor configuration, persisted as TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Base URL of the tracker, e.g. `http://192.168.4.1`.
    pub base_url: String,
    /// Polling and UI timing constants.
    pub timings: Timings,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            // ESP8266 soft-AP default address
            base_url: "http://192.168.4.1".to_string(),
            timings: Timings::default(),
        }
    }
}

impl MonitorConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tracker base URL, trimming any trailing slash.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Returns the default config file location.
    ///
    /// Uses `$XDG_CONFIG_HOME/gpsmon/config.toml` (or the platform
    /// equivalent), falling back to the working directory.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gpsmon")
            .join("config.toml")
    }

    /// Loads the config from `path`, writing a default template first if
    /// the file does not exist yet.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or written, or if its
    /// contents are not valid TOML.
    pub fn load_or_create(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&raw)?)
        } else {
            let config = Self::default();
            config.save(path)?;
            log::info!("Wrote default config to {}", path.display());
            Ok(config)
        }
    }

    /// Saves the config to disk atomically (write tmp + rename).
    ///
    /// # Errors
    /// Returns an error if the parent directory cannot be created or the
    /// file cannot be written.
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self).unwrap_or_default();
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, raw)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_timings_match_tracker_page() {
        let t = Timings::default();
        assert_eq!(t.status_poll_ms, 2000);
        assert_eq!(t.download_poll_ms, 10_000);
        assert_eq!(t.connectivity_poll_ms, 1000);
        assert_eq!(t.button_feedback_ms, 150);
        assert_eq!(t.form_reset_ms, 3000);
        assert_eq!(t.notification_visible_ms, 3000);
        assert_eq!(t.notification_exit_ms, 300);
    }

    #[test]
    fn notification_total_includes_exit_window() {
        let t = Timings::default();
        assert_eq!(t.notification_total(), Duration::from_millis(3300));
    }

    #[test]
    fn config_serializes_to_toml() {
        let config = MonitorConfig::default();
        let raw = toml::to_string(&config).unwrap();
        let back: MonitorConfig = toml::from_str(&raw).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: MonitorConfig = toml::from_str("base_url = \"http://10.0.0.9\"").unwrap();
        assert_eq!(config.base_url, "http://10.0.0.9");
        assert_eq!(config.timings, Timings::default());
    }

    #[test]
    fn with_base_url_trims_trailing_slash() {
        let config = MonitorConfig::new().with_base_url("http://10.0.0.9/");
        assert_eq!(config.base_url, "http://10.0.0.9");
    }

    #[test]
    fn load_or_create_writes_template() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let config = MonitorConfig::load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config, MonitorConfig::default());

        // Second load reads the file back
        let again = MonitorConfig::load_or_create(&path).unwrap();
        assert_eq!(again, config);
    }

    #[test]
    fn load_rejects_bad_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();

        assert!(MonitorConfig::load_or_create(&path).is_err());
    }
}
