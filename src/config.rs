use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub sources: SourcesConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Seconds to wait for `systemd-inhibit` before giving up on it.
    pub command_timeout_secs: u64,
    /// Color theme for text output: default, dracula, gruvbox, nord
    pub theme: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Program used to list inhibitor locks.
    pub systemd_inhibit:    String,
    pub acpi_wakeup_path:   PathBuf,
    pub sysfs_root:         PathBuf,
    /// Walk /sys/devices for devices with power/wakeup = enabled.
    pub scan_sysfs_devices: bool,
}

// ── Defaults ─────────────────────────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { command_timeout_secs: 5, theme: "default".into() }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            systemd_inhibit:    "systemd-inhibit".into(),
            acpi_wakeup_path:   PathBuf::from("/proc/acpi/wakeup"),
            sysfs_root:         PathBuf::from("/sys"),
            scan_sysfs_devices: true,
        }
    }
}

// ── Load ──────────────────────────────────────────────────────────────

impl Config {
    /// Load the config file, falling back to defaults. Never writes anything.
    pub fn load() -> Self {
        let Some(path) = Config::config_path() else { return Config::default() };
        if !path.exists() {
            return Config::default();
        }
        match try_load(&path) {
            Ok(c)  => c,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                Config::default()
            }
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sleepwhy").join("sleepwhy.toml"))
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.general.command_timeout_secs.max(1))
    }
}

fn try_load(path: &std::path::Path) -> Result<Config> {
    let text = fs::read_to_string(path)?;
    parse(&text)
}

fn parse(text: &str) -> Result<Config> {
    Ok(toml::from_str(text)?)
}
