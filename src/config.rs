//! Configuration options

use crate::{
    reconcile::Settings,
    utils::{deserialize_absolute_path, deserialize_shellexpand},
};
use anyhow::{Context, Result};
use colored::Colorize;
use directories::ProjectDirs;
use format_serde_error::SerdeError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{
    env,
    fs,
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

/// Configuration file name
const CONFIG_FILE: &str = "bspmon.yml";

/// Desktop names handed out to monitors, the primary gets the first
const DESKTOP_LAYOUTS: &[&[&str]] = &[
    &["1", "2", "3", "4", "5", "6", "7"],
    &["I", "II", "II", "IV"],
    // Third screen, more rare
    &["a", "b", "c", "d"],
    // Fourth screen, extremely rare
    &["A", "B", "C", "D"],
    &["一", "二", "三", "四", "語"],
];

// =============== GlobalSettings ================= [[[

/// Global configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct GlobalSettings {
    /// The `bspc` binary to run
    #[serde(deserialize_with = "deserialize_absolute_path")]
    pub(crate) bspc: Option<PathBuf>,

    /// Whether logs should be written to a file
    #[serde(alias = "log-to-file")]
    pub(crate) log_to_file: bool,

    /// The directory to write the log to
    #[serde(alias = "log-dir", deserialize_with = "deserialize_shellexpand")]
    pub(crate) log_dir: Option<PathBuf>,

    /// Top padding of the primary monitor, room for the status bar
    #[serde(alias = "primary-padding")]
    pub(crate) primary_padding: u32,

    /// Names of the desktops for each monitor. The first list is for the
    /// primary monitor. More monitors than lists is an error
    #[serde(alias = "desktop-layouts")]
    pub(crate) desktop_layouts: Vec<Vec<String>>,

    /// Milliseconds to wait after a hotplug before looking at the outputs
    #[serde(alias = "settle-delay")]
    pub(crate) settle_delay: u64,

    /// Milliseconds between polls for a primary output
    #[serde(alias = "primary-poll-interval")]
    pub(crate) primary_poll_interval: u64,
} // ]]] === Global Settings ===

impl GlobalSettings {
    /// What the [`Reconciler`](crate::reconcile::Reconciler) should set up
    pub(crate) fn reconcile_settings(&self) -> Settings {
        Settings {
            primary_padding: self.primary_padding,
            desktop_layouts: self.desktop_layouts.clone(),
        }
    }

    /// Delay between a hotplug and the following pass
    pub(crate) const fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay)
    }

    /// Delay between polls for a primary output
    pub(crate) const fn primary_poll_interval(&self) -> Duration {
        Duration::from_millis(self.primary_poll_interval)
    }
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            bspc:        None,
            log_to_file: false,
            log_dir:     None,

            primary_padding:       42_u32,
            desktop_layouts:       DESKTOP_LAYOUTS
                .iter()
                .map(|layout| layout.iter().map(ToString::to_string).collect())
                .collect(),
            settle_delay:          3000_u64,
            primary_poll_interval: 200_u64,
        }
    }
}

// =================== Config ===================== [[[

/// Configuration file to parse
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Config {
    /// Global settings
    #[serde(flatten)]
    pub(crate) global: GlobalSettings,
}

impl Config {
    /// Create the default configuration file
    pub(crate) fn create_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::debug!("Creating configuration path: {}", path.display());
            fs::create_dir_all(path).context("unable to create configuration directory")?;
        }

        let path = path.join(CONFIG_FILE);
        log::debug!("{}: {}", "Configuration path".bright_blue(), path.display());

        if !path.is_file() {
            let initialization = include_str!("../share/bspmon.yml");

            let mut config_file: fs::File = fs::OpenOptions::new()
                .write(true)
                .create(true)
                .open(&path)
                .with_context(|| format!("could not create bspmon config: '{}'", path.display()))?;

            config_file
                .write_all(initialization.as_bytes())
                .with_context(|| format!("could not create bspmon config: '{}'", path.display()))?;
            config_file.flush()?;
        }

        Self::load(path)
    }

    // NOTE: SerdeError doesn't always point out correct error

    /// Load the configuration file from a given path
    pub(crate) fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: '{}'", path.display()))?;

        Self::parse(file)
    }

    /// Parse the contents of a configuration file
    pub(crate) fn parse(file: String) -> Result<Self> {
        let res = serde_yaml::from_str(&file).map_err(|e| SerdeError::new(file, e))?;
        Ok(res)
    }

    /// Load the default configuration file
    pub(crate) fn load_default() -> Result<Self> {
        log::debug!("loading default config: {}", CONFIG_DIR.display());
        Self::create_default(CONFIG_DIR.as_path())
    }
} // ]]] === Config ===

// ================ Project Dirs ================== [[[

/// Directory holding the configuration file
pub(crate) static CONFIG_DIR: Lazy<PathBuf> = Lazy::new(|| {
    config_dir().expect("could not detect user home directory to place program files")
});

/// `$BSPMON_CONFIG_DIR` when it is absolute, otherwise `$XDG_CONFIG_HOME/bspmon`
fn config_dir() -> Option<PathBuf> {
    env::var_os("BSPMON_CONFIG_DIR")
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .or_else(|| {
            ProjectDirs::from("", "", env!("CARGO_PKG_NAME")).map(|p| p.config_dir().to_path_buf())
        })
}

// ]]] === Project Dirs ===

#[cfg(test)]
mod tests {
    use super::{config_dir, Config, GlobalSettings};
    use std::{env, path::PathBuf, time::Duration};

    #[test]
    fn config_dir_override() {
        env::set_var("BSPMON_CONFIG_DIR", "/etc/bspmon");
        assert_eq!(config_dir(), Some(PathBuf::from("/etc/bspmon")));

        // Relative overrides are ignored
        env::set_var("BSPMON_CONFIG_DIR", "bspmon");
        assert_ne!(config_dir(), Some(PathBuf::from("bspmon")));
        env::remove_var("BSPMON_CONFIG_DIR");
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let config = Config::parse(include_str!("../share/bspmon.yml").to_owned()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn default_layouts() {
        let settings = GlobalSettings::default().reconcile_settings();
        assert_eq!(settings.primary_padding, 42);
        assert_eq!(settings.desktop_layouts.len(), 5);
        assert_eq!(settings.desktop_layouts[0], vec!["1", "2", "3", "4", "5", "6", "7"]);
        assert_eq!(settings.desktop_layouts[1], vec!["I", "II", "II", "IV"]);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config = Config::parse(String::from(
            "primary-padding: 30\ndesktop-layouts:\n  - [web, code]\n  - [chat]\n",
        ))
        .unwrap();

        assert_eq!(config.global.primary_padding, 30);
        assert_eq!(config.global.desktop_layouts, vec![vec!["web", "code"], vec!["chat"]]);
        assert_eq!(config.global.settle_delay(), Duration::from_secs(3));
        assert_eq!(config.global.primary_poll_interval(), Duration::from_millis(200));
    }

    #[test]
    fn bad_type_is_an_error() {
        assert!(Config::parse(String::from("primary-padding: lots\n")).is_err());
    }
}
