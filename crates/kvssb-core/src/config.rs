use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::counter::DEFAULT_STEPS;
use crate::layout::ANCHOR_OFFSET;
use crate::reveal::REVEAL_START;
use crate::scroll::{BACK_TO_TOP_AFTER, NAV_OFFSET};
use crate::sync::{COUNTER_TICK, COUNTER_VISIBILITY, SyncConfig};
use crate::toast::TOAST_TTL;
use crate::typewriter::TypewriterOptions;

/// Overrides the config directory (used by tests and CI)
pub const CONFIG_DIR_ENV: &str = "KVSSB_CONFIG_DIR";

/// Delay between the `load` event and hiding the preloader
pub const PRELOADER_DELAY_MS: u64 = 1000;

/// Keys accepted by [`Config::get`], [`Config::set`] and [`Config::clear`]
pub const KEYS: &[&str] = &[
    "nav-offset",
    "back-to-top-after",
    "counter-steps",
    "counter-tick-ms",
    "counter-visibility",
    "reveal-start",
    "anchor-offset",
    "toast-ttl-ms",
    "preloader-delay-ms",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub nav_offset: f64,
    pub back_to_top_after: f64,
    pub counter_steps: f64,
    pub counter_tick_ms: u64,
    pub counter_visibility: f64,
    pub reveal_start: f64,
    pub anchor_offset: f64,
    pub toast_ttl_ms: u64,
    pub preloader_delay_ms: u64,
    pub typewriter: TypewriterOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nav_offset: NAV_OFFSET,
            back_to_top_after: BACK_TO_TOP_AFTER,
            counter_steps: DEFAULT_STEPS,
            counter_tick_ms: COUNTER_TICK.as_millis() as u64,
            counter_visibility: COUNTER_VISIBILITY,
            reveal_start: REVEAL_START,
            anchor_offset: ANCHOR_OFFSET,
            toast_ttl_ms: TOAST_TTL.as_millis() as u64,
            preloader_delay_ms: PRELOADER_DELAY_MS,
            typewriter: TypewriterOptions::default(),
        }
    }
}

/// Result of loading a config file
#[derive(Debug)]
pub struct Loaded {
    pub config: Config,
    /// Where an unparseable config file was moved before falling back to
    /// defaults
    pub recovered: Option<PathBuf>,
}

impl Config {
    /// Get the config directory path (`$KVSSB_CONFIG_DIR` or ~/.config/kvssb)
    pub fn dir() -> Option<PathBuf> {
        if let Some(dir) = env::var_os(CONFIG_DIR_ENV).filter(|dir| !dir.is_empty()) {
            return Some(PathBuf::from(dir));
        }
        dirs::home_dir().map(|home| home.join(".config").join("kvssb"))
    }

    /// Get the config file path
    pub fn path() -> Option<PathBuf> {
        Self::dir().map(|dir| dir.join("config.toml"))
    }

    /// Load config from the default location
    pub fn load() -> Result<Loaded> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Loaded {
                config: Self::default(),
                recovered: None,
            }),
        }
    }

    /// Load config from a file, returning defaults if it doesn't exist.
    ///
    /// A file that can't be parsed or holds invalid values is renamed to
    /// `<name>.bak` and defaults are used instead.
    pub fn load_from(path: &Path) -> Result<Loaded> {
        if !path.exists() {
            return Ok(Loaded {
                config: Self::default(),
                recovered: None,
            });
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let parsed = toml::from_str::<Config>(&contents)
            .map_err(anyhow::Error::from)
            .and_then(|config| config.validate().map(|()| config));

        match parsed {
            Ok(config) => Ok(Loaded {
                config,
                recovered: None,
            }),
            Err(err) => {
                let backup = backup_path(path);
                warn!(path = %path.display(), error = %err, "config file is corrupted");
                fs::rename(path, &backup).with_context(|| {
                    format!("Failed to move corrupted config to {}", backup.display())
                })?;
                Ok(Loaded {
                    config: Self::default(),
                    recovered: Some(backup),
                })
            }
        }
    }

    /// Parse and validate config text, e.g. an inline config block on the
    /// page.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the default location, creating the directory if needed
    pub fn save(&self) -> Result<()> {
        let path = Self::path().context("Could not determine config path")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("nav_offset", self.nav_offset),
            ("back_to_top_after", self.back_to_top_after),
            ("anchor_offset", self.anchor_offset),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                bail!("{name} must be a finite number");
            }
        }
        if !(self.counter_steps >= 1.0) {
            bail!("counter_steps must be at least 1");
        }
        if !(self.counter_visibility > 0.0 && self.counter_visibility <= 1.0) {
            bail!("counter_visibility must be in (0, 1]");
        }
        if !(0.0..=1.0).contains(&self.reveal_start) {
            bail!("reveal_start must be in [0, 1]");
        }
        if self.toast_ttl_ms == 0 {
            bail!("toast_ttl_ms must be positive");
        }
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match normalize(key).as_str() {
            "nav_offset" => self.nav_offset.to_string(),
            "back_to_top_after" => self.back_to_top_after.to_string(),
            "counter_steps" => self.counter_steps.to_string(),
            "counter_tick_ms" => self.counter_tick_ms.to_string(),
            "counter_visibility" => self.counter_visibility.to_string(),
            "reveal_start" => self.reveal_start.to_string(),
            "anchor_offset" => self.anchor_offset.to_string(),
            "toast_ttl_ms" => self.toast_ttl_ms.to_string(),
            "preloader_delay_ms" => self.preloader_delay_ms.to_string(),
            _ => bail!(unknown_key(key)),
        };
        Ok(value)
    }

    /// Set a configuration value by key. The config is unchanged if the
    /// value doesn't parse or fails validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut next = self.clone();
        match normalize(key).as_str() {
            "nav_offset" => next.nav_offset = parse(key, value)?,
            "back_to_top_after" => next.back_to_top_after = parse(key, value)?,
            "counter_steps" => next.counter_steps = parse(key, value)?,
            "counter_tick_ms" => next.counter_tick_ms = parse(key, value)?,
            "counter_visibility" => next.counter_visibility = parse(key, value)?,
            "reveal_start" => next.reveal_start = parse(key, value)?,
            "anchor_offset" => next.anchor_offset = parse(key, value)?,
            "toast_ttl_ms" => next.toast_ttl_ms = parse(key, value)?,
            "preloader_delay_ms" => next.preloader_delay_ms = parse(key, value)?,
            _ => bail!(unknown_key(key)),
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Reset a configuration value to its default
    pub fn clear(&mut self, key: &str) -> Result<()> {
        let defaults = Self::default();
        match normalize(key).as_str() {
            "nav_offset" => self.nav_offset = defaults.nav_offset,
            "back_to_top_after" => self.back_to_top_after = defaults.back_to_top_after,
            "counter_steps" => self.counter_steps = defaults.counter_steps,
            "counter_tick_ms" => self.counter_tick_ms = defaults.counter_tick_ms,
            "counter_visibility" => self.counter_visibility = defaults.counter_visibility,
            "reveal_start" => self.reveal_start = defaults.reveal_start,
            "anchor_offset" => self.anchor_offset = defaults.anchor_offset,
            "toast_ttl_ms" => self.toast_ttl_ms = defaults.toast_ttl_ms,
            "preloader_delay_ms" => self.preloader_delay_ms = defaults.preloader_delay_ms,
            _ => bail!(unknown_key(key)),
        }
        Ok(())
    }

    pub fn sync(&self) -> SyncConfig {
        SyncConfig {
            nav_offset: self.nav_offset,
            back_to_top_after: self.back_to_top_after,
            counter_steps: self.counter_steps,
            counter_tick: Duration::from_millis(self.counter_tick_ms),
            counter_visibility: self.counter_visibility,
            reveal_start: self.reveal_start,
        }
    }

    pub fn toast_ttl(&self) -> Duration {
        Duration::from_millis(self.toast_ttl_ms)
    }

    pub fn preloader_delay(&self) -> Duration {
        Duration::from_millis(self.preloader_delay_ms)
    }
}

fn normalize(key: &str) -> String {
    key.trim().replace('-', "_")
}

fn unknown_key(key: &str) -> String {
    format!("Unknown config key: {}. Available keys: {}", key, KEYS.join(", "))
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid value for {}: {}", key, value))
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    path.with_file_name(name)
}
