//! Compatibility and hot-reload settings for `glkit`.
//!
//! The file is a small TOML document:
//!
//! ```toml
//! version = 1
//!
//! [texture]
//! alpha_packing = "fixed"
//!
//! [reload]
//! refresh_timestamps = true
//! watch_interval = "250ms"
//! ```
//!
//! Both compatibility switches default to the corrected behaviour; the
//! `legacy` / `false` values reproduce byte-for-byte what older content was
//! authored against.
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to read configuration at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// How decoded pixels are laid out in the upload buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlphaPacking {
    /// Four bytes per pixel, every channel kept.
    #[default]
    Fixed,
    /// The write cursor advances after R, G and B but not after A, so each
    /// alpha byte is overwritten by the next pixel's red byte.
    Legacy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TextureSettings {
    #[serde(default)]
    pub alpha_packing: AlphaPacking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReloadSettings {
    /// Adopt the newly observed modification times after a successful reload.
    /// `false` keeps the construction-time stamps, which makes every later
    /// check relink again.
    #[serde(default = "default_refresh_timestamps")]
    pub refresh_timestamps: bool,
    /// Poll interval for the background watcher. `None` means the caller
    /// polls from the render loop instead.
    #[serde(
        default,
        deserialize_with = "deserialize_interval",
        skip_serializing_if = "Option::is_none"
    )]
    pub watch_interval: Option<Duration>,
}

impl Default for ReloadSettings {
    fn default() -> Self {
        Self {
            refresh_timestamps: default_refresh_timestamps(),
            watch_interval: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KitConfig {
    pub version: u32,
    #[serde(default)]
    pub texture: TextureSettings,
    #[serde(default)]
    pub reload: ReloadSettings,
}

impl Default for KitConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            texture: TextureSettings::default(),
            reload: ReloadSettings::default(),
        }
    }
}

const CONFIG_VERSION: u32 = 1;

fn default_refresh_timestamps() -> bool {
    true
}

fn deserialize_interval<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Text(String),
        Seconds(u64),
        Fractional(f64),
    }

    let interval = match Helper::deserialize(deserializer)? {
        Helper::Text(raw) => humantime::parse_duration(&raw)
            .map_err(|err| de::Error::custom(format!("invalid duration '{raw}': {err}")))?,
        Helper::Seconds(secs) => Duration::from_secs(secs),
        Helper::Fractional(secs) => Duration::try_from_secs_f64(secs)
            .map_err(|err| de::Error::custom(format!("invalid duration {secs}: {err}")))?,
    };
    Ok(Some(interval))
}

impl KitConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: KitConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected {CONFIG_VERSION}",
                self.version
            )));
        }

        if let Some(interval) = self.reload.watch_interval {
            if interval.is_zero() {
                return Err(ConfigError::Invalid(
                    "reload.watch_interval must be greater than zero".into(),
                ));
            }
        }

        Ok(())
    }
}
