//! Settings file for the `estimator` binary.
//!
//! ```toml
//! [defaults]
//! default_tax_rate = 20
//! default_labor_rate = 45
//! currency_symbol = "€"
//!
//! [business]
//! name = "Smith Carpentry"
//! email = "jo@example.com"
//! phone = "+44 1234 567890"
//!
//! [database]
//! backend = "sqlite"
//! connection_string = "estimates.db"
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Every section and key is optional. Anything left out keeps its built-in
//! default.

use std::path::{Path, PathBuf};

use estimate_core::db::DbConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_SETTINGS_FILE: &str = "estimator.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read settings file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Values used to fill in drafts that leave them out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Percentage, e.g. `20`.
    pub default_tax_rate: Decimal,
    /// Per hour.
    pub default_labor_rate: Decimal,
    pub currency_symbol: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            default_tax_rate: Decimal::from(20),
            default_labor_rate: Decimal::from(45),
            currency_symbol: "€".to_string(),
        }
    }
}

/// Contact details printed at the top of exported quotes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl BusinessInfo {
    /// Non-empty header lines in display order.
    pub fn header_lines(&self) -> Vec<&str> {
        [&self.name, &self.email, &self.phone]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// A bare level or any `EnvFilter` directive.
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub defaults: Defaults,
    pub business: BusinessInfo,
    pub database: DbConfig,
    pub logging: LoggingSettings,
}

impl Settings {
    pub fn from_toml_str(
        contents: &str,
        path: &Path,
    ) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads settings from `path`, or from [`DEFAULT_SETTINGS_FILE`] when
    /// `path` is `None`.
    ///
    /// A missing default file is not an error: the built-in defaults are
    /// used. A missing file that was asked for explicitly is.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                let settings = Self::from_toml_str(&contents, &path)?;
                tracing::debug!(path = %path.display(), "loaded settings");
                Ok(settings)
            }
            Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    path = %path.display(),
                    "no settings file found, using built-in defaults"
                );
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }
}
