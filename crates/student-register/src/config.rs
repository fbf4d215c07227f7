//! Register settings: where the store lives, which classes the dashboard
//! counts, the role PINs, and the report layout.
//!
//! Settings are layered with figment. Built-in defaults come first, then
//! the TOML file, then `STUREG_*` environment variables.

use std::collections::HashSet;
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory name under both the config and data roots.
const DATA_DIR_NAME: &str = "student-register";

const DATABASE_FILE_NAME: &str = "register.db";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "STUREG_";

/// All register settings.
///
/// Later sources override earlier ones (highest precedence first):
/// 1. Environment variables (prefixed with `STUREG_`, sections split by `__`,
///    e.g. `STUREG_AUTH__ADMIN_PIN`)
/// 2. TOML config file at `~/.config/student-register/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store location.
    pub storage: StorageConfig,
    /// Roster configuration.
    pub register: RegisterConfig,
    /// PIN configuration.
    pub auth: AuthConfig,
    /// Report export configuration.
    pub export: ExportConfig,
}

/// Where the store lives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/student-register/register.db`
    pub database_path: Option<PathBuf>,
}

/// Roster-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterConfig {
    /// Class labels shown on the dashboard, in display order.
    pub classes: Vec<String>,
}

/// PINs that unlock each role.
///
/// These gate casual misuse only; they are not a security boundary.
/// Numeric values are accepted. A PIN with leading zeros set through the
/// environment must be quoted (`STUREG_AUTH__GUEST_PIN='"0000"'`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// PIN for the admin role. Never serialized.
    #[serde(deserialize_with = "pin_text", skip_serializing)]
    pub admin_pin: String,
    /// PIN for the guest role. Never serialized.
    #[serde(deserialize_with = "pin_text", skip_serializing)]
    pub guest_pin: String,
}

/// Layout of the CSV report's score columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Subjects, one column group each.
    pub subjects: Vec<String>,
    /// Exams reported within each subject.
    pub exams: Vec<String>,
}

impl Default for RegisterConfig {
    fn default() -> Self {
        Self {
            classes: ["6", "7", "8", "9", "10"].map(String::from).to_vec(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_pin: "1578".to_string(),
            guest_pin: "0000".to_string(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            subjects: ["Math", "English", "Science"].map(String::from).to_vec(),
            exams: ["MidTerm", "Final"].map(String::from).to_vec(),
        }
    }
}

impl Config {
    /// Load settings from the default file location and the environment.
    ///
    /// # Errors
    ///
    /// See [`Config::load_from`].
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings, reading the TOML file at `config_path` if given.
    ///
    /// A missing file is not an error; its layer is simply empty.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing, or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/student-register/config.toml`.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// `<local data dir>/student-register`, home of the default store.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Check settings that parse but cannot work.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidation`] naming the first bad setting.
    pub fn validate(&self) -> Result<()> {
        if self.register.classes.is_empty() {
            return Err(validation("register.classes must not be empty"));
        }
        let mut seen = HashSet::new();
        for class in &self.register.classes {
            if class.trim().is_empty() {
                return Err(validation("register.classes must not contain blank labels"));
            }
            if !seen.insert(class.as_str()) {
                return Err(validation(format!(
                    "register.classes lists class {class} more than once"
                )));
            }
        }

        if self.auth.admin_pin.trim().is_empty() || self.auth.guest_pin.trim().is_empty() {
            return Err(validation("auth pins must not be empty"));
        }
        if self.auth.admin_pin == self.auth.guest_pin {
            return Err(validation("auth.admin_pin and auth.guest_pin must differ"));
        }

        if self.export.subjects.is_empty() || self.export.exams.is_empty() {
            return Err(validation("export.subjects and export.exams must not be empty"));
        }

        Ok(())
    }

    /// The store file, falling back to `register.db` in the data directory.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}

/// Accept a PIN written as a string or a bare number.
fn pin_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

fn validation(message: impl Into<String>) -> Error {
    Error::ConfigValidation {
        message: message.into(),
    }
}
