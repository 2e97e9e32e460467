//! Engine configuration.
//!
//! Root configuration struct and nested sections with full defaults,
//! validation, YAML file loading and environment variable overrides. Every
//! section defaults independently, so a file only needs the keys it changes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::date;
use crate::error::ConfigError;
use crate::numeric::NumberLocale;

/// File name searched for in each config directory.
pub const CONFIG_FILE_NAME: &str = "ledgerform.yaml";

/// Placeholder substituted with the field label in label templates.
pub const LABEL_TOKEN: &str = "{label}";

// ---------------------------------------------------------------------------
// Root config
// ---------------------------------------------------------------------------

/// Root configuration for the rendering engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub number: NumberConfig,
    pub date: DateConfig,
    pub labels: LabelConfig,
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Reads and validates a YAML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: Self = if raw.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads the first config file on the search path (defaults when none
    /// exists), then applies `LEDGERFORM_*` environment overrides.
    pub fn load_default() -> Result<Self, ConfigError> {
        let mut cfg = match find_config_file() {
            Some(path) => Self::load(&path)?,
            None => Self::default(),
        };
        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Applies overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from an arbitrary key lookup.
    ///
    /// `LEDGERFORM_LOG` sets the log level; the separator keys take the first
    /// character of their value.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(level) = lookup("LEDGERFORM_LOG").filter(|v| !v.trim().is_empty()) {
            self.logging.level = level.trim().to_owned();
        }
        if let Some(sep) = lookup("LEDGERFORM_DECIMAL_SEPARATOR").and_then(|v| v.chars().next()) {
            self.number.decimal_separator = sep;
        }
        if let Some(sep) = lookup("LEDGERFORM_GROUP_SEPARATOR").and_then(|v| v.chars().next()) {
            self.number.group_separator = sep;
        }
    }

    /// Validates the entire configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Number
        let number = &self.number;
        for (key, sep) in [
            ("number.group_separator", number.group_separator),
            ("number.decimal_separator", number.decimal_separator),
        ] {
            if sep.is_ascii_digit() || sep == '-' || sep == '+' {
                return Err(ConfigError::Invalid(format!(
                    "{key} must not be a digit or sign, got {sep:?}"
                )));
            }
        }
        if number.group_separator == number.decimal_separator {
            return Err(ConfigError::Invalid(
                "number.group_separator and number.decimal_separator must differ".into(),
            ));
        }
        if number.max_fraction_digits > 10 {
            return Err(ConfigError::Invalid(
                "number.max_fraction_digits must be at most 10".into(),
            ));
        }

        // Date
        if !date::is_valid_pattern(&self.date.display_format) {
            return Err(ConfigError::Invalid(format!(
                "date.display_format is not a valid strftime pattern: {:?}",
                self.date.display_format
            )));
        }

        // Labels
        if self.labels.required_template.trim().is_empty() {
            return Err(ConfigError::Invalid("labels.required_template is required".into()));
        }

        // Logging
        match self.logging.level.to_lowercase().trim() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Invalid(
                    "logging.level must be one of trace, debug, info, warn, error".into(),
                ))
            }
        }
        match self.logging.format.to_lowercase().trim() {
            "console" | "json" => {}
            _ => {
                return Err(ConfigError::Invalid(
                    "logging.format must be one of console, json".into(),
                ))
            }
        }
        Ok(())
    }

    /// Number locale described by the `number` section.
    #[must_use]
    pub fn number_locale(&self) -> NumberLocale {
        NumberLocale {
            group_separator: self.number.group_separator,
            decimal_separator: self.number.decimal_separator,
            max_fraction_digits: self.number.max_fraction_digits,
        }
    }

    /// Message registered for a required field.
    #[must_use]
    pub fn required_message(&self, label: &str) -> String {
        self.labels.required_template.replace(LABEL_TOKEN, label)
    }

    /// Placeholder shown by an empty form select.
    #[must_use]
    pub fn select_placeholder(&self, label: &str) -> String {
        self.labels.select_placeholder.replace(LABEL_TOKEN, label)
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberConfig {
    pub group_separator: char,
    pub decimal_separator: char,
    pub max_fraction_digits: u8,
}

impl Default for NumberConfig {
    fn default() -> Self {
        let locale = NumberLocale::default();
        Self {
            group_separator: locale.group_separator,
            decimal_separator: locale.decimal_separator,
            max_fraction_digits: locale.max_fraction_digits,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateConfig {
    /// strftime pattern for read-only date display.
    pub display_format: String,
}

impl Default for DateConfig {
    fn default() -> Self {
        Self {
            display_format: date::DEFAULT_DISPLAY_FORMAT.into(),
        }
    }
}

/// User-facing strings. Templates may contain `{label}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub yes: String,
    pub no: String,
    pub required_template: String,
    pub invalid_email: String,
    pub select_placeholder: String,
    pub cell_select_placeholder: String,
    pub date_placeholder: String,
    pub malformed_fields: String,
    pub notebook_title: String,
    pub add_row: String,
    pub remove_row: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            yes: "Có".into(),
            no: "Không".into(),
            required_template: "{label} là bắt buộc".into(),
            invalid_email: crate::validation::INVALID_EMAIL_MESSAGE.into(),
            select_placeholder: "-- Chọn {label} --".into(),
            cell_select_placeholder: "-- Chọn --".into(),
            date_placeholder: "Chọn ngày...".into(),
            malformed_fields: "⚠️ Metadata form.fields không hợp lệ".into(),
            notebook_title: "Lịch sử giao dịch".into(),
            add_row: "+ Thêm dòng".into(),
            remove_row: "Xóa".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "console".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config file discovery
// ---------------------------------------------------------------------------

/// Searches for `ledgerform.yaml` in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    config_search_paths()
        .into_iter()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Returns the list of directories to search for config files.
fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        paths.push(Path::new(&xdg).join("ledgerform"));
    }

    let home = home_dir();
    if home.as_os_str() != "" {
        paths.push(home.join(".config/ledgerform"));
    }

    paths.push(PathBuf::from("."));
    paths
}

/// Get the user's home directory, falling back to `/` on failure.
fn home_dir() -> PathBuf {
    #[allow(deprecated)]
    std::env::home_dir().unwrap_or_else(|| PathBuf::from("/"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
