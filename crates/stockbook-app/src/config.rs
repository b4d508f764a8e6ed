//! # Application Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOCKBOOK_DB_PATH=/srv/shop/stockbook.db                           │
//! │     STOCKBOOK_VALUATION=profit                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/stockbook/stockbook.toml (Linux)                         │
//! │     ~/Library/Application Support/com.stockbook.stockbook/... (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     platform data dir, revenue valuation, "$" and "."                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! database_path = "/srv/shop/stockbook.db"
//! backup = "best_effort"  # off | best_effort | required
//! backup_dir = "/srv/shop/backups"
//!
//! [sales]
//! valuation = "revenue"  # revenue | profit
//!
//! [display]
//! currency_symbol = "R$ "
//! decimal_separator = ","
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

use stockbook_core::{Money, Valuation};
use stockbook_db::DbConfig;

use crate::error::{AppError, AppResult};

const DATABASE_FILE: &str = "stockbook.db";
const CONFIG_FILE: &str = "stockbook.toml";

// =============================================================================
// Sections
// =============================================================================

/// What `Shop::save` does about a copy of the previous store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupPolicy {
    /// No copy is made.
    #[default]
    Off,

    /// A failed copy is logged and the save goes ahead.
    BestEffort,

    /// A failed copy aborts the save.
    Required,
}

impl std::fmt::Display for BackupPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackupPolicy::Off => write!(f, "off"),
            BackupPolicy::BestEffort => write!(f, "best_effort"),
            BackupPolicy::Required => write!(f, "required"),
        }
    }
}

impl FromStr for BackupPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" | "none" => Ok(BackupPolicy::Off),
            "best_effort" | "best-effort" => Ok(BackupPolicy::BestEffort),
            "required" => Ok(BackupPolicy::Required),
            other => Err(AppError::InvalidConfig(format!(
                "Unknown backup policy: '{}'. Valid options: off, best_effort, required",
                other
            ))),
        }
    }
}

/// Where the store lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Explicit database file. `None` means the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub backup: BackupPolicy,

    /// Backup directory. `None` means `backups/` beside the database file.
    #[serde(default)]
    pub backup_dir: Option<PathBuf>,
}

/// How sales are valued.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSettings {
    #[serde(default)]
    pub valuation: Valuation,
}

/// How amounts are rendered for people.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Single character placed between units and cents.
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: String,
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_decimal_separator() -> String {
    ".".to_string()
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            currency_symbol: default_currency_symbol(),
            decimal_separator: default_decimal_separator(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub sales: SalesSettings,

    #[serde(default)]
    pub display: DisplaySettings,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for a specific database file, everything else default.
    pub fn with_database(path: impl Into<PathBuf>) -> Self {
        AppConfig {
            store: StoreSettings {
                database_path: Some(path.into()),
                ..StoreSettings::default()
            },
            ..Self::default()
        }
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`stockbook.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> AppResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| AppError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    pub fn validate(&self) -> AppResult<()> {
        if let Some(ref path) = self.store.database_path {
            if path.as_os_str().is_empty() {
                return Err(AppError::InvalidConfig(
                    "store.database_path must not be empty".into(),
                ));
            }
        }

        let separator = &self.display.decimal_separator;
        if separator.chars().count() != 1 || separator.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::InvalidConfig(format!(
                "display.decimal_separator must be a single non-digit character, got: '{}'",
                separator
            )));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `STOCKBOOK_*` overrides read through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("STOCKBOOK_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.store.database_path = Some(PathBuf::from(path));
        }

        if let Some(policy) = lookup("STOCKBOOK_BACKUP") {
            match policy.parse::<BackupPolicy>() {
                Ok(parsed) => self.store.backup = parsed,
                Err(e) => warn!(error = %e, "Ignoring backup policy from environment"),
            }
        }

        if let Some(mode) = lookup("STOCKBOOK_VALUATION") {
            match mode.parse::<Valuation>() {
                Ok(parsed) => {
                    debug!(valuation = %parsed, "Overriding valuation from environment");
                    self.sales.valuation = parsed;
                }
                Err(_) => warn!(valuation = %mode, "Unknown valuation in environment"),
            }
        }

        if let Some(symbol) = lookup("STOCKBOOK_CURRENCY_SYMBOL") {
            self.display.currency_symbol = symbol;
        }

        if let Some(separator) = lookup("STOCKBOOK_DECIMAL_SEPARATOR") {
            self.display.decimal_separator = separator;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Resolved database file: the configured path, or `stockbook.db` in the
    /// platform data directory.
    pub fn database_path(&self) -> AppResult<PathBuf> {
        match self.store.database_path {
            Some(ref path) => Ok(path.clone()),
            None => project_dirs()
                .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
                .ok_or(AppError::NoAppDirectory),
        }
    }

    /// Directory that receives backups of the store at `database_path`.
    pub fn backup_dir(&self, database_path: &Path) -> PathBuf {
        self.store.backup_dir.clone().unwrap_or_else(|| {
            database_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join("backups")
        })
    }

    pub fn db_config(&self) -> AppResult<DbConfig> {
        Ok(DbConfig::new(self.database_path()?))
    }

    pub fn valuation(&self) -> Valuation {
        self.sales.valuation
    }

    /// Renders `amount` with the configured symbol and separator. No digit
    /// grouping.
    pub fn format_money(&self, amount: Money) -> String {
        let sign = if amount.is_negative() { "-" } else { "" };
        format!(
            "{}{}{}{}{:02}",
            sign,
            self.display.currency_symbol,
            amount.major().abs(),
            self.display.decimal_separator,
            amount.minor()
        )
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "stockbook", "stockbook")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.valuation(), Valuation::Revenue);
        assert_eq!(config.display.currency_symbol, "$");
        assert_eq!(config.display.decimal_separator, ".");
        assert!(config.store.database_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();

        config.display.decimal_separator = String::new();
        assert!(config.validate().is_err());

        config.display.decimal_separator = ",,".into();
        assert!(config.validate().is_err());

        config.display.decimal_separator = "5".into();
        assert!(config.validate().is_err());

        config.display.decimal_separator = ",".into();
        assert!(config.validate().is_ok());

        config.store.database_path = Some(PathBuf::new());
        assert!(matches!(config.validate(), Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn test_format_money() {
        let mut config = AppConfig::default();
        assert_eq!(config.format_money(Money::from_cents(123450)), "$1234.50");
        assert_eq!(config.format_money(Money::from_cents(-550)), "-$5.50");
        assert_eq!(config.format_money(Money::zero()), "$0.00");

        config.display.currency_symbol = "R$ ".into();
        config.display.decimal_separator = ",".into();
        assert_eq!(config.format_money(Money::from_cents(1805)), "R$ 18,05");
    }

    #[test]
    fn test_overrides() {
        let mut config = AppConfig::default();
        config.apply_overrides(env(&[
            ("STOCKBOOK_DB_PATH", "/tmp/shop.db"),
            ("STOCKBOOK_VALUATION", "Profit"),
            ("STOCKBOOK_CURRENCY_SYMBOL", "€"),
        ]));

        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.valuation(), Valuation::Profit);
        assert_eq!(config.display.currency_symbol, "€");
        assert_eq!(config.display.decimal_separator, ".");
    }

    #[test]
    fn test_backup_policy() {
        assert_eq!("off".parse::<BackupPolicy>().unwrap(), BackupPolicy::Off);
        assert_eq!(
            "best-effort".parse::<BackupPolicy>().unwrap(),
            BackupPolicy::BestEffort
        );
        assert_eq!(
            "REQUIRED".parse::<BackupPolicy>().unwrap(),
            BackupPolicy::Required
        );
        assert!("sometimes".parse::<BackupPolicy>().is_err());

        let mut config = AppConfig::default();
        config.apply_overrides(env(&[("STOCKBOOK_BACKUP", "required")]));
        assert_eq!(config.store.backup, BackupPolicy::Required);
    }

    #[test]
    fn test_backup_dir() {
        let mut config = AppConfig::default();
        assert_eq!(
            config.backup_dir(Path::new("/srv/shop/stockbook.db")),
            PathBuf::from("/srv/shop/backups")
        );

        config.store.backup_dir = Some(PathBuf::from("/mnt/usb"));
        assert_eq!(
            config.backup_dir(Path::new("/srv/shop/stockbook.db")),
            PathBuf::from("/mnt/usb")
        );
    }

    #[test]
    fn test_unknown_valuation_override_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(env(&[("STOCKBOOK_VALUATION", "markup")]));
        assert_eq!(config.valuation(), Valuation::Revenue);
    }

    #[test]
    fn test_toml_serialization() {
        let mut config = AppConfig::with_database("/srv/shop/stockbook.db");
        config.sales.valuation = Valuation::Profit;
        config.store.backup = BackupPolicy::BestEffort;

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[store]"));
        assert!(toml_str.contains("valuation = \"profit\""));
        assert!(toml_str.contains("backup = \"best_effort\""));

        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: AppConfig = toml::from_str("[display]\ncurrency_symbol = \"£\"\n").unwrap();
        assert_eq!(parsed.display.currency_symbol, "£");
        assert_eq!(parsed.display.decimal_separator, ".");
        assert_eq!(parsed.valuation(), Valuation::Revenue);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let mut config = AppConfig::with_database(dir.path().join(DATABASE_FILE));
        config.display.decimal_separator = ",".into();
        config.save(Some(path.clone())).unwrap();

        let mut loaded: AppConfig =
            toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        loaded.apply_overrides(|_| None);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_malformed_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[sales]\nvaluation = 42\n").unwrap();

        // The environment may carry overrides, but a parse error comes first.
        let err = AppConfig::load(Some(path)).unwrap_err();
        assert!(matches!(err, AppError::ConfigLoadFailed(_)));
    }
}
