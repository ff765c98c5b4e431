// ⚙️ Configuration - everything a request needs, passed in explicitly
//
// Read from HOSTEL_* environment variables (the binary loads `.env` first),
// then overridden by command-line flags.

use crate::bill::{BillOptions, DEFAULT_INSTITUTION};
use crate::error::{BillingError, Result};
use crate::sync::{SheetExportSync, SyncCapability};
use std::path::PathBuf;

pub const ENV_DATA_FILE: &str = "HOSTEL_DATA_FILE";
pub const ENV_BILL_DIR: &str = "HOSTEL_BILL_DIR";
pub const ENV_INSTITUTION: &str = "HOSTEL_INSTITUTION";
pub const ENV_SYNC_URL: &str = "HOSTEL_SYNC_URL";
pub const ENV_SYNC_ENABLED: &str = "HOSTEL_SYNC_ENABLED";

pub const DEFAULT_DATA_FILE: &str = "data.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Billing sheet (CSV)
    pub data_file: PathBuf,
    /// Where exported bills are written
    pub output_dir: PathBuf,
    pub institution: String,
    pub sync_url: Option<String>,
    pub sync_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            output_dir: PathBuf::from("."),
            institution: DEFAULT_INSTITUTION.to_string(),
            sync_url: None,
            sync_enabled: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = AppConfig::default();
        if let Some(path) = get(ENV_DATA_FILE) {
            config.data_file = PathBuf::from(path);
        }
        if let Some(dir) = get(ENV_BILL_DIR) {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(name) = get(ENV_INSTITUTION) {
            config.institution = name;
        }
        config.sync_url = get(ENV_SYNC_URL);
        if let Some(flag) = get(ENV_SYNC_ENABLED) {
            config.sync_enabled = parse_flag(ENV_SYNC_ENABLED, &flag)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sync_enabled && self.sync_url.is_none() {
            return Err(BillingError::Config(format!(
                "{ENV_SYNC_ENABLED} is set but {ENV_SYNC_URL} is missing"
            )));
        }
        Ok(())
    }

    pub fn bill_options(&self) -> BillOptions {
        BillOptions {
            institution: self.institution.clone(),
            output_dir: self.output_dir.clone(),
        }
    }

    /// The explicit sync flag handed to the service at startup
    pub fn sync_capability(&self) -> Result<SyncCapability> {
        self.validate()?;
        match (&self.sync_url, self.sync_enabled) {
            (Some(url), true) => Ok(SyncCapability::Enabled(Box::new(SheetExportSync::new(
                url.clone(),
            )?))),
            _ => Ok(SyncCapability::Disabled),
        }
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(BillingError::Config(format!(
            "{key} must be true or false, got '{other}'"
        ))),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.data_file, PathBuf::from("data.csv"));
        assert!(!config.sync_enabled);
        assert!(!config.sync_capability().unwrap().is_enabled());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            (ENV_DATA_FILE, "/srv/hostel/data.csv"),
            (ENV_BILL_DIR, "/srv/hostel/bills"),
            (ENV_INSTITUTION, "Hostel Office"),
            (ENV_SYNC_URL, "https://example.org/sheet.csv"),
            (ENV_SYNC_ENABLED, "yes"),
        ])
        .unwrap();

        assert_eq!(config.data_file, PathBuf::from("/srv/hostel/data.csv"));
        assert_eq!(config.bill_options().output_dir, PathBuf::from("/srv/hostel/bills"));
        assert_eq!(config.bill_options().institution, "Hostel Office");
        assert!(config.sync_enabled);
        assert!(config.sync_capability().unwrap().is_enabled());
    }

    #[test]
    fn test_blank_values_keep_defaults() {
        let config = config_from(&[(ENV_DATA_FILE, "  "), (ENV_SYNC_URL, "")]).unwrap();
        assert_eq!(config.data_file, PathBuf::from(DEFAULT_DATA_FILE));
        assert_eq!(config.sync_url, None);
    }

    #[test]
    fn test_url_without_flag_stays_disabled() {
        let config = config_from(&[(ENV_SYNC_URL, "https://example.org/sheet.csv")]).unwrap();
        assert!(!config.sync_capability().unwrap().is_enabled());
    }

    #[test]
    fn test_enabled_without_url_is_error() {
        let err = config_from(&[(ENV_SYNC_ENABLED, "true")]).unwrap_err();
        assert!(matches!(err, BillingError::Config(_)));
    }

    #[test]
    fn test_bad_flag_is_error() {
        let err = config_from(&[(ENV_SYNC_ENABLED, "maybe")]).unwrap_err();
        assert!(matches!(err, BillingError::Config(_)));
    }
}
