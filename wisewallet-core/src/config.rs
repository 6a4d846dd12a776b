//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "app": { "appId": "wise-wallet-v1", "defaultCurrency": "USD", "pollIntervalMs": 1000 },
//!   "advice": { "apiKey": "...", "model": "gemini-2.5-flash", "recentLimit": 20 }
//! }
//! ```
//! Fields this crate does not know about are preserved on save.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::adapters::gemini::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::services::DEFAULT_RECENT_LIMIT;
use crate::store::DEFAULT_APP_ID;

pub const SETTINGS_FILE: &str = "settings.json";

const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(default)]
    advice: AdviceSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    poll_interval_ms: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdviceSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recent_limit: Option<usize>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Advice provider settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdviceConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub recent_limit: usize,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

/// Wise Wallet configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub app_id: String,
    pub default_currency: String,
    pub advice: AdviceConfig,
    /// How often `ww watch` polls for changes from other sessions
    pub poll_interval_ms: u64,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_id: DEFAULT_APP_ID.to_string(),
            default_currency: DEFAULT_CURRENCY.to_string(),
            advice: AdviceConfig::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            _raw_settings: SettingsFile::default(),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load config from the data directory
    ///
    /// Environment overrides:
    /// - `WISE_WALLET_APP_ID`
    /// - `GEMINI_API_KEY`, then `API_KEY`
    /// - `WISE_WALLET_ADVICE_MODEL`
    pub fn load(data_dir: &Path) -> Result<Self> {
        let settings_path = data_dir.join(SETTINGS_FILE);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let defaults = AdviceConfig::default();
        let app_id = non_empty_env("WISE_WALLET_APP_ID")
            .or_else(|| raw.app.app_id.clone())
            .unwrap_or_else(|| DEFAULT_APP_ID.to_string());
        let api_key = non_empty_env("GEMINI_API_KEY")
            .or_else(|| non_empty_env("API_KEY"))
            .or_else(|| raw.advice.api_key.clone())
            .filter(|k| !k.trim().is_empty());
        let model = non_empty_env("WISE_WALLET_ADVICE_MODEL")
            .or_else(|| raw.advice.model.clone())
            .unwrap_or(defaults.model);

        Ok(Self {
            app_id,
            default_currency: raw
                .app
                .default_currency
                .clone()
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            advice: AdviceConfig {
                api_key,
                model,
                endpoint: raw.advice.endpoint.clone().unwrap_or(defaults.endpoint),
                recent_limit: raw.advice.recent_limit.unwrap_or(defaults.recent_limit),
            },
            poll_interval_ms: raw.app.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            _raw_settings: raw,
        })
    }

    /// Save config to the data directory
    /// Preserves other settings that this crate doesn't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let settings_path = data_dir.join(SETTINGS_FILE);

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            self._raw_settings.clone()
        };

        settings.app.app_id = Some(self.app_id.clone());
        settings.app.default_currency = Some(self.default_currency.clone());
        settings.app.poll_interval_ms = Some(self.poll_interval_ms);
        settings.advice.model = Some(self.advice.model.clone());
        settings.advice.endpoint = Some(self.advice.endpoint.clone());
        settings.advice.recent_limit = Some(self.advice.recent_limit);
        if self._raw_settings.advice.api_key.is_some() {
            settings.advice.api_key = self._raw_settings.advice.api_key.clone();
        }

        std::fs::create_dir_all(data_dir)?;
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Set the advice API key; unlike env overrides it is written on save
    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        let api_key = api_key.into();
        self.advice.api_key = Some(api_key.clone());
        self._raw_settings.advice.api_key = Some(api_key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // Env-dependent fields (app id, api key, model) are not asserted

    #[test]
    fn test_defaults_without_settings_file() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.default_currency, "USD");
        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(config.advice.recent_limit, 20);
        assert_eq!(config.advice.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_load_reads_settings() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"app":{"defaultCurrency":"EUR","pollIntervalMs":250},"advice":{"recentLimit":5}}"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.default_currency, "EUR");
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.advice.recent_limit, 5);
    }

    #[test]
    fn test_malformed_settings_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "{oops").unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.default_currency, "USD");
    }

    #[test]
    fn test_save_preserves_unknown_fields() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"app":{"theme":"dark"},"desktop":{"window":1}}"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        config.default_currency = "GBP".to_string();
        config.save(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["app"]["theme"], "dark");
        assert_eq!(value["app"]["defaultCurrency"], "GBP");
        assert_eq!(value["desktop"]["window"], 1);
    }

    #[test]
    fn test_set_api_key_is_saved() {
        let dir = tempdir().unwrap();
        let mut config = Config::load(dir.path()).unwrap();
        config.set_api_key("secret");
        config.save(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["advice"]["apiKey"], "secret");
    }
}
