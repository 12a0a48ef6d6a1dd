// Application settings
// Loaded from ~/.config/profitgrid/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Store
    #[serde(rename = "store.path", skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,  // None = platform data dir

    // Metrics
    #[serde(rename = "metrics.activityDiscount")]
    pub activity_discount: f64,

    #[serde(rename = "metrics.defaultAdBidRatio")]
    pub default_ad_bid_ratio: f64,

    // Export
    #[serde(rename = "export.costColumn")]
    pub cost_column: String,

    #[serde(rename = "export.profitColumn")]
    pub profit_column: String,

    // Display
    #[serde(rename = "display.previewRows")]
    pub preview_rows: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Store
            store_path: None,
            // Metrics
            activity_discount: 0.95,
            default_ad_bid_ratio: 1.0,
            // Export
            cost_column: "cost".to_string(),
            profit_column: "profit".to_string(),
            // Display
            preview_rows: 100,
        }
    }
}

const DEFAULT_CONFIG: &str = r#"{
    // Product store (SQLite). Omit to use the platform data directory.
    // "store.path": "/path/to/products.db",

    // Metrics
    // Activity price = declared price x discount
    "metrics.activityDiscount": 0.95,
    // Used when a product has no ad bid ratio; <= 0 disables the ad fee
    "metrics.defaultAdBidRatio": 1.0,

    // Column labels appended to profit results
    "export.costColumn": "cost",
    "export.profitColumn": "profit",

    // Rows shown in terminal previews
    "display.previewRows": 100
}
"#;

impl Settings {
    /// Every key accepted in settings.json
    pub const KEYS: &'static [&'static str] = &[
        "store.path",
        "metrics.activityDiscount",
        "metrics.defaultAdBidRatio",
        "export.costColumn",
        "export.profitColumn",
        "display.previewRows",
    ];

    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("profitgrid");
        config_dir.join("settings.json")
    }

    /// Default product store location when `store.path` is unset
    pub fn default_store_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("profitgrid")
            .join("products.db")
    }

    /// Configured store path, or the platform default
    pub fn effective_store_path(&self) -> PathBuf {
        self.store_path.clone().unwrap_or_else(Self::default_store_path)
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`. A missing file is created with commented
    /// defaults; unreadable or malformed files yield defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            create_default_file(path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("error parsing {}: {}; using default settings", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON, ignoring lines that start with `//`
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned)
    }

    /// Save current settings to disk
    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Set one dotted key from command-line text. The value is read as JSON
    /// first, then as a plain string, so `0.9` and `利润` both work.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        if !Self::KEYS.contains(&key) {
            return Err(format!("unknown setting '{}' (known: {})", key, Self::KEYS.join(", ")));
        }

        let mut candidates = Vec::with_capacity(2);
        if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(value) {
            candidates.push(parsed);
        }
        candidates.push(serde_json::Value::String(value.to_string()));

        let mut last_err = String::new();
        for candidate in candidates {
            let mut json = serde_json::to_value(&*self).map_err(|e| e.to_string())?;
            let Some(map) = json.as_object_mut() else {
                return Err("settings did not serialize to an object".to_string());
            };
            map.insert(key.to_string(), candidate);
            match serde_json::from_value::<Settings>(json) {
                Ok(updated) => {
                    *self = updated;
                    return Ok(());
                }
                Err(e) => last_err = e.to_string(),
            }
        }
        Err(format!("invalid value for '{}': {}", key, last_err))
    }
}

/// Create default settings file with comments
fn create_default_file(path: &Path) {
    // Ensure directory exists
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            log::warn!("error creating config directory: {}", e);
            return;
        }
    }

    if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
        log::warn!("error writing default settings.json: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_file_parses_to_defaults() {
        assert_eq!(Settings::parse(DEFAULT_CONFIG).unwrap(), Settings::default());
    }

    #[test]
    fn missing_file_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings::load_from(&path);
        assert_eq!(settings, Settings::default());
        assert!(path.exists());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let settings = Settings::parse(
            r#"{
            // only one key
            "export.profitColumn": "利润"
        }"#,
        )
        .unwrap();
        assert_eq!(settings.profit_column, "利润");
        assert_eq!(settings.cost_column, "cost");
        assert_eq!(settings.preview_rows, 100);
    }

    #[test]
    fn malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            store_path: Some(PathBuf::from("/tmp/p.db")),
            default_ad_bid_ratio: 0.0,
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn set_parses_by_field_type() {
        let mut settings = Settings::default();
        settings.set("metrics.defaultAdBidRatio", "0").unwrap();
        settings.set("export.profitColumn", "利润").unwrap();
        settings.set("export.costColumn", "2024").unwrap();
        settings.set("store.path", "/tmp/p.db").unwrap();
        assert_eq!(settings.default_ad_bid_ratio, 0.0);
        assert_eq!(settings.profit_column, "利润");
        assert_eq!(settings.cost_column, "2024");
        assert_eq!(settings.store_path, Some(PathBuf::from("/tmp/p.db")));

        settings.set("store.path", "null").unwrap();
        assert_eq!(settings.store_path, None);
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_value() {
        let mut settings = Settings::default();
        assert!(settings.set("metrics.discount", "0.9").unwrap_err().contains("unknown setting"));
        assert!(settings.set("display.previewRows", "many").unwrap_err().contains("invalid value"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn keys_match_serialized_fields() {
        let settings = Settings {
            store_path: Some(PathBuf::from("x")),
            ..Settings::default()
        };
        let json = serde_json::to_value(&settings).unwrap();
        let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        let mut expected = Settings::KEYS.to_vec();
        keys.sort();
        expected.sort();
        assert_eq!(keys, expected);
    }

    #[test]
    fn store_path_fallback() {
        let settings = Settings::default();
        assert!(settings.effective_store_path().ends_with("products.db"));
    }
}
