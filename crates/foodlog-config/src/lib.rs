use foodlog_engine::NutritionFacts;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_LOG_HEADING: &str = "Food Log";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Daily targets, one optional value per nutrient key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fats: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturated_fats: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>,
}

impl GoalsConfig {
    /// The goals that are set, keyed by nutrient key.
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        [
            ("calories", self.calories),
            ("fats", self.fats),
            ("saturated_fats", self.saturated_fats),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("sugar", self.sugar),
            ("fiber", self.fiber),
            ("sodium", self.sodium),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Title of the level-2 heading that opens the food log section.
    pub log_heading: String,
    /// Document to read when none is given on the command line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_document: Option<PathBuf>,
    pub goals: GoalsConfig,
    /// Per-100 nutrition facts by food name.
    pub foods: BTreeMap<String, NutritionFacts>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_heading: DEFAULT_LOG_HEADING.to_string(),
            default_document: None,
            goals: GoalsConfig::default(),
            foods: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the default document path
        config.default_document = config
            .default_document
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/markdown-foodlog");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    fn sample() -> Config {
        let mut foods = BTreeMap::new();
        foods.insert(
            "apple".to_string(),
            NutritionFacts {
                calories: Some(52.0),
                carbs: Some(14.0),
                serving_size: Some(180.0),
                ..NutritionFacts::default()
            },
        );
        Config {
            log_heading: "Meals".to_string(),
            default_document: None,
            goals: GoalsConfig {
                calories: Some(2200.0),
                protein: Some(120.0),
                ..GoalsConfig::default()
            },
            foods,
        }
    }

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/markdown-foodlog/config.toml"));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.log_heading, "Food Log");
        assert!(config.goals.is_empty());
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let original = sample();
        let toml_str = toml::to_string(&original).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(deserialized, original);
    }

    #[test]
    fn test_parse_handwritten_config() {
        let config_content = r#"
log_heading = "Diet"

[goals]
calories = 2000
sugar = 40.5

[foods.oats]
calories = 380
protein = 13

[foods."Greek Yogurt"]
calories = 97
serving_size = 150
"#;
        let config: Config = toml::from_str(config_content).unwrap();

        assert_eq!(config.log_heading, "Diet");
        assert_eq!(config.goals.entries(), vec![("calories", 2000.0), ("sugar", 40.5)]);
        assert_eq!(config.foods.len(), 2);
        assert_eq!(config.foods["oats"].protein, Some(13.0));
        assert_eq!(config.foods["Greek Yogurt"].serving_size, Some(150.0));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test/path");
        let expanded = Config::expand_path(&path).unwrap();

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_default_document_with_env_var() {
        unsafe {
            env::set_var("FOODLOG_TEST_NOTES", "/custom/notes");
        }

        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_file,
            "default_document = \"$FOODLOG_TEST_NOTES/today.md\"\n",
        )
        .unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();
        assert_eq!(
            config.default_document,
            Some(PathBuf::from("/custom/notes/today.md"))
        );

        unsafe {
            env::remove_var("FOODLOG_TEST_NOTES");
        }
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_invalid_config_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "goals = 12\n").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let test_config = sample();

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }
}
