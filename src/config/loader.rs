use crate::intersect::FeatureSelection;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for an intersection run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Class-name substrings excluded from the string reference
    /// intersection (library and framework packages)
    pub filters: Vec<String>,

    /// Reducers to run
    pub features: FeatureSelection,

    /// Report configuration
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output format: terminal, json
    pub format: String,

    /// Maximum items listed per feature family in terminal output
    pub max_items: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            filters: vec![
                "Landroid/".to_string(),
                "Landroidx/".to_string(),
                "Lkotlin/".to_string(),
                "Lkotlinx/".to_string(),
                "Ljava/".to_string(),
                "Ljavax/".to_string(),
                "Lcom/google/".to_string(),
                "Lokhttp3/".to_string(),
            ],
            features: FeatureSelection::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: "terminal".to_string(),
            max_items: 50,
        }
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            _ => {
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(dir: &Path) -> Result<Self> {
        let default_names = [
            ".apkintersect.yml",
            ".apkintersect.yaml",
            ".apkintersect.toml",
            "apkintersect.yml",
            "apkintersect.yaml",
            "apkintersect.toml",
        ];

        for name in &default_names {
            let path = dir.join(name);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Add filters, skipping ones already present
    pub fn add_filters<I: IntoIterator<Item = String>>(&mut self, filters: I) {
        for filter in filters {
            if !self.filters.contains(&filter) {
                self.filters.push(filter);
            }
        }
    }
}
