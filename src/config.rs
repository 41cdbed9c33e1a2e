//! Dashboard configuration.
//!
//! Loaded from the JSON file named by `MOTIVIA_CONFIG`, else `motivia.json`
//! in the working directory, else built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::color::PaletteId;
use crate::data::loader::LoadOptions;

pub const CONFIG_ENV: &str = "MOTIVIA_CONFIG";
pub const CONFIG_FILE: &str = "motivia.json";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Input datasets.
    #[serde(default)]
    pub data: DataConfig,

    /// Chart appearance.
    #[serde(default)]
    pub charts: ChartConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_teachers")]
    pub teachers: DatasetSource,

    #[serde(default = "default_students")]
    pub students: DatasetSource,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            teachers: default_teachers(),
            students: default_students(),
        }
    }
}

fn default_teachers() -> DatasetSource {
    DatasetSource {
        path: PathBuf::from("Data/profs.csv"),
        delimiter: default_delimiter(),
        index_column: true,
    }
}

fn default_students() -> DatasetSource {
    DatasetSource {
        path: PathBuf::from("Data/eleves.csv"),
        delimiter: default_delimiter(),
        index_column: false,
    }
}

/// Where one cohort's answers live and how the file is laid out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSource {
    pub path: PathBuf,

    /// Field delimiter for delimited text.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// The first column is an exported row index.
    #[serde(default)]
    pub index_column: bool,
}

fn default_delimiter() -> char {
    ','
}

impl DatasetSource {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            delimiter: u8::try_from(self.delimiter).unwrap_or(b','),
            index_column: self.index_column,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Height of each chart in points.
    #[serde(default = "default_height")]
    pub height: f32,

    /// Palette for charts that do not name one.
    #[serde(default)]
    pub palette: PaletteId,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            height: default_height(),
            palette: PaletteId::default(),
        }
    }
}

fn default_height() -> f32 {
    360.0
}

impl DashboardConfig {
    /// Load from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Resolve the config location and load it, falling back to defaults
    /// when no file exists.
    pub fn discover() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

        if path.exists() {
            log::info!("Using configuration from {}", path.display());
            Self::from_file(&path)
        } else {
            log::debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.data.teachers.path, PathBuf::from("Data/profs.csv"));
        assert!(config.data.teachers.index_column);
        assert!(!config.data.students.index_column);
        assert_eq!(config.charts.palette, PaletteId::Plotly);
    }

    #[test]
    fn test_parse_partial_config() {
        let json = r#"{
            "data": { "students": { "path": "exports/eleves.tsv", "delimiter": "\t" } },
            "charts": { "palette": "Pastel" }
        }"#;
        let config: DashboardConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.data.students.path, PathBuf::from("exports/eleves.tsv"));
        assert_eq!(config.data.students.load_options().delimiter, b'\t');
        assert_eq!(config.data.teachers, default_teachers());
        assert_eq!(config.charts.palette, PaletteId::Pastel);
        assert_eq!(config.charts.height, 360.0);
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("motivia.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = DashboardConfig::from_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
    }
}
