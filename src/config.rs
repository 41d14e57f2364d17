use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Optional settings file looked up in the working directory.
pub const CONFIG_FILE: &str = "meteor_dashboard.json";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Where the artifacts live and how much of them to show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub dataset_path: PathBuf,
    pub clusters_path: PathBuf,
    pub anomalies_path: PathBuf,

    /// Rows of the raw dataset shown in the preview.
    pub preview_rows: usize,
    /// Rows of the clustering artifact shown above the map.
    pub cluster_sample_rows: usize,
    /// Rows of the ranked anomaly table.
    pub top_anomalies: usize,

    /// Tile zoom level of the map base layer.
    pub map_zoom: u8,
    pub map_height: f32,
    /// `{z}`, `{x}` and `{y}` are substituted per tile.
    pub tile_url: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("meteor_data.csv"),
            clusters_path: PathBuf::from("artifacts/clusters.parquet"),
            anomalies_path: PathBuf::from("artifacts/anomaly_scores.parquet"),
            preview_rows: 10,
            cluster_sample_rows: 5,
            top_anomalies: 20,
            map_zoom: 1,
            map_height: 500.0,
            tile_url: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Read a JSON settings file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Defaults, overridden by `path` when it exists and parses.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => {
                log::info!("Using settings from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring settings file: {e:#}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_pipeline_outputs() {
        let config = DashboardConfig::default();
        assert_eq!(config.clusters_path, Path::new("artifacts/clusters.parquet"));
        assert_eq!(config.anomalies_path, Path::new("artifacts/anomaly_scores.parquet"));
        assert_eq!(
            (config.preview_rows, config.cluster_sample_rows, config.top_anomalies),
            (10, 5, 20)
        );
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "top_anomalies": 50 }"#).unwrap();

        let config = DashboardConfig::load_or_default(&path);
        assert_eq!(config.top_anomalies, 50);
        assert_eq!(config.preview_rows, 10);
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();

        assert!(DashboardConfig::from_file(&path).is_err());
        assert_eq!(DashboardConfig::load_or_default(&path), DashboardConfig::default());
    }
}
