use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::aggregate::{Rgb, SeverityPalette};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "COLLISION_DASH_CONFIG";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "collision-dash.json";

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// On-disk column names for the ten record fields. Defaults match the
/// cleaned collisions export.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub year: String,
    pub month: String,
    pub hour: String,
    pub weekday: String,
    pub weather_group: String,
    pub lighting_group: String,
    pub road_surface_group: String,
    pub severity: String,
    pub latitude: String,
    pub longitude: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        ColumnMapping {
            year: "year".to_string(),
            month: "month".to_string(),
            hour: "hour".to_string(),
            weekday: "accident_day_of_week".to_string(),
            weather_group: "weather_group".to_string(),
            lighting_group: "lighting_group".to_string(),
            road_surface_group: "road_surface_group".to_string(),
            severity: "accident_severity".to_string(),
            latitude: "latitude".to_string(),
            longitude: "longitude".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Every field is optional in the JSON file.
///
/// ```json
/// {
///   "dataset_path": "collisions_cleaned_streamlit.csv",
///   "columns": { "weekday": "day_of_week" },
///   "injury_color": [255, 0, 0],
///   "point_radius": 2.5,
///   "initial_filters": { "year": "2020", "weather_group": "Snow" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Dataset opened at startup.
    pub dataset_path: Option<PathBuf>,
    pub columns: ColumnMapping,
    pub injury_color: Rgb,
    pub no_injury_color: Rgb,
    /// Marker radius on the map, in points.
    pub point_radius: f32,
    /// Dimension key → option label applied right after the startup load.
    pub initial_filters: BTreeMap<String, String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let palette = SeverityPalette::default();
        DashboardConfig {
            dataset_path: None,
            columns: ColumnMapping::default(),
            injury_color: palette.injury,
            no_injury_color: palette.no_injury,
            point_radius: 2.0,
            initial_filters: BTreeMap::new(),
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// `$COLLISION_DASH_CONFIG` if set, else `./collision-dash.json` if it
    /// exists, else defaults.
    pub fn discover() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Self::load(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::load(local);
        }
        log::debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    pub fn severity_palette(&self) -> SeverityPalette {
        SeverityPalette {
            injury: self.injury_color,
            no_injury: self.no_injury_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let cfg = DashboardConfig::from_json("{}").unwrap();
        assert_eq!(cfg, DashboardConfig::default());
        assert_eq!(cfg.columns.weekday, "accident_day_of_week");
        assert_eq!(cfg.severity_palette(), SeverityPalette::default());
    }

    #[test]
    fn partial_column_mapping_keeps_other_defaults() {
        let cfg = DashboardConfig::from_json(
            r#"{
                "dataset_path": "data/collisions.parquet",
                "columns": { "weekday": "day_of_week", "severity": "injury" },
                "no_injury_color": [0, 0, 128],
                "initial_filters": { "year": "2020" }
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.dataset_path, Some(PathBuf::from("data/collisions.parquet")));
        assert_eq!(cfg.columns.weekday, "day_of_week");
        assert_eq!(cfg.columns.severity, "injury");
        assert_eq!(cfg.columns.latitude, "latitude");
        assert_eq!(cfg.severity_palette().no_injury, [0, 0, 128]);
        assert_eq!(cfg.severity_palette().injury, SeverityPalette::INJURY_RED);
        assert_eq!(cfg.initial_filters.get("year").map(String::as_str), Some("2020"));
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(DashboardConfig::from_json(r#"{ "point_radius": "big" }"#).is_err());
    }
}
