use std::path::Path;
use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::data::aggregate::{SeverityPalette, Summary};
use crate::data::catalog::{self, FilterCatalog, ALL_LABEL};
use crate::data::filter::{self, FilterSelection, SelectionError};
use crate::data::loader;
use crate::data::model::{Dataset, Dimension};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Map,
    Distributions,
    Statistics,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Map, Tab::Distributions, Tab::Statistics];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Map => "Map",
            Tab::Distributions => "Distributions",
            Tab::Statistics => "Statistics",
        }
    }
}

/// The full UI state, independent of rendering.
///
/// Every filter change recomputes `visible_indices` and `summary` from
/// scratch before the next frame is drawn.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Arc<Dataset>>,

    /// Selectable values, derived once per load.
    pub catalog: FilterCatalog,

    pub selection: FilterSelection,

    /// Indices of collisions passing the current selection.
    pub visible_indices: Vec<usize>,

    /// Metrics, map points and frequency tables for `visible_indices`.
    pub summary: Summary,

    pub active_tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: None,
            catalog: FilterCatalog::default(),
            selection: FilterSelection::new(),
            visible_indices: Vec::new(),
            summary: Summary::empty(),
            active_tab: Tab::default(),
            status_message: None,
        }
    }

    pub fn palette(&self) -> SeverityPalette {
        self.config.severity_palette()
    }

    /// Ingest a newly loaded dataset: rebuild the catalog, clear filters.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.catalog = FilterCatalog::build(&dataset);
        self.selection.reset_all();
        self.dataset = Some(Arc::new(dataset));
        self.status_message = None;
        self.refilter();
    }

    /// Load `path` with the configured column mapping. On failure the
    /// current dataset stays active.
    pub fn load_path(&mut self, path: &Path) -> anyhow::Result<()> {
        match loader::load_file(path, &self.config.columns) {
            Ok(dataset) => {
                log::info!("Loaded {} collisions from {}", dataset.len(), path.display());
                self.set_dataset(dataset);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                self.status_message = Some(format!("Error: {e:#}"));
                Err(e)
            }
        }
    }

    /// Recompute the view and every aggregate for the current selection.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            self.visible_indices.clear();
            self.summary = Summary::empty();
            return;
        };
        let view = match filter::checked_apply(ds, &self.catalog, &self.selection) {
            Ok(view) => view,
            Err(e) => {
                log::error!("invalid selection, clearing filters: {e}");
                self.status_message = Some(e.to_string());
                self.selection.reset_all();
                filter::apply(ds, &self.selection)
            }
        };
        self.summary = Summary::compute(&view, &self.config.severity_palette());
        log::debug!(
            "selection {:?} matches {} of {} collisions",
            self.selection,
            view.len(),
            ds.len()
        );
        self.visible_indices = view.into_indices();
    }

    /// Apply a label picked in a selection control. Labels that are not in
    /// the catalog are rejected and leave the selection unchanged.
    pub fn select_label(&mut self, dim: Dimension, label: &str) -> Result<(), SelectionError> {
        if label == ALL_LABEL {
            self.selection.clear(dim);
        } else {
            let value = self
                .catalog
                .value_for_label(dim, label)
                .cloned()
                .ok_or_else(|| SelectionError::ValueNotInCatalog {
                    dimension: dim,
                    value: label.to_string(),
                });
            match value {
                Ok(value) => self.selection.set(dim, value),
                Err(e) => {
                    log::warn!("rejected selection: {e}");
                    self.status_message = Some(e.to_string());
                    return Err(e);
                }
            }
        }
        self.refilter();
        Ok(())
    }

    /// Replace the whole selection from `(dimension key, label)` pairs.
    pub fn apply_labels<'a, I>(&mut self, labels: I) -> Result<(), SelectionError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.selection = FilterSelection::from_labels(&self.catalog, labels)?;
        self.refilter();
        Ok(())
    }

    /// Label currently shown in the control for `dim`.
    pub fn selected_label(&self, dim: Dimension) -> String {
        self.selection
            .get(dim)
            .map_or_else(|| ALL_LABEL.to_string(), catalog::option_label)
    }

    pub fn reset_filters(&mut self) {
        self.selection.reset_all();
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Record, Severity, Weekday};

    fn state_with_data() -> AppState {
        let mut state = AppState::default();
        state.set_dataset(Dataset::from_records(vec![
            Record {
                year: Some(2020),
                weekday: Some(Weekday::Monday),
                latitude: Some(45.5),
                longitude: Some(-73.6),
                ..Record::new(Severity::Yes)
            },
            Record {
                year: Some(2020),
                weekday: Some(Weekday::Tuesday),
                latitude: Some(45.6),
                longitude: Some(-73.5),
                ..Record::new(Severity::No)
            },
            Record {
                year: Some(2021),
                weekday: Some(Weekday::Monday),
                ..Record::new(Severity::Yes)
            },
        ]));
        state
    }

    #[test]
    fn loading_shows_everything() {
        let state = state_with_data();
        assert_eq!(state.visible_indices, vec![0, 1, 2]);
        assert_eq!(state.summary.total, 3);
        assert_eq!(state.summary.injuries, 2);
        assert_eq!(state.selected_label(Dimension::Year), "All");
    }

    #[test]
    fn selecting_labels_recomputes_the_summary() {
        let mut state = state_with_data();
        state.select_label(Dimension::Year, "2020").unwrap();
        assert_eq!(state.visible_indices, vec![0, 1]);
        assert_eq!(state.summary.points.len(), 2);
        assert_eq!(state.selected_label(Dimension::Year), "2020");

        state.select_label(Dimension::Weekday, "Tuesday").unwrap();
        assert_eq!(state.summary.total, 1);
        assert_eq!(state.summary.injuries, 0);

        state.select_label(Dimension::Year, "All").unwrap();
        assert_eq!(state.visible_indices, vec![1]);

        state.reset_filters();
        assert_eq!(state.summary.total, 3);
    }

    #[test]
    fn unknown_label_is_rejected_without_changing_the_view() {
        let mut state = state_with_data();
        state.select_label(Dimension::Year, "2020").unwrap();
        let err = state.select_label(Dimension::Year, "1999").unwrap_err();
        assert!(matches!(err, SelectionError::ValueNotInCatalog { .. }));
        assert_eq!(state.visible_indices, vec![0, 1]);
        assert!(state.status_message.is_some());
    }

    #[test]
    fn initial_filters_from_labels() {
        let mut state = state_with_data();
        state
            .apply_labels([("year", "2020"), ("weekday", "Monday")])
            .unwrap();
        assert_eq!(state.visible_indices, vec![0]);

        assert!(state.apply_labels([("borough", "Verdun")]).is_err());
        assert_eq!(state.visible_indices, vec![0]);
    }

    #[test]
    fn stale_selection_is_cleared_on_refilter() {
        let mut state = state_with_data();
        state.selection.set(Dimension::Year, 1999);
        state.refilter();
        assert!(state.selection.is_unconstrained());
        assert_eq!(state.summary.total, 3);
    }

    #[test]
    fn value_spelled_all_stays_selectable() {
        let mut state = AppState::default();
        state.set_dataset(Dataset::from_records(vec![
            Record {
                weather_group: Some("All".to_string()),
                ..Record::new(Severity::Yes)
            },
            Record {
                weather_group: Some("Clear".to_string()),
                ..Record::new(Severity::No)
            },
        ]));

        state.select_label(Dimension::WeatherGroup, "\"All\"").unwrap();
        assert_eq!(state.visible_indices, vec![0]);
        assert_eq!(state.selected_label(Dimension::WeatherGroup), "\"All\"");

        state.select_label(Dimension::WeatherGroup, ALL_LABEL).unwrap();
        assert_eq!(state.visible_indices, vec![0, 1]);
    }

    #[test]
    fn no_dataset_means_empty_summary() {
        let mut state = AppState::default();
        state.refilter();
        assert_eq!(state.summary, Summary::empty());
        assert!(state.summary.center.is_none());
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let mut state = state_with_data();
        assert!(state.load_path(Path::new("does-not-exist.csv")).is_err());
        assert_eq!(state.dataset.as_ref().map(|d| d.len()), Some(3));
        assert!(state.status_message.is_some());
    }
}
