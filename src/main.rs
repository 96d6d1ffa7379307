mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::Context;
use app::CollisionDashApp;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut config = DashboardConfig::discover().context("loading dashboard config")?;
    if let Some(path) = std::env::args_os().nth(1) {
        config.dataset_path = Some(PathBuf::from(path));
    }

    // A dataset named at startup must load; the dashboard never runs on a
    // partially loaded table.
    let mut state = AppState::new(config);
    if let Some(path) = state.config.dataset_path.clone() {
        state
            .load_path(&path)
            .with_context(|| format!("loading dataset {}", path.display()))?;

        let filters = state.config.initial_filters.clone();
        state
            .apply_labels(filters.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .context("applying initial_filters from config")?;
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Collision Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(CollisionDashApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard: {e}"))
}
