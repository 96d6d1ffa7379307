use eframe::egui;

use crate::state::{AppState, Tab};
use crate::ui::{charts, map, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CollisionDashApp {
    pub state: AppState,
}

impl CollisionDashApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for CollisionDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics + tabs ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Montreal Crash Severity Analysis Dashboard");
            ui.separator();

            if self.state.dataset.is_some() {
                panels::key_metrics(ui, &self.state);
                ui.separator();
            }

            ui.horizontal(|ui| {
                for tab in Tab::ALL {
                    ui.selectable_value(&mut self.state.active_tab, tab, tab.label());
                }
            });
            ui.separator();

            match self.state.active_tab {
                Tab::Map => map::collision_map(ui, &self.state),
                Tab::Distributions => charts::distribution_charts(ui, &self.state),
                Tab::Statistics => charts::statistics_tables(ui, &self.state),
            }
        });
    }
}
