use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::Dimension;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel: one combo box per dimension.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    // Collect the click and apply it after the widgets are drawn, so the
    // summary is recomputed at most once per frame.
    let mut picked: Option<(Dimension, String)> = None;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for dim in Dimension::ALL {
                let current = state.selected_label(dim);
                ui.strong(dim.label());
                egui::ComboBox::from_id_salt(dim.key())
                    .selected_text(current.as_str())
                    .width(ui.available_width() - 8.0)
                    .show_ui(ui, |ui: &mut Ui| {
                        for label in state.catalog.labels_for(dim) {
                            if ui.selectable_label(current == label, label.as_str()).clicked() {
                                picked = Some((dim, label));
                            }
                        }
                    });
                ui.add_space(6.0);
            }

            ui.separator();
            if ui
                .add_enabled(
                    !state.selection.is_unconstrained(),
                    egui::Button::new("Reset filters"),
                )
                .clicked()
            {
                state.reset_filters();
            }
        });

    if let Some((dim, label)) = picked {
        // Rejections are logged and surfaced in the top bar by the state.
        let _ = state.select_label(dim, &label);
    }
}

// ---------------------------------------------------------------------------
// Key metrics
// ---------------------------------------------------------------------------

pub fn key_metrics(ui: &mut Ui, state: &AppState) {
    ui.heading("Key Metrics");
    ui.columns(2, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Total Collisions", state.summary.total);
        metric(&mut cols[1], "Injury Collisions", state.summary.injuries);
    });
}

fn metric(ui: &mut Ui, label: &str, value: usize) {
    ui.label(label);
    ui.label(RichText::new(value.to_string()).size(28.0).strong());
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} collisions loaded, {} match the filters",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open collision data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        // The error is already logged and stored in `status_message`.
        let _ = state.load_path(&path);
    }
}
