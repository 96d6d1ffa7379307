use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Plot};

use crate::color::bar_colors;
use crate::data::aggregate::FrequencyTable;
use crate::data::model::Dimension;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Distributions tab – bar charts
// ---------------------------------------------------------------------------

pub fn distribution_charts(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Distribution of Categories");
            ui.columns(3, |cols: &mut [Ui]| {
                let [surface, lighting, weather] = cols else {
                    return;
                };
                category_chart(
                    surface,
                    state,
                    Dimension::RoadSurfaceGroup,
                    "Road Surface Conditions",
                );
                category_chart(lighting, state, Dimension::LightingGroup, "Lighting Conditions");
                category_chart(weather, state, Dimension::WeatherGroup, "Weather Conditions");
            });

            ui.separator();
            category_chart(ui, state, Dimension::Severity, "Injury vs No Injury");

            ui.separator();
            ui.heading("When Collisions Happen");
            ui.columns(2, |cols: &mut [Ui]| {
                category_chart(&mut cols[0], state, Dimension::Hour, "Hour of Day");
                category_chart(&mut cols[1], state, Dimension::Weekday, "Day of Week");
            });
            ui.columns(2, |cols: &mut [Ui]| {
                category_chart(&mut cols[0], state, Dimension::Month, "Month");
                category_chart(&mut cols[1], state, Dimension::Year, "Year");
            });
        });
}

fn category_chart(ui: &mut Ui, state: &AppState, dim: Dimension, title: &str) {
    ui.strong(title);
    let Some(table) = state.summary.table(dim) else {
        return;
    };
    if table.is_empty() {
        ui.label("No data.");
        return;
    }

    let colors = bar_colors(table, &state.palette());
    let labels: Vec<String> = table.iter().map(|(v, _)| v.to_string()).collect();
    let bars: Vec<Bar> = table
        .iter()
        .zip(colors)
        .enumerate()
        .map(|(i, ((value, count), color))| {
            Bar::new(i as f64, count as f64)
                .name(value.to_string())
                .fill(color)
                .width(0.7)
        })
        .collect();

    Plot::new(("distribution", dim.key()))
        .height(240.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if idx < 0.0 || (mark.value - idx).abs() > 1e-6 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

// ---------------------------------------------------------------------------
// Statistics tab – frequency tables as text
// ---------------------------------------------------------------------------

pub fn statistics_tables(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let summary = &state.summary;
            ui.label(format!(
                "{} collisions: {} with injuries, {} without",
                summary.total, summary.injuries, summary.non_injuries
            ));
            ui.separator();
            for dim in Dimension::ALL {
                let Some(table) = state.summary.table(dim) else {
                    continue;
                };
                let header = format!("{}  ({} values)", dim.label(), table.len());
                egui::CollapsingHeader::new(RichText::new(header).strong())
                    .id_salt(dim.key())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.push_id(dim.key(), |ui: &mut Ui| frequency_grid(ui, table));
                    });
            }
        });
}

fn frequency_grid(ui: &mut Ui, table: &FrequencyTable) {
    if table.is_empty() {
        ui.label("No data.");
        return;
    }
    let total = table.total() as f64;

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto().at_least(160.0))
        .column(Column::auto().at_least(70.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Value");
            });
            header.col(|ui| {
                ui.strong("Count");
            });
            header.col(|ui| {
                ui.strong("Share");
            });
        })
        .body(|mut body| {
            for (value, count) in table.iter() {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(value.to_string());
                    });
                    row.col(|ui| {
                        ui.label(count.to_string());
                    });
                    row.col(|ui| {
                        ui.label(format!("{:.1}%", 100.0 * count as f64 / total));
                    });
                });
            }
        });
}
