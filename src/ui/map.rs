use std::collections::BTreeMap;

use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, MarkerShape, Plot, PlotPoints, Points};

use crate::color::to_color32;
use crate::data::aggregate::Rgb;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Collision map (Map tab)
// ---------------------------------------------------------------------------

/// Scatter of collision locations, coloured by severity and framed around the
/// mean position.
pub fn collision_map(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to explore collisions  (File → Open…)");
        });
        return;
    }

    ui.heading("Collision Map");

    let summary = &state.summary;
    let Some(center) = summary.center else {
        ui.colored_label(Color32::YELLOW, "No data for the selected filters.");
        return;
    };

    ui.label(format!(
        "{} of {} collisions plotted, centred on {:.4}, {:.4}",
        summary.points.len(),
        summary.total,
        center.latitude,
        center.longitude
    ));

    let palette = state.palette();
    let mut series: BTreeMap<Rgb, Vec<[f64; 2]>> = BTreeMap::new();
    for p in &summary.points {
        series
            .entry(p.color)
            .or_default()
            .push([p.longitude, p.latitude]);
    }

    // Degrees of longitude shrink with latitude; keep the map undistorted.
    let aspect = 1.0 / center.latitude.to_radians().cos().max(0.01);
    let radius = state.config.point_radius;

    Plot::new("collision_map")
        .legend(Legend::default())
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .data_aspect(aspect as f32)
        .include_x(center.longitude)
        .include_y(center.latitude)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (rgb, coords) in series {
                let name = if rgb == palette.injury {
                    "Injury"
                } else {
                    "No injury"
                };
                let points = Points::new(PlotPoints::new(coords))
                    .name(name)
                    .color(to_color32(rgb))
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius(radius);
                plot_ui.points(points);
            }
        });
}
