use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::aggregate::{FrequencyTable, Rgb, SeverityPalette};
use crate::data::model::{Dimension, DimensionValue, Severity};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            let rgb: Srgb<u8> = rgb.into_format();
            Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
        })
        .collect()
}

pub fn to_color32([r, g, b]: Rgb) -> Color32 {
    Color32::from_rgb(r, g, b)
}

// ---------------------------------------------------------------------------
// Bar colours for a frequency table
// ---------------------------------------------------------------------------

/// One colour per table entry. The severity table reuses the map palette so
/// that injury bars match injury points; other dimensions get distinct hues.
pub fn bar_colors(table: &FrequencyTable, severity: &SeverityPalette) -> Vec<Color32> {
    if table.dimension() != Dimension::Severity {
        return generate_palette(table.len());
    }
    table
        .iter()
        .map(|(value, _)| {
            let sev = match value {
                DimensionValue::Text(s) => s.parse::<Severity>().ok(),
                DimensionValue::Integer(_) => None,
            };
            sev.map_or(Color32::GRAY, |s| to_color32(severity.color_for(s)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::frequency_table;
    use crate::data::filter::{apply, FilterSelection};
    use crate::data::model::{Dataset, Record};

    #[test]
    fn palette_has_requested_size_and_distinct_colours() {
        assert!(generate_palette(0).is_empty());
        let colors = generate_palette(4);
        assert_eq!(colors.len(), 4);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn severity_bars_follow_the_map_palette() {
        let ds = Dataset::from_records(vec![
            Record::new(Severity::No),
            Record::new(Severity::No),
            Record::new(Severity::Yes),
        ]);
        let table = frequency_table(&apply(&ds, &FilterSelection::new()), Dimension::Severity);
        let colors = bar_colors(&table, &SeverityPalette::default());
        assert_eq!(
            colors,
            vec![Color32::from_rgb(0, 100, 255), Color32::from_rgb(255, 0, 0)]
        );
    }
}
