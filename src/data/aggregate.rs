use std::collections::BTreeMap;

use super::filter::FilteredView;
use super::model::{Dimension, DimensionValue, Severity, Weekday};

/// Plain 8-bit RGB triple.
pub type Rgb = [u8; 3];

// ---------------------------------------------------------------------------
// Severity palette
// ---------------------------------------------------------------------------

/// Fixed two-colour palette keyed by severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeverityPalette {
    pub injury: Rgb,
    pub no_injury: Rgb,
}

impl SeverityPalette {
    pub const INJURY_RED: Rgb = [255, 0, 0];
    pub const NO_INJURY_BLUE: Rgb = [0, 100, 255];

    pub fn color_for(&self, severity: Severity) -> Rgb {
        match severity {
            Severity::Yes => self.injury,
            Severity::No => self.no_injury,
        }
    }
}

impl Default for SeverityPalette {
    fn default() -> Self {
        SeverityPalette {
            injury: Self::INJURY_RED,
            no_injury: Self::NO_INJURY_BLUE,
        }
    }
}

// ---------------------------------------------------------------------------
// Counts
// ---------------------------------------------------------------------------

pub fn total_count(view: &FilteredView<'_>) -> usize {
    view.len()
}

/// Rows with `severity == Yes`.
pub fn injury_count(view: &FilteredView<'_>) -> usize {
    view.records().filter(|r| r.severity.is_injury()).count()
}

pub fn non_injury_count(view: &FilteredView<'_>) -> usize {
    view.records().filter(|r| !r.severity.is_injury()).count()
}

// ---------------------------------------------------------------------------
// FrequencyTable
// ---------------------------------------------------------------------------

/// Category → count for one dimension, in display order.
///
/// * weekday: Monday → Sunday
/// * year / month / hour: ascending value
/// * everything else: descending count, ties by value
///
/// Rows whose cell is missing are left out entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable {
    dimension: Dimension,
    entries: Vec<(DimensionValue, usize)>,
}

impl FrequencyTable {
    pub fn empty(dimension: Dimension) -> Self {
        FrequencyTable {
            dimension,
            entries: Vec::new(),
        }
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Count for `value`, zero when absent.
    pub fn get(&self, value: &DimensionValue) -> usize {
        self.entries
            .iter()
            .find(|(v, _)| v == value)
            .map_or(0, |(_, n)| *n)
    }

    /// Sum of all counts: rows of the view with a value for this dimension.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DimensionValue, usize)> {
        self.entries.iter().map(|(v, n)| (v, *n))
    }
}

pub fn frequency_table(view: &FilteredView<'_>, dim: Dimension) -> FrequencyTable {
    let mut counts: BTreeMap<DimensionValue, usize> = BTreeMap::new();
    for value in view.records().filter_map(|r| r.value(dim)) {
        *counts.entry(value).or_default() += 1;
    }

    let entries = match dim {
        Dimension::Weekday => Weekday::ALL
            .into_iter()
            .filter_map(|day| {
                let value = DimensionValue::from(day);
                counts.remove(&value).map(|n| (value, n))
            })
            .collect(),
        d if d.is_numeric() => counts.into_iter().collect(),
        _ => {
            let mut entries: Vec<_> = counts.into_iter().collect();
            // stable sort keeps the BTreeMap's value order among equal counts
            entries.sort_by(|a, b| b.1.cmp(&a.1));
            entries
        }
    };

    FrequencyTable { dimension: dim, entries }
}

// ---------------------------------------------------------------------------
// Geo points
// ---------------------------------------------------------------------------

/// A plottable collision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub color: Rgb,
}

/// Arithmetic mean of the plottable points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapCenter {
    pub latitude: f64,
    pub longitude: f64,
}

/// One point per row with both coordinates, in view order.
pub fn geo_points(view: &FilteredView<'_>) -> Vec<GeoPoint> {
    geo_points_with(view, &SeverityPalette::default())
}

pub fn geo_points_with(view: &FilteredView<'_>, palette: &SeverityPalette) -> Vec<GeoPoint> {
    view.records()
        .filter_map(|r| {
            let (latitude, longitude) = r.coordinates()?;
            Some(GeoPoint {
                latitude,
                longitude,
                color: palette.color_for(r.severity),
            })
        })
        .collect()
}

/// Mean position of the plottable rows; `None` when there are none.
pub fn map_center(view: &FilteredView<'_>) -> Option<MapCenter> {
    let (mut lat_sum, mut lon_sum, mut n) = (0.0_f64, 0.0_f64, 0_usize);
    for (lat, lon) in view.records().filter_map(|r| r.coordinates()) {
        lat_sum += lat;
        lon_sum += lon;
        n += 1;
    }
    if n == 0 {
        return None;
    }
    Some(MapCenter {
        latitude: lat_sum / n as f64,
        longitude: lon_sum / n as f64,
    })
}

// ---------------------------------------------------------------------------
// Summary – everything the presentation layer needs for one selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub injuries: usize,
    pub non_injuries: usize,
    pub points: Vec<GeoPoint>,
    pub center: Option<MapCenter>,
    pub tables: BTreeMap<Dimension, FrequencyTable>,
}

impl Summary {
    /// Derive every output from `view`.
    pub fn compute(view: &FilteredView<'_>, palette: &SeverityPalette) -> Self {
        Summary {
            total: total_count(view),
            injuries: injury_count(view),
            non_injuries: non_injury_count(view),
            points: geo_points_with(view, palette),
            center: map_center(view),
            tables: Dimension::ALL
                .into_iter()
                .map(|dim| (dim, frequency_table(view, dim)))
                .collect(),
        }
    }

    /// What an empty view produces.
    pub fn empty() -> Self {
        Summary {
            total: 0,
            injuries: 0,
            non_injuries: 0,
            points: Vec::new(),
            center: None,
            tables: Dimension::ALL
                .into_iter()
                .map(|dim| (dim, FrequencyTable::empty(dim)))
                .collect(),
        }
    }

    pub fn table(&self, dim: Dimension) -> Option<&FrequencyTable> {
        self.tables.get(&dim)
    }
}

impl Default for Summary {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply, FilterSelection};
    use crate::data::model::{Dataset, Record};

    fn collision(year: i32, severity: Severity, lat: Option<f64>, lon: Option<f64>) -> Record {
        Record {
            year: Some(year),
            latitude: lat,
            longitude: lon,
            ..Record::new(severity)
        }
    }

    fn three_rows() -> Dataset {
        Dataset::from_records(vec![
            collision(2020, Severity::Yes, Some(45.5), Some(-73.6)),
            collision(2020, Severity::No, Some(45.6), Some(-73.5)),
            collision(2021, Severity::Yes, None, Some(-73.4)),
        ])
    }

    #[test]
    fn year_2020_scenario() {
        let ds = three_rows();
        let view = apply(&ds, &FilterSelection::new().with(Dimension::Year, 2020));

        assert_eq!(total_count(&view), 2);
        assert_eq!(injury_count(&view), 1);

        let points = geo_points(&view);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].color, SeverityPalette::INJURY_RED);
        assert_eq!(points[1].color, SeverityPalette::NO_INJURY_BLUE);

        let center = map_center(&view).expect("two plottable points");
        assert!((center.latitude - 45.55).abs() < 1e-9);
        assert!((center.longitude - -73.55).abs() < 1e-9);
    }

    #[test]
    fn empty_view_degrades_gracefully() {
        let ds = three_rows();
        let view = apply(&ds, &FilterSelection::new().with(Dimension::Year, 1999));

        assert_eq!(total_count(&view), 0);
        assert_eq!(injury_count(&view), 0);
        for dim in Dimension::ALL {
            assert!(frequency_table(&view, dim).is_empty());
        }
        assert!(geo_points(&view).is_empty());
        assert_eq!(map_center(&view), None);
        assert_eq!(Summary::compute(&view, &SeverityPalette::default()), Summary::empty());
    }

    #[test]
    fn rows_without_coordinates_are_not_plotted() {
        let ds = three_rows();
        let view = apply(&ds, &FilterSelection::new().with(Dimension::Year, 2021));
        assert_eq!(total_count(&view), 1);
        assert!(geo_points(&view).is_empty());
        assert_eq!(map_center(&view), None);
    }

    #[test]
    fn injuries_and_non_injuries_partition_the_view() {
        let ds = three_rows();
        for sel in [
            FilterSelection::new(),
            FilterSelection::new().with(Dimension::Year, 2020),
            FilterSelection::new().with(Dimension::Severity, Severity::No),
        ] {
            let view = apply(&ds, &sel);
            assert_eq!(total_count(&view), injury_count(&view) + non_injury_count(&view));
        }
    }

    #[test]
    fn missing_weather_is_excluded_from_its_table_only() {
        let mut wet = Record::new(Severity::No);
        wet.weather_group = Some("Rain".to_string());
        let ds = Dataset::from_records(vec![wet, Record::new(Severity::Yes)]);
        let view = apply(&ds, &FilterSelection::new());

        let table = frequency_table(&view, Dimension::WeatherGroup);
        assert_eq!(table.total(), 1);
        assert_eq!(table.get(&"Rain".into()), 1);
        assert_eq!(total_count(&view), 2);
        assert_eq!(frequency_table(&view, Dimension::Severity).total(), 2);
    }

    #[test]
    fn weekday_table_uses_calendar_order() {
        let days = [Weekday::Sunday, Weekday::Friday, Weekday::Sunday, Weekday::Monday];
        let ds = Dataset::from_records(
            days.into_iter()
                .map(|d| Record {
                    weekday: Some(d),
                    ..Record::new(Severity::No)
                })
                .collect(),
        );
        let table = frequency_table(&apply(&ds, &FilterSelection::new()), Dimension::Weekday);
        let order: Vec<String> = table.iter().map(|(v, _)| v.to_string()).collect();
        assert_eq!(order, vec!["Monday", "Friday", "Sunday"]);
        assert_eq!(table.get(&Weekday::Sunday.into()), 2);
    }

    #[test]
    fn categorical_tables_sort_by_count_then_value() {
        let surfaces = ["Wet", "Dry", "Snow", "Dry", "Wet", "Dry", "Ice"];
        let ds = Dataset::from_records(
            surfaces
                .into_iter()
                .map(|s| Record {
                    road_surface_group: Some(s.to_string()),
                    ..Record::new(Severity::Yes)
                })
                .collect(),
        );
        let view = apply(&ds, &FilterSelection::new());
        let table = frequency_table(&view, Dimension::RoadSurfaceGroup);
        let rows: Vec<(String, usize)> = table.iter().map(|(v, n)| (v.to_string(), n)).collect();
        assert_eq!(
            rows,
            vec![
                ("Dry".to_string(), 3),
                ("Wet".to_string(), 2),
                ("Ice".to_string(), 1),
                ("Snow".to_string(), 1),
            ]
        );
    }

    #[test]
    fn numeric_tables_sort_by_value() {
        let ds = Dataset::from_records(
            [17, 8, 17, 23, 0]
                .into_iter()
                .map(|h| Record {
                    hour: Some(h),
                    ..Record::new(Severity::No)
                })
                .collect(),
        );
        let table = frequency_table(&apply(&ds, &FilterSelection::new()), Dimension::Hour);
        let hours: Vec<DimensionValue> = table.iter().map(|(v, _)| v.clone()).collect();
        assert_eq!(
            hours,
            vec![
                DimensionValue::Integer(0),
                DimensionValue::Integer(8),
                DimensionValue::Integer(17),
                DimensionValue::Integer(23),
            ]
        );
    }

    #[test]
    fn table_totals_match_non_missing_rows() {
        let mut rows = Vec::new();
        for (i, light) in [Some("Daylight"), None, Some("Dark"), Some("Daylight"), None]
            .into_iter()
            .enumerate()
        {
            rows.push(Record {
                lighting_group: light.map(str::to_string),
                month: Some(i as u32 + 1),
                ..Record::new(Severity::No)
            });
        }
        let ds = Dataset::from_records(rows);
        let view = apply(&ds, &FilterSelection::new());
        let non_missing = view.records().filter(|r| r.lighting_group.is_some()).count();
        assert_eq!(frequency_table(&view, Dimension::LightingGroup).total(), non_missing);
        assert_eq!(frequency_table(&view, Dimension::Month).total(), total_count(&view));
    }

    #[test]
    fn custom_palette_is_applied() {
        let palette = SeverityPalette {
            injury: [200, 10, 10],
            no_injury: [10, 10, 200],
        };
        let ds = three_rows();
        let view = apply(&ds, &FilterSelection::new());
        let colors: Vec<Rgb> = geo_points_with(&view, &palette).iter().map(|p| p.color).collect();
        assert_eq!(colors, vec![[200, 10, 10], [10, 10, 200]]);
    }
}
