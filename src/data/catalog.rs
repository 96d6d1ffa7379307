use std::collections::{BTreeMap, BTreeSet};

use super::model::{Dataset, Dimension, DimensionValue, Severity, Weekday};

/// Label of the synthetic "no constraint" option shown first in every
/// selection control.
pub const ALL_LABEL: &str = "All";

// ---------------------------------------------------------------------------
// FilterCatalog – selectable values per dimension
// ---------------------------------------------------------------------------

/// Distinct values present in the dataset for every dimension, computed once
/// per load.
///
/// Ordering:
/// * year / month / hour: ascending
/// * weather / lighting / road surface: lexicographic
/// * weekday: Monday → Sunday, restricted to days present in the data
/// * severity: Yes, No, restricted to values present in the data
#[derive(Debug, Clone, Default)]
pub struct FilterCatalog {
    options: BTreeMap<Dimension, Vec<DimensionValue>>,
}

impl FilterCatalog {
    pub fn build(dataset: &Dataset) -> Self {
        let options = Dimension::ALL
            .into_iter()
            .map(|dim| (dim, options_in(dataset, dim)))
            .collect();
        FilterCatalog { options }
    }

    /// Ordered distinct values for `dim`, excluding missing cells. Empty for
    /// an empty dataset.
    pub fn options_for(&self, dim: Dimension) -> &[DimensionValue] {
        self.options.get(&dim).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, dim: Dimension, value: &DimensionValue) -> bool {
        self.options_for(dim).contains(value)
    }

    /// Labels for a selection control: [`ALL_LABEL`] followed by the options.
    pub fn labels_for(&self, dim: Dimension) -> Vec<String> {
        std::iter::once(ALL_LABEL.to_string())
            .chain(self.options_for(dim).iter().map(option_label))
            .collect()
    }

    /// Resolve a control label back to the catalog value it was rendered from.
    pub fn value_for_label(&self, dim: Dimension, label: &str) -> Option<&DimensionValue> {
        self.options_for(dim)
            .iter()
            .find(|v| option_label(v) == label)
    }
}

/// Control label for a concrete value. A value spelled like [`ALL_LABEL`] is
/// quoted so it never reads as the unconstrained option.
pub fn option_label(value: &DimensionValue) -> String {
    let text = value.to_string();
    if text == ALL_LABEL {
        format!("\"{text}\"")
    } else {
        text
    }
}

fn options_in(dataset: &Dataset, dim: Dimension) -> Vec<DimensionValue> {
    let present: BTreeSet<DimensionValue> = dataset
        .records()
        .iter()
        .filter_map(|rec| rec.value(dim))
        .collect();

    match dim {
        Dimension::Weekday => Weekday::ALL
            .into_iter()
            .map(DimensionValue::from)
            .filter(|v| present.contains(v))
            .collect(),
        Dimension::Severity => Severity::ALL
            .into_iter()
            .map(DimensionValue::from)
            .filter(|v| present.contains(v))
            .collect(),
        _ => present.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn record(year: i32, weekday: Weekday, weather: Option<&str>, severity: Severity) -> Record {
        Record {
            year: Some(year),
            weekday: Some(weekday),
            weather_group: weather.map(str::to_string),
            ..Record::new(severity)
        }
    }

    fn sample() -> Dataset {
        Dataset::from_records(vec![
            record(2021, Weekday::Sunday, Some("Snow"), Severity::No),
            record(2019, Weekday::Wednesday, None, Severity::No),
            record(2020, Weekday::Monday, Some("Clear"), Severity::No),
            record(2019, Weekday::Sunday, Some("Rain"), Severity::No),
        ])
    }

    #[test]
    fn numeric_options_sort_ascending() {
        let catalog = FilterCatalog::build(&sample());
        assert_eq!(
            catalog.options_for(Dimension::Year),
            &[
                DimensionValue::Integer(2019),
                DimensionValue::Integer(2020),
                DimensionValue::Integer(2021)
            ]
        );
    }

    #[test]
    fn text_options_sort_lexicographically_without_nulls() {
        let catalog = FilterCatalog::build(&sample());
        assert_eq!(
            catalog.options_for(Dimension::WeatherGroup),
            &[
                DimensionValue::from("Clear"),
                DimensionValue::from("Rain"),
                DimensionValue::from("Snow")
            ]
        );
    }

    #[test]
    fn weekday_follows_calendar_order_and_only_present_days() {
        let catalog = FilterCatalog::build(&sample());
        assert_eq!(
            catalog.options_for(Dimension::Weekday),
            &[
                DimensionValue::from(Weekday::Monday),
                DimensionValue::from(Weekday::Wednesday),
                DimensionValue::from(Weekday::Sunday)
            ]
        );
    }

    #[test]
    fn severity_lists_only_present_values() {
        let catalog = FilterCatalog::build(&sample());
        assert_eq!(
            catalog.options_for(Dimension::Severity),
            &[DimensionValue::from(Severity::No)]
        );
    }

    #[test]
    fn empty_dataset_has_no_options() {
        let catalog = FilterCatalog::build(&Dataset::default());
        for dim in Dimension::ALL {
            assert!(catalog.options_for(dim).is_empty());
            assert_eq!(catalog.labels_for(dim), vec![ALL_LABEL.to_string()]);
        }
    }

    #[test]
    fn labels_start_with_all_and_resolve_back() {
        let catalog = FilterCatalog::build(&sample());
        assert_eq!(
            catalog.labels_for(Dimension::Year),
            vec!["All", "2019", "2020", "2021"]
        );
        assert_eq!(
            catalog.value_for_label(Dimension::Year, "2020"),
            Some(&DimensionValue::Integer(2020))
        );
        assert_eq!(catalog.value_for_label(Dimension::Year, "1999"), None);
        assert!(catalog.contains(Dimension::WeatherGroup, &"Rain".into()));
        assert!(!catalog.contains(Dimension::WeatherGroup, &"rain".into()));
    }

    #[test]
    fn value_spelled_all_gets_a_distinct_label() {
        let catalog = FilterCatalog::build(&Dataset::from_records(vec![
            record(2020, Weekday::Monday, Some("All"), Severity::No),
            record(2020, Weekday::Monday, Some("Clear"), Severity::No),
        ]));
        let labels = catalog.labels_for(Dimension::WeatherGroup);
        assert_eq!(labels, vec!["All", "\"All\"", "Clear"]);
        assert_eq!(
            catalog.value_for_label(Dimension::WeatherGroup, "\"All\""),
            Some(&DimensionValue::from("All"))
        );
        assert_eq!(catalog.value_for_label(Dimension::WeatherGroup, "All"), None);
    }
}
