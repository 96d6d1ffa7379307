use std::collections::BTreeMap;

use super::catalog::{FilterCatalog, ALL_LABEL};
use super::model::{Dataset, Dimension, DimensionValue, Record, UnknownDimension};

// ---------------------------------------------------------------------------
// Selection errors
// ---------------------------------------------------------------------------

/// A selection that references something the catalog does not know about.
/// Raised at the presentation boundary so that "no rows match" is never
/// confused with a caller bug.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectionError {
    #[error(transparent)]
    UnknownDimension(#[from] UnknownDimension),
    #[error("'{value}' is not a selectable value for {dimension}")]
    ValueNotInCatalog { dimension: Dimension, value: String },
}

// ---------------------------------------------------------------------------
// FilterSelection – one optional equality constraint per dimension
// ---------------------------------------------------------------------------

/// Per-dimension constraints. A dimension without an entry is unconstrained
/// ("All"); keying by dimension makes a second value per dimension impossible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    constraints: BTreeMap<Dimension, DimensionValue>,
}

impl FilterSelection {
    /// The unconstrained selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`FilterSelection::set`].
    pub fn with(mut self, dim: Dimension, value: impl Into<DimensionValue>) -> Self {
        self.set(dim, value);
        self
    }

    /// Constrain `dim` to `value`, replacing any previous constraint.
    pub fn set(&mut self, dim: Dimension, value: impl Into<DimensionValue>) {
        self.constraints.insert(dim, value.into());
    }

    pub fn clear(&mut self, dim: Dimension) {
        self.constraints.remove(&dim);
    }

    pub fn reset_all(&mut self) {
        self.constraints.clear();
    }

    pub fn get(&self, dim: Dimension) -> Option<&DimensionValue> {
        self.constraints.get(&dim)
    }

    pub fn is_unconstrained(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Active constraints in dimension order.
    pub fn active(&self) -> impl Iterator<Item = (Dimension, &DimensionValue)> {
        self.constraints.iter().map(|(dim, value)| (*dim, value))
    }

    /// Build a selection from `(dimension key, control label)` pairs as they
    /// come out of the selection controls. [`ALL_LABEL`] leaves the dimension
    /// unconstrained; everything else must be a catalog option.
    pub fn from_labels<'a, I>(
        catalog: &FilterCatalog,
        labels: I,
    ) -> Result<Self, SelectionError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut selection = FilterSelection::new();
        for (key, label) in labels {
            let dim: Dimension = key.parse()?;
            if label == ALL_LABEL {
                selection.clear(dim);
                continue;
            }
            let value = catalog.value_for_label(dim, label).ok_or_else(|| {
                SelectionError::ValueNotInCatalog {
                    dimension: dim,
                    value: label.to_string(),
                }
            })?;
            selection.set(dim, value.clone());
        }
        Ok(selection)
    }

    /// Whether `record` satisfies every active constraint.
    pub fn admits(&self, record: &Record) -> bool {
        self.constraints
            .iter()
            .all(|(dim, value)| record.matches(*dim, value))
    }
}

/// Check every active constraint against the catalog.
pub fn validate(
    catalog: &FilterCatalog,
    selection: &FilterSelection,
) -> Result<(), SelectionError> {
    for (dim, value) in selection.active() {
        if !catalog.contains(dim, value) {
            return Err(SelectionError::ValueNotInCatalog {
                dimension: dim,
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// FilteredView – rows of a dataset that pass a selection
// ---------------------------------------------------------------------------

/// Ordered row indices into a borrowed [`Dataset`]. The dataset itself is
/// never touched.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// A view over every row.
    pub fn full(dataset: &'a Dataset) -> Self {
        FilteredView {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Records in source order.
    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let dataset = self.dataset;
        self.indices.iter().filter_map(move |&i| dataset.get(i))
    }
}

// ---------------------------------------------------------------------------
// Filter engine
// ---------------------------------------------------------------------------

/// Return the rows of `dataset` passing every constraint of `selection`, in
/// source order.
///
/// The engine assumes a validated selection: a value that is not in the
/// catalog simply matches nothing. Use [`checked_apply`] at input boundaries.
pub fn apply<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> FilteredView<'a> {
    let indices = dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.admits(rec))
        .map(|(i, _)| i)
        .collect();
    FilteredView { dataset, indices }
}

/// Narrow an existing view further, keeping its order.
pub fn refine<'a>(view: &FilteredView<'a>, selection: &FilterSelection) -> FilteredView<'a> {
    let dataset = view.dataset;
    let indices = view
        .indices
        .iter()
        .copied()
        .filter(|&i| dataset.get(i).is_some_and(|rec| selection.admits(rec)))
        .collect();
    FilteredView { dataset, indices }
}

/// [`validate`] then [`apply`].
pub fn checked_apply<'a>(
    dataset: &'a Dataset,
    catalog: &FilterCatalog,
    selection: &FilterSelection,
) -> Result<FilteredView<'a>, SelectionError> {
    validate(catalog, selection)?;
    Ok(apply(dataset, selection))
}
