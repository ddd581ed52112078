use std::collections::{BTreeMap, BTreeSet};

use crate::models::FilterOptions;
use crate::services::dataset::{Dataset, DatasetKind};

/// Column label → accepted raw values. A column that is absent, or present
/// with an empty set, imposes no constraint; columns combine as a
/// conjunction, with set membership inside each column.
pub type FilterSelection = BTreeMap<String, BTreeSet<String>>;

/// Returns the order-preserving subsequence of rows matching the selection.
/// An empty result is valid and flows through every downstream stage.
pub fn apply(dataset: &Dataset, selection: &FilterSelection) -> Dataset {
    let active: Vec<(usize, &BTreeSet<String>)> = selection
        .iter()
        .filter(|(_, values)| !values.is_empty())
        .filter_map(|(column, values)| dataset.column_index(column).map(|idx| (idx, values)))
        .collect();

    if active.is_empty() {
        return dataset.clone();
    }

    let rows = dataset
        .rows
        .iter()
        .filter(|row| {
            active.iter().all(|(idx, values)| {
                row.get(*idx)
                    .map(|value| values.contains(&value.as_text()))
                    .unwrap_or(false)
            })
        })
        .cloned()
        .collect();

    Dataset {
        columns: dataset.columns.clone(),
        rows,
    }
}

/// Option lists offered for the multi-select controls: the sorted distinct
/// values per filterable column, always computed from the unfiltered dataset.
pub fn options(dataset: &Dataset, kind: DatasetKind) -> Vec<FilterOptions> {
    kind.filter_columns()
        .iter()
        .map(|column| FilterOptions {
            column: column.to_string(),
            values: dataset.distinct_values(column),
        })
        .collect()
}
