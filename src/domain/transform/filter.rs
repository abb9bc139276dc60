// Valid point filter - jointly-valid tuples across the selected variables
use crate::domain::telemetry::TelemetryPoint;
use crate::domain::variable::{extract_by_key, Variable};
use std::collections::BTreeMap;

/// Points where every requested variable has a finite value, with the
/// per-variable values aligned 1:1 to `indices`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidPointSet<K: Ord = Variable> {
    pub indices: Vec<usize>,
    pub values: BTreeMap<K, Vec<f64>>,
}

impl<K: Ord> ValidPointSet<K> {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn values(&self, key: &K) -> &[f64] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Value of `key` at position `row` of the set.
    pub fn value_at(&self, key: &K, row: usize) -> Option<f64> {
        self.values.get(key).and_then(|column| column.get(row)).copied()
    }
}

/// Keep the points where every variable in `variables` is present.
///
/// Each point's value vector is computed once, in point order. An empty
/// selection places no constraint and every point qualifies.
pub fn filter_valid(points: &[TelemetryPoint], variables: &[Variable]) -> ValidPointSet {
    collect(points, variables, |point, variable| variable.extract(point))
}

/// Untyped variant of [`filter_valid`]. A key the registry does not know is
/// never present, so selecting one yields an empty set.
pub fn filter_valid_keys(points: &[TelemetryPoint], keys: &[&str]) -> ValidPointSet<String> {
    let owned: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
    collect(points, &owned, |point, key| extract_by_key(point, key))
}

fn collect<K, F>(points: &[TelemetryPoint], keys: &[K], extract: F) -> ValidPointSet<K>
where
    K: Ord + Clone,
    F: Fn(&TelemetryPoint, &K) -> Option<f64>,
{
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); keys.len()];
    let mut indices = Vec::new();
    let mut row = Vec::with_capacity(keys.len());

    for (index, point) in points.iter().enumerate() {
        row.clear();
        for key in keys {
            match extract(point, key) {
                Some(value) if value.is_finite() => row.push(value),
                _ => break,
            }
        }
        if row.len() != keys.len() {
            continue;
        }

        indices.push(index);
        for (column, value) in columns.iter_mut().zip(&row) {
            column.push(*value);
        }
    }

    // Duplicate keys in the selection collapse onto one identical column
    let values = keys.iter().cloned().zip(columns).collect();
    ValidPointSet { indices, values }
}
