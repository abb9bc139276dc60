// Normalizer - min-max rescaling to [0, 1] for radar display

/// Value used for every element of a constant series.
pub const DEGENERATE_MIDPOINT: f64 = 0.5;

/// Rescale `values` to [0, 1] by their own min and max.
///
/// A constant series has no spread and maps to the midpoint.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let Some((min, max)) = min_max(values) else {
        return Vec::new();
    };

    if max == min {
        return vec![DEGENERATE_MIDPOINT; values.len()];
    }

    let span = max - min;
    values.iter().map(|v| (v - min) / span).collect()
}

/// Smallest and largest element, `None` for an empty slice.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_series_maps_to_midpoint() {
        assert_eq!(normalize(&[5.0, 5.0, 5.0]), vec![0.5, 0.5, 0.5]);
        assert_eq!(normalize(&[-2.0]), vec![0.5]);
    }

    #[test]
    fn test_range_and_extremes() {
        let values = [30.0, 10.0, 50.0, 20.0];
        let normalized = normalize(&values);

        assert_eq!(normalized.len(), values.len());
        assert!(normalized.iter().all(|v| (0.0..=1.0).contains(v)));
        assert_eq!(normalized[1], 0.0);
        assert_eq!(normalized[2], 1.0);
        assert_eq!(normalized[0], 0.5);
        assert_eq!(normalized[3], 0.25);
    }

    #[test]
    fn test_empty() {
        assert!(normalize(&[]).is_empty());
        assert_eq!(min_max(&[]), None);
    }
}
