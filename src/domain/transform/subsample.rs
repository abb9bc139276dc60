// Subsampler - fixed-stride reduction to a point budget

/// Keep every `stride`-th element, `stride = ceil(len / max_count)`.
///
/// Input that already fits the budget comes back unchanged. The result is a
/// fixed-stride sample, so it may land below `max_count`; it never exceeds
/// it. A budget of zero is treated as one.
pub fn subsample<T: Clone>(items: &[T], max_count: usize) -> Vec<T> {
    let max_count = max_count.max(1);
    if items.len() <= max_count {
        return items.to_vec();
    }

    let stride = items.len().div_ceil(max_count);
    items.iter().step_by(stride).cloned().collect()
}
