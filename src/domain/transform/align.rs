// Time aligner - resample two unevenly sampled series onto one timeline
use serde::Serialize;

/// Grid spacing of the shared timeline, in seconds.
pub const ALIGN_STEP_SECS: f64 = 1.0;

/// One source sample, `time_secs` relative to the start of its series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedSample {
    pub time_secs: f64,
    pub value: Option<f64>,
}

impl TimedSample {
    pub fn new(time_secs: f64, value: Option<f64>) -> Self {
        Self { time_secs, value }
    }
}

/// A series to be aligned together with the span it covers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampledSeries {
    pub duration_secs: f64,
    pub samples: Vec<TimedSample>,
}

impl SampledSeries {
    pub fn new(duration_secs: f64, samples: Vec<TimedSample>) -> Self {
        Self {
            duration_secs,
            samples,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignedSeries {
    pub time_points: Vec<f64>,
    pub series_a: Vec<f64>,
    pub series_b: Vec<f64>,
}

impl AlignedSeries {
    pub fn len(&self) -> usize {
        self.time_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_points.is_empty()
    }
}

/// Upper bound on the grid `align` builds, one day at one-second steps.
pub const MAX_ALIGN_POINTS: usize = 86_400;

/// Resample `a` and `b` onto `0, 1, 2, ...` seconds covering the longer of
/// the two durations, at most [`MAX_ALIGN_POINTS`] points.
pub fn align(a: &SampledSeries, b: &SampledSeries) -> AlignedSeries {
    align_within(a, b, MAX_ALIGN_POINTS)
}

/// Like [`align`] with a caller-chosen bound; longer spans are truncated to
/// the first `max_points` grid times.
pub fn align_within(a: &SampledSeries, b: &SampledSeries, max_points: usize) -> AlignedSeries {
    let count = grid_len(a, b).min(max_points);
    let time_points: Vec<f64> = (0..count).map(|i| i as f64 * ALIGN_STEP_SECS).collect();

    let series_a = resample(&a.samples, &time_points);
    let series_b = resample(&b.samples, &time_points);

    AlignedSeries {
        time_points,
        series_a,
        series_b,
    }
}

/// Number of grid points the two durations call for. Negative and
/// non-finite durations count as zero.
pub fn grid_len(a: &SampledSeries, b: &SampledSeries) -> usize {
    let span = usable_span(a.duration_secs).max(usable_span(b.duration_secs));
    // Float to int casts saturate, so a huge span stays representable here.
    (span / ALIGN_STEP_SECS).ceil() as usize
}

fn usable_span(duration_secs: f64) -> f64 {
    if duration_secs.is_finite() && duration_secs > 0.0 {
        duration_secs
    } else {
        0.0
    }
}

/// Interpolate `samples` at every grid time.
///
/// Only samples with a present, finite value take part. Outside the covered
/// range the nearest sample is held flat; with no samples at all the result
/// is 0 throughout.
pub fn resample(samples: &[TimedSample], grid: &[f64]) -> Vec<f64> {
    let mut present: Vec<(f64, f64)> = samples
        .iter()
        .filter_map(|s| match s.value {
            Some(v) if v.is_finite() && s.time_secs.is_finite() => Some((s.time_secs, v)),
            _ => None,
        })
        .collect();
    present.sort_by(|x, y| x.0.total_cmp(&y.0));

    grid.iter().map(|&t| value_at(&present, t)).collect()
}

fn value_at(present: &[(f64, f64)], t: f64) -> f64 {
    // First sample strictly after t
    let split = present.partition_point(|&(time, _)| time <= t);
    let before = split.checked_sub(1).map(|i| present[i]);
    let after = present.get(split).copied();

    match (before, after) {
        (None, None) => 0.0,
        (Some((_, v)), None) | (None, Some((_, v))) => v,
        (Some((t0, v0)), Some((t1, v1))) => {
            if t1 == t0 {
                v0
            } else {
                v0 + (t - t0) / (t1 - t0) * (v1 - v0)
            }
        }
    }
}
