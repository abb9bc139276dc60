// Data transformation layer shared by every chart type
//
// Everything here is a pure function over in-memory slices: absent readings
// are skipped and degenerate inputs fall back to fixed values instead of
// failing.
pub mod aggregate;
pub mod align;
pub mod filter;
pub mod normalize;
pub mod subsample;

pub use aggregate::{aggregate, AggregationMethod};
pub use align::{
    align, align_within, grid_len, resample, AlignedSeries, SampledSeries, TimedSample,
    ALIGN_STEP_SECS, MAX_ALIGN_POINTS,
};
pub use filter::{filter_valid, filter_valid_keys, ValidPointSet};
pub use normalize::{min_max, normalize};
pub use subsample::subsample;
