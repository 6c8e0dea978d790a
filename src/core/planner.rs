use crate::domain::model::{ContourBatch, ContourThreshold};
use crate::utils::error::{BundleError, Result};

/// Default walking-time range and the engine's per-request contour cap.
pub const DEFAULT_MIN_MINUTES: u32 = 1;
pub const DEFAULT_MAX_MINUTES: u32 = 20;
pub const DEFAULT_BATCH_SIZE: usize = 4;

/// `min..=max` as thresholds. Zero is skipped since it is never a valid contour.
pub fn threshold_range(min_minutes: u32, max_minutes: u32) -> Vec<ContourThreshold> {
    (min_minutes..=max_minutes)
        .filter_map(ContourThreshold::new)
        .collect()
}

/// Splits the thresholds into ascending, non-overlapping batches of at most
/// `cap` entries. The last batch holds the remainder.
pub fn plan_batches(thresholds: &[ContourThreshold], cap: usize) -> Result<Vec<ContourBatch>> {
    if cap == 0 {
        return Err(BundleError::InvalidConfigValueError {
            field: "batch_size".to_string(),
            value: cap.to_string(),
            reason: "Batch size must be at least 1".to_string(),
        });
    }

    let mut ordered = thresholds.to_vec();
    ordered.sort_unstable();
    ordered.dedup();

    let plan = ordered
        .chunks(cap)
        .map(|chunk| ContourBatch::new(chunk.to_vec()))
        .collect();

    Ok(plan)
}
