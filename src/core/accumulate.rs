use crate::domain::model::{BundledDataset, StationContourSet};

/// Folds one station's contours into the dataset. Empty sets are dropped and a
/// repeated name replaces the earlier entry wholesale.
pub fn accumulate(
    mut dataset: BundledDataset,
    station_name: &str,
    contours: StationContourSet,
) -> BundledDataset {
    if contours.is_empty() {
        return dataset;
    }

    if dataset.contains(station_name) {
        tracing::warn!("⚠️ Station '{}' already bundled, replacing its contours", station_name);
    }

    dataset.replace(station_name.to_string(), contours);
    dataset
}
