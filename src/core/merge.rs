use crate::domain::model::{ContourFeature, StationContourSet};

/// Folds a batch of features into a station's contour set.
/// A threshold seen again replaces the earlier feature (last write wins).
pub fn merge_contours<I>(mut contours: StationContourSet, features: I) -> StationContourSet
where
    I: IntoIterator<Item = ContourFeature>,
{
    for feature in features {
        if let Some(previous) = contours.insert(feature) {
            tracing::debug!("Replaced existing {}-minute contour", previous.threshold());
        }
    }
    contours
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(contour: u32, tag: &str) -> ContourFeature {
        ContourFeature::from_geojson(json!({
            "type": "Feature",
            "properties": {"contour": contour, "tag": tag},
            "geometry": {"type": "Polygon", "coordinates": []}
        }))
        .unwrap()
    }

    #[test]
    fn test_merge_adds_each_threshold() {
        let merged = merge_contours(
            StationContourSet::new(),
            vec![feature(1, "a"), feature(2, "a"), feature(3, "a")],
        );
        assert_eq!(merged.thresholds(), vec![1, 2, 3]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let batch = vec![feature(5, "a"), feature(6, "a")];
        let once = merge_contours(StationContourSet::new(), batch.clone());
        let twice = merge_contours(once.clone(), batch);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_overlapping_thresholds_keep_last_feature() {
        let first = merge_contours(StationContourSet::new(), vec![feature(4, "early")]);
        let merged = merge_contours(first, vec![feature(4, "late"), feature(8, "late")]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get(4).unwrap().geojson()["properties"]["tag"], "late");
    }

    #[test]
    fn test_repeat_within_one_batch_keeps_last() {
        let merged = merge_contours(
            StationContourSet::new(),
            vec![feature(2, "first"), feature(2, "second")],
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.get(2).unwrap().geojson()["properties"]["tag"], "second");
    }

    #[test]
    fn test_merging_nothing_leaves_set_unchanged() {
        let set = merge_contours(StationContourSet::new(), vec![feature(1, "a")]);
        assert_eq!(merge_contours(set.clone(), Vec::new()), set);
    }
}
