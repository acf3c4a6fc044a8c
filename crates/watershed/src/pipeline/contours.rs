use std::collections::HashSet;

use tracing::{debug, trace, warn};
use crate::{
    buffers::WorkingImageState,
    error::{Result, WatershedError},
    pipeline::scaling::AxisScale,
    traits::ImageBackend,
    types::{EngineConfig, LabelMask, Marker, WatershedPolygon, BACKGROUND_MARKER_ID},
};

/// Turn the segmented label mask into polygons, one marker id at a time.
///
/// The background id, non-positive ids and repeated ids are skipped; the first marker with a
/// given id supplies its `label_id`. An id whose extraction fails is logged
/// and left out, the remaining ids are still extracted.
pub fn extract<B>(
    backend: &B,
    config: &EngineConfig,
    state: &WorkingImageState,
    markers: &[Marker],
) -> Result<Vec<WatershedPolygon>>
where
    B: ImageBackend + ?Sized,
{
    let mask = state.label_mask.as_ref().ok_or_else(|| {
        WatershedError::ImageProcessing("no segmented label mask to extract from".to_string())
    })?;
    let to_original = AxisScale::between(mask.dimensions(), state.original.dimensions());

    let mut seen = HashSet::new();
    let mut polygons = Vec::new();

    for marker in markers {
        if marker.id <= BACKGROUND_MARKER_ID || !seen.insert(marker.id) {
            continue;
        }

        match extract_region(backend, config, mask, to_original, marker) {
            Ok(mut region) => {
                trace!(id = marker.id, polygons = region.len(), "Region extracted");
                polygons.append(&mut region);
            }
            Err(e) => {
                warn!(id = marker.id, label_id = %marker.label_id, "Skipping region: {}", e);
            }
        }
    }

    debug!(polygons = polygons.len(), regions = seen.len(), "Contour extraction finished");
    Ok(polygons)
}

/// Polygons of the region labelled `marker.id`.
///
/// The isolated mask and traced contours live only for this call.
fn extract_region<B>(
    backend: &B,
    config: &EngineConfig,
    mask: &LabelMask,
    to_original: AxisScale,
    marker: &Marker,
) -> Result<Vec<WatershedPolygon>>
where
    B: ImageBackend + ?Sized,
{
    let isolated = backend.threshold_range(mask, marker.id, marker.id);
    let contours = backend
        .trace_contours(&isolated)
        .map_err(|e| WatershedError::ContourExtraction {
            id: marker.id,
            reason: e.to_string(),
        })?;

    let polygons = contours
        .iter()
        .filter_map(|contour| {
            let simplified = backend.simplify_contour(&contour.points, config.simplify_epsilon, true);
            if simplified.len() < 3 {
                trace!(id = marker.id, vertices = simplified.len(), "Dropping degenerate contour");
                return None;
            }

            Some(WatershedPolygon {
                id: marker.id,
                label_id: marker.label_id.clone(),
                points: simplified.into_iter().map(|p| to_original.apply(p)).collect(),
            })
        })
        .collect();

    Ok(polygons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::ImageprocBackend;
    use crate::traits::TracedContour;
    use image::{DynamicImage, GrayImage, Luma, RgbImage};

    fn segmented_state(original: (u32, u32), mask: LabelMask) -> WorkingImageState {
        WorkingImageState {
            original: RgbImage::new(original.0, original.1),
            working: RgbImage::new(mask.width(), mask.height()),
            label_mask: Some(mask),
        }
    }

    /// Label 2 fills a block, label 1 the rest
    fn two_region_mask() -> LabelMask {
        LabelMask::from_fn(40, 30, |x, y| {
            if (10..30).contains(&x) && (10..20).contains(&y) { Luma([2]) } else { Luma([1]) }
        })
    }

    #[test]
    fn test_background_and_duplicates_are_skipped() {
        let state = segmented_state((40, 30), two_region_mask());
        let markers = vec![
            Marker::new(1, "background", vec![[0.0, 0.0]], 1.0),
            Marker::new(2, "cat", vec![[15.0, 15.0]], 1.0),
            Marker::new(2, "dog", vec![[20.0, 15.0]], 1.0),
        ];

        let polygons = extract(&ImageprocBackend, &EngineConfig::default(), &state, &markers).unwrap();

        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].id, 2);
        assert_eq!(polygons[0].label_id, "cat");
        assert_eq!(polygons[0].points.len(), 4);
    }

    #[test]
    fn test_vertices_are_mapped_to_original_space() {
        let state = segmented_state((80, 60), two_region_mask());
        let markers = vec![Marker::new(2, "cat", vec![], 1.0)];

        let polygons = extract(&ImageprocBackend, &EngineConfig::default(), &state, &markers).unwrap();
        let polygon = &polygons[0];

        for corner in [[20.0, 20.0], [58.0, 20.0], [58.0, 38.0], [20.0, 38.0]] {
            assert!(polygon.points.contains(&corner), "missing corner {:?} in {:?}", corner, polygon.points);
        }
    }

    #[test]
    fn test_split_region_yields_several_polygons() {
        let mask = LabelMask::from_fn(40, 30, |x, y| {
            let left = (5..15).contains(&x) && (5..15).contains(&y);
            let right = (25..35).contains(&x) && (5..15).contains(&y);
            if left || right { Luma([3]) } else { Luma([1]) }
        });
        let state = segmented_state((40, 30), mask);
        let markers = vec![Marker::new(3, "tree", vec![], 1.0)];

        let polygons = extract(&ImageprocBackend, &EngineConfig::default(), &state, &markers).unwrap();
        assert_eq!(polygons.len(), 2);
        assert!(polygons.iter().all(|p| p.label_id == "tree"));
    }

    #[test]
    fn test_non_positive_ids_are_not_extracted() {
        let mask = LabelMask::from_fn(40, 30, |x, y| {
            if x == 0 || y == 0 || x == 39 || y == 29 { Luma([-1]) } else { Luma([0]) }
        });
        let state = segmented_state((40, 30), mask);
        let markers = vec![
            Marker::new(-1, "edge", vec![], 1.0),
            Marker::new(0, "none", vec![], 1.0),
        ];

        let polygons = extract(&ImageprocBackend, &EngineConfig::default(), &state, &markers).unwrap();
        assert!(polygons.is_empty());
    }

    #[test]
    fn test_missing_region_yields_nothing() {
        let state = segmented_state((40, 30), two_region_mask());
        let markers = vec![Marker::new(7, "ghost", vec![], 1.0)];

        let polygons = extract(&ImageprocBackend, &EngineConfig::default(), &state, &markers).unwrap();
        assert!(polygons.is_empty());
    }

    /// Fails to trace one specific label, delegates everything else
    struct FailingTraceBackend {
        failing_label: i32,
    }

    impl ImageBackend for FailingTraceBackend {
        fn to_working_color_space(&self, image: &DynamicImage) -> RgbImage {
            ImageprocBackend.to_working_color_space(image)
        }

        fn resize_area(&self, image: &RgbImage, width: u32, height: u32) -> Result<RgbImage> {
            ImageprocBackend.resize_area(image, width, height)
        }

        fn threshold_range(&self, mask: &LabelMask, low: i32, high: i32) -> GrayImage {
            // Tag the isolated mask so trace_contours can tell which label it is
            let mut binary = ImageprocBackend.threshold_range(mask, low, high);
            if low == self.failing_label {
                binary.put_pixel(0, 0, Luma([1]));
            }
            binary
        }

        fn grow_regions(&self, image: &RgbImage, mask: &mut LabelMask) -> Result<()> {
            ImageprocBackend.grow_regions(image, mask)
        }

        fn trace_contours(&self, binary: &GrayImage) -> Result<Vec<TracedContour>> {
            if binary.get_pixel(0, 0)[0] == 1 {
                return Err(WatershedError::ImageProcessing("trace failed".to_string()));
            }
            ImageprocBackend.trace_contours(binary)
        }

        fn simplify_contour(&self, contour: &[[f32; 2]], epsilon: f32, closed: bool) -> Vec<[f32; 2]> {
            ImageprocBackend.simplify_contour(contour, epsilon, closed)
        }

        fn draw_polyline(&self, mask: &mut LabelMask, points: &[[f32; 2]], label: i32, thickness: f32) {
            ImageprocBackend.draw_polyline(mask, points, label, thickness)
        }
    }

    #[test]
    fn test_failing_region_does_not_abort_others() {
        let mask = LabelMask::from_fn(40, 30, |x, _| {
            if x < 20 { Luma([2]) } else { Luma([3]) }
        });
        let state = segmented_state((40, 30), mask);
        let markers = vec![
            Marker::new(2, "cat", vec![], 1.0),
            Marker::new(3, "dog", vec![], 1.0),
        ];
        let backend = FailingTraceBackend { failing_label: 2 };

        let polygons = extract(&backend, &EngineConfig::default(), &state, &markers).unwrap();

        assert!(!polygons.is_empty());
        assert!(polygons.iter().all(|p| p.id == 3));
    }
}
