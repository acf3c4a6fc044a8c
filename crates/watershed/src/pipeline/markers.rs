use tracing::{debug, trace, warn};
use crate::{
    buffers::WorkingImageState,
    pipeline::scaling::AxisScale,
    traits::ImageBackend,
    types::{EngineConfig, LabelMask, Marker},
};

/// Burn `markers` into a fresh label mask sized to the working raster.
///
/// Markers are drawn in order, so later strokes overwrite earlier ones where
/// they overlap.
pub fn draw_markers<B>(backend: &B, config: &EngineConfig, state: &mut WorkingImageState, markers: &[Marker])
where
    B: ImageBackend + ?Sized,
{
    let (width, height) = state.working.dimensions();
    let mut mask = LabelMask::new(width, height);
    let to_working = AxisScale::between(state.original.dimensions(), (width, height));

    for marker in markers {
        // Zero and negative values are reserved for unassigned and boundary pixels
        if marker.id < 1 {
            warn!(id = marker.id, label_id = %marker.label_id, "Skipping marker with non-positive id");
            continue;
        }
        if marker.points.is_empty() {
            trace!(id = marker.id, "Skipping marker without points");
            continue;
        }

        let points: Vec<[f32; 2]> = marker.points
            .iter()
            .map(|&point| to_working.apply(point))
            .collect();
        let thickness = (marker.brush_size * to_working.mean()).max(config.min_stroke_width);

        backend.draw_polyline(&mut mask, &points, marker.id, thickness);
    }

    debug!(markers = markers.len(), width, height, "Markers rasterized");
    state.label_mask = Some(mask);
}
