use tracing::debug;
use crate::{
    buffers::WorkingImageState,
    error::{Result, WatershedError},
    traits::ImageBackend,
};

/// Per-axis factor between two raster sizes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisScale {
    pub x: f32,
    pub y: f32,
}

impl AxisScale {
    /// Factors that take coordinates in a `from` raster to a `to` raster
    pub fn between(from: (u32, u32), to: (u32, u32)) -> Self {
        Self {
            x: to.0 as f32 / from.0 as f32,
            y: to.1 as f32 / from.1 as f32,
        }
    }

    pub fn apply(&self, [x, y]: [f32; 2]) -> [f32; 2] {
        [x * self.x, y * self.y]
    }

    /// Single factor for lengths that are not tied to an axis (stroke widths)
    pub fn mean(&self) -> f32 {
        (self.x + self.y) / 2.0
    }
}

/// Working resolution requested by `sensitivity` for an image of `original` size.
///
/// `scale = max(width, height) / sensitivity`; a scale at or below one means
/// full resolution.
pub fn target_dimensions(original: (u32, u32), sensitivity: f64) -> Result<(u32, u32)> {
    if !sensitivity.is_finite() || sensitivity <= 0.0 {
        return Err(WatershedError::InvalidParameter(format!(
            "sensitivity must be a positive number, got {}",
            sensitivity
        )));
    }

    let (width, height) = original;
    let scale = width.max(height) as f64 / sensitivity;
    if scale <= 1.0 {
        return Ok(original);
    }

    let scaled = |dimension: u32| ((dimension as f64 / scale).round() as u32).max(1);
    Ok((scaled(width), scaled(height)))
}

/// Bring the working raster to the resolution `sensitivity` asks for.
///
/// Returns whether the working raster was replaced.
pub fn rescale<B>(backend: &B, state: &mut WorkingImageState, sensitivity: f64) -> Result<bool>
where
    B: ImageBackend + ?Sized,
{
    let original = state.original.dimensions();
    let target = target_dimensions(original, sensitivity)?;

    if target == state.working.dimensions() {
        debug!(width = target.0, height = target.1, "Working resolution unchanged");
        return Ok(false);
    }

    let working = if target == original {
        state.original.clone()
    } else {
        backend.resize_area(&state.original, target.0, target.1)?
    };

    debug!(
        sensitivity,
        from_width = state.working.width(),
        from_height = state.working.height(),
        to_width = target.0,
        to_height = target.1,
        "Working resolution changed"
    );
    state.replace_working(working);
    Ok(true)
}
