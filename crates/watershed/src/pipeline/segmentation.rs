use std::time::Instant;

use tracing::debug;
use crate::{
    buffers::WorkingImageState,
    error::{Result, WatershedError},
    traits::ImageBackend,
};

/// Grow the rasterized markers over the working image in a single pass.
///
/// The label mask is updated in place. Failures are returned unchanged;
/// the caller decides whether they are fatal.
pub fn run<B>(backend: &B, state: &mut WorkingImageState) -> Result<()>
where
    B: ImageBackend + ?Sized,
{
    let WorkingImageState { working, label_mask, .. } = state;
    let mask = label_mask.as_mut().ok_or_else(|| {
        WatershedError::ImageProcessing("markers have not been rasterized".to_string())
    })?;

    let started = Instant::now();
    backend.grow_regions(working, mask)?;
    debug!(
        width = working.width(),
        height = working.height(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Region growing finished"
    );
    Ok(())
}
