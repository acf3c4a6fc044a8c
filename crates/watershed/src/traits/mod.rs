use image::{DynamicImage, GrayImage, RgbImage};
use crate::{error::Result, types::LabelMask};

/// Which side of a region a traced contour bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContourKind {
    Outer,
    Hole,
}

/// A boundary traced from a binary mask, in mask pixel coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct TracedContour {
    pub points: Vec<[f32; 2]>,
    pub kind: ContourKind,
    /// Index of the enclosing contour in the same trace result
    pub parent: Option<usize>,
}

/// Image-processing primitives the segmentation engine is built on.
///
/// The engine only relies on the semantics documented here; any backend
/// honouring them can be injected at construction.
pub trait ImageBackend: Send + Sync {
    /// Convert an arbitrary source image into the color space segmentation runs in
    fn to_working_color_space(&self, image: &DynamicImage) -> RgbImage;

    /// Downsample with area averaging
    fn resize_area(&self, image: &RgbImage, width: u32, height: u32) -> Result<RgbImage>;

    /// Binary mask: 255 where `low <= label <= high`, 0 elsewhere
    fn threshold_range(&self, mask: &LabelMask, low: i32, high: i32) -> GrayImage;

    /// Grow seed labels across the image in place, using pixel content as boundaries
    fn grow_regions(&self, image: &RgbImage, mask: &mut LabelMask) -> Result<()>;

    /// Trace outer and hole boundaries of the non-zero pixels, keeping every vertex
    fn trace_contours(&self, binary: &GrayImage) -> Result<Vec<TracedContour>>;

    /// Reduce vertex count so that no dropped vertex deviates more than `epsilon`
    fn simplify_contour(&self, contour: &[[f32; 2]], epsilon: f32, closed: bool) -> Vec<[f32; 2]>;

    /// Rasterize a connected stroke through `points` with round joins
    fn draw_polyline(&self, mask: &mut LabelMask, points: &[[f32; 2]], label: i32, thickness: f32);
}
