pub mod preprocessing;
pub mod region_growing;
pub mod extraction;
pub mod simplification;
pub mod drawing;

use image::{DynamicImage, GrayImage, RgbImage};
use crate::{
    error::Result,
    traits::{ImageBackend, TracedContour},
    types::LabelMask,
};

/// Default backend built on the image, imageproc and geo crates
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageprocBackend;

impl ImageBackend for ImageprocBackend {
    fn to_working_color_space(&self, image: &DynamicImage) -> RgbImage {
        preprocessing::to_rgb(image)
    }

    fn resize_area(&self, image: &RgbImage, width: u32, height: u32) -> Result<RgbImage> {
        preprocessing::resize_area(image, width, height)
    }

    fn threshold_range(&self, mask: &LabelMask, low: i32, high: i32) -> GrayImage {
        extraction::threshold_range(mask, low, high)
    }

    fn grow_regions(&self, image: &RgbImage, mask: &mut LabelMask) -> Result<()> {
        region_growing::grow_regions(image, mask)
    }

    fn trace_contours(&self, binary: &GrayImage) -> Result<Vec<TracedContour>> {
        extraction::trace_contours(binary)
    }

    fn simplify_contour(&self, contour: &[[f32; 2]], epsilon: f32, closed: bool) -> Vec<[f32; 2]> {
        simplification::douglas_peucker(contour, epsilon, closed)
    }

    fn draw_polyline(&self, mask: &mut LabelMask, points: &[[f32; 2]], label: i32, thickness: f32) {
        drawing::draw_polyline(mask, points, label, thickness)
    }
}
