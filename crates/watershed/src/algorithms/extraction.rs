use image::{GrayImage, Luma};
use imageproc::contours::BorderType;
use crate::{
    error::{Result, WatershedError},
    traits::{ContourKind, TracedContour},
    types::LabelMask,
};

/// Two-sided threshold of a label mask into a binary image
pub fn threshold_range(mask: &LabelMask, low: i32, high: i32) -> GrayImage {
    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        let label = mask.get_pixel(x, y)[0];
        if (low..=high).contains(&label) {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Suzuki-Abe border following via imageproc, outer borders and holes alike
pub fn trace_contours(binary: &GrayImage) -> Result<Vec<TracedContour>> {
    if binary.width() == 0 || binary.height() == 0 {
        return Err(WatershedError::ImageProcessing(
            "Cannot trace contours of an empty mask".to_string(),
        ));
    }

    let contours = imageproc::contours::find_contours::<i32>(binary);

    let result = contours
        .into_iter()
        .map(|contour| TracedContour {
            points: contour.points
                .iter()
                .map(|p| [p.x as f32, p.y as f32])
                .collect(),
            kind: match contour.border_type {
                BorderType::Outer => ContourKind::Outer,
                BorderType::Hole => ContourKind::Hole,
            },
            parent: contour.parent,
        })
        .collect();

    Ok(result)
}
