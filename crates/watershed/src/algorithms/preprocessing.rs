use image::{DynamicImage, Rgb, RgbImage};
use crate::error::{Result, WatershedError};

/// Flatten any source image (grayscale, RGBA, 16-bit, ...) to 8-bit RGB.
///
/// Alpha is dropped; region growing only looks at color.
pub fn to_rgb(image: &DynamicImage) -> RgbImage {
    image.to_rgb8()
}

/// Area-averaging resize.
///
/// Every destination pixel is the coverage-weighted mean of the source pixels
/// its footprint overlaps. Used for downsampling, where it does not alias.
pub fn resize_area(image: &RgbImage, width: u32, height: u32) -> Result<RgbImage> {
    let (src_w, src_h) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(WatershedError::ImageProcessing(format!(
            "Cannot resize to empty target {}x{}",
            width, height
        )));
    }
    if src_w == 0 || src_h == 0 {
        return Err(WatershedError::ImageProcessing(
            "Cannot resize an empty image".to_string(),
        ));
    }
    if (src_w, src_h) == (width, height) {
        return Ok(image.clone());
    }

    let scale_x = src_w as f64 / width as f64;
    let scale_y = src_h as f64 / height as f64;

    let x_spans: Vec<Vec<(u32, f64)>> = (0..width)
        .map(|dx| coverage(dx, scale_x, src_w))
        .collect();
    let y_spans: Vec<Vec<(u32, f64)>> = (0..height)
        .map(|dy| coverage(dy, scale_y, src_h))
        .collect();

    let mut output = RgbImage::new(width, height);
    for (dy, ys) in y_spans.iter().enumerate() {
        for (dx, xs) in x_spans.iter().enumerate() {
            let mut sum = [0.0f64; 3];
            let mut weight = 0.0f64;

            for &(sy, wy) in ys {
                for &(sx, wx) in xs {
                    let w = wx * wy;
                    let px = image.get_pixel(sx, sy);
                    for c in 0..3 {
                        sum[c] += px[c] as f64 * w;
                    }
                    weight += w;
                }
            }

            let px = if weight > 0.0 {
                sum.map(|s| (s / weight).round().clamp(0.0, 255.0) as u8)
            } else {
                [0, 0, 0]
            };
            output.put_pixel(dx as u32, dy as u32, Rgb(px));
        }
    }

    Ok(output)
}

/// Source pixels overlapped by destination pixel `index`, with overlap length
fn coverage(index: u32, scale: f64, src_len: u32) -> Vec<(u32, f64)> {
    let start = index as f64 * scale;
    let end = ((index + 1) as f64 * scale).min(src_len as f64);

    let first = start.floor() as u32;
    let last = (end.ceil() as u32).min(src_len);

    (first..last)
        .filter_map(|s| {
            let overlap = (end.min((s + 1) as f64) - start.max(s as f64)).max(0.0);
            (overlap > 0.0).then_some((s, overlap))
        })
        .collect()
}
