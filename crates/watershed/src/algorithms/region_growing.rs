//! Marker-controlled watershed flooding.
//!
//! Seeds are the positive labels of the mask. Unassigned pixels are flooded
//! in order of increasing color difference to the pixel they were reached
//! from, so regions meet along strong edges. Pixels where two different
//! regions meet become [`BOUNDARY_LABEL`].

use std::collections::VecDeque;

use image::RgbImage;
use crate::{
    error::{Result, WatershedError},
    types::{LabelMask, BOUNDARY_LABEL},
};

/// Sits in the queue; never visible after flooding completes
const IN_QUEUE: i32 = -2;

const NEIGHBOURS: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// 256 FIFO buckets indexed by priority, popped lowest first
struct BucketQueue {
    buckets: Vec<VecDeque<usize>>,
    active: usize,
    len: usize,
}

impl BucketQueue {
    fn new() -> Self {
        Self {
            buckets: vec![VecDeque::new(); 256],
            active: 0,
            len: 0,
        }
    }

    fn push(&mut self, priority: u8, index: usize) {
        let priority = priority as usize;
        self.buckets[priority].push_back(index);
        self.active = self.active.min(priority);
        self.len += 1;
    }

    fn pop(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        while self.buckets[self.active].is_empty() {
            self.active += 1;
        }
        self.len -= 1;
        self.buckets[self.active].pop_front()
    }
}

/// Largest per-channel absolute difference
#[inline]
fn color_diff(image: &[u8], a: usize, b: usize) -> u8 {
    let pa = &image[a * 3..a * 3 + 3];
    let pb = &image[b * 3..b * 3 + 3];
    pa.iter()
        .zip(pb)
        .map(|(&x, &y)| x.abs_diff(y))
        .max()
        .unwrap_or(0)
}

/// Flood the seeds of `mask` across `image`, in place.
pub fn grow_regions(image: &RgbImage, mask: &mut LabelMask) -> Result<()> {
    if image.dimensions() != mask.dimensions() {
        return Err(WatershedError::ImageProcessing(format!(
            "Image is {}x{} but label mask is {}x{}",
            image.width(),
            image.height(),
            mask.width(),
            mask.height()
        )));
    }

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(WatershedError::ImageProcessing(
            "Cannot grow regions on an empty image".to_string(),
        ));
    }

    let w = width as usize;
    let h = height as usize;
    let pixels = image.as_raw();
    let labels: &mut [i32] = mask;

    // The outer frame is boundary so every flooded pixel has four in-bounds neighbours
    for x in 0..w {
        labels[x] = BOUNDARY_LABEL;
        labels[(h - 1) * w + x] = BOUNDARY_LABEL;
    }
    for y in 0..h {
        labels[y * w] = BOUNDARY_LABEL;
        labels[y * w + w - 1] = BOUNDARY_LABEL;
    }

    let neighbour = |index: usize, (dx, dy): (i64, i64)| -> Option<usize> {
        let x = (index % w) as i64 + dx;
        let y = (index / w) as i64 + dy;
        (x >= 0 && y >= 0 && (x as usize) < w && (y as usize) < h)
            .then(|| y as usize * w + x as usize)
    };

    let mut queue = BucketQueue::new();

    // Seed the queue with unassigned pixels touching a marker
    for index in 0..labels.len() {
        if labels[index] != 0 {
            continue;
        }

        let priority = NEIGHBOURS
            .iter()
            .filter_map(|&offset| neighbour(index, offset))
            .filter(|&n| labels[n] > 0)
            .map(|n| color_diff(pixels, index, n))
            .min();

        if let Some(priority) = priority {
            queue.push(priority, index);
            labels[index] = IN_QUEUE;
        }
    }

    while let Some(index) = queue.pop() {
        let mut label = 0;
        for &offset in &NEIGHBOURS {
            let Some(n) = neighbour(index, offset) else { continue };
            let candidate = labels[n];
            if candidate <= 0 {
                continue;
            }
            if label == 0 {
                label = candidate;
            } else if label != candidate {
                label = BOUNDARY_LABEL;
            }
        }

        if label == 0 {
            label = BOUNDARY_LABEL;
        }
        labels[index] = label;

        if label == BOUNDARY_LABEL {
            continue;
        }

        for &offset in &NEIGHBOURS {
            let Some(n) = neighbour(index, offset) else { continue };
            if labels[n] == 0 {
                queue.push(color_diff(pixels, index, n), n);
                labels[n] = IN_QUEUE;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    fn label_at(mask: &LabelMask, x: u32, y: u32) -> i32 {
        mask.get_pixel(x, y)[0]
    }

    #[test]
    fn test_flooding_stops_at_intensity_edge() {
        // Dark left half, bright right half
        let image = RgbImage::from_fn(20, 10, |x, _| {
            if x < 10 { Rgb([10, 10, 10]) } else { Rgb([240, 240, 240]) }
        });
        let mut mask = LabelMask::new(20, 10);
        mask.put_pixel(3, 5, Luma([2]));
        mask.put_pixel(16, 5, Luma([3]));

        grow_regions(&image, &mut mask).expect("Should grow regions");

        for y in 1..9 {
            for x in 1..9 {
                assert_eq!(label_at(&mask, x, y), 2, "pixel ({}, {})", x, y);
            }
            for x in 11..19 {
                assert_eq!(label_at(&mask, x, y), 3, "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_frame_becomes_boundary() {
        let image = RgbImage::new(8, 8);
        let mut mask = LabelMask::new(8, 8);
        mask.put_pixel(4, 4, Luma([5]));

        grow_regions(&image, &mut mask).expect("Should grow regions");

        assert_eq!(label_at(&mask, 0, 0), BOUNDARY_LABEL);
        assert_eq!(label_at(&mask, 7, 3), BOUNDARY_LABEL);
        // A single seed claims the whole interior
        for y in 1..7 {
            for x in 1..7 {
                assert_eq!(label_at(&mask, x, y), 5);
            }
        }
    }

    #[test]
    fn test_without_seeds_interior_stays_unassigned() {
        let image = RgbImage::new(6, 6);
        let mut mask = LabelMask::new(6, 6);

        grow_regions(&image, &mut mask).expect("Should grow regions");

        assert_eq!(label_at(&mask, 3, 3), 0);
        assert!(mask.pixels().all(|p| p[0] == 0 || p[0] == BOUNDARY_LABEL));
    }

    #[test]
    fn test_dimension_mismatch_is_an_error() {
        let image = RgbImage::new(6, 6);
        let mut mask = LabelMask::new(5, 6);
        assert!(grow_regions(&image, &mut mask).is_err());
    }
}
