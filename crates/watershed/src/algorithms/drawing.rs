use image::Luma;
use imageproc::drawing::{draw_filled_circle_mut, BresenhamLineIter};
use crate::types::LabelMask;

/// Thick polyline with round joins and caps.
///
/// A disc of the stroke radius is stamped at every Bresenham step of every
/// segment, so consecutive segments always overlap and the stroke is one
/// 4-connected region. A single point yields a dot.
///
/// Geometry is clipped to the mask grown by the radius first, so strokes far
/// outside the mask cost nothing and never reach pixel coordinates that
/// overflow `i32`.
pub fn draw_polyline(mask: &mut LabelMask, points: &[[f32; 2]], label: i32, thickness: f32) {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return;
    }

    let extent = width.max(height) as f32;
    let radius = ((thickness.max(1.0) - 1.0) / 2.0).round().min(extent);
    let bounds = Bounds::around(width, height, radius + 1.0);
    let radius = radius as i32;
    let color = Luma([label]);

    match points {
        [] => {}
        [point] => {
            if let Some((x, y)) = bounds.pixel(*point) {
                draw_filled_circle_mut(mask, (x, y), radius, color);
            }
        }
        _ => {
            for segment in points.windows(2) {
                let Some((start, end)) = bounds.clip(segment[0], segment[1]) else {
                    continue;
                };
                let start = (start[0].round(), start[1].round());
                let end = (end[0].round(), end[1].round());
                for (x, y) in BresenhamLineIter::new(start, end) {
                    draw_filled_circle_mut(mask, (x, y), radius, color);
                }
                // Joint disc
                draw_filled_circle_mut(mask, (end.0 as i32, end.1 as i32), radius, color);
            }
        }
    }
}

/// Region where a stamped disc can still touch the mask
#[derive(Debug, Clone, Copy)]
struct Bounds {
    min: [f32; 2],
    max: [f32; 2],
}

impl Bounds {
    fn around(width: u32, height: u32, margin: f32) -> Self {
        Self {
            min: [-margin, -margin],
            max: [width as f32 - 1.0 + margin, height as f32 - 1.0 + margin],
        }
    }

    fn contains(&self, [x, y]: [f32; 2]) -> bool {
        (self.min[0]..=self.max[0]).contains(&x) && (self.min[1]..=self.max[1]).contains(&y)
    }

    /// Rounded pixel of a point inside the bounds; outside or non-finite points have none
    fn pixel(&self, point: [f32; 2]) -> Option<(i32, i32)> {
        self.contains(point)
            .then(|| (point[0].round() as i32, point[1].round() as i32))
    }

    /// Liang-Barsky clip of the segment `a`-`b` against the bounds
    fn clip(&self, a: [f32; 2], b: [f32; 2]) -> Option<([f32; 2], [f32; 2])> {
        if !a.iter().chain(&b).all(|v| v.is_finite()) {
            return None;
        }

        // f64 so the span between two extreme f32 coordinates stays finite
        let a = [a[0] as f64, a[1] as f64];
        let delta = [b[0] as f64 - a[0], b[1] as f64 - a[1]];
        let (mut t0, mut t1) = (0.0f64, 1.0f64);

        for axis in 0..2 {
            let min = self.min[axis] as f64;
            let max = self.max[axis] as f64;
            for (p, q) in [(-delta[axis], a[axis] - min), (delta[axis], max - a[axis])] {
                if p == 0.0 {
                    if q < 0.0 {
                        return None;
                    }
                    continue;
                }
                let t = q / p;
                if p < 0.0 {
                    t0 = t0.max(t);
                } else {
                    t1 = t1.min(t);
                }
            }
        }

        if t0 > t1 {
            return None;
        }

        // Clamped since rounding may leave the clipped point a hair outside
        let at = |t: f64| {
            [
                ((a[0] + t * delta[0]) as f32).clamp(self.min[0], self.max[0]),
                ((a[1] + t * delta[1]) as f32).clamp(self.min[1], self.max[1]),
            ]
        };
        Some((at(t0), at(t1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::region_labelling::{connected_components, Connectivity};

    fn count(mask: &LabelMask, label: i32) -> usize {
        mask.pixels().filter(|p| p[0] == label).count()
    }

    #[test]
    fn test_single_point_draws_dot() {
        let mut mask = LabelMask::new(10, 10);
        draw_polyline(&mut mask, &[[5.0, 5.0]], 3, 1.0);

        assert_eq!(count(&mask, 3), 1);
        assert_eq!(mask.get_pixel(5, 5)[0], 3);
    }

    #[test]
    fn test_thick_stroke_is_one_region() {
        let mut mask = LabelMask::new(40, 40);
        let points = [[5.0, 5.0], [30.0, 8.0], [12.0, 33.0], [35.0, 35.0]];
        draw_polyline(&mut mask, &points, 2, 5.0);

        let binary = image::GrayImage::from_fn(40, 40, |x, y| {
            Luma([if mask.get_pixel(x, y)[0] == 2 { 255u8 } else { 0 }])
        });
        let components = connected_components(&binary, Connectivity::Four, Luma([0u8]));
        let max_label = components.pixels().map(|p| p[0]).max().unwrap_or(0);
        assert_eq!(max_label, 1, "stroke should be a single 4-connected component");

        for &[x, y] in &points {
            assert_eq!(mask.get_pixel(x as u32, y as u32)[0], 2);
        }
    }

    #[test]
    fn test_strokes_clip_at_mask_edges() {
        let mut mask = LabelMask::new(10, 10);
        draw_polyline(&mut mask, &[[-5.0, 5.0], [15.0, 5.0]], 4, 3.0);

        assert!(count(&mask, 4) >= 10);
        assert_eq!(mask.get_pixel(0, 5)[0], 4);
        assert_eq!(mask.get_pixel(9, 5)[0], 4);
    }

    #[test]
    fn test_empty_points_draw_nothing() {
        let mut mask = LabelMask::new(4, 4);
        draw_polyline(&mut mask, &[], 2, 3.0);
        assert_eq!(count(&mask, 2), 0);
    }

    #[test]
    fn test_far_off_mask_geometry_is_ignored() {
        let mut mask = LabelMask::new(40, 30);
        draw_polyline(&mut mask, &[[2.2e9, 5.0], [2.3e9, 5.0]], 2, 1.0);
        draw_polyline(&mut mask, &[[3.0e9, 5.0]], 2, 4.0);
        draw_polyline(&mut mask, &[[f32::MAX, f32::MIN], [f32::MAX, f32::MAX]], 2, 1.0);
        draw_polyline(&mut mask, &[[f32::NAN, 5.0], [10.0, f32::INFINITY]], 2, 3.0);

        assert_eq!(count(&mask, 2), 0);
    }

    #[test]
    fn test_huge_stroke_is_clipped_to_the_mask() {
        let mut mask = LabelMask::new(40, 30);
        draw_polyline(&mut mask, &[[-1.0e7, 15.0], [1.0e7, 15.0]], 3, 1.0);

        let row: Vec<i32> = (0..40).map(|x| mask.get_pixel(x, 15)[0]).collect();
        assert!(row.iter().all(|&label| label == 3));
        assert_eq!(count(&mask, 3), 40);
    }

    #[test]
    fn test_oversized_brush_fills_the_mask() {
        let mut mask = LabelMask::new(40, 30);
        draw_polyline(&mut mask, &[[20.0, 15.0]], 4, 1.0e9);
        assert_eq!(count(&mask, 4), 40 * 30);
    }

    #[test]
    fn test_segment_entering_the_mask_is_drawn_inside() {
        let mut mask = LabelMask::new(20, 20);
        draw_polyline(&mut mask, &[[-5.0e8, 10.0], [10.0, 10.0]], 5, 1.0);

        for x in 0..=10 {
            assert_eq!(mask.get_pixel(x, 10)[0], 5, "pixel ({}, 10)", x);
        }
        assert_eq!(mask.get_pixel(11, 10)[0], 0);
    }
}
