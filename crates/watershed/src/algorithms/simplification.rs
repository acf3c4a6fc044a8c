use geo_types::{Coord, LineString};

/// Douglas-Peucker simplification using geo crate's implementation.
///
/// For closed contours the ring is closed before simplifying so the seam
/// between the last and first vertex is judged like any other edge, and the
/// duplicated closing vertex is removed again afterwards.
pub fn douglas_peucker(contour: &[[f32; 2]], epsilon: f32, closed: bool) -> Vec<[f32; 2]> {
    use geo::Simplify;

    if contour.len() < 3 {
        return contour.to_vec();
    }

    let mut coords: Vec<Coord<f32>> = contour
        .iter()
        .map(|&[x, y]| Coord { x, y })
        .collect();
    if closed && coords.first() != coords.last() {
        coords.push(coords[0]);
    }

    let simplified = LineString::new(coords).simplify(&epsilon);
    let mut points: Vec<[f32; 2]> = simplified.coords()
        .map(|coord| [coord.x, coord.y])
        .collect();

    if closed && points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Traced boundary of a square: every integer point along the edges
    fn square_contour(size: i32) -> Vec<[f32; 2]> {
        let mut points = Vec::new();
        for x in 0..size {
            points.push([x as f32, 0.0]);
        }
        for y in 0..size {
            points.push([size as f32, y as f32]);
        }
        for x in (1..=size).rev() {
            points.push([x as f32, size as f32]);
        }
        for y in (1..=size).rev() {
            points.push([0.0, y as f32]);
        }
        points
    }

    #[test]
    fn test_square_reduces_to_corners() {
        let simplified = douglas_peucker(&square_contour(10), 1.0, true);

        assert_eq!(simplified.len(), 4);
        for corner in [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]] {
            assert!(simplified.contains(&corner), "missing corner {:?}", corner);
        }
    }

    #[test]
    fn test_short_contours_are_untouched() {
        let line = vec![[0.0, 0.0], [1.0, 1.0]];
        assert_eq!(douglas_peucker(&line, 1.0, true), line);
    }
}
