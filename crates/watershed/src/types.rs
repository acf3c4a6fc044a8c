use geo_types::{Coord, LineString, Polygon};
use image::{ImageBuffer, Luma};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Integer label raster consumed and produced by region growing.
///
/// `0` is unassigned, `-1` is the boundary sentinel, positive values are marker ids.
pub type LabelMask = ImageBuffer<Luma<i32>, Vec<i32>>;

/// Marker id reserved for the background / excluded region.
pub const BACKGROUND_MARKER_ID: i32 = 1;

/// Label value written by region growing between competing regions.
pub const BOUNDARY_LABEL: i32 = -1;

/// Polygons at or below this shoelace area are not usable annotations.
pub const MIN_VALID_POLYGON_AREA: f64 = 4.0;

/// A user-drawn scribble, in original-image pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    /// Label written into the mask; must be positive, `1` is reserved for background
    pub id: i32,
    /// Domain label this region will be annotated with
    pub label_id: String,
    /// Stroke vertices, in drawing order
    pub points: Vec<[f32; 2]>,
    /// Stroke thickness in original-image pixels
    pub brush_size: f32,
}

impl Marker {
    pub fn new(id: i32, label_id: impl Into<String>, points: Vec<[f32; 2]>, brush_size: f32) -> Self {
        Self {
            id,
            label_id: label_id.into(),
            points,
            brush_size,
        }
    }

    pub fn is_background(&self) -> bool {
        self.id == BACKGROUND_MARKER_ID
    }
}

/// One region outline produced by segmentation, in original-image coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WatershedPolygon {
    pub id: i32,
    pub label_id: String,
    pub points: Vec<[f32; 2]>,
}

impl WatershedPolygon {
    /// Convert to a geo-types polygon (the ring is closed by geo)
    pub fn to_geo_polygon(&self) -> Polygon<f32> {
        let coords: Vec<Coord<f32>> = self.points
            .iter()
            .map(|&[x, y]| Coord { x, y })
            .collect();
        Polygon::new(LineString::new(coords), vec![])
    }

    /// Unsigned shoelace area of the outline
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }

        let twice_area: f64 = (0..n)
            .map(|i| {
                let [x1, y1] = self.points[i];
                let [x2, y2] = self.points[(i + 1) % n];
                x1 as f64 * y2 as f64 - x2 as f64 * y1 as f64
            })
            .sum();

        (twice_area / 2.0).abs()
    }

    /// Length of the closed outline
    pub fn perimeter(&self) -> f64 {
        let n = self.points.len();
        if n < 2 {
            return 0.0;
        }

        (0..n)
            .map(|i| {
                let [x1, y1] = self.points[i];
                let [x2, y2] = self.points[(i + 1) % n];
                let dx = (x2 - x1) as f64;
                let dy = (y2 - y1) as f64;
                (dx * dx + dy * dy).sqrt()
            })
            .sum()
    }

    /// Whether a consumer should accept this polygon as an annotation.
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 3
            && self.points.iter().all(|&[x, y]| x.is_finite() && y.is_finite())
            && self.area() > MIN_VALID_POLYGON_AREA
    }
}

/// Engine tuning knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EngineConfig {
    /// Douglas-Peucker epsilon, in working-resolution pixels
    #[schemars(range(min = 0.0, max = 10.0))]
    pub simplify_epsilon: f32,
    /// Narrowest stroke rasterized into the label mask, in working pixels
    #[schemars(range(min = 1.0))]
    pub min_stroke_width: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            simplify_epsilon: 1.0,
            min_stroke_width: 1.0,
        }
    }
}
