use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde::{Deserialize, Serialize};
use crate::{
    error::{Result, WatershedError},
    types::WatershedPolygon,
};

/// Segmentation output together with the size of the image it refers to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonSet {
    pub polygons: Vec<WatershedPolygon>,
    pub image_width: u32,
    pub image_height: u32,
}

impl PolygonSet {
    pub fn new(polygons: Vec<WatershedPolygon>, image_width: u32, image_height: u32) -> Self {
        Self {
            polygons,
            image_width,
            image_height,
        }
    }

    /// Keep only polygons a consumer would accept as annotations
    pub fn retain_valid(&mut self) {
        self.polygons.retain(WatershedPolygon::is_valid);
    }

    pub fn to_geojson(&self) -> Result<FeatureCollection> {
        let mut features = Vec::new();

        for (i, polygon) in self.polygons.iter().enumerate() {
            // GeoJSON rings are explicitly closed
            let mut ring: Vec<Vec<f64>> = polygon.points
                .iter()
                .map(|&[x, y]| vec![x as f64, y as f64])
                .collect();
            if let Some(first) = ring.first().cloned() {
                ring.push(first);
            }

            let geometry = Geometry::new(Value::Polygon(vec![ring]));

            let mut properties = serde_json::Map::new();
            properties.insert("id".to_string(), serde_json::Value::from(polygon.id));
            properties.insert("labelId".to_string(), serde_json::Value::from(polygon.label_id.clone()));
            properties.insert("area".to_string(), number(polygon.area()));
            properties.insert("perimeter".to_string(), number(polygon.perimeter()));
            properties.insert("valid".to_string(), serde_json::Value::Bool(polygon.is_valid()));

            features.push(Feature {
                bbox: None,
                geometry: Some(geometry),
                id: Some(geojson::feature::Id::Number(serde_json::Number::from(i))),
                properties: Some(properties),
                foreign_members: None,
            });
        }

        let mut foreign_members = serde_json::Map::new();
        foreign_members.insert("image_width".to_string(), serde_json::Value::from(self.image_width));
        foreign_members.insert("image_height".to_string(), serde_json::Value::from(self.image_height));
        foreign_members.insert("polygon_count".to_string(), serde_json::Value::from(self.polygons.len()));

        Ok(FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(foreign_members),
        })
    }

    /// Export to GeoJSON and serialize to JSON string
    pub fn to_geojson_string(&self) -> Result<String> {
        let geojson = self.to_geojson()?;
        Ok(serde_json::to_string_pretty(&geojson)?)
    }

    /// Save GeoJSON to file
    pub fn save_geojson(&self, path: &str) -> Result<()> {
        std::fs::write(path, self.to_geojson_string()?)?;
        Ok(())
    }

    /// Load a PolygonSet from a GeoJSON string written by [`Self::to_geojson_string`]
    pub fn from_geojson_string(geojson_str: &str) -> Result<Self> {
        let geojson: FeatureCollection = geojson_str.parse()?;

        let foreign_members = geojson.foreign_members.as_ref()
            .ok_or_else(|| WatershedError::InvalidGeoJson("Missing metadata in GeoJSON".to_string()))?;
        let dimension = |key: &str| {
            foreign_members.get(key)
                .and_then(|v| v.as_u64())
                .map(|v| v as u32)
                .ok_or_else(|| WatershedError::InvalidGeoJson(format!("Missing or invalid {}", key)))
        };
        let image_width = dimension("image_width")?;
        let image_height = dimension("image_height")?;

        let mut polygons = Vec::new();
        for feature in geojson.features {
            let Some(Value::Polygon(rings)) = feature.geometry.map(|g| g.value) else {
                continue;
            };
            let Some(ring) = rings.first() else {
                continue;
            };

            let properties = feature.properties.unwrap_or_default();
            let id = properties.get("id")
                .and_then(|v| v.as_i64())
                .ok_or_else(|| WatershedError::InvalidGeoJson("Feature without id".to_string()))?;
            let label_id = properties.get("labelId")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();

            let mut points: Vec<[f32; 2]> = ring
                .iter()
                .map(|coord| [coord[0] as f32, coord[1] as f32])
                .collect();
            if points.len() > 1 && points.first() == points.last() {
                points.pop();
            }

            polygons.push(WatershedPolygon {
                id: id as i32,
                label_id,
                points,
            });
        }

        Ok(Self {
            polygons,
            image_width,
            image_height,
        })
    }
}

fn number(value: f64) -> serde_json::Value {
    serde_json::Number::from_f64(value)
        .map(serde_json::Value::Number)
        .unwrap_or_else(|| serde_json::Value::from(0))
}
