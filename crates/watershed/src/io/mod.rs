pub mod geojson;

pub use self::geojson::PolygonSet;
