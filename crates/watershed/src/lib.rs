//! # Watershed Segmentation Engine
//!
//! Interactive marker-based segmentation: user scribbles go in, labeled
//! region polygons come out. Each scribble seeds a region; the regions are
//! grown across the image until they meet along its edges, and the outline
//! of every region is traced, simplified and mapped back to image space.
//!
//! ## Core Features
//!
//! - **Sensitivity-controlled resolution**: segmentation runs on a working copy
//!   whose size follows a sensitivity value, so large images stay interactive
//! - **Marker rasterization**: thick polylines with round joins, last stroke wins
//! - **Region growing**: marker-controlled watershed flooding
//! - **Polygon extraction**: per-label contours, Douglas-Peucker simplification,
//!   coordinates in original-image space
//! - **Pluggable primitives**: every image operation goes through [`ImageBackend`]
//! - **GeoJSON Support**: export results as a FeatureCollection
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use watershed::{Marker, WatershedEngine};
//!
//! let mut engine = WatershedEngine::new();
//! engine.initialize(&image::open("photo.png")?)?;
//!
//! let markers = vec![
//!     // id 1 marks background
//!     Marker::new(1, "background", vec![[5.0, 5.0], [395.0, 5.0], [395.0, 295.0]], 4.0),
//!     Marker::new(2, "cat", vec![[190.0, 150.0], [210.0, 152.0]], 4.0),
//! ];
//!
//! let polygons = engine.execute_segmentation(&markers, 400.0)?;
//! for polygon in &polygons {
//!     println!("{} -> {} vertices", polygon.label_id, polygon.points.len());
//! }
//!
//! engine.teardown();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Engine
//!
//! ```rust,no_run
//! use watershed::WatershedEngine;
//!
//! let engine = WatershedEngine::builder()
//!     .with_simplification(2.0)
//!     .with_min_stroke_width(3.0)
//!     .build();
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod traits;
pub mod buffers;
pub mod algorithms;
pub mod pipeline;
pub mod io;

// Re-exports for convenience
pub use error::{WatershedError, Result};
pub use types::{
    EngineConfig, LabelMask, Marker, WatershedPolygon,
    BACKGROUND_MARKER_ID, BOUNDARY_LABEL, MIN_VALID_POLYGON_AREA,
};
pub use traits::*;
pub use algorithms::ImageprocBackend;
pub use buffers::{ImageBufferStore, WorkingImageState};
pub use pipeline::{WatershedEngine, builder::EngineBuilder};
pub use io::PolygonSet;
