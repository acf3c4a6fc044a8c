pub mod builder;
pub mod scaling;
pub mod markers;
pub mod segmentation;
pub mod contours;

use image::DynamicImage;
use tracing::{debug, warn};
use crate::{
    algorithms::ImageprocBackend,
    buffers::{ImageBufferStore, WorkingImageState},
    error::Result,
    traits::ImageBackend,
    types::{EngineConfig, Marker, WatershedPolygon},
};

/// Interactive marker-based segmentation over one source image.
///
/// The backend is injected once and kept for the engine's lifetime. Calls
/// take `&mut self`, so they are serialized by construction; each call
/// reuses the buffers left by the previous one.
pub struct WatershedEngine<B: ImageBackend = ImageprocBackend> {
    backend: B,
    config: EngineConfig,
    buffers: ImageBufferStore,
}

impl WatershedEngine<ImageprocBackend> {
    /// Engine with the default backend and configuration
    pub fn new() -> Self {
        Self::with_backend(ImageprocBackend)
    }

    /// Create a new engine builder
    pub fn builder() -> builder::EngineBuilder<ImageprocBackend> {
        builder::EngineBuilder::new()
    }
}

impl Default for WatershedEngine<ImageprocBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ImageBackend> WatershedEngine<B> {
    pub fn with_backend(backend: B) -> Self {
        Self::from_parts(backend, EngineConfig::default())
    }

    pub fn from_parts(backend: B, config: EngineConfig) -> Self {
        Self {
            backend,
            config,
            buffers: ImageBufferStore::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Load the image to segment, releasing buffers of any previous image
    pub fn initialize(&mut self, source: &DynamicImage) -> Result<()> {
        self.buffers.initialize(&self.backend, source)
    }

    /// Release all buffers. The engine cannot be used afterwards.
    pub fn teardown(&mut self) {
        self.buffers.teardown();
    }

    pub fn is_ready(&self) -> bool {
        self.buffers.is_ready()
    }

    /// Current buffers, for inspection
    pub fn state(&self) -> Result<&WorkingImageState> {
        self.buffers.state()
    }

    /// Match the working resolution to `sensitivity`; true if it changed
    pub fn rescale(&mut self, sensitivity: f64) -> Result<bool> {
        let state = self.buffers.state_mut()?;
        scaling::rescale(&self.backend, state, sensitivity)
    }

    /// Rasterize `markers` into a new label mask at working resolution
    pub fn draw_markers(&mut self, markers: &[Marker]) -> Result<()> {
        let state = self.buffers.state_mut()?;
        markers::draw_markers(&self.backend, &self.config, state, markers);
        Ok(())
    }

    /// Grow the rasterized markers into a full segmentation
    pub fn run(&mut self) -> Result<()> {
        let state = self.buffers.state_mut()?;
        segmentation::run(&self.backend, state)
    }

    /// Polygons for every non-background marker id in the segmented mask
    pub fn extract(&self, markers: &[Marker]) -> Result<Vec<WatershedPolygon>> {
        let state = self.buffers.state()?;
        contours::extract(&self.backend, &self.config, state, markers)
    }

    /// Segment the image from `markers` at the resolution `sensitivity` selects.
    ///
    /// Only misuse (no image loaded, engine torn down) is an error. Any failure
    /// inside the computation is logged and reported as no polygons.
    pub fn execute_segmentation(&mut self, markers: &[Marker], sensitivity: f64) -> Result<Vec<WatershedPolygon>> {
        self.buffers.state()?;

        match self.segment(markers, sensitivity) {
            Ok(polygons) => {
                debug!(markers = markers.len(), polygons = polygons.len(), "Segmentation complete");
                Ok(polygons)
            }
            Err(e) if e.is_contract_violation() => Err(e),
            Err(e) => {
                warn!(markers = markers.len(), sensitivity, "Segmentation failed: {}", e);
                Ok(Vec::new())
            }
        }
    }

    fn segment(&mut self, markers: &[Marker], sensitivity: f64) -> Result<Vec<WatershedPolygon>> {
        self.rescale(sensitivity)?;
        self.draw_markers(markers)?;
        self.run()?;
        self.extract(markers)
    }
}
