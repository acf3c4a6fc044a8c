use crate::{
    algorithms::ImageprocBackend,
    pipeline::WatershedEngine,
    traits::ImageBackend,
    types::EngineConfig,
};

/// Builder for configuring a segmentation engine with a fluent API
pub struct EngineBuilder<B: ImageBackend> {
    backend: B,
    config: EngineConfig,
}

impl EngineBuilder<ImageprocBackend> {
    /// Create a new builder around the default backend
    pub fn new() -> Self {
        Self {
            backend: ImageprocBackend,
            config: EngineConfig::default(),
        }
    }
}

impl Default for EngineBuilder<ImageprocBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ImageBackend> EngineBuilder<B> {
    /// Swap the image-processing backend
    pub fn with_backend<N: ImageBackend>(self, backend: N) -> EngineBuilder<N> {
        EngineBuilder {
            backend,
            config: self.config,
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Douglas-Peucker epsilon for contour simplification, in working pixels
    pub fn with_simplification(mut self, epsilon: f32) -> Self {
        self.config.simplify_epsilon = epsilon;
        self
    }

    /// Narrowest stroke drawn into the label mask
    pub fn with_min_stroke_width(mut self, width: f32) -> Self {
        self.config.min_stroke_width = width;
        self
    }

    pub fn build(self) -> WatershedEngine<B> {
        WatershedEngine::from_parts(self.backend, self.config)
    }
}
