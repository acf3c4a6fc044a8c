//! Ownership of the three rasters segmentation works on.
//!
//! Buffers are plain owned values: replacing or dropping one frees it, so
//! every exit path (including `?` early returns) releases what it allocated.

use image::{DynamicImage, RgbImage};
use tracing::debug;
use crate::{
    error::{Result, WatershedError},
    traits::ImageBackend,
    types::LabelMask,
};

/// Original, working and label rasters of one engine
#[derive(Debug, Clone)]
pub struct WorkingImageState {
    pub(crate) original: RgbImage,
    pub(crate) working: RgbImage,
    /// Same dimensions as `working` whenever present
    pub(crate) label_mask: Option<LabelMask>,
}

impl WorkingImageState {
    pub fn original(&self) -> &RgbImage {
        &self.original
    }

    pub fn working(&self) -> &RgbImage {
        &self.working
    }

    pub fn label_mask(&self) -> Option<&LabelMask> {
        self.label_mask.as_ref()
    }

    /// Replace the working raster; the label mask no longer matches and is dropped
    pub(crate) fn replace_working(&mut self, working: RgbImage) {
        self.working = working;
        self.label_mask = None;
    }
}

#[derive(Debug, Default)]
enum Lifecycle {
    #[default]
    Empty,
    Ready(WorkingImageState),
    TornDown,
}

/// Holds the engine's rasters and enforces initialize / teardown ordering
#[derive(Debug, Default)]
pub struct ImageBufferStore {
    lifecycle: Lifecycle,
}

impl ImageBufferStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a new source image, replacing whatever was loaded before
    pub fn initialize<B>(&mut self, backend: &B, source: &DynamicImage) -> Result<()>
    where
        B: ImageBackend + ?Sized,
    {
        if matches!(self.lifecycle, Lifecycle::TornDown) {
            return Err(WatershedError::State(
                "engine was torn down and cannot be re-initialized".to_string(),
            ));
        }

        if source.width() == 0 || source.height() == 0 {
            return Err(WatershedError::Initialization(format!(
                "source image has zero area ({}x{})",
                source.width(),
                source.height()
            )));
        }

        if let Lifecycle::Ready(previous) = std::mem::take(&mut self.lifecycle) {
            debug!(
                width = previous.original.width(),
                height = previous.original.height(),
                "Releasing buffers of previous image"
            );
        }

        let original = backend.to_working_color_space(source);
        let working = original.clone();
        debug!(width = original.width(), height = original.height(), "Image buffers initialized");

        self.lifecycle = Lifecycle::Ready(WorkingImageState {
            original,
            working,
            label_mask: None,
        });
        Ok(())
    }

    /// Release every buffer. Safe to call any number of times.
    pub fn teardown(&mut self) {
        match std::mem::replace(&mut self.lifecycle, Lifecycle::TornDown) {
            Lifecycle::Ready(state) => {
                debug!(
                    has_label_mask = state.label_mask.is_some(),
                    "Releasing image buffers"
                );
            }
            Lifecycle::Empty => debug!("Teardown before initialization"),
            Lifecycle::TornDown => debug!("Teardown already performed"),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Ready(_))
    }

    pub fn state(&self) -> Result<&WorkingImageState> {
        match &self.lifecycle {
            Lifecycle::Ready(state) => Ok(state),
            Lifecycle::Empty => Err(not_initialized()),
            Lifecycle::TornDown => Err(torn_down()),
        }
    }

    pub fn state_mut(&mut self) -> Result<&mut WorkingImageState> {
        match &mut self.lifecycle {
            Lifecycle::Ready(state) => Ok(state),
            Lifecycle::Empty => Err(not_initialized()),
            Lifecycle::TornDown => Err(torn_down()),
        }
    }
}

fn not_initialized() -> WatershedError {
    WatershedError::State("no image loaded; call initialize first".to_string())
}

fn torn_down() -> WatershedError {
    WatershedError::State("engine was torn down".to_string())
}
