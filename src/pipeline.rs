//! Pipeline orchestration
//!
//! [`Pipeline`] owns every piece of mutable processing state: the loaded
//! source, the options snapshot, the target size, the cached blur output and
//! the current [`PixelGrid`]. Each run is split into a job that captures
//! everything it needs (so it can execute anywhere) and a commit step that only
//! applies the result if no newer run has started since.
//!
//! Invalidation rules:
//! - a new source replaces the blur cache and the grid together, only once
//!   its first run has succeeded
//! - a change in any blur percentage rebuilds the blur cache (full run)
//! - every other option, the resize mode and the target size reuse the cache
//!   and only redo scaling, edges, compression and quantization

use image::RgbaImage;
use std::path::Path;
use std::sync::Arc;

use crate::blur::{apply_blur_effects, create_oversized_canvas};
use crate::bounds::BlurVariants;
use crate::compression::simulate_jpeg;
use crate::dither::Ditherer;
use crate::edge::{cleanup_isolated_pixels, enhance_edges};
use crate::error::{PixelrickError, Result};
use crate::grid::PixelGrid;
use crate::options::{ProcessingOptions, ResizeHandling};
use crate::quantize::{quantize_with, Quantizer};
use crate::resize_mode::{convert_target_size, rescale_for_expand, select_source};
use crate::scale::{
    scale_to_max_dimension, validate_target_size, AUTO_SCALE_LIMIT, MAX_TARGET_SIZE,
};
use crate::source::{decode_source_bytes, decode_source_file};

/// Where the pipeline stands for the currently loaded source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// No source loaded
    Idle,
    /// Source scaled, blur not run yet
    Scaled,
    /// Blur output and bounds cached
    Blurred,
    /// A grid is ready
    Quantized,
}

/// Generation a run was started under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunTicket(u64);

impl RunTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// What happened to a finished run's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The output became the current state
    Committed,
    /// A newer run started first; the output was dropped
    Superseded,
}

/// Blur stage work captured from the pipeline.
#[derive(Debug, Clone)]
pub struct BlurJob {
    ticket: RunTicket,
    source: Arc<RgbaImage>,
    options: ProcessingOptions,
}

/// Result of a [`BlurJob`].
#[derive(Debug)]
pub struct BlurOutput {
    ticket: RunTicket,
    variants: BlurVariants,
}

impl BlurJob {
    pub fn ticket(&self) -> RunTicket {
        self.ticket
    }

    /// Draw the source on the oversized canvas, blur it and derive the variants.
    pub fn run(self) -> BlurOutput {
        let (canvas, offset) = create_oversized_canvas(&self.source);
        let blurred = apply_blur_effects(&canvas, &self.options);
        let variants = BlurVariants::derive(blurred, offset, self.source.dimensions());
        BlurOutput { ticket: self.ticket, variants }
    }
}

/// Scale-to-grid work captured from the pipeline.
#[derive(Debug, Clone)]
pub struct QuantizeJob {
    ticket: RunTicket,
    blur: Arc<BlurVariants>,
    options: ProcessingOptions,
    target_size: u32,
}

/// Result of a [`QuantizeJob`].
#[derive(Debug)]
pub struct QuantizeOutput {
    ticket: RunTicket,
    grid: PixelGrid,
    unquantized: RgbaImage,
    cleaned: usize,
}

impl QuantizeOutput {
    pub fn ticket(&self) -> RunTicket {
        self.ticket
    }

    pub fn grid(&self) -> &PixelGrid {
        &self.grid
    }

    /// Pixels replaced by isolated-pixel cleanup.
    pub fn cleaned(&self) -> usize {
        self.cleaned
    }
}

impl QuantizeJob {
    pub fn ticket(&self) -> RunTicket {
        self.ticket
    }

    /// Run every stage after blur in order: scale, edge enhancement, lossy
    /// compression, quantization with dithering, isolated-pixel cleanup.
    pub fn run(self) -> Result<QuantizeOutput> {
        let options = &self.options;
        let source = select_source(&self.blur, options.resize_handling);
        let scaled = scale_to_max_dimension(source, self.target_size)?;

        let quantizer = Quantizer::from_options(options);
        let enhanced = if options.edge_enhancement != 0.0 {
            enhance_edges(&scaled, options.edge_enhancement, &quantizer)
        } else {
            scaled
        };

        let compressed =
            simulate_jpeg(&enhanced, options.jpeg_compression_amount, options.jpeg_passes)?;

        let mut ditherer = Ditherer::from_options(options);
        let mut quantized = quantize_with(&compressed, options, &quantizer, &mut ditherer);
        let cleaned =
            if options.cleanup_isolated { cleanup_isolated_pixels(&mut quantized) } else { 0 };

        Ok(QuantizeOutput {
            ticket: self.ticket,
            grid: PixelGrid::new(quantized),
            unquantized: compressed,
            cleaned,
        })
    }
}

/// Dimensions of each stage for the loaded source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub original: (u32, u32),
    /// Working source size when it differs from the original
    pub scaled: Option<(u32, u32)>,
    /// Bound size when blur grew the content past the working source
    pub expanded: Option<(u32, u32)>,
    pub final_size: Option<(u32, u32)>,
}

/// The processing state machine.
#[derive(Debug)]
pub struct Pipeline {
    original: Option<RgbaImage>,
    source: Option<Arc<RgbaImage>>,
    options: ProcessingOptions,
    target_size: u32,
    blur: Option<Arc<BlurVariants>>,
    grid: Option<PixelGrid>,
    unquantized: Option<RgbaImage>,
    /// Bound max dimension before a blur change, used to rescale in expand mode
    pending_expand: Option<u32>,
    generation: u64,
    state: PipelineState,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(ProcessingOptions::default())
    }
}

impl Pipeline {
    pub fn new(options: ProcessingOptions) -> Self {
        Self {
            original: None,
            source: None,
            options,
            target_size: AUTO_SCALE_LIMIT,
            blur: None,
            grid: None,
            unquantized: None,
            pending_expand: None,
            generation: 0,
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn options(&self) -> &ProcessingOptions {
        &self.options
    }

    pub fn target_size(&self) -> u32 {
        self.target_size
    }

    pub fn grid(&self) -> Option<&PixelGrid> {
        self.grid.as_ref()
    }

    /// Scaled bitmap right before quantization, from the last committed run.
    pub fn unquantized(&self) -> Option<&RgbaImage> {
        self.unquantized.as_ref()
    }

    pub fn blur_variants(&self) -> Option<&BlurVariants> {
        self.blur.as_deref()
    }

    /// The decoded image as loaded.
    pub fn original(&self) -> Option<&RgbaImage> {
        self.original.as_ref()
    }

    /// The working source the blur stage starts from.
    pub fn source(&self) -> Option<&RgbaImage> {
        self.source.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, ticket: RunTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Load a new source image and process it with the current color settings.
    ///
    /// Non-color settings are reset. Sources larger than 64 pixels on their
    /// longer side are scaled down first and the target size becomes 64;
    /// smaller sources use their own longer side.
    pub fn load_source(&mut self, image: RgbaImage) -> Result<RunOutcome> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(PixelrickError::InvalidDimension(0));
        }

        let max_dimension = width.max(height);
        let source = if max_dimension > AUTO_SCALE_LIMIT {
            log::info!("auto-scaling {}x{} source to {}px", width, height, AUTO_SCALE_LIMIT);
            scale_to_max_dimension(&image, AUTO_SCALE_LIMIT)?
        } else {
            image.clone()
        };

        let mut options = self.options.clone();
        options.reset_non_color_settings();
        self.replace_source(Some(image), source, options, max_dimension.min(AUTO_SCALE_LIMIT))
    }

    /// Decode PNG or JPEG bytes and load them as the new source.
    pub fn load_source_bytes(&mut self, bytes: &[u8]) -> Result<RunOutcome> {
        let image = decode_source_bytes(bytes)?;
        self.load_source(image)
    }

    /// Read a PNG or JPEG file and load it as the new source.
    pub fn load_source_file(&mut self, path: &Path) -> Result<RunOutcome> {
        let image = decode_source_file(path)?;
        self.load_source(image)
    }

    /// Restore a pipeline from saved state without resetting any option.
    ///
    /// # Arguments
    ///
    /// * `image` - The original decoded image
    /// * `options` - Saved options snapshot
    /// * `scale_size` - Longer side of the working source when it was saved
    /// * `target_size` - Saved target size of the grid
    pub fn restore(
        &mut self,
        image: RgbaImage,
        options: ProcessingOptions,
        scale_size: u32,
        target_size: u32,
    ) -> Result<RunOutcome> {
        if target_size == 0 || target_size > MAX_TARGET_SIZE {
            return Err(PixelrickError::InvalidScaleTarget(target_size.to_string()));
        }
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(PixelrickError::InvalidDimension(0));
        }
        options.validate()?;

        let source = if scale_size > 0 && scale_size != width.max(height) {
            scale_to_max_dimension(&image, scale_size)?
        } else {
            image.clone()
        };

        self.replace_source(Some(image), source, options, target_size)
    }

    /// Re-scale the loaded image to `size` and process it again.
    pub fn rescale_source(&mut self, size: u32) -> Result<RunOutcome> {
        let size = validate_target_size(size)?;
        let original = self.original.as_ref().ok_or(PixelrickError::NoSource)?;
        let source = scale_to_max_dimension(original, size)?;
        let options = self.options.clone();
        self.replace_source(None, source, options, size)
    }

    /// Run blur and quantization for a new working source, then swap it in.
    ///
    /// Nothing is replaced unless both stages succeed, so a failed run keeps
    /// the previous source, options, target size and grid. `original` is
    /// `None` when only the working source changes.
    fn replace_source(
        &mut self,
        original: Option<RgbaImage>,
        source: RgbaImage,
        options: ProcessingOptions,
        target_size: u32,
    ) -> Result<RunOutcome> {
        let source = Arc::new(source);
        let job = BlurJob {
            ticket: self.next_ticket(),
            source: Arc::clone(&source),
            options: options.clone(),
        };
        let blur = Arc::new(job.run().variants);

        let job = QuantizeJob {
            ticket: self.next_ticket(),
            blur: Arc::clone(&blur),
            options: options.clone(),
            target_size,
        };
        let output = match job.run() {
            Ok(output) => output,
            Err(e) => {
                log::warn!("run aborted, keeping previous source and grid: {}", e);
                return Err(e);
            }
        };

        if let Some(original) = original {
            self.original = Some(original);
        }
        self.source = Some(source);
        self.options = options;
        self.target_size = target_size;
        self.blur = Some(blur);
        self.pending_expand = None;
        self.state = PipelineState::Blurred;
        Ok(self.commit(output))
    }

    /// Replace the options snapshot and rerun as little as possible.
    ///
    /// Switching resize mode converts the target size first. A blur change
    /// rebuilds the blur cache; in expand mode the target size then follows
    /// the change in bound size.
    pub fn set_options(&mut self, options: ProcessingOptions) -> Result<RunOutcome> {
        options.validate()?;

        if let Some(variants) = &self.blur {
            if options.resize_handling != self.options.resize_handling {
                let converted = convert_target_size(
                    self.options.resize_handling,
                    options.resize_handling,
                    self.target_size,
                    variants.original_max_dimension(),
                    variants.expanded_max_dimension(),
                );
                log::debug!(
                    "resize mode {} -> {}: target {} -> {}",
                    self.options.resize_handling,
                    options.resize_handling,
                    self.target_size,
                    converted
                );
                self.target_size = converted;
            }
        }

        let blur_changed = options.blur_differs(&self.options);
        self.options = options;

        if self.source.is_none() {
            return Ok(RunOutcome::Committed);
        }

        if blur_changed || self.blur.is_none() {
            self.pending_expand = self.blur.as_ref().map(|v| v.expanded_max_dimension());
            self.run_full()
        } else {
            self.run_quick()
        }
    }

    /// Set a new target size (8..=1024) and requantize from the blur cache.
    pub fn set_target_size(&mut self, size: u32) -> Result<RunOutcome> {
        self.target_size = validate_target_size(size)?;
        if self.source.is_none() {
            return Ok(RunOutcome::Committed);
        }
        self.run_quick()
    }

    /// Run blur and everything after it.
    pub fn run_full(&mut self) -> Result<RunOutcome> {
        let job = self.prepare_blur()?;
        let outcome = self.commit_blur(job.run());
        if outcome == RunOutcome::Superseded {
            return Ok(outcome);
        }
        self.run_quick()
    }

    /// Run everything after blur from the cached blur output.
    pub fn run_quick(&mut self) -> Result<RunOutcome> {
        let job = self.prepare_quantize()?;
        match job.run() {
            Ok(output) => Ok(self.commit(output)),
            Err(e) => {
                log::warn!("run aborted, keeping previous grid: {}", e);
                Err(e)
            }
        }
    }

    fn next_ticket(&mut self) -> RunTicket {
        self.generation += 1;
        RunTicket(self.generation)
    }

    /// Start a blur run. Any run started earlier becomes stale, and the
    /// pipeline reports `Scaled` until a blur output is committed.
    pub fn prepare_blur(&mut self) -> Result<BlurJob> {
        let source = self.source.clone().ok_or(PixelrickError::NoSource)?;
        self.state = PipelineState::Scaled;
        Ok(BlurJob { ticket: self.next_ticket(), source, options: self.options.clone() })
    }

    /// Cache a blur result if it is still current and apply any pending
    /// expand-mode target adjustment.
    pub fn commit_blur(&mut self, output: BlurOutput) -> RunOutcome {
        if !self.is_current(output.ticket) {
            log::warn!(
                "discarding blur output from generation {} (current {})",
                output.ticket.0,
                self.generation
            );
            return RunOutcome::Superseded;
        }

        self.blur = Some(Arc::new(output.variants));
        self.state = PipelineState::Blurred;
        self.apply_pending_expand();
        RunOutcome::Committed
    }

    fn apply_pending_expand(&mut self) {
        let Some(old_max) = self.pending_expand.take() else {
            return;
        };
        if self.options.resize_handling != ResizeHandling::Expand {
            return;
        }
        let Some(variants) = &self.blur else {
            return;
        };
        if let Some(adjusted) =
            rescale_for_expand(self.target_size, old_max, variants.expanded_max_dimension())
        {
            if adjusted != self.target_size {
                log::info!("expand mode: target size {} -> {}", self.target_size, adjusted);
                self.target_size = adjusted;
            }
        }
    }

    /// Start a scale-to-grid run from the blur cache. Any run started earlier
    /// becomes stale.
    pub fn prepare_quantize(&mut self) -> Result<QuantizeJob> {
        let blur = self.blur.clone().ok_or(PixelrickError::NoSource)?;
        Ok(QuantizeJob {
            ticket: self.next_ticket(),
            blur,
            options: self.options.clone(),
            target_size: self.target_size,
        })
    }

    /// Apply a finished run if its ticket is still the latest.
    pub fn commit(&mut self, output: QuantizeOutput) -> RunOutcome {
        if !self.is_current(output.ticket) {
            log::warn!(
                "discarding grid from generation {} (current {})",
                output.ticket.0,
                self.generation
            );
            return RunOutcome::Superseded;
        }

        log::info!(
            "grid {}x{} ready ({} cleaned pixels)",
            output.grid.width(),
            output.grid.height(),
            output.cleaned
        );
        self.grid = Some(output.grid);
        self.unquantized = Some(output.unquantized);
        self.state = PipelineState::Quantized;
        RunOutcome::Committed
    }

    /// Stage dimensions for the loaded source, `None` when idle.
    pub fn image_info(&self) -> Option<ImageInfo> {
        let original = self.original.as_ref()?.dimensions();
        let working = self.source.as_ref().map(|s| s.dimensions());
        let scaled = working.filter(|w| *w != original);
        let expanded = match (&self.blur, working) {
            (Some(v), Some((w, h))) if v.bounds.width > w || v.bounds.height > h => {
                Some((v.bounds.width, v.bounds.height))
            }
            _ => None,
        };
        Some(ImageInfo {
            original,
            scaled,
            expanded,
            final_size: self.grid.as_ref().map(|g| g.dimensions()),
        })
    }
}
