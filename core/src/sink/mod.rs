//! Output sinks for generated images
//!
//! The generator streams image attribute sets, in study-major,
//! series-minor order, into exactly one [`ImageSink`]:
//! - [`FileTreeSink`]: one DICOM file per image beneath a directory layout
//! - [`TabularSink`]: study, series and image tables with one row per entity
//! - [`CollectingSink`]: keeps the images in memory

mod files;
mod tabular;

pub use files::{
    BlackBoxRenderer, DicomEncoder, DicomObjectEncoder, FileTreeSink, PixelPayload,
    PixelRenderer, PLACEHOLDER_SIZE,
};
pub use tabular::{
    group_rows, DelimitedWriter, GroupingState, RowLevel, TabularSink, TabularWriter,
    IMAGE_COLUMNS, NULL_SENTINEL, SERIES_COLUMNS, STUDY_COLUMNS,
};

use crate::attributes::ImageAttributes;
use crate::config::{GeneratorConfig, OutputMode};
use crate::error::Result;

/// Destination of generated images
pub trait ImageSink {
    /// Accepts the next image
    fn emit(&mut self, image: &ImageAttributes) -> Result<()>;

    /// Flushes buffered output
    ///
    /// Resources are released on drop regardless; calling this surfaces
    /// write errors that a drop would swallow.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: ImageSink + ?Sized> ImageSink for Box<S> {
    fn emit(&mut self, image: &ImageAttributes) -> Result<()> {
        (**self).emit(image)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

/// Keeps every emitted image in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub images: Vec<ImageAttributes>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ImageSink for CollectingSink {
    fn emit(&mut self, image: &ImageAttributes) -> Result<()> {
        self.images.push(image.clone());
        Ok(())
    }
}

/// The sink selected by a [`GeneratorConfig`]
pub enum OutputSink {
    Files(FileTreeSink),
    Tabular(TabularSink),
}

impl OutputSink {
    /// Opens the sink named by the configuration's output mode
    ///
    /// Tabular output opens its three tables immediately, headers included.
    pub fn open(config: &GeneratorConfig) -> Result<Self> {
        match config.output {
            OutputMode::Files { layout } => Ok(OutputSink::Files(FileTreeSink::new(
                &config.output_dir,
                layout,
                config.no_pixels,
            ))),
            OutputMode::Tabular => Ok(OutputSink::Tabular(TabularSink::open(&config.output_dir)?)),
        }
    }
}

impl ImageSink for OutputSink {
    fn emit(&mut self, image: &ImageAttributes) -> Result<()> {
        match self {
            OutputSink::Files(sink) => sink.emit(image),
            OutputSink::Tabular(sink) => sink.emit(image),
        }
    }

    fn finish(&mut self) -> Result<()> {
        match self {
            OutputSink::Files(sink) => sink.finish(),
            OutputSink::Tabular(sink) => sink.finish(),
        }
    }
}
