use crate::layout::FileSystemLayout;
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};

/// Where generated images go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// One DICOM file per image
    Files { layout: FileSystemLayout },

    /// Study, series and image tables
    Tabular,
}

impl Default for OutputMode {
    fn default() -> Self {
        OutputMode::Files {
            layout: FileSystemLayout::default(),
        }
    }
}

/// Configuration for a generation run
///
/// # Example
///
/// ```
/// use dicomgen_core::{FileSystemLayout, GeneratorConfig, OutputMode};
///
/// let config = GeneratorConfig::new("out")
///     .with_modalities(["CT", "MR"])
///     .with_maximum_images(100)
///     .with_layout(FileSystemLayout::Flat)
///     .no_pixels(true);
///
/// assert_eq!(config.modalities, vec!["CT", "MR"]);
/// assert_eq!(config.maximum_images, Some(100));
/// assert_eq!(config.output, OutputMode::Files { layout: FileSystemLayout::Flat });
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Modality codes to draw from; empty means all supported modalities
    pub modalities: Vec<String>,

    /// Total image budget across all studies; `None` is unbounded
    pub maximum_images: Option<usize>,

    /// Skip placeholder pixel data in file output
    pub no_pixels: bool,

    pub output: OutputMode,

    pub output_dir: PathBuf,

    /// Last possible study date for people still alive
    pub reference_date: NaiveDate,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            modalities: Vec::new(),
            maximum_images: None,
            no_pixels: false,
            output: OutputMode::default(),
            output_dir: PathBuf::from("."),
            reference_date: Local::now().date_naive(),
        }
    }
}

impl GeneratorConfig {
    /// Default configuration writing beneath `output_dir`
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Builder: restrict generation to these modality codes
    pub fn with_modalities<I, S>(mut self, modalities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modalities = modalities.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: cap the number of images across the run
    pub fn with_maximum_images(mut self, maximum: usize) -> Self {
        self.maximum_images = Some(maximum);
        self
    }

    /// Builder: suppress pixel data
    pub fn no_pixels(mut self, no_pixels: bool) -> Self {
        self.no_pixels = no_pixels;
        self
    }

    /// Builder: write files using `layout`
    pub fn with_layout(mut self, layout: FileSystemLayout) -> Self {
        self.output = OutputMode::Files { layout };
        self
    }

    /// Builder: write tables instead of files
    pub fn tabular(mut self) -> Self {
        self.output = OutputMode::Tabular;
        self
    }

    /// Builder: bound lifetimes of living people at `date`
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = date;
        self
    }
}

/// Remaining image budget of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageQuota {
    remaining: Option<usize>,
}

impl ImageQuota {
    pub fn new(maximum: Option<usize>) -> Self {
        Self { remaining: maximum }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Takes one image from the budget; false once it is spent
    pub fn try_take(&mut self) -> bool {
        match self.remaining.as_mut() {
            None => true,
            Some(0) => false,
            Some(n) => {
                *n -= 1;
                true
            }
        }
    }

    /// Images left, `None` if unbounded
    pub fn remaining(&self) -> Option<usize> {
        self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }
}
