pub mod attributes;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod harness;
pub mod layout;
pub mod model;
pub mod person;
pub mod sink;
pub mod stats;
pub mod types;
pub mod uid;

pub use attributes::ImageAttributes;
pub use cli::report::RunReport;
pub use config::{GeneratorConfig, ImageQuota, OutputMode};
pub use error::{GeneratorError, Result};
pub use generator::{DicomDataGenerator, GenerationSummary, StudyEmission};
pub use harness::{write_test_data, DataGenerator};
pub use layout::FileSystemLayout;
pub use model::{Series, SeriesBuilder, Study, StudyBuilder, StudyShape};
pub use person::{read_people, Address, Person};
pub use sink::{
    CollectingSink, DicomEncoder, FileTreeSink, ImageSink, OutputSink, PixelRenderer,
    TabularSink, TabularWriter,
};
pub use stats::{ModalityProfile, ShapePolicy, Statistics, WeightedSampler};
pub use types::*;
pub use uid::generate_uid;
