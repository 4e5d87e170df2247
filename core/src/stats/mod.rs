//! Empirical distributions behind the generator
//!
//! - [`Statistics`]: the immutable bundle of modality profiles and value tables
//! - [`WeightedSampler`]: weighted random choice used by every table
//! - [`ModalityProfile`]: per-modality counts and shape policy

mod profile;
mod registry;
mod sampler;

pub use profile::{
    clamp_count, CountDistribution, FixedShape, ModalityProfile, NormalParams, ShapePolicy,
};
pub use registry::{Statistics, TagDistributions};
pub use sampler::WeightedSampler;
