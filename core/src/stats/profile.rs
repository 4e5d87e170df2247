use crate::error::{GeneratorError, Result};
use crate::types::ImageType;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::Deserialize;

/// Mean and standard deviation of a fitted normal distribution
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct NormalParams {
    pub mean: f64,
    pub std_dev: f64,
}

/// A count distribution (series per study, images per series)
///
/// Samples are drawn from a normal distribution, floored, and clamped to a
/// minimum of one: a fitted normal happily produces zero or negative
/// counts, which must never reach a study.
#[derive(Debug, Clone, Copy)]
pub struct CountDistribution {
    normal: Normal<f64>,
}

impl CountDistribution {
    /// # Errors
    ///
    /// Returns a configuration error for a negative or non-finite deviation.
    pub fn new(params: NormalParams) -> Result<Self> {
        if params.std_dev.is_nan() || params.std_dev < 0.0 {
            return Err(GeneratorError::config(format!(
                "standard deviation must be non-negative, got {}",
                params.std_dev
            )));
        }
        Ok(Self {
            normal: Normal::new(params.mean, params.std_dev)?,
        })
    }

    /// Raw (unclamped) sample
    pub fn sample_raw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.normal.sample(rng)
    }

    /// Sample floored to an integer and clamped to at least one
    pub fn sample_count<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        clamp_count(self.sample_raw(rng))
    }
}

/// Floors a raw sample and clamps it to a minimum of one
pub fn clamp_count(raw: f64) -> usize {
    let floored = raw.floor();
    if floored >= 1.0 {
        floored as usize
    } else {
        1
    }
}

/// A fixed study shape used when no counts are sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FixedShape {
    pub series: usize,
    pub images: usize,
}

/// How a modality decides its image type and study shape
///
/// Only reconstructed axial CT series show the large multi-series,
/// multi-slice structure of real archives; everything else is a small
/// series. Which modality behaves which way is data, looked up per
/// profile.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapePolicy {
    /// Fixed image type; series and image counts are always sampled
    Fixed { image_type: String },

    /// Image type drawn from the modality's image-type table. Counts are
    /// sampled only when the draw equals `full_shape_for`; any other image
    /// type gets the `fallback` shape.
    SampledImageType {
        full_shape_for: String,
        fallback: FixedShape,
    },
}

impl Default for ShapePolicy {
    fn default() -> Self {
        ShapePolicy::Fixed {
            image_type: ImageType::original_primary().to_string(),
        }
    }
}

/// Serialized form of a modality profile
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProfileRecord {
    pub code: String,
    pub frequency: u64,
    pub series_per_study: NormalParams,
    pub images_per_series: NormalParams,
    #[serde(default)]
    pub shape: ShapePolicy,
}

/// Statistical profile of one modality
#[derive(Debug, Clone)]
pub struct ModalityProfile {
    pub code: String,
    pub frequency: u64,
    pub series_per_study: CountDistribution,
    pub images_per_series: CountDistribution,
    pub shape: ShapePolicy,
}

impl TryFrom<ProfileRecord> for ModalityProfile {
    type Error = GeneratorError;

    fn try_from(record: ProfileRecord) -> Result<Self> {
        if let ShapePolicy::SampledImageType { fallback, .. } = &record.shape {
            if fallback.series == 0 || fallback.images == 0 {
                return Err(GeneratorError::config(format!(
                    "modality {}: fallback shape must have at least one series and one image",
                    record.code
                )));
            }
        }

        Ok(Self {
            series_per_study: CountDistribution::new(record.series_per_study)?,
            images_per_series: CountDistribution::new(record.images_per_series)?,
            code: record.code,
            frequency: record.frequency,
            shape: record.shape,
        })
    }
}
