use super::profile::{ModalityProfile, ProfileRecord};
use super::sampler::WeightedSampler;
use crate::attributes::tags;
use crate::error::{GeneratorError, Result};
use crate::types::ImageType;
use chrono::NaiveTime;
use dicom_core::Tag;
use log::debug;
use rand::Rng;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

/// Statistics bundle shipped with the crate
const EMBEDDED_STATISTICS: &str = include_str!("../../resources/statistics.json");

#[derive(Debug, Deserialize)]
struct StatisticsRecord {
    modalities: Vec<ProfileRecord>,
    #[serde(default)]
    tag_values: BTreeMap<String, BTreeMap<String, Vec<(String, u64)>>>,
    #[serde(default)]
    image_types: BTreeMap<String, Vec<(String, u64)>>,
    accession: AccessionRecord,
    hour_of_day: Vec<(u32, u64)>,
}

#[derive(Debug, Deserialize)]
struct AccessionRecord {
    prefixes: Vec<(String, u64)>,
    digits: u32,
}

/// Value distributions of the tags known for one modality
#[derive(Debug, Clone, Default)]
pub struct TagDistributions {
    by_tag: BTreeMap<Tag, WeightedSampler<String>>,
}

impl TagDistributions {
    /// Iterates over distributions in tag order
    pub fn iter(&self) -> impl Iterator<Item = (Tag, &WeightedSampler<String>)> {
        self.by_tag.iter().map(|(tag, sampler)| (*tag, sampler))
    }

    /// Draws a value for `tag`, or `None` if the modality has no table for it
    pub fn sample<R: Rng + ?Sized>(&self, tag: Tag, rng: &mut R) -> Result<Option<String>> {
        self.by_tag
            .get(&tag)
            .map(|sampler| sampler.pick(rng).cloned())
            .transpose()
    }
}

/// Empirical distributions driving the generator
///
/// The bundle is immutable once built. [`Statistics::shared`] loads the
/// embedded tables once per process; builders and the generator only
/// ever borrow it.
#[derive(Debug, Clone)]
pub struct Statistics {
    profiles: Vec<ModalityProfile>,
    modality_indexes: HashMap<String, usize>,
    modality_frequency: WeightedSampler<usize>,
    tag_values: HashMap<String, TagDistributions>,
    image_types: HashMap<String, WeightedSampler<ImageType>>,
    accession_prefixes: WeightedSampler<String>,
    accession_digits: u32,
    hour_of_day: WeightedSampler<u32>,
}

impl Statistics {
    /// Returns the process-wide bundle built from the embedded tables
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Statistics`] if the embedded tables are
    /// malformed; the failure is cached like a success.
    pub fn shared() -> Result<&'static Statistics> {
        static SHARED: OnceLock<std::result::Result<Statistics, String>> = OnceLock::new();
        SHARED
            .get_or_init(|| Statistics::embedded().map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|e| GeneratorError::Statistics(e.clone()))
    }

    /// Builds a fresh bundle from the embedded tables
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_STATISTICS)
    }

    /// Builds a bundle from a JSON document with the embedded layout
    pub fn from_json(json: &str) -> Result<Self> {
        let record: StatisticsRecord = serde_json::from_str(json)?;
        Self::from_record(record)
    }

    fn from_record(record: StatisticsRecord) -> Result<Self> {
        let mut profiles = Vec::with_capacity(record.modalities.len());
        let mut modality_indexes = HashMap::new();

        for profile_record in record.modalities {
            let profile = ModalityProfile::try_from(profile_record)?;
            if modality_indexes
                .insert(profile.code.clone(), profiles.len())
                .is_some()
            {
                return Err(GeneratorError::Statistics(format!(
                    "modality {} is listed twice",
                    profile.code
                )));
            }
            profiles.push(profile);
        }

        if profiles.is_empty() {
            return Err(GeneratorError::Statistics(
                "no modalities defined".to_string(),
            ));
        }

        let modality_frequency = WeightedSampler::new(
            profiles
                .iter()
                .enumerate()
                .map(|(index, profile)| (index, profile.frequency)),
        )?;

        let mut tag_values = HashMap::new();
        for (modality, tables) in record.tag_values {
            let mut by_tag = BTreeMap::new();
            for (keyword, entries) in tables {
                let tag = tags::by_keyword(&keyword).ok_or_else(|| {
                    GeneratorError::Statistics(format!(
                        "modality {}: unknown tag keyword '{}'",
                        modality, keyword
                    ))
                })?;
                by_tag.insert(tag, WeightedSampler::new(entries)?);
            }
            tag_values.insert(modality, TagDistributions { by_tag });
        }

        let mut image_types = HashMap::new();
        for (modality, entries) in record.image_types {
            let mut parsed = Vec::with_capacity(entries.len());
            for (value, weight) in entries {
                let image_type = ImageType::parse(&value);
                if !image_type.is_valid() {
                    return Err(GeneratorError::Statistics(format!(
                        "modality {}: malformed image type '{}'",
                        modality, value
                    )));
                }
                parsed.push((image_type, weight));
            }
            let sampler = WeightedSampler::new(parsed)?;
            image_types.insert(modality, sampler);
        }

        if record.accession.digits == 0 || record.accession.digits > 18 {
            return Err(GeneratorError::Statistics(format!(
                "accession digits must be between 1 and 18, got {}",
                record.accession.digits
            )));
        }

        if let Some((hour, _)) = record.hour_of_day.iter().find(|(hour, _)| *hour > 23) {
            return Err(GeneratorError::Statistics(format!(
                "hour of day out of range: {}",
                hour
            )));
        }

        debug!(
            "Loaded statistics for {} modalities ({} with tag tables)",
            profiles.len(),
            tag_values.len()
        );

        Ok(Self {
            profiles,
            modality_indexes,
            modality_frequency,
            tag_values,
            image_types,
            accession_prefixes: WeightedSampler::new(record.accession.prefixes)?,
            accession_digits: record.accession.digits,
            hour_of_day: WeightedSampler::new(record.hour_of_day)?,
        })
    }

    /// All profiles, in bundle order
    pub fn profiles(&self) -> &[ModalityProfile] {
        &self.profiles
    }

    pub fn profile(&self, index: usize) -> Option<&ModalityProfile> {
        self.profiles.get(index)
    }

    /// Index of a modality code, if supported
    pub fn modality_index(&self, code: &str) -> Option<usize> {
        self.modality_indexes.get(code).copied()
    }

    /// Supported modality codes, in bundle order
    pub fn supported_modalities(&self) -> Vec<String> {
        self.profiles.iter().map(|p| p.code.clone()).collect()
    }

    /// Resolves requested modality codes to profile indexes
    ///
    /// An empty request selects every supported modality.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::UnsupportedModality`] naming the first
    /// unknown code and listing the supported ones.
    pub fn resolve_modalities<S: AsRef<str>>(&self, requested: &[S]) -> Result<Vec<usize>> {
        if requested.is_empty() {
            return Ok((0..self.profiles.len()).collect());
        }

        requested
            .iter()
            .map(|code| {
                let code = code.as_ref().trim();
                self.modality_index(code)
                    .ok_or_else(|| GeneratorError::UnsupportedModality {
                        requested: code.to_string(),
                        supported: self.supported_modalities(),
                    })
            })
            .collect()
    }

    /// Picks a modality by frequency, restricted to `subset`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the subset's total frequency is zero.
    pub fn pick_modality<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        subset: &[usize],
    ) -> Result<&ModalityProfile> {
        let index = *self.modality_frequency.pick_from(rng, subset)?;
        Ok(&self.profiles[index])
    }

    /// Tag value distributions for a modality, if any are known
    pub fn tag_values(&self, modality: &str) -> Option<&TagDistributions> {
        self.tag_values.get(modality)
    }

    /// Draws an image type from the modality's image-type table
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the modality has no table.
    pub fn random_image_type<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        modality: &str,
    ) -> Result<ImageType> {
        let sampler = self.image_types.get(modality).ok_or_else(|| {
            GeneratorError::config(format!("no image type table for modality {}", modality))
        })?;
        sampler.pick(rng).cloned()
    }

    /// Draws an accession number: a weighted site prefix and a zero-padded number
    pub fn random_accession_number<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String> {
        let prefix = self.accession_prefixes.pick(rng)?;
        let width = self.accession_digits as usize;
        let number = rng.gen_range(0..10u64.pow(self.accession_digits));
        Ok(format!("{}{:0width$}", prefix, number, width = width))
    }

    /// Draws a time of day: weighted hour, uniform minute and second
    pub fn random_time_of_day<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<NaiveTime> {
        let hour = *self.hour_of_day.pick(rng)?;
        let minute = rng.gen_range(0..60);
        let second = rng.gen_range(0..60);
        NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(|| {
            GeneratorError::config(format!("invalid time {}:{}:{}", hour, minute, second))
        })
    }
}
