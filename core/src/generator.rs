//! Study generation and routing to a sink

use crate::attributes::ImageAttributes;
use crate::config::{GeneratorConfig, ImageQuota};
use crate::error::{GeneratorError, Result};
use crate::model::{image_attributes, Study, StudyBuilder};
use crate::person::Person;
use crate::sink::{ImageSink, OutputSink};
use crate::stats::Statistics;
use crate::uid::generate_uid;
use chrono::NaiveDate;
use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of generating one study
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyEmission {
    pub study_uid: String,
    pub modality: String,

    /// Images handed to the sink
    pub emitted: usize,

    /// Images the study was built with
    pub total: usize,
}

impl StudyEmission {
    /// True when the quota ran out part way through the study
    pub fn is_partial(&self) -> bool {
        self.emitted < self.total
    }

    /// The study UID if any image was emitted
    pub fn row(&self) -> Option<&str> {
        (self.emitted > 0).then_some(self.study_uid.as_str())
    }
}

/// Running totals of what reached the sink
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationSummary {
    pub studies: usize,
    pub partial_studies: usize,
    pub images: usize,

    /// Studies per modality code
    pub modalities: BTreeMap<String, usize>,
}

impl GenerationSummary {
    fn record(&mut self, emission: &StudyEmission) {
        if emission.emitted == 0 {
            return;
        }
        self.studies += 1;
        self.images += emission.emitted;
        if emission.is_partial() {
            self.partial_studies += 1;
        }
        *self.modalities.entry(emission.modality.clone()).or_default() += 1;
    }
}

/// Generates synthetic studies for people and streams their images into a sink
///
/// Generation is deterministic for a given seed apart from UIDs.
///
/// # Example
///
/// ```
/// use dicomgen_core::{CollectingSink, DicomDataGenerator, GeneratorConfig, Person, Statistics};
/// use chrono::NaiveDate;
///
/// let stats = Statistics::embedded().unwrap();
/// let config = GeneratorConfig::new("unused")
///     .with_modalities(["MR"])
///     .with_maximum_images(5)
///     .with_reference_date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
///
/// let mut generator =
///     DicomDataGenerator::with_sink(&stats, &config, 42, CollectingSink::new()).unwrap();
///
/// let person = Person::new("0101801234", "Ada", "Lovelace", NaiveDate::from_ymd_opt(1980, 1, 1).unwrap());
/// while generator.generate_test_data_row(&person).unwrap().is_some() {}
///
/// assert_eq!(generator.sink().images.len(), 5);
/// ```
pub struct DicomDataGenerator<'s, S: ImageSink = OutputSink> {
    stats: &'s Statistics,
    subset: Vec<usize>,
    reference_date: NaiveDate,
    rng: ChaCha8Rng,
    quota: ImageQuota,
    sink: S,
    summary: GenerationSummary,
}

impl<'s> DicomDataGenerator<'s, OutputSink> {
    /// Creates a generator writing to the sink named by `config`
    ///
    /// # Errors
    ///
    /// Fails with [`GeneratorError::UnsupportedModality`] before any output
    /// is created if a configured modality is unknown, or with an I/O error
    /// if the sink cannot be opened.
    pub fn new(stats: &'s Statistics, config: &GeneratorConfig, seed: u64) -> Result<Self> {
        let subset = stats.resolve_modalities(&config.modalities)?;
        let sink = OutputSink::open(config)?;
        Ok(Self::assemble(stats, subset, config, seed, sink))
    }
}

impl<'s, S: ImageSink> DicomDataGenerator<'s, S> {
    /// Creates a generator writing to a caller-supplied sink
    ///
    /// The output mode and directory of `config` are ignored.
    pub fn with_sink(stats: &'s Statistics, config: &GeneratorConfig, seed: u64, sink: S) -> Result<Self> {
        let subset = stats.resolve_modalities(&config.modalities)?;
        Ok(Self::assemble(stats, subset, config, seed, sink))
    }

    fn assemble(stats: &'s Statistics, subset: Vec<usize>, config: &GeneratorConfig, seed: u64, sink: S) -> Self {
        let codes: Vec<&str> = subset
            .iter()
            .filter_map(|&i| stats.profile(i))
            .map(|p| p.code.as_str())
            .collect();
        info!(
            "Generator ready: seed {}, modalities [{}], image limit {}",
            seed,
            codes.join(","),
            config
                .maximum_images
                .map(|n| n.to_string())
                .unwrap_or_else(|| "none".to_string())
        );

        Self {
            stats,
            subset,
            reference_date: config.reference_date,
            rng: ChaCha8Rng::seed_from_u64(seed),
            quota: ImageQuota::new(config.maximum_images),
            sink,
            summary: GenerationSummary::default(),
        }
    }

    /// Generates one study for `person` and emits its images
    ///
    /// Returns the study UID if at least one image was emitted. Once the
    /// image quota is spent every call returns `Ok(None)`.
    pub fn generate_test_data_row(&mut self, person: &Person) -> Result<Option<String>> {
        let emission = self.generate_study_detailed(person)?;
        Ok(emission.row().map(str::to_string))
    }

    /// Generates one study and reports how much of it reached the sink
    ///
    /// Images are emitted in study-major, series-minor order. When the
    /// quota runs out the rest of the study is dropped.
    pub fn generate_study_detailed(&mut self, person: &Person) -> Result<StudyEmission> {
        let study = self.generate_study(person)?;
        let total = study.image_count();

        let mut emitted = 0;
        for image in study.images() {
            if !self.quota.try_take() {
                info!(
                    "Image limit reached after {} of {} images of study {}",
                    emitted, total, study.study_uid
                );
                break;
            }
            self.sink.emit(image)?;
            emitted += 1;
        }

        let emission = StudyEmission {
            study_uid: study.study_uid,
            modality: study.modality,
            emitted,
            total,
        };
        self.summary.record(&emission);
        Ok(emission)
    }

    /// Builds a study for `person` without emitting it or using the quota
    pub fn generate_study(&mut self, person: &Person) -> Result<Study> {
        let stats = self.stats;
        let profile = stats.pick_modality(&mut self.rng, &self.subset)?;
        StudyBuilder::new(stats, self.reference_date).build(person, profile, &mut self.rng)
    }

    /// Returns a single image of the first series of a fresh study
    pub fn generate_test_dataset(&mut self, person: &Person) -> Result<ImageAttributes> {
        let study = self.generate_study(person)?;
        let series = study
            .series
            .first()
            .ok_or_else(|| GeneratorError::config("generated study has no series"))?;
        let image = image_attributes(&study, series, person, &generate_uid());
        debug!("Generated single image for study {}", study.study_uid);
        Ok(image)
    }

    /// Images left in the quota, `None` if unbounded
    pub fn remaining_images(&self) -> Option<usize> {
        self.quota.remaining()
    }

    pub fn summary(&self) -> &GenerationSummary {
        &self.summary
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Flushes the sink
    pub fn finish(&mut self) -> Result<()> {
        self.sink.finish()
    }

    /// Flushes and returns the sink
    pub fn into_sink(mut self) -> Result<S> {
        self.sink.finish()?;
        Ok(self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CollectingSink;

    fn person() -> Person {
        Person::new(
            "0101801234",
            "Ada",
            "Lovelace",
            NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
        )
    }

    fn config() -> GeneratorConfig {
        GeneratorConfig::new("unused")
            .with_reference_date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())
    }

    #[test]
    fn test_unsupported_modality_rejected() {
        let stats = Statistics::embedded().unwrap();
        let result = DicomDataGenerator::with_sink(
            &stats,
            &config().with_modalities(["CT", "ZZ"]),
            1,
            CollectingSink::new(),
        );
        match result {
            Err(GeneratorError::UnsupportedModality { requested, supported }) => {
                assert_eq!(requested, "ZZ");
                assert!(supported.contains(&"CT".to_string()));
            }
            _ => panic!("expected UnsupportedModality"),
        }
    }

    #[test]
    fn test_zero_quota_emits_nothing() {
        let stats = Statistics::embedded().unwrap();
        let mut generator = DicomDataGenerator::with_sink(
            &stats,
            &config().with_maximum_images(0),
            1,
            CollectingSink::new(),
        )
        .unwrap();

        assert_eq!(generator.generate_test_data_row(&person()).unwrap(), None);
        assert!(generator.sink().images.is_empty());
        assert_eq!(generator.summary().studies, 0);
    }

    #[test]
    fn test_row_is_study_uid() {
        let stats = Statistics::embedded().unwrap();
        let mut generator =
            DicomDataGenerator::with_sink(&stats, &config(), 3, CollectingSink::new()).unwrap();

        let uid = generator.generate_test_data_row(&person()).unwrap().unwrap();
        let sink = generator.into_sink().unwrap();
        assert!(!sink.images.is_empty());
        assert!(sink
            .images
            .iter()
            .all(|image| image.study_instance_uid() == Some(uid.as_str())));
    }

    #[test]
    fn test_subset_restricts_modality() {
        let stats = Statistics::embedded().unwrap();
        let mut generator = DicomDataGenerator::with_sink(
            &stats,
            &config().with_modalities(["US"]),
            8,
            CollectingSink::new(),
        )
        .unwrap();

        for _ in 0..5 {
            let emission = generator.generate_study_detailed(&person()).unwrap();
            assert_eq!(emission.modality, "US");
            assert!(!emission.is_partial());
        }
        assert_eq!(generator.summary().modalities.get("US"), Some(&5));
    }

    #[test]
    fn test_generate_study_leaves_quota() {
        let stats = Statistics::embedded().unwrap();
        let mut generator = DicomDataGenerator::with_sink(
            &stats,
            &config().with_maximum_images(2),
            5,
            CollectingSink::new(),
        )
        .unwrap();

        let study = generator.generate_study(&person()).unwrap();
        assert!(study.image_count() >= 1);
        assert_eq!(generator.remaining_images(), Some(2));
        assert!(generator.sink().images.is_empty());
    }

    #[test]
    fn test_generate_test_dataset() {
        let stats = Statistics::embedded().unwrap();
        let mut generator =
            DicomDataGenerator::with_sink(&stats, &config(), 9, CollectingSink::new()).unwrap();

        let image = generator.generate_test_dataset(&person()).unwrap();
        assert!(image.study_instance_uid().is_some());
        assert!(image.sop_instance_uid().unwrap().starts_with("2.25."));
        assert!(generator.sink().images.is_empty());
    }

    #[test]
    fn test_emission_row() {
        let mut emission = StudyEmission {
            study_uid: "2.25.1".to_string(),
            modality: "CT".to_string(),
            emitted: 0,
            total: 4,
        };
        assert_eq!(emission.row(), None);
        assert!(emission.is_partial());

        emission.emitted = 4;
        assert_eq!(emission.row(), Some("2.25.1"));
        assert!(!emission.is_partial());
    }
}
