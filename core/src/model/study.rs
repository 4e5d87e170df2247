use super::series::{Series, SeriesBuilder};
use crate::attributes::{tags, ImageAttributes};
use crate::error::Result;
use crate::person::Person;
use crate::stats::{ModalityProfile, ShapePolicy, Statistics};
use crate::types::ImageType;
use crate::uid::generate_uid;
use chrono::{NaiveDate, NaiveTime};
use log::debug;
use rand::Rng;

/// A generated study (a collection of series)
#[derive(Debug, Clone)]
pub struct Study {
    pub study_uid: String,
    pub study_date: NaiveDate,
    pub study_time: NaiveTime,

    /// Links the study to the requesting system
    pub accession_number: String,

    pub study_description: Option<String>,
    pub modality: String,

    /// Number of series in the study, always at least one
    pub number_of_study_related_instances: usize,

    /// Series in generation order
    pub series: Vec<Series>,
}

impl Study {
    /// Images in study-major, series-minor order
    pub fn images(&self) -> impl Iterator<Item = &ImageAttributes> {
        self.series.iter().flat_map(|series| series.images.iter())
    }

    pub fn image_count(&self) -> usize {
        self.series.iter().map(|series| series.images.len()).sum()
    }
}

/// Series count, images per series and image type of a study
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyShape {
    pub series: usize,
    pub images_per_series: usize,
    pub image_type: ImageType,
}

/// Builds studies for a person from a modality profile
///
/// # Example
///
/// ```
/// use dicomgen_core::{Person, Statistics, StudyBuilder};
/// use chrono::NaiveDate;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let stats = Statistics::embedded().unwrap();
/// let person = Person::new(
///     "0101801234",
///     "Ada",
///     "Lovelace",
///     NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
/// );
/// let profile = &stats.profiles()[stats.modality_index("MR").unwrap()];
/// let until = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
///
/// let mut rng = ChaCha8Rng::seed_from_u64(1);
/// let study = StudyBuilder::new(&stats, until)
///     .build(&person, profile, &mut rng)
///     .unwrap();
///
/// assert_eq!(study.modality, "MR");
/// assert!(study.number_of_study_related_instances >= 1);
/// assert!(study.images().all(|img| img.study_instance_uid() == Some(study.study_uid.as_str())));
/// ```
pub struct StudyBuilder<'a> {
    stats: &'a Statistics,
    until: NaiveDate,
}

impl<'a> StudyBuilder<'a> {
    /// `until` bounds the study date of people without a date of death
    pub fn new(stats: &'a Statistics, until: NaiveDate) -> Self {
        Self { stats, until }
    }

    /// Builds a complete study, including all series and images
    ///
    /// # Algorithm
    ///
    /// 1. Fresh study UID
    /// 2. Study date uniform over the person's lifetime
    /// 3. Study description, if the modality has a table for it
    /// 4. Accession number and study time
    /// 5. Shape from the profile's [`ShapePolicy`]
    /// 6. One series per the shape, in order
    pub fn build<R: Rng + ?Sized>(
        &self,
        person: &Person,
        profile: &ModalityProfile,
        rng: &mut R,
    ) -> Result<Study> {
        let study_uid = generate_uid();
        let study_date = person.random_date_during_lifetime(rng, self.until);

        let study_description = match self.stats.tag_values(&profile.code) {
            Some(distributions) => distributions.sample(tags::STUDY_DESCRIPTION, rng)?,
            None => None,
        };

        let accession_number = self.stats.random_accession_number(rng)?;
        let study_time = self.stats.random_time_of_day(rng)?;

        let shape = self.shape(profile, rng)?;

        let mut study = Study {
            study_uid,
            study_date,
            study_time,
            accession_number,
            study_description,
            modality: profile.code.clone(),
            number_of_study_related_instances: shape.series,
            series: Vec::with_capacity(shape.series),
        };

        let series_builder = SeriesBuilder::new(self.stats);
        let series = (0..shape.series)
            .map(|_| {
                series_builder.build(
                    &study,
                    person,
                    &profile.code,
                    &shape.image_type,
                    shape.images_per_series,
                    rng,
                )
            })
            .collect::<Result<Vec<_>>>()?;
        study.series = series;

        debug!(
            "Built {} study {} ({} series x {} images, {})",
            study.modality,
            study.study_uid,
            shape.series,
            shape.images_per_series,
            shape.image_type
        );

        Ok(study)
    }

    /// Decides series count, images per series and image type
    ///
    /// Sampled counts are floored and clamped to at least one.
    pub fn shape<R: Rng + ?Sized>(
        &self,
        profile: &ModalityProfile,
        rng: &mut R,
    ) -> Result<StudyShape> {
        let sampled = |image_type: ImageType, rng: &mut R| StudyShape {
            series: profile.series_per_study.sample_count(rng),
            images_per_series: profile.images_per_series.sample_count(rng),
            image_type,
        };

        match &profile.shape {
            ShapePolicy::Fixed { image_type } => Ok(sampled(ImageType::parse(image_type), rng)),
            ShapePolicy::SampledImageType {
                full_shape_for,
                fallback,
            } => {
                let image_type = self.stats.random_image_type(rng, &profile.code)?;
                if image_type.to_dicom() == *full_shape_for {
                    Ok(sampled(image_type, rng))
                } else {
                    Ok(StudyShape {
                        series: fallback.series,
                        images_per_series: fallback.images,
                        image_type,
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn person() -> Person {
        Person::new("0101801234", "Ada", "Lovelace", date(1980, 1, 1))
    }

    fn single_modality(profile_json: &str, extra: &str) -> Statistics {
        Statistics::from_json(&format!(
            r#"{{
                "modalities": [ {} ],
                {}
                "accession": {{ "prefixes": [["RA", 1]], "digits": 6 }},
                "hour_of_day": [[10, 1]]
            }}"#,
            profile_json, extra
        ))
        .unwrap()
    }

    #[test]
    fn test_fixed_policy_samples_counts() {
        let stats = single_modality(
            r#"{ "code": "MR", "frequency": 1, "series_per_study": { "mean": 3, "std_dev": 0 }, "images_per_series": { "mean": 4, "std_dev": 0 } }"#,
            "",
        );
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let study = StudyBuilder::new(&stats, date(2024, 1, 1))
            .build(&person(), &stats.profiles()[0], &mut rng)
            .unwrap();

        assert_eq!(study.number_of_study_related_instances, 3);
        assert_eq!(study.series.len(), 3);
        assert_eq!(study.image_count(), 12);
        assert!(study.series.iter().all(|s| s.image_type == ImageType::original_primary()));
        assert_eq!(study.study_description, None);
    }

    #[test]
    fn test_non_positive_samples_clamped() {
        let stats = single_modality(
            r#"{ "code": "MR", "frequency": 1, "series_per_study": { "mean": -4, "std_dev": 0 }, "images_per_series": { "mean": 0, "std_dev": 0 } }"#,
            "",
        );
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let study = StudyBuilder::new(&stats, date(2024, 1, 1))
            .build(&person(), &stats.profiles()[0], &mut rng)
            .unwrap();

        assert_eq!(study.number_of_study_related_instances, 1);
        assert_eq!(study.series.len(), 1);
        assert_eq!(study.series[0].images.len(), 1);
    }

    #[test]
    fn test_sampled_policy_full_shape() {
        let stats = single_modality(
            r#"{ "code": "CT", "frequency": 1, "series_per_study": { "mean": 2, "std_dev": 0 }, "images_per_series": { "mean": 50, "std_dev": 0 },
                 "shape": { "kind": "sampled_image_type", "full_shape_for": "ORIGINAL\\PRIMARY\\AXIAL", "fallback": { "series": 1, "images": 2 } } }"#,
            r#""image_types": { "CT": [["ORIGINAL\\PRIMARY\\AXIAL", 1]] },"#,
        );
        let builder = StudyBuilder::new(&stats, date(2024, 1, 1));
        let shape = builder
            .shape(&stats.profiles()[0], &mut ChaCha8Rng::seed_from_u64(1))
            .unwrap();
        assert_eq!(
            shape,
            StudyShape {
                series: 2,
                images_per_series: 50,
                image_type: ImageType::new("ORIGINAL", "PRIMARY", Some("AXIAL")),
            }
        );
    }

    #[test]
    fn test_sampled_policy_fallback_shape() {
        let stats = single_modality(
            r#"{ "code": "CT", "frequency": 1, "series_per_study": { "mean": 2, "std_dev": 0 }, "images_per_series": { "mean": 50, "std_dev": 0 },
                 "shape": { "kind": "sampled_image_type", "full_shape_for": "ORIGINAL\\PRIMARY\\AXIAL", "fallback": { "series": 1, "images": 2 } } }"#,
            r#""image_types": { "CT": [["ORIGINAL\\PRIMARY\\LOCALIZER", 1]] },"#,
        );
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let study = StudyBuilder::new(&stats, date(2024, 1, 1))
            .build(&person(), &stats.profiles()[0], &mut rng)
            .unwrap();

        assert_eq!(study.number_of_study_related_instances, 1);
        assert_eq!(study.image_count(), 2);
        assert_eq!(
            study.series[0].image_type,
            ImageType::parse("ORIGINAL\\PRIMARY\\LOCALIZER")
        );
    }

    #[test]
    fn test_new_modality_with_ct_policy_is_data_only() {
        let stats = single_modality(
            r#"{ "code": "PT", "frequency": 1, "series_per_study": { "mean": 2, "std_dev": 0 }, "images_per_series": { "mean": 7, "std_dev": 0 },
                 "shape": { "kind": "sampled_image_type", "full_shape_for": "ORIGINAL\\PRIMARY", "fallback": { "series": 1, "images": 1 } } }"#,
            r#""image_types": { "PT": [["ORIGINAL\\PRIMARY", 1]] },"#,
        );
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let study = StudyBuilder::new(&stats, date(2024, 1, 1))
            .build(&person(), &stats.profiles()[0], &mut rng)
            .unwrap();
        assert_eq!(study.image_count(), 14);
    }

    #[test]
    fn test_hierarchy_invariants_embedded() {
        let stats = Statistics::embedded().unwrap();
        let builder = StudyBuilder::new(&stats, date(2024, 1, 1));
        let person = person();
        let mut rng = ChaCha8Rng::seed_from_u64(2024);

        for profile in stats.profiles() {
            let study = builder.build(&person, profile, &mut rng).unwrap();
            assert!(study.number_of_study_related_instances >= 1);
            assert_eq!(study.series.len(), study.number_of_study_related_instances);
            assert!(study.study_date >= person.date_of_birth);
            assert!(study.study_date <= date(2024, 1, 1));

            let mut series_uids = HashSet::new();
            for series in &study.series {
                assert!(!series.images.is_empty());
                assert!(series.series_date >= study.study_date);
                assert!(series_uids.insert(series.series_uid.clone()));
                for image in &series.images {
                    assert_eq!(image.study_instance_uid(), Some(study.study_uid.as_str()));
                    assert_eq!(image.series_instance_uid(), Some(series.series_uid.as_str()));
                    assert_eq!(image.get(tags::MODALITY), Some(profile.code.as_str()));
                }
            }
        }
    }

    #[test]
    fn test_images_are_study_major_series_minor() {
        let stats = single_modality(
            r#"{ "code": "MR", "frequency": 1, "series_per_study": { "mean": 3, "std_dev": 0 }, "images_per_series": { "mean": 2, "std_dev": 0 } }"#,
            "",
        );
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let study = StudyBuilder::new(&stats, date(2024, 1, 1))
            .build(&person(), &stats.profiles()[0], &mut rng)
            .unwrap();

        let order: Vec<_> = study
            .images()
            .map(|img| img.series_instance_uid().unwrap().to_string())
            .collect();
        let expected: Vec<_> = study
            .series
            .iter()
            .flat_map(|s| std::iter::repeat(s.series_uid.clone()).take(2))
            .collect();
        assert_eq!(order, expected);
    }
}
