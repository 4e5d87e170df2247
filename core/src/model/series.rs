use super::study::Study;
use crate::attributes::{tags, ImageAttributes};
use crate::error::Result;
use crate::person::Person;
use crate::stats::Statistics;
use crate::types::{ImageType, PatientAge};
use crate::uid::generate_uid;
use chrono::{Days, NaiveDate, NaiveTime, Timelike};
use dicom_core::Tag;
use dicom_dictionary_std::uids;
use log::debug;
use rand::Rng;
use std::collections::BTreeMap;

/// Longest gap between the start of a study and the start of one of its series
const MAX_SERIES_OFFSET_SECONDS: u32 = 2 * 60 * 60;

const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// Fixed acquisition values written on every image
const ACQUISITION_PLACEHOLDERS: &[(Tag, &str)] = &[
    (tags::PERFORMED_PROCEDURE_STEP_ID, "0"),
    (tags::SERIES_NUMBER, "0"),
    (tags::BURNED_IN_ANNOTATION, "NO"),
    (tags::SLICE_LOCATION, ""),
    (tags::SLICE_THICKNESS, ""),
    (tags::SPACING_BETWEEN_SLICES, ""),
    (tags::SPIRAL_PITCH_FACTOR, "0.0"),
    (tags::KVP, "0"),
    (tags::EXPOSURE_TIME, "0"),
    (tags::EXPOSURE, "0"),
    (tags::X_RAY_TUBE_CURRENT, "0"),
    (tags::PHOTOMETRIC_INTERPRETATION, ""),
    (tags::ACQUISITION_NUMBER, "0"),
    (tags::IMAGE_POSITION_PATIENT, "0"),
    (tags::PIXEL_SPACING, "0"),
    (tags::FIELD_OF_VIEW_DIMENSIONS, "0"),
    (tags::FIELD_OF_VIEW_DIMENSIONS_IN_FLOAT, "0"),
    (tags::TRANSFER_SYNTAX_UID, uids::EXPLICIT_VR_LITTLE_ENDIAN),
    (tags::LOSSY_IMAGE_COMPRESSION, "00"),
    (tags::LOSSY_IMAGE_COMPRESSION_METHOD, "ISO_10918_1"),
    (tags::LOSSY_IMAGE_COMPRESSION_RATIO, "1"),
];

/// A generated series and its images
#[derive(Debug, Clone)]
pub struct Series {
    pub series_uid: String,
    pub series_date: NaiveDate,
    pub series_time: NaiveTime,
    pub modality: String,
    pub image_type: ImageType,
    pub number_of_series_related_instances: usize,

    /// Series-level values drawn from the modality's tag tables
    pub attributes: BTreeMap<Tag, String>,

    /// Images in generation order
    pub images: Vec<ImageAttributes>,
}

/// Builds series and their images for a study
pub struct SeriesBuilder<'a> {
    stats: &'a Statistics,
}

impl<'a> SeriesBuilder<'a> {
    pub fn new(stats: &'a Statistics) -> Self {
        Self { stats }
    }

    /// Builds one series of `image_count` images
    ///
    /// The series starts up to two hours after the study; a start that
    /// runs past midnight moves the series date to the next day, so the
    /// series date is never before the study date.
    pub fn build<R: Rng + ?Sized>(
        &self,
        study: &Study,
        person: &Person,
        modality: &str,
        image_type: &ImageType,
        image_count: usize,
        rng: &mut R,
    ) -> Result<Series> {
        let series_uid = generate_uid();
        let (series_date, series_time) =
            offset_start(study.study_date, study.study_time, rng.gen_range(0..=MAX_SERIES_OFFSET_SECONDS));

        let mut attributes = BTreeMap::new();
        if let Some(distributions) = self.stats.tag_values(modality) {
            for (tag, sampler) in distributions.iter() {
                if tag == tags::STUDY_DESCRIPTION {
                    continue;
                }
                attributes.insert(tag, sampler.pick(rng)?.clone());
            }
        }

        let mut series = Series {
            series_uid,
            series_date,
            series_time,
            modality: modality.to_string(),
            image_type: image_type.clone(),
            number_of_series_related_instances: image_count,
            attributes,
            images: Vec::with_capacity(image_count),
        };

        for _ in 0..image_count {
            let image = image_attributes(study, &series, person, &generate_uid());
            series.images.push(image);
        }

        debug!(
            "Built {} series {} with {} images",
            series.modality, series.series_uid, image_count
        );

        Ok(series)
    }
}

/// Adds `offset_seconds` to a date and time, rolling over midnight
fn offset_start(date: NaiveDate, time: NaiveTime, offset_seconds: u32) -> (NaiveDate, NaiveTime) {
    let total = time.num_seconds_from_midnight() + offset_seconds;
    let days = u64::from(total / SECONDS_PER_DAY);
    let time = NaiveTime::from_num_seconds_from_midnight_opt(total % SECONDS_PER_DAY, 0)
        .unwrap_or(time);
    let date = date.checked_add_days(Days::new(days)).unwrap_or(date);
    (date, time)
}

/// Assembles the attribute set of one image
///
/// Carries the patient, study and series attributes down to the image
/// alongside its own SOP instance UID and the age at the series date.
pub fn image_attributes(
    study: &Study,
    series: &Series,
    person: &Person,
    sop_instance_uid: &str,
) -> ImageAttributes {
    let mut attrs = ImageAttributes::new();

    attrs.put(tags::STUDY_INSTANCE_UID, study.study_uid.as_str());
    attrs.put(tags::SERIES_INSTANCE_UID, series.series_uid.as_str());
    attrs.put(tags::SOP_INSTANCE_UID, sop_instance_uid);
    attrs.put(tags::SOP_CLASS_UID, uids::SECONDARY_CAPTURE_IMAGE_STORAGE);

    // patient
    attrs.put(tags::PATIENT_ID, person.chi.as_str());
    attrs.put(tags::PATIENT_NAME, person.dicom_name());
    attrs.put_date(tags::PATIENT_BIRTH_DATE, person.date_of_birth);
    attrs.put(tags::PATIENT_ADDRESS, person.address.single_line());
    attrs.put(
        tags::PATIENT_AGE,
        PatientAge::at(person.date_of_birth, series.series_date).to_string(),
    );

    // study
    attrs.put_date(tags::STUDY_DATE, study.study_date);
    attrs.put_time(tags::STUDY_TIME, study.study_time);
    attrs.put(tags::ACCESSION_NUMBER, study.accession_number.as_str());
    if let Some(ref description) = study.study_description {
        attrs.put(tags::STUDY_DESCRIPTION, description.as_str());
    }
    attrs.put(tags::MODALITIES_IN_STUDY, study.modality.as_str());
    attrs.put(
        tags::NUMBER_OF_STUDY_RELATED_INSTANCES,
        study.number_of_study_related_instances.to_string(),
    );

    // series
    attrs.put_date(tags::SERIES_DATE, series.series_date);
    attrs.put_time(tags::SERIES_TIME, series.series_time);
    attrs.put(tags::MODALITY, series.modality.as_str());
    attrs.put(tags::IMAGE_TYPE, series.image_type.to_dicom());
    attrs.put(
        tags::NUMBER_OF_SERIES_RELATED_INSTANCES,
        series.number_of_series_related_instances.to_string(),
    );
    for (tag, value) in &series.attributes {
        attrs.put(*tag, value.as_str());
    }

    // image
    attrs.put_date(tags::ACQUISITION_DATE, series.series_date);
    attrs.put_time(tags::ACQUISITION_TIME, series.series_time);
    for (tag, value) in ACQUISITION_PLACEHOLDERS {
        attrs.put(*tag, *value);
    }

    attrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_study(study_date: NaiveDate, study_time: NaiveTime) -> Study {
        Study {
            study_uid: "1.2.3".to_string(),
            study_date,
            study_time,
            accession_number: "RA00000001".to_string(),
            study_description: Some("CT Head".to_string()),
            modality: "CT".to_string(),
            number_of_study_related_instances: 1,
            series: Vec::new(),
        }
    }

    #[test]
    fn test_offset_start_same_day() {
        let (d, t) = offset_start(
            date(2010, 1, 1),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            90,
        );
        assert_eq!(d, date(2010, 1, 1));
        assert_eq!(t, NaiveTime::from_hms_opt(10, 1, 30).unwrap());
    }

    #[test]
    fn test_offset_start_rolls_past_midnight() {
        let (d, t) = offset_start(
            date(2010, 12, 31),
            NaiveTime::from_hms_opt(23, 30, 0).unwrap(),
            3600,
        );
        assert_eq!(d, date(2011, 1, 1));
        assert_eq!(t, NaiveTime::from_hms_opt(0, 30, 0).unwrap());
    }

    #[test]
    fn test_series_images_share_identifiers() {
        let stats = Statistics::embedded().unwrap();
        let person = Person::new("0101801234", "Ada", "Lovelace", date(1980, 1, 1));
        let study = test_study(date(2015, 3, 4), NaiveTime::from_hms_opt(23, 50, 0).unwrap());
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let series = SeriesBuilder::new(&stats)
            .build(
                &study,
                &person,
                "CT",
                &ImageType::new("ORIGINAL", "PRIMARY", Some("AXIAL")),
                4,
                &mut rng,
            )
            .unwrap();

        assert_eq!(series.images.len(), 4);
        assert!(series.series_date >= study.study_date);
        let mut sops = std::collections::HashSet::new();
        for image in &series.images {
            assert_eq!(image.study_instance_uid(), Some("1.2.3"));
            assert_eq!(image.series_instance_uid(), Some(series.series_uid.as_str()));
            assert_eq!(image.get(tags::IMAGE_TYPE), Some("ORIGINAL\\PRIMARY\\AXIAL"));
            assert_eq!(image.get(tags::NUMBER_OF_SERIES_RELATED_INSTANCES), Some("4"));
            assert_eq!(image.get(tags::STUDY_DESCRIPTION), Some("CT Head"));
            assert!(image.get(tags::BODY_PART_EXAMINED).is_some());
            assert!(sops.insert(image.sop_instance_uid().unwrap().to_string()));
        }
    }

    #[test]
    fn test_age_computed_at_series_date() {
        let stats = Statistics::embedded().unwrap();
        let person = Person::new("1", "A", "B", date(2000, 5, 1));
        let study = test_study(date(2005, 4, 1), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let series = SeriesBuilder::new(&stats)
            .build(&study, &person, "OT", &ImageType::original_primary(), 1, &mut rng)
            .unwrap();

        assert_eq!(series.images[0].get(tags::PATIENT_AGE), Some("004Y"));
        assert_eq!(series.images[0].get(tags::PATIENT_BIRTH_DATE), Some("20000501"));
    }
}
