use dicom_core::{DataDictionary, Tag, VR};
use dicom_dictionary_std::StandardDataDictionary;

// File Meta Tags
pub const SOURCE_APPLICATION_ENTITY_TITLE: Tag = Tag(0x0002, 0x0016);
pub const TRANSFER_SYNTAX_UID: Tag = Tag(0x0002, 0x0010);

// Study/Series Identification Tags
pub const IMAGE_TYPE: Tag = Tag(0x0008, 0x0008);
pub const SOP_CLASS_UID: Tag = Tag(0x0008, 0x0016);
pub const SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x0018);
pub const STUDY_DATE: Tag = Tag(0x0008, 0x0020);
pub const SERIES_DATE: Tag = Tag(0x0008, 0x0021);
pub const ACQUISITION_DATE: Tag = Tag(0x0008, 0x0022);
pub const STUDY_TIME: Tag = Tag(0x0008, 0x0030);
pub const SERIES_TIME: Tag = Tag(0x0008, 0x0031);
pub const ACQUISITION_TIME: Tag = Tag(0x0008, 0x0032);
pub const ACCESSION_NUMBER: Tag = Tag(0x0008, 0x0050);
pub const MODALITY: Tag = Tag(0x0008, 0x0060);
pub const MODALITIES_IN_STUDY: Tag = Tag(0x0008, 0x0061);
pub const STUDY_INSTANCE_UID: Tag = Tag(0x0020, 0x000D);
pub const SERIES_INSTANCE_UID: Tag = Tag(0x0020, 0x000E);
pub const SERIES_NUMBER: Tag = Tag(0x0020, 0x0011);
pub const ACQUISITION_NUMBER: Tag = Tag(0x0020, 0x0012);
pub const NUMBER_OF_STUDY_RELATED_INSTANCES: Tag = Tag(0x0020, 0x1208);
pub const NUMBER_OF_SERIES_RELATED_INSTANCES: Tag = Tag(0x0020, 0x1209);

// Description Tags
pub const STUDY_DESCRIPTION: Tag = Tag(0x0008, 0x1030);
pub const PROCEDURE_CODE_SEQUENCE: Tag = Tag(0x0008, 0x1032);
pub const SERIES_DESCRIPTION: Tag = Tag(0x0008, 0x103E);
pub const DERIVATION_DESCRIPTION: Tag = Tag(0x0008, 0x2111);
pub const PROTOCOL_NAME: Tag = Tag(0x0018, 0x1030);
pub const PERFORMED_PROCEDURE_STEP_ID: Tag = Tag(0x0040, 0x0253);
pub const PERFORMED_PROCEDURE_STEP_DESCRIPTION: Tag = Tag(0x0040, 0x0254);

// Device/Institution Tags
pub const MANUFACTURER: Tag = Tag(0x0008, 0x0070);
pub const INSTITUTION_NAME: Tag = Tag(0x0008, 0x0080);
pub const MANUFACTURER_MODEL_NAME: Tag = Tag(0x0008, 0x1090);
pub const DEVICE_SERIAL_NUMBER: Tag = Tag(0x0018, 0x1000);

// Patient Tags
pub const PATIENT_NAME: Tag = Tag(0x0010, 0x0010);
pub const PATIENT_ID: Tag = Tag(0x0010, 0x0020);
pub const PATIENT_BIRTH_DATE: Tag = Tag(0x0010, 0x0030);
pub const PATIENT_AGE: Tag = Tag(0x0010, 0x1010);
pub const PATIENT_ADDRESS: Tag = Tag(0x0010, 0x1040);

// Acquisition Tags
pub const CONTRAST_BOLUS_AGENT: Tag = Tag(0x0018, 0x0010);
pub const BODY_PART_EXAMINED: Tag = Tag(0x0018, 0x0015);
pub const SCAN_OPTIONS: Tag = Tag(0x0018, 0x0022);
pub const SLICE_THICKNESS: Tag = Tag(0x0018, 0x0050);
pub const KVP: Tag = Tag(0x0018, 0x0060);
pub const SPACING_BETWEEN_SLICES: Tag = Tag(0x0018, 0x0088);
pub const CONTRAST_BOLUS_ROUTE: Tag = Tag(0x0018, 0x1040);
pub const FIELD_OF_VIEW_DIMENSIONS: Tag = Tag(0x0018, 0x1149);
pub const EXPOSURE_TIME: Tag = Tag(0x0018, 0x1150);
pub const X_RAY_TUBE_CURRENT: Tag = Tag(0x0018, 0x1151);
pub const EXPOSURE: Tag = Tag(0x0018, 0x1152);
pub const SPIRAL_PITCH_FACTOR: Tag = Tag(0x0018, 0x9311);
pub const FIELD_OF_VIEW_DIMENSIONS_IN_FLOAT: Tag = Tag(0x0018, 0x9461);

// Image Geometry Tags
pub const IMAGE_POSITION_PATIENT: Tag = Tag(0x0020, 0x0032);
pub const SLICE_LOCATION: Tag = Tag(0x0020, 0x1041);
pub const SAMPLES_PER_PIXEL: Tag = Tag(0x0028, 0x0002);
pub const PHOTOMETRIC_INTERPRETATION: Tag = Tag(0x0028, 0x0004);
pub const ROWS: Tag = Tag(0x0028, 0x0010);
pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
pub const PIXEL_SPACING: Tag = Tag(0x0028, 0x0030);
pub const BITS_ALLOCATED: Tag = Tag(0x0028, 0x0100);
pub const BITS_STORED: Tag = Tag(0x0028, 0x0101);
pub const HIGH_BIT: Tag = Tag(0x0028, 0x0102);
pub const PIXEL_REPRESENTATION: Tag = Tag(0x0028, 0x0103);
pub const BURNED_IN_ANNOTATION: Tag = Tag(0x0028, 0x0301);
pub const LOSSY_IMAGE_COMPRESSION: Tag = Tag(0x0028, 0x2110);
pub const LOSSY_IMAGE_COMPRESSION_RATIO: Tag = Tag(0x0028, 0x2112);
pub const LOSSY_IMAGE_COMPRESSION_METHOD: Tag = Tag(0x0028, 0x2114);
pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);

/// Returns the dictionary keyword of a tag, e.g. `"StudyInstanceUID"`
///
/// Returns `None` for private or unregistered tags
pub fn keyword(tag: Tag) -> Option<&'static str> {
    StandardDataDictionary.by_tag(tag).map(|entry| entry.alias)
}

/// Looks a tag up by its dictionary keyword
pub fn by_keyword(keyword: &str) -> Option<Tag> {
    StandardDataDictionary
        .by_name(keyword)
        .map(|entry| entry.tag.inner())
}

/// Returns the value representation used when encoding a tag
///
/// Tags missing from the standard dictionary are written as long strings.
pub fn value_representation(tag: Tag) -> VR {
    StandardDataDictionary
        .by_tag(tag)
        .map(|entry| entry.vr.relaxed())
        .unwrap_or(VR::LO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_values() {
        assert_eq!(STUDY_INSTANCE_UID, Tag(0x0020, 0x000D));
        assert_eq!(SERIES_INSTANCE_UID, Tag(0x0020, 0x000E));
        assert_eq!(SOP_INSTANCE_UID, Tag(0x0008, 0x0018));
        assert_eq!(PATIENT_AGE, Tag(0x0010, 0x1010));
    }

    #[test]
    fn test_keyword_round_trip() {
        assert_eq!(keyword(STUDY_DESCRIPTION), Some("StudyDescription"));
        assert_eq!(by_keyword("StudyDescription"), Some(STUDY_DESCRIPTION));
        assert_eq!(keyword(PIXEL_DATA), Some("PixelData"));
        assert_eq!(by_keyword("NoSuchKeyword"), None);
        assert_eq!(keyword(Tag(0x0009, 0x1001)), None);
    }

    #[test]
    fn test_keywords_beyond_generated_tags() {
        assert_eq!(by_keyword("StationName"), Some(Tag(0x0008, 0x1010)));
        assert_eq!(keyword(Tag(0x0008, 0x1010)), Some("StationName"));
        assert_eq!(value_representation(Tag(0x0008, 0x1010)), VR::SH);
    }

    #[test]
    fn test_value_representation() {
        assert_eq!(value_representation(STUDY_DATE), VR::DA);
        assert_eq!(value_representation(SPIRAL_PITCH_FACTOR), VR::FD);
        assert_eq!(value_representation(FIELD_OF_VIEW_DIMENSIONS_IN_FLOAT), VR::FL);
        assert_eq!(value_representation(Tag(0x0009, 0x1001)), VR::LO);
    }
}
