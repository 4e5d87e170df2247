//! Image attribute sets
//!
//! An [`ImageAttributes`] is the flattened, per-image view of a generated
//! study: every study and series attribute propagated down to the image,
//! plus the per-image fields. Values are held in their DICOM string form
//! (`YYYYMMDD` dates, `HHMMSS` times, `\`-joined multi-values) so the same
//! set can be handed to a file encoder or written as a table row.

pub mod tags;

use chrono::{NaiveDate, NaiveTime};
use dicom_core::Tag;
use std::collections::BTreeMap;

/// Ordered mapping from DICOM tag to string value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageAttributes {
    values: BTreeMap<Tag, String>,
}

impl ImageAttributes {
    /// Creates an empty attribute set
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a value
    pub fn put(&mut self, tag: Tag, value: impl Into<String>) {
        self.values.insert(tag, value.into());
    }

    /// Inserts a date in DICOM `DA` form
    pub fn put_date(&mut self, tag: Tag, date: NaiveDate) {
        self.put(tag, format_date(date));
    }

    /// Inserts a time in DICOM `TM` form
    pub fn put_time(&mut self, tag: Tag, time: NaiveTime) {
        self.put(tag, format_time(time));
    }

    /// Returns the value of a tag, if present
    pub fn get(&self, tag: Tag) -> Option<&str> {
        self.values.get(&tag).map(String::as_str)
    }

    /// Returns true if the tag is present (even with an empty value)
    pub fn contains(&self, tag: Tag) -> bool {
        self.values.contains_key(&tag)
    }

    /// Iterates over all values in tag order
    pub fn iter(&self) -> impl Iterator<Item = (Tag, &str)> {
        self.values.iter().map(|(tag, value)| (*tag, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn study_instance_uid(&self) -> Option<&str> {
        self.get(tags::STUDY_INSTANCE_UID)
    }

    pub fn series_instance_uid(&self) -> Option<&str> {
        self.get(tags::SERIES_INSTANCE_UID)
    }

    pub fn sop_instance_uid(&self) -> Option<&str> {
        self.get(tags::SOP_INSTANCE_UID)
    }

    /// Parses the study date back out of its `DA` form
    pub fn study_date(&self) -> Option<NaiveDate> {
        self.get(tags::STUDY_DATE).and_then(parse_date)
    }
}

/// Formats a date as DICOM `DA` (`YYYYMMDD`)
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Formats a time as DICOM `TM` (`HHMMSS`)
pub fn format_time(time: NaiveTime) -> String {
    time.format("%H%M%S").to_string()
}

/// Parses a DICOM `DA` value
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y%m%d").ok()
}
