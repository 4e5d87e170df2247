//! Directory layouts for DICOM file output

use crate::attributes::{tags, ImageAttributes};
use chrono::Datelike;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Placeholder for a path component whose value is missing
const UNKNOWN: &str = "unknown";

/// How generated files are arranged beneath the output directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FileSystemLayout {
    /// `root/<SOPInstanceUID>.dcm`
    Flat,

    /// `root/<StudyInstanceUID>/<SOPInstanceUID>.dcm`
    StudyUid,

    /// `root/YYYY/MM/DD/<StudyInstanceUID>/<SOPInstanceUID>.dcm`
    #[default]
    StudyYearMonthDay,

    /// `root/YYYY/MM/DD/<AccessionNumber>/<SOPInstanceUID>.dcm`
    StudyYearMonthDayAccession,
}

impl FileSystemLayout {
    /// Returns the destination of an image beneath `root`
    ///
    /// Directories are not created here; the file sink creates missing
    /// parents right before writing.
    pub fn path(&self, root: &Path, attrs: &ImageAttributes) -> PathBuf {
        let file_name = format!("{}.dcm", component(attrs.sop_instance_uid()));

        let mut path = root.to_path_buf();
        match self {
            FileSystemLayout::Flat => {}
            FileSystemLayout::StudyUid => {
                path.push(component(attrs.study_instance_uid()));
            }
            FileSystemLayout::StudyYearMonthDay => {
                push_date(&mut path, attrs);
                path.push(component(attrs.study_instance_uid()));
            }
            FileSystemLayout::StudyYearMonthDayAccession => {
                push_date(&mut path, attrs);
                path.push(component(attrs.get(tags::ACCESSION_NUMBER)));
            }
        }
        path.push(file_name);
        path
    }

    /// Simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            FileSystemLayout::Flat => "flat",
            FileSystemLayout::StudyUid => "study-uid",
            FileSystemLayout::StudyYearMonthDay => "study-year-month-day",
            FileSystemLayout::StudyYearMonthDayAccession => "study-year-month-day-accession",
        }
    }
}

impl fmt::Display for FileSystemLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

fn push_date(path: &mut PathBuf, attrs: &ImageAttributes) {
    match attrs.study_date() {
        Some(date) => {
            path.push(format!("{:04}", date.year()));
            path.push(format!("{:02}", date.month()));
            path.push(format!("{:02}", date.day()));
        }
        None => path.push(UNKNOWN),
    }
}

/// Makes a value safe to use as a single path component
fn component(value: Option<&str>) -> String {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let re = REGEX.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]").expect("Failed to compile regex"));

    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() || value.chars().all(|c| c == '.') {
        return UNKNOWN.to_string();
    }
    re.replace_all(value, "_").into_owned()
}
