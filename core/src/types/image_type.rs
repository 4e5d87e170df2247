use std::fmt;

/// DICOM ImageType value decomposed into its components
///
/// The ImageType value is a backslash-separated list:
/// - `pixels`: first element (e.g., "ORIGINAL", "DERIVED")
/// - `exam`: second element (e.g., "PRIMARY", "SECONDARY")
/// - `flavor`: third element (optional, e.g. "AXIAL", "LOCALIZER")
/// - `extras`: anything after the third element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageType {
    pub pixels: String,
    pub exam: String,
    pub flavor: Option<String>,
    pub extras: Vec<String>,
}

impl ImageType {
    /// Creates a new ImageType
    pub fn new(pixels: &str, exam: &str, flavor: Option<&str>) -> Self {
        Self {
            pixels: pixels.to_string(),
            exam: exam.to_string(),
            flavor: flavor.map(str::to_string),
            extras: Vec::new(),
        }
    }

    /// `ORIGINAL\PRIMARY`, the image type of every non-CT acquisition
    pub fn original_primary() -> Self {
        Self::new("ORIGINAL", "PRIMARY", None)
    }

    /// Parses a backslash-separated ImageType value
    ///
    /// Missing leading components are left empty; see [`ImageType::is_valid`].
    pub fn parse(value: &str) -> Self {
        let mut parts = value.split('\\').map(|part| part.trim().to_string());
        Self {
            pixels: parts.next().unwrap_or_default(),
            exam: parts.next().unwrap_or_default(),
            flavor: parts.next(),
            extras: parts.collect(),
        }
    }

    /// Returns the DICOM multi-value form, e.g. `ORIGINAL\PRIMARY\AXIAL`
    pub fn to_dicom(&self) -> String {
        let mut parts = vec![self.pixels.as_str(), self.exam.as_str()];
        if let Some(ref flavor) = self.flavor {
            parts.push(flavor);
        }
        parts.extend(self.extras.iter().map(String::as_str));
        parts.join("\\")
    }

    /// Returns true if both pixels and exam are non-empty
    pub fn is_valid(&self) -> bool {
        !self.pixels.is_empty() && !self.exam.is_empty()
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dicom())
    }
}
