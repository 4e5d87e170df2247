//! Core value types for generated metadata
//!
//! - [`ImageType`]: decomposed DICOM ImageType value
//! - [`PatientAge`]: age in years with DICOM `AS` formatting

mod age;
mod image_type;

pub use age::PatientAge;
pub use image_type::ImageType;
