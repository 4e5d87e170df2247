use super::ImageSink;
use crate::attributes::{tags, ImageAttributes};
use crate::error::{GeneratorError, Result};
use crate::layout::FileSystemLayout;
use dicom_core::value::PrimitiveValue;
use dicom_core::{dicom_value, DataElement, VR};
use dicom_dictionary_std::uids;
use dicom_object::{FileMetaTableBuilder, InMemDicomObject};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Width and height of placeholder images
pub const PLACEHOLDER_SIZE: u16 = 500;

/// Uncompressed 8-bit greyscale pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelPayload {
    pub rows: u16,
    pub columns: u16,
    pub data: Vec<u8>,
}

/// Renders placeholder pixel data for an image
pub trait PixelRenderer {
    fn render(&self, attrs: &ImageAttributes, width: u16, height: u16, label: &str) -> PixelPayload;
}

/// Serializes an image to a file
pub trait DicomEncoder {
    fn encode(&self, attrs: &ImageAttributes, pixels: Option<&PixelPayload>, path: &Path)
        -> Result<()>;
}

/// Black frame with a white border and a bar pattern derived from the label
///
/// The bars give each instance a visibly different image without any font
/// rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlackBoxRenderer;

impl BlackBoxRenderer {
    const BORDER: usize = 4;
    const BAR_WIDTH: usize = 3;
}

impl PixelRenderer for BlackBoxRenderer {
    fn render(&self, _attrs: &ImageAttributes, width: u16, height: u16, label: &str) -> PixelPayload {
        let (w, h) = (width as usize, height as usize);
        let mut data = vec![0u8; w * h];

        for y in 0..h {
            for x in 0..w {
                let on_border = x < Self::BORDER
                    || y < Self::BORDER
                    || x + Self::BORDER >= w
                    || y + Self::BORDER >= h;
                if on_border {
                    data[y * w + x] = 0xFF;
                }
            }
        }

        // bar band across the middle third
        let band = (h / 3)..(2 * h / 3);
        for (i, byte) in label.bytes().enumerate() {
            if byte % 2 == 0 {
                continue;
            }
            let start = Self::BORDER * 2 + i * Self::BAR_WIDTH;
            let end = (start + Self::BAR_WIDTH).min(w.saturating_sub(Self::BORDER * 2));
            for y in band.clone() {
                for x in start..end {
                    data[y * w + x] = 0xFF;
                }
            }
        }

        PixelPayload {
            rows: height,
            columns: width,
            data,
        }
    }
}

/// Writes DICOM Part 10 files with `dicom-object`
///
/// Group 0002 values are left to the file meta table, sequences are not
/// written, and binary float values are parsed from their string form.
#[derive(Debug, Clone, Copy, Default)]
pub struct DicomObjectEncoder;

impl DicomObjectEncoder {
    /// Builds the in-memory dataset for an image
    pub fn to_object(&self, attrs: &ImageAttributes, pixels: Option<&PixelPayload>) -> InMemDicomObject {
        let mut obj = InMemDicomObject::new_empty();

        for (tag, value) in attrs.iter() {
            if tag.0 == 0x0002 {
                continue;
            }
            let vr = tags::value_representation(tag);
            let primitive = match vr {
                VR::FD => parse_number::<f64>(value).map(PrimitiveValue::from),
                VR::FL => parse_number::<f32>(value).map(PrimitiveValue::from),
                VR::US => parse_number::<u16>(value).map(PrimitiveValue::from),
                VR::SS => parse_number::<i16>(value).map(PrimitiveValue::from),
                VR::UL => parse_number::<u32>(value).map(PrimitiveValue::from),
                VR::SL => parse_number::<i32>(value).map(PrimitiveValue::from),
                VR::AE | VR::AS | VR::CS | VR::DA | VR::DS | VR::DT | VR::IS | VR::LO
                | VR::LT | VR::PN | VR::SH | VR::ST | VR::TM | VR::UC | VR::UI | VR::UR
                | VR::UT => Some(PrimitiveValue::from(value)),
                VR::SQ => continue,
                _ => {
                    warn!("Skipping {} with binary value representation {:?}", tag, vr);
                    continue;
                }
            };
            obj.put(DataElement::new(
                tag,
                vr,
                primitive.unwrap_or(PrimitiveValue::Empty),
            ));
        }

        if let Some(pixels) = pixels {
            obj.put(DataElement::new(tags::SAMPLES_PER_PIXEL, VR::US, dicom_value!(U16, [1])));
            obj.put(DataElement::new(
                tags::PHOTOMETRIC_INTERPRETATION,
                VR::CS,
                PrimitiveValue::from("MONOCHROME2"),
            ));
            obj.put(DataElement::new(tags::ROWS, VR::US, dicom_value!(U16, [pixels.rows])));
            obj.put(DataElement::new(tags::COLUMNS, VR::US, dicom_value!(U16, [pixels.columns])));
            obj.put(DataElement::new(tags::BITS_ALLOCATED, VR::US, dicom_value!(U16, [8])));
            obj.put(DataElement::new(tags::BITS_STORED, VR::US, dicom_value!(U16, [8])));
            obj.put(DataElement::new(tags::HIGH_BIT, VR::US, dicom_value!(U16, [7])));
            obj.put(DataElement::new(tags::PIXEL_REPRESENTATION, VR::US, dicom_value!(U16, [0])));
            obj.put(DataElement::new(
                tags::PIXEL_DATA,
                VR::OB,
                PrimitiveValue::U8(pixels.data.clone().into()),
            ));
        }

        obj
    }
}

impl DicomEncoder for DicomObjectEncoder {
    fn encode(&self, attrs: &ImageAttributes, pixels: Option<&PixelPayload>, path: &Path) -> Result<()> {
        let sop_class = attrs
            .get(tags::SOP_CLASS_UID)
            .unwrap_or(uids::SECONDARY_CAPTURE_IMAGE_STORAGE);
        let sop_instance = attrs.sop_instance_uid().ok_or_else(|| {
            GeneratorError::DicomError("image has no SOPInstanceUID".to_string())
        })?;

        let file = self
            .to_object(attrs, pixels)
            .with_meta(
                FileMetaTableBuilder::new()
                    .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                    .media_storage_sop_class_uid(sop_class)
                    .media_storage_sop_instance_uid(sop_instance),
            )
            .map_err(|e| GeneratorError::DicomError(format!("{}", e)))?;

        file.write_to_file(path)
            .map_err(|e| GeneratorError::DicomError(format!("{}: {}", path.display(), e)))
    }
}

fn parse_number<T: std::str::FromStr>(value: &str) -> Option<T> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match value.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Not a number, writing empty value: '{}'", value);
            None
        }
    }
}

/// Writes one DICOM file per image beneath a directory layout
pub struct FileTreeSink<E = DicomObjectEncoder, P = BlackBoxRenderer> {
    root: PathBuf,
    layout: FileSystemLayout,
    encoder: E,
    renderer: Option<P>,
    written: usize,
}

impl FileTreeSink {
    /// File sink with the default encoder; `no_pixels` suppresses pixel data
    pub fn new(root: &Path, layout: FileSystemLayout, no_pixels: bool) -> Self {
        let renderer = if no_pixels { None } else { Some(BlackBoxRenderer) };
        Self::with_parts(root, layout, DicomObjectEncoder, renderer)
    }
}

impl<E: DicomEncoder, P: PixelRenderer> FileTreeSink<E, P> {
    /// File sink with a custom encoder and optional renderer
    pub fn with_parts(root: &Path, layout: FileSystemLayout, encoder: E, renderer: Option<P>) -> Self {
        Self {
            root: root.to_path_buf(),
            layout,
            encoder,
            renderer,
            written: 0,
        }
    }

    /// Number of files written so far
    pub fn written(&self) -> usize {
        self.written
    }
}

impl<E: DicomEncoder, P: PixelRenderer> ImageSink for FileTreeSink<E, P> {
    fn emit(&mut self, image: &ImageAttributes) -> Result<()> {
        let path = self.layout.path(&self.root, image);
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let pixels = self.renderer.as_ref().map(|renderer| {
            renderer.render(
                image,
                PLACEHOLDER_SIZE,
                PLACEHOLDER_SIZE,
                image.sop_instance_uid().unwrap_or_default(),
            )
        });

        self.encoder.encode(image, pixels.as_ref(), &path)?;
        self.written += 1;
        debug!("Wrote {}", path.display());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        info!("Wrote {} DICOM files to {}", self.written, self.root.display());
        Ok(())
    }
}
