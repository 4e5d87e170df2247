use super::ImageSink;
use crate::attributes::{tags, ImageAttributes};
use crate::error::Result;
use dicom_core::Tag;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Written in place of a value the image does not carry
pub const NULL_SENTINEL: &str = "NULL";

pub const STUDY_COLUMNS: &[Tag] = &[
    tags::PATIENT_ID,
    tags::STUDY_INSTANCE_UID,
    tags::STUDY_DATE,
    tags::STUDY_TIME,
    tags::MODALITIES_IN_STUDY,
    tags::STUDY_DESCRIPTION,
    tags::PATIENT_AGE,
    tags::NUMBER_OF_STUDY_RELATED_INSTANCES,
    tags::PATIENT_BIRTH_DATE,
];

pub const SERIES_COLUMNS: &[Tag] = &[
    tags::STUDY_INSTANCE_UID,
    tags::SERIES_INSTANCE_UID,
    tags::SERIES_DATE,
    tags::SERIES_TIME,
    tags::MODALITY,
    tags::IMAGE_TYPE,
    tags::SOURCE_APPLICATION_ENTITY_TITLE,
    tags::INSTITUTION_NAME,
    tags::PROCEDURE_CODE_SEQUENCE,
    tags::PROTOCOL_NAME,
    tags::PERFORMED_PROCEDURE_STEP_ID,
    tags::PERFORMED_PROCEDURE_STEP_DESCRIPTION,
    tags::SERIES_DESCRIPTION,
    tags::BODY_PART_EXAMINED,
    tags::DEVICE_SERIAL_NUMBER,
    tags::NUMBER_OF_SERIES_RELATED_INSTANCES,
    tags::SERIES_NUMBER,
];

pub const IMAGE_COLUMNS: &[Tag] = &[
    tags::SERIES_INSTANCE_UID,
    tags::SOP_INSTANCE_UID,
    tags::BURNED_IN_ANNOTATION,
    tags::SLICE_LOCATION,
    tags::SLICE_THICKNESS,
    tags::SPACING_BETWEEN_SLICES,
    tags::SPIRAL_PITCH_FACTOR,
    tags::KVP,
    tags::EXPOSURE_TIME,
    tags::EXPOSURE,
    tags::MANUFACTURER_MODEL_NAME,
    tags::MANUFACTURER,
    tags::X_RAY_TUBE_CURRENT,
    tags::PHOTOMETRIC_INTERPRETATION,
    tags::CONTRAST_BOLUS_ROUTE,
    tags::CONTRAST_BOLUS_AGENT,
    tags::ACQUISITION_NUMBER,
    tags::ACQUISITION_DATE,
    tags::ACQUISITION_TIME,
    tags::IMAGE_POSITION_PATIENT,
    tags::PIXEL_SPACING,
    tags::FIELD_OF_VIEW_DIMENSIONS,
    tags::FIELD_OF_VIEW_DIMENSIONS_IN_FLOAT,
    tags::DERIVATION_DESCRIPTION,
    tags::TRANSFER_SYNTAX_UID,
    tags::LOSSY_IMAGE_COMPRESSION,
    tags::LOSSY_IMAGE_COMPRESSION_METHOD,
    tags::LOSSY_IMAGE_COMPRESSION_RATIO,
    tags::SCAN_OPTIONS,
];

/// Row-oriented output table
pub trait TabularWriter {
    fn append_row(&mut self, fields: &[&str]) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}

/// Comma separated writer with RFC 4180 quoting
///
/// The header row is written when the writer is created.
pub struct DelimitedWriter<W: Write> {
    inner: W,
    rows: usize,
}

impl DelimitedWriter<BufWriter<File>> {
    /// Creates (or truncates) a file and writes its header
    pub fn create(path: &Path, header: &[&str]) -> Result<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file), header)
    }
}

impl<W: Write> DelimitedWriter<W> {
    pub fn new(inner: W, header: &[&str]) -> Result<Self> {
        let mut writer = Self { inner, rows: 0 };
        writer.write_record(header)?;
        Ok(writer)
    }

    /// Data rows written, header excluded
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn write_record(&mut self, fields: &[&str]) -> Result<()> {
        let line = fields.iter().map(|f| quote(f)).collect::<Vec<_>>().join(",");
        self.inner.write_all(line.as_bytes())?;
        self.inner.write_all(b"\r\n")?;
        Ok(())
    }
}

impl<W: Write> TabularWriter for DelimitedWriter<W> {
    fn append_row(&mut self, fields: &[&str]) -> Result<()> {
        self.write_record(fields)?;
        self.rows += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Table a row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLevel {
    Study,
    Series,
    Image,
}

/// Identifiers of the most recently written study and series rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingState {
    pub last_study_uid: Option<String>,
    pub last_series_uid: Option<String>,
}

impl GroupingState {
    /// Folds one image into the state
    ///
    /// Returns the next state and the rows the image produces, in write
    /// order: a study row when the study changes, a series row when the
    /// series changes, then always an image row.
    pub fn advance(self, image: &ImageAttributes) -> (GroupingState, Vec<RowLevel>) {
        let study_uid = image.study_instance_uid().map(str::to_string);
        let series_uid = image.series_instance_uid().map(str::to_string);

        let mut rows = Vec::with_capacity(3);
        if study_uid != self.last_study_uid {
            rows.push(RowLevel::Study);
        }
        if series_uid != self.last_series_uid {
            rows.push(RowLevel::Series);
        }
        rows.push(RowLevel::Image);

        let next = GroupingState {
            last_study_uid: study_uid,
            last_series_uid: series_uid,
        };
        (next, rows)
    }
}

/// Runs the grouping fold over a whole image stream
pub fn group_rows<'a, I>(images: I) -> Vec<(RowLevel, &'a ImageAttributes)>
where
    I: IntoIterator<Item = &'a ImageAttributes>,
{
    let mut state = GroupingState::default();
    let mut out = Vec::new();
    for image in images {
        let (next, rows) = state.advance(image);
        state = next;
        out.extend(rows.into_iter().map(|level| (level, image)));
    }
    out
}

fn row_values<'a>(columns: &[Tag], image: &'a ImageAttributes) -> Vec<&'a str> {
    columns
        .iter()
        .map(|tag| image.get(*tag).unwrap_or(NULL_SENTINEL))
        .collect()
}

fn header(columns: &[Tag]) -> Vec<String> {
    columns
        .iter()
        .map(|tag| match tags::keyword(*tag) {
            Some(keyword) => keyword.to_string(),
            None => format!("({:04X},{:04X})", tag.0, tag.1),
        })
        .collect()
}

/// Writes study, series and image tables
pub struct TabularSink<W: TabularWriter = DelimitedWriter<BufWriter<File>>> {
    study: W,
    series: W,
    image: W,
    state: GroupingState,
}

impl TabularSink {
    /// Opens `study.csv`, `series.csv` and `image.csv` in `dir`
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let open = |name: &str, columns: &[Tag]| {
            let names = header(columns);
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            DelimitedWriter::create(&dir.join(name), &names)
        };

        let sink = Self::from_writers(
            open("study.csv", STUDY_COLUMNS)?,
            open("series.csv", SERIES_COLUMNS)?,
            open("image.csv", IMAGE_COLUMNS)?,
        );
        info!("Writing tables to {}", dir.display());
        Ok(sink)
    }
}

impl<W: TabularWriter> TabularSink<W> {
    pub fn from_writers(study: W, series: W, image: W) -> Self {
        Self {
            study,
            series,
            image,
            state: GroupingState::default(),
        }
    }

    /// Returns the study, series and image writers
    pub fn into_writers(self) -> (W, W, W) {
        (self.study, self.series, self.image)
    }
}

impl<W: TabularWriter> ImageSink for TabularSink<W> {
    fn emit(&mut self, image: &ImageAttributes) -> Result<()> {
        let (next, rows) = std::mem::take(&mut self.state).advance(image);
        self.state = next;

        for level in rows {
            match level {
                RowLevel::Study => self.study.append_row(&row_values(STUDY_COLUMNS, image))?,
                RowLevel::Series => self.series.append_row(&row_values(SERIES_COLUMNS, image))?,
                RowLevel::Image => self.image.append_row(&row_values(IMAGE_COLUMNS, image))?,
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.study.flush()?;
        self.series.flush()?;
        self.image.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn image(study: &str, series: &str, sop: &str) -> ImageAttributes {
        let mut attrs = ImageAttributes::new();
        attrs.put(tags::STUDY_INSTANCE_UID, study);
        attrs.put(tags::SERIES_INSTANCE_UID, series);
        attrs.put(tags::SOP_INSTANCE_UID, sop);
        attrs.put(tags::IMAGE_TYPE, "ORIGINAL\\PRIMARY");
        attrs
    }

    #[rstest]
    #[case("plain", "plain")]
    #[case("a,b", "\"a,b\"")]
    #[case("say \"hi\"", "\"say \"\"hi\"\"\"")]
    #[case("two\nlines", "\"two\nlines\"")]
    #[case("ORIGINAL\\PRIMARY", "ORIGINAL\\PRIMARY")]
    fn test_quote(#[case] field: &str, #[case] expected: &str) {
        assert_eq!(quote(field), expected);
    }

    #[test]
    fn test_writer_header_then_rows() {
        let mut writer = DelimitedWriter::new(Vec::new(), &["A", "B"]).unwrap();
        writer.append_row(&["1", "x,y"]).unwrap();
        writer.flush().unwrap();
        assert_eq!(writer.rows(), 1);

        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(text, "A,B\r\n1,\"x,y\"\r\n");
    }

    #[test]
    fn test_advance_emits_study_and_series_once() {
        let first = image("s1", "se1", "i1");
        let (state, rows) = GroupingState::default().advance(&first);
        assert_eq!(rows, vec![RowLevel::Study, RowLevel::Series, RowLevel::Image]);

        let (state, rows) = state.advance(&image("s1", "se1", "i2"));
        assert_eq!(rows, vec![RowLevel::Image]);

        let (state, rows) = state.advance(&image("s1", "se2", "i3"));
        assert_eq!(rows, vec![RowLevel::Series, RowLevel::Image]);
        assert_eq!(state.last_series_uid.as_deref(), Some("se2"));
    }

    #[test]
    fn test_group_rows_counts() {
        let images = vec![
            image("s1", "se1", "i1"),
            image("s1", "se1", "i2"),
            image("s1", "se2", "i3"),
            image("s2", "se3", "i4"),
        ];
        let rows = group_rows(&images);
        let count = |level| rows.iter().filter(|(l, _)| *l == level).count();
        assert_eq!(count(RowLevel::Study), 2);
        assert_eq!(count(RowLevel::Series), 3);
        assert_eq!(count(RowLevel::Image), 4);
    }

    #[test]
    fn test_missing_values_use_sentinel() {
        let attrs = image("s", "se", "i");
        let values = row_values(&[tags::SOP_INSTANCE_UID, tags::DEVICE_SERIAL_NUMBER], &attrs);
        assert_eq!(values, vec!["i", NULL_SENTINEL]);
    }

    #[test]
    fn test_header_uses_keywords() {
        let names = header(STUDY_COLUMNS);
        assert_eq!(names[0], "PatientID");
        assert_eq!(names[1], "StudyInstanceUID");
        assert_eq!(names.len(), STUDY_COLUMNS.len());
        assert_eq!(header(&[Tag(0x0009, 0x1001)]), vec!["(0009,1001)"]);
    }

    #[test]
    fn test_sink_over_in_memory_writers() {
        let writer = |columns: &[Tag]| {
            let names = header(columns);
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            DelimitedWriter::new(Vec::new(), &names).unwrap()
        };
        let mut sink = TabularSink::from_writers(
            writer(STUDY_COLUMNS),
            writer(SERIES_COLUMNS),
            writer(IMAGE_COLUMNS),
        );
        sink.emit(&image("s1", "se1", "i1")).unwrap();
        sink.emit(&image("s1", "se1", "i2")).unwrap();
        sink.finish().unwrap();

        let (study, series, images) = sink.into_writers();
        assert_eq!((study.rows(), series.rows(), images.rows()), (1, 1, 2));
        let images = String::from_utf8(images.into_inner()).unwrap();
        assert!(images.lines().nth(2).unwrap().starts_with("se1,i2,"));
    }

    #[test]
    fn test_sink_writes_one_row_per_entity() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut sink = TabularSink::open(dir.path()).unwrap();
        for attrs in [
            image("s1", "se1", "i1"),
            image("s1", "se1", "i2"),
            image("s1", "se2", "i3"),
        ] {
            sink.emit(&attrs).unwrap();
        }
        sink.finish().unwrap();

        let lines = |name: &str| {
            std::fs::read_to_string(dir.path().join(name))
                .unwrap()
                .lines()
                .count()
        };
        // header plus data rows
        assert_eq!(lines("study.csv"), 2);
        assert_eq!(lines("series.csv"), 3);
        assert_eq!(lines("image.csv"), 4);
    }
}
