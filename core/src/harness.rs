//! Row-per-person driver
//!
//! A [`DataGenerator`] turns one person into one row of cells. The harness
//! writes a header and then one row per person, which for the DICOM
//! generator is the UID of the study produced for that person.

use crate::error::Result;
use crate::generator::DicomDataGenerator;
use crate::person::Person;
use crate::sink::{DelimitedWriter, ImageSink, TabularWriter};
use log::info;

/// Produces one row of cells per person
pub trait DataGenerator {
    fn headers(&self) -> Vec<String>;

    /// Cells for `person`; `None` cells are written empty
    fn generate_test_data_row(&mut self, person: &Person) -> Result<Vec<Option<String>>>;
}

impl<'s, S: ImageSink> DataGenerator for DicomDataGenerator<'s, S> {
    fn headers(&self) -> Vec<String> {
        vec!["Studies Generated".to_string()]
    }

    fn generate_test_data_row(&mut self, person: &Person) -> Result<Vec<Option<String>>> {
        let uid = DicomDataGenerator::generate_test_data_row(self, person)?;
        Ok(vec![uid])
    }
}

/// Writes the header and one row per person
///
/// Returns the number of rows written, header excluded.
pub fn write_test_data<G, W>(generator: &mut G, people: &[Person], writer: W) -> Result<usize>
where
    G: DataGenerator + ?Sized,
    W: std::io::Write,
{
    let headers = generator.headers();
    let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
    let mut table = DelimitedWriter::new(writer, &headers)?;

    for person in people {
        let cells = generator.generate_test_data_row(person)?;
        let cells: Vec<&str> = cells.iter().map(|c| c.as_deref().unwrap_or("")).collect();
        table.append_row(&cells)?;
    }
    table.flush()?;

    info!("Wrote {} rows", table.rows());
    Ok(table.rows())
}
