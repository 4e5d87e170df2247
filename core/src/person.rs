//! Patient record consumed by the generator
//!
//! People are produced elsewhere (a demographics generator, a fixture file)
//! and handed to the generator one at a time. The generator only needs the
//! identity fields it copies into the patient module and a way to draw a
//! date during the person's lifetime.

use chrono::{Days, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Postal address of a patient
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub line2: String,
    #[serde(default)]
    pub line3: String,
    #[serde(default)]
    pub line4: String,
    #[serde(default)]
    pub postcode: String,
}

impl Address {
    /// Single-line form used for the PatientAddress attribute
    pub fn single_line(&self) -> String {
        [
            &self.line1,
            &self.line2,
            &self.line3,
            &self.line4,
            &self.postcode,
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .map(|part| part.as_str())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// A synthetic patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Community Health Index number, used as PatientID
    pub chi: String,
    pub forename: String,
    pub surname: String,
    pub date_of_birth: NaiveDate,
    #[serde(default)]
    pub date_of_death: Option<NaiveDate>,
    #[serde(default)]
    pub address: Address,
}

impl Person {
    pub fn new(chi: &str, forename: &str, surname: &str, date_of_birth: NaiveDate) -> Self {
        Self {
            chi: chi.to_string(),
            forename: forename.to_string(),
            surname: surname.to_string(),
            date_of_birth,
            date_of_death: None,
            address: Address::default(),
        }
    }

    /// PatientName in DICOM person-name form (`Surname^Forename`)
    pub fn dicom_name(&self) -> String {
        format!("{}^{}", self.surname, self.forename)
    }

    /// Last date on which this person can have been imaged
    ///
    /// The date of death if known, otherwise `until`; never earlier than
    /// the date of birth.
    pub fn last_date(&self, until: NaiveDate) -> NaiveDate {
        let end = match self.date_of_death {
            Some(death) if death < until => death,
            _ => until,
        };
        end.max(self.date_of_birth)
    }

    /// Uniform random date between birth and [`Person::last_date`], inclusive
    pub fn random_date_during_lifetime<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        until: NaiveDate,
    ) -> NaiveDate {
        let span = (self.last_date(until) - self.date_of_birth).num_days().max(0) as u64;
        let offset = rng.gen_range(0..=span);
        self.date_of_birth
            .checked_add_days(Days::new(offset))
            .unwrap_or(self.date_of_birth)
    }
}

/// Reads people from a JSON array file
pub fn read_people(path: &Path) -> Result<Vec<Person>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
