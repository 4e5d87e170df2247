use chrono::{Datelike, Months, NaiveDate};
use std::fmt;

/// Patient age in whole years, formatted as a DICOM `AS` value (`042Y`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PatientAge {
    pub years: i32,
}

impl PatientAge {
    /// Age of someone born on `birth` as of `on`
    ///
    /// Takes the difference in calendar years, then steps back one year if
    /// the birthday has not yet come round. The check moves `on` back by
    /// the candidate age with month arithmetic, which lands 29 February
    /// on 28 February in non-leap years.
    pub fn at(birth: NaiveDate, on: NaiveDate) -> Self {
        let mut years = on.year() - birth.year();

        let anniversary = if years >= 0 {
            on.checked_sub_months(Months::new(12 * years as u32))
        } else {
            on.checked_add_months(Months::new(12 * years.unsigned_abs()))
        };

        if anniversary.is_some_and(|date| birth > date) {
            years -= 1;
        }

        Self { years }
    }
}

impl fmt::Display for PatientAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}Y", self.years)
    }
}
