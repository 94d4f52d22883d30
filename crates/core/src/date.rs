//! Issue dates and their German labels.

use std::fmt;
use std::str::FromStr;

use time::format_description::well_known::Rfc3339;
use time::{Date, Month, OffsetDateTime, UtcOffset};

use crate::{EpaperError, Result};

const MONTH_ABBREVIATIONS: [&str; 12] = ["Jan", "Feb", "Mär", "Apr", "Mai", "Jun", "Jul", "Aug", "Sep", "Okt", "Nov", "Dez"];

/// Calendar date of an issue, written `YYYYMMDD` by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct IssueDate(Date);

impl IssueDate {
    /// Builds a date from its numeric `YYYYMMDD` form.
    pub fn from_number(value: u32) -> Result<Self> {
        let invalid = || EpaperError::InvalidDate(value.to_string());
        let year = i32::try_from(value / 10_000).map_err(|_| invalid())?;
        let month = Month::try_from(((value / 100) % 100) as u8).map_err(|_| invalid())?;
        let day = (value % 100) as u8;
        Date::from_calendar_date(year, month, day).map(Self).map_err(|_| invalid())
    }

    /// `20200821`
    pub fn compact(&self) -> String {
        format!("{:04}{:02}{:02}", self.0.year(), u8::from(self.0.month()), self.0.day())
    }

    /// `2020-08-21`
    pub fn iso(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.0.year(), u8::from(self.0.month()), self.0.day())
    }

    /// `21.08.2020`
    pub fn numeric(&self) -> String {
        format!("{:02}.{:02}.{:04}", self.0.day(), u8::from(self.0.month()), self.0.year())
    }

    /// `21. Aug. 2020`
    pub fn long(&self) -> String {
        let month = MONTH_ABBREVIATIONS[usize::from(u8::from(self.0.month())) - 1];
        format!("{:02}. {}. {:04}", self.0.day(), month, self.0.year())
    }
}

impl FromStr for IssueDate {
    type Err = EpaperError;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EpaperError::InvalidDate(s.to_string()));
        }
        let value = s.parse::<u32>().map_err(|_| EpaperError::InvalidDate(s.to_string()))?;
        Self::from_number(value)
    }
}

impl fmt::Display for IssueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compact())
    }
}

/// RFC 3339 UTC timestamp with whole seconds, as used by `dcterms:modified`.
pub fn modified_timestamp(at: OffsetDateTime) -> Result<String> {
    let at = at.to_offset(UtcOffset::UTC);
    let at = at.replace_nanosecond(0).unwrap_or(at);
    Ok(at.format(&Rfc3339)?)
}
