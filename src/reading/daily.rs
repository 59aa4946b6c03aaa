//! Daily station observations and the tab separated line format they arrive in.

use std::num::ParseIntError;

use serde::Serialize;
use sqlx::FromRow;

use crate::aggregate::extract_year;

/// The four raw tokens of a station line, untouched.
pub type RawLine<'a> = (&'a str, &'a str, &'a str, &'a str);

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct DailyObservation {
    pub station: String,
    /// YYYYMMDD
    pub date: i64,
    /// Tenths of a degree Celsius, -9999 when missing.
    pub max_temp: i64,
    pub min_temp: i64,
    /// Tenths of a millimetre, -9999 when missing.
    pub precipitation: i64,
}

impl DailyObservation {
    pub fn from_tokens(station: &str, tokens: RawLine<'_>) -> Result<Self, ParseIntError> {
        let (date, max_temp, min_temp, precipitation) = tokens;

        Ok(DailyObservation {
            station: station.to_string(),
            date: date.trim().parse()?,
            max_temp: max_temp.trim().parse()?,
            min_temp: min_temp.trim().parse()?,
            precipitation: precipitation.trim().parse()?,
        })
    }

    pub fn year(&self) -> i64 {
        extract_year(self.date)
    }
}

/// Splits one station line into its four tokens.
///
/// Returns `None` for blank lines and for lines that do not have exactly four
/// tab separated fields. Values are not interpreted here.
pub fn parse_line(line: &str) -> Option<RawLine<'_>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut fields = line.split('\t');
    let tokens = (fields.next()?, fields.next()?, fields.next()?, fields.next()?);
    match fields.next() {
        Some(_) => None,
        None => Some(tokens),
    }
}

// -- Tests ----------------------------------------------------------------------------
