//! Annual crop yield records.

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct YieldRecord {
    pub year: i64,
    pub yield_bushels: i64,
}

impl YieldRecord {
    /// Parses `year<TAB>bushels`. Anything else, including extra fields or
    /// non-integer values, yields `None`.
    pub fn from_line(line: &str) -> Option<Self> {
        let mut fields = line.trim().split('\t');
        let year = fields.next()?.trim().parse().ok()?;
        let yield_bushels = fields.next()?.trim().parse().ok()?;
        if fields.next().is_some() {
            return None;
        }

        Some(YieldRecord {
            year,
            yield_bushels,
        })
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn should_parse_line() {
        let record = YieldRecord::from_line("1985\t1234567890").unwrap();
        assert_eq!(record.year, 1985);
        assert_eq!(record.yield_bushels, 1234567890);
    }

    #[test]
    fn should_reject_short_and_long_lines() {
        assert_eq!(YieldRecord::from_line("1985"), None);
        assert_eq!(YieldRecord::from_line("1985\t12\t3"), None);
    }

    #[test]
    fn should_reject_non_numeric_values() {
        assert_eq!(YieldRecord::from_line("year\tbushels"), None);
    }
}
