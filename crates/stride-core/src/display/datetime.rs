//! DateTime display utilities.

use std::fmt;

use jiff::{tz::TimeZone, Timestamp};

/// Formats a timestamp as a calendar date in the system time zone.
///
/// Chat replies only need the day a goal was started or finished, so the
/// format is `YYYY-MM-DD`.
pub struct LocalDate<'a>(pub &'a Timestamp);

impl fmt::Display for LocalDate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.0.to_zoned(TimeZone::system()).strftime("%Y-%m-%d")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_date_shape() {
        let ts = Timestamp::from_second(1_700_000_000).unwrap();
        let text = LocalDate(&ts).to_string();
        assert_eq!(text.len(), 10);
        assert!(text.starts_with("2023-11-1"));
    }
}
