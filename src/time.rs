//! Business-timezone date handling
//!
//! "Today" for report caching is computed in a fixed business timezone so a
//! server running elsewhere agrees with users on which calendar day it is.

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

/// Current calendar date in the given business timezone.
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_today_matches_utc_offset() {
        // Asia/Seoul is UTC+9 year-round; the local date is the UTC instant
        // shifted by nine hours.
        let tz: Tz = "Asia/Seoul".parse().unwrap();
        let expected = (Utc::now() + Duration::hours(9)).date_naive();
        assert_eq!(today_in(tz), expected);
    }

    #[test]
    fn test_utc_today() {
        let tz: Tz = "UTC".parse().unwrap();
        assert_eq!(today_in(tz), Utc::now().date_naive());
    }
}
