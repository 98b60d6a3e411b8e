//! Date parsing and display helpers.
//!
//! Series dates are stored as local wall-clock text in the database; these
//! helpers convert between that column format and the formats shown to users.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{Error, Result};

/// Column format for series dates.
pub const SERIES_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Long display format, e.g. "January 1, 2019".
const PRETTY_FORMAT: &str = "%B %-d, %Y";

/// Short display format, e.g. "01/01".
const SHORT_FORMAT: &str = "%m/%d";

/// Label for dates falling on the day before today.
pub const YESTERDAY: &str = "Yesterday";

/// Label for dates falling on today.
pub const TODAY: &str = "Today";

/// Label for dates falling on the day after today.
pub const TOMORROW: &str = "Tomorrow";

/// Parse a series date column value.
///
/// # Errors
///
/// Returns an error if the text doesn't match [`SERIES_DATE_FORMAT`].
pub fn series_date_to_date(series_date: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(series_date.trim(), SERIES_DATE_FORMAT).map_err(|e| {
        Error::invalid_input(format!("invalid series date '{series_date}': {e}"))
    })
}

/// Format a date for the series date column.
#[must_use]
pub fn date_to_series_date(date: &NaiveDateTime) -> String {
    date.format(SERIES_DATE_FORMAT).to_string()
}

/// Long form of a date, using relative labels around `today`.
#[must_use]
pub fn date_to_pretty(date: &NaiveDateTime, today: NaiveDate) -> String {
    let day = date.date();
    if day == today - Duration::days(1) {
        YESTERDAY.to_string()
    } else if day == today {
        TODAY.to_string()
    } else if day == today + Duration::days(1) {
        TOMORROW.to_string()
    } else {
        date.format(PRETTY_FORMAT).to_string()
    }
}

/// Long form of a date relative to the local current day.
#[must_use]
pub fn date_to_pretty_now(date: &NaiveDateTime) -> String {
    date_to_pretty(date, Local::now().date_naive())
}

/// Month and day only.
#[must_use]
pub fn date_to_short(date: &NaiveDateTime) -> String {
    date.format(SHORT_FORMAT).to_string()
}

/// The start of the day `date` falls on.
#[must_use]
pub fn set_to_midnight(date: NaiveDateTime) -> NaiveDateTime {
    date.date().and_time(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan_1_2019() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn apr_26_1995() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(1995, 4, 26)
            .unwrap()
            .and_hms_opt(4, 55, 0)
            .unwrap()
    }

    #[test]
    fn test_date_to_pretty() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(date_to_pretty(&jan_1_2019(), today), "January 1, 2019");
        assert_eq!(date_to_pretty(&apr_26_1995(), today), "April 26, 1995");

        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        let yesterday = (today - Duration::days(1)).and_time(noon);
        let tomorrow = (today + Duration::days(1)).and_hms_opt(23, 59, 59).unwrap();
        assert_eq!(date_to_pretty(&yesterday, today), YESTERDAY);
        assert_eq!(date_to_pretty(&today.and_time(noon), today), TODAY);
        assert_eq!(date_to_pretty(&tomorrow, today), TOMORROW);

        let two_days_out = (today + Duration::days(2)).and_time(NaiveTime::MIN);
        assert_eq!(date_to_pretty(&two_days_out, today), "June 17, 2024");
    }

    #[test]
    fn test_series_date_to_date() {
        assert_eq!(
            series_date_to_date("2019-01-01 00:00:00").unwrap(),
            jan_1_2019()
        );
        assert_eq!(
            series_date_to_date("1995-04-26 04:55:00").unwrap(),
            apr_26_1995()
        );
        assert!(series_date_to_date("April 26, 1995").is_err());
    }

    #[test]
    fn test_date_to_series_date() {
        assert_eq!(date_to_series_date(&jan_1_2019()), "2019-01-01 00:00:00");
        assert_eq!(date_to_series_date(&apr_26_1995()), "1995-04-26 04:55:00");
    }

    #[test]
    fn test_date_to_short() {
        assert_eq!(date_to_short(&jan_1_2019()), "01/01");
        assert_eq!(date_to_short(&apr_26_1995()), "04/26");
    }

    #[test]
    fn test_set_to_midnight() {
        let midnight = set_to_midnight(apr_26_1995());
        assert_eq!(date_to_series_date(&midnight), "1995-04-26 00:00:00");
        assert_eq!(set_to_midnight(jan_1_2019()), jan_1_2019());
    }
}
