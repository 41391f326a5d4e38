use chrono::{Duration, NaiveDate, NaiveDateTime};

const SECONDS_PER_DAY: f64 = 86_400.0;
const MAX_SERIAL: f64 = 2_958_466.0;

/// Converts an Excel serial day number to a timestamp.
///
/// Fractions are the time of day, rounded to the nearest second. Values
/// outside 1900-01-01..=9999-12-31 yield `None`.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 1.0 || serial >= MAX_SERIAL {
        return None;
    }
    // Excel's serial 60 is the nonexistent 1900-02-29; counting from
    // 1899-12-30 lines every later serial up with the real calendar.
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * SECONDS_PER_DAY).round() as i64;
    epoch.checked_add_signed(Duration::seconds(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_serial_is_midnight() {
        let value = excel_serial_to_datetime(44_931.0).expect("serial");
        assert_eq!(value.to_string(), "2023-01-05 00:00:00");
    }

    #[test]
    fn fraction_is_time_of_day() {
        let value = excel_serial_to_datetime(44_931.5).expect("serial");
        assert_eq!(value.to_string(), "2023-01-05 12:00:00");
    }

    #[test]
    fn out_of_range_is_rejected() {
        assert!(excel_serial_to_datetime(0.0).is_none());
        assert!(excel_serial_to_datetime(f64::NAN).is_none());
        assert!(excel_serial_to_datetime(3_000_000.0).is_none());
    }
}
