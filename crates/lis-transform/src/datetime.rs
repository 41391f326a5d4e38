use chrono::{NaiveDate, NaiveDateTime, Timelike};
use lis_model::{CellValue, excel_serial_to_datetime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M",
    "%Y年%m月%d日 %H:%M:%S",
    "%Y年%m月%d日 %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y年%m月%d日"];

fn try_parse_datetime(value: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

fn try_parse_date(value: &str) -> Option<NaiveDate> {
    if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
        let year = value[0..4].parse().ok()?;
        let month = value[4..6].parse().ok()?;
        let day = value[6..8].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Interprets a cell as a timestamp.
///
/// Numbers are Excel serial day numbers. Sub-second precision is dropped.
pub fn parse_timestamp(value: &CellValue) -> Option<NaiveDateTime> {
    let parsed = match value {
        CellValue::DateTime(value) => Some(*value),
        CellValue::Date(value) => value.and_hms_opt(0, 0, 0),
        CellValue::Number(serial) => excel_serial_to_datetime(*serial),
        CellValue::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                None
            } else {
                try_parse_datetime(text)
                    .or_else(|| try_parse_date(text).and_then(|date| date.and_hms_opt(0, 0, 0)))
            }
        }
        CellValue::Null => None,
    };
    parsed.and_then(|value| value.with_nanosecond(0))
}

/// `YYYY-MM-DD` at midnight, `YYYY-MM-DD HH:MM:SS` otherwise.
pub fn format_timestamp(value: NaiveDateTime) -> String {
    if value.hour() == 0 && value.minute() == 0 && value.second() == 0 {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
