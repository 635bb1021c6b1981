use chrono::{NaiveDate, NaiveDateTime, ParseResult, Timelike};

/// `datetime-local` shape, the stored form of every task timestamp.
pub const MINUTE_FORMAT: &str = "%Y-%m-%dT%H:%M";

const INPUT_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M", MINUTE_FORMAT];

pub fn truncate_to_minute(datetime: NaiveDateTime) -> NaiveDateTime {
  datetime
    .with_second(0)
    .and_then(|d| d.with_nanosecond(0))
    .unwrap_or(datetime)
}

/// Parses user input. A bare `HH:MM` means that time on `today`.
pub fn parse_datetime(datetime: &str, today: NaiveDate) -> ParseResult<NaiveDateTime> {
  let mut input = datetime.trim().to_owned();
  if !input.contains(' ') && !input.contains('T') {
    input = format!("{} {}", today.format("%Y-%m-%d"), input);
  }

  let mut result = NaiveDateTime::parse_from_str(&input, INPUT_FORMATS[0]);
  for format in INPUT_FORMATS.iter().skip(1) {
    if result.is_ok() {
      break;
    }
    result = NaiveDateTime::parse_from_str(&input, format);
  }
  return result.map(truncate_to_minute);
}

pub fn format_datetime(datetime: &NaiveDateTime) -> String {
  datetime.format(MINUTE_FORMAT).to_string()
}

/// Serde adapter for minute-precision local timestamps.
pub mod minute_format {
  use chrono::NaiveDateTime;
  use serde::{Deserialize, Deserializer, Serializer};

  const READ_FORMATS: [&str; 3] = [super::MINUTE_FORMAT, "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

  pub fn serialize<S>(datetime: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.serialize_str(&super::format_datetime(datetime))
  }

  pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
  where
    D: Deserializer<'de>,
  {
    let raw = String::deserialize(deserializer)?;
    if raw.trim().is_empty() {
      return Err(serde::de::Error::custom("empty timestamp"));
    }
    READ_FORMATS
      .iter()
      .find_map(|format| NaiveDateTime::parse_from_str(&raw, format).ok())
      .map(super::truncate_to_minute)
      .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
  }
}
