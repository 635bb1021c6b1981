use chrono::NaiveDateTime;

/// Time-remaining percentage of the `start..end` window at `now`.
///
/// 100 means the window has not begun yet, 0 means it is over. A window whose end is not
/// after its start has no time left and always yields 0. Inside the window the value is
/// rounded half away from zero and kept within `1..=99`, so only the window edges
/// produce the extremes.
pub fn percentage(start: NaiveDateTime, end: NaiveDateTime, now: NaiveDateTime) -> u8 {
  if end <= start || now >= end {
    return 0;
  }
  if now <= start {
    return 100;
  }

  let total = end.signed_duration_since(start).num_milliseconds() as f64;
  let remaining = end.signed_duration_since(now).num_milliseconds() as f64;
  let rounded = (100.0 * remaining / total).round() as u8;
  return rounded.clamp(1, 99);
}

/// Time left until `end`, never negative.
pub fn remaining(end: NaiveDateTime, now: NaiveDateTime) -> chrono::Duration {
  let left = end.signed_duration_since(now);
  if left < chrono::Duration::zero() {
    return chrono::Duration::zero();
  }
  return left;
}
