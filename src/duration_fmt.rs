/// Compact time-left label: `2h 05m`, or just `42m` under an hour.
pub fn format_time_left(left: chrono::Duration) -> String {
  let hours = left.num_hours();
  let minutes = left.num_minutes() % 60;

  match hours {
    0 => format!("{:02}m", minutes),
    _ => format!("{}h {:02}m", hours, minutes),
  }
}
