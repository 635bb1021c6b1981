use chrono::NaiveDateTime;

use crate::{progress, traits::Indexable};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
  id: uuid::Uuid,
  title: String,
  is_completed: bool,
  is_important: bool,
  is_deleted: bool,
  #[serde(with = "crate::time::minute_format")]
  start_time: NaiveDateTime,
  #[serde(with = "crate::time::minute_format")]
  end_time: NaiveDateTime,
}

impl Indexable for Task {
  fn id(&self) -> uuid::Uuid {
    self.id
  }
}

impl Task {
  pub fn new(
    id: uuid::Uuid,
    title: &str,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
  ) -> Self {
    Self {
      id,
      title: title.to_owned(),
      is_completed: false,
      is_important: false,
      is_deleted: false,
      start_time,
      end_time,
    }
  }

  pub fn title(&self) -> &str {
    self.title.as_str()
  }

  pub fn is_completed(&self) -> bool {
    self.is_completed
  }

  pub fn is_important(&self) -> bool {
    self.is_important
  }

  pub fn is_deleted(&self) -> bool {
    self.is_deleted
  }

  pub fn start_time(&self) -> NaiveDateTime {
    self.start_time
  }

  pub fn end_time(&self) -> NaiveDateTime {
    self.end_time
  }

  pub fn set_title(&mut self, title: &str) {
    self.title = title.to_owned();
  }

  pub fn set_window(&mut self, start_time: NaiveDateTime, end_time: NaiveDateTime) {
    self.start_time = start_time;
    self.end_time = end_time;
  }

  pub fn set_completed(&mut self, is_completed: bool) {
    self.is_completed = is_completed;
  }

  pub fn set_important(&mut self, is_important: bool) {
    self.is_important = is_important;
  }

  pub(crate) fn mark_deleted(&mut self) {
    self.is_deleted = true;
  }

  /// Share of the scheduled window still ahead of `now`, 0..=100.
  pub fn time_left_percentage(&self, now: NaiveDateTime) -> u8 {
    progress::percentage(self.start_time, self.end_time, now)
  }

  pub fn time_left(&self, now: NaiveDateTime) -> chrono::Duration {
    progress::remaining(self.end_time, now)
  }
}
