use std::sync::atomic::{AtomicI64, Ordering};

use chrono::NaiveDateTime;

pub trait Clock: Send + Sync {
  fn now(&self) -> NaiveDateTime;
}

/// Wall clock in the local time zone.
#[derive(Default)]
pub struct LocalClock;

impl Clock for LocalClock {
  fn now(&self) -> NaiveDateTime {
    chrono::Local::now().naive_local()
  }
}

/// A clock that only moves when told to.
pub struct FixedClock {
  timestamp_ms: AtomicI64,
}

impl FixedClock {
  pub fn new(now: NaiveDateTime) -> Self {
    Self {
      timestamp_ms: AtomicI64::new(now.and_utc().timestamp_millis()),
    }
  }

  pub fn set(&self, now: NaiveDateTime) {
    self
      .timestamp_ms
      .store(now.and_utc().timestamp_millis(), Ordering::SeqCst);
  }

  #[cfg(test)]
  pub fn advance(&self, by: chrono::Duration) {
    self
      .timestamp_ms
      .fetch_add(by.num_milliseconds(), Ordering::SeqCst);
  }
}

impl Clock for FixedClock {
  fn now(&self) -> NaiveDateTime {
    let millis = self.timestamp_ms.load(Ordering::SeqCst);
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(millis)
      .map(|datetime| datetime.naive_utc())
      .unwrap_or(NaiveDateTime::MIN)
  }
}

pub trait IdGenerator {
  fn next_id(&mut self) -> uuid::Uuid;
}

#[derive(Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
  fn next_id(&mut self) -> uuid::Uuid {
    uuid::Uuid::new_v4()
  }
}

/// Predictable ids `1, 2, 3, ...` encoded as uuids.
#[derive(Default)]
pub struct SequentialIds {
  last: u128,
}

impl SequentialIds {
  #[cfg(test)]
  pub fn starting_after(last: u128) -> Self {
    Self { last }
  }
}

impl IdGenerator for SequentialIds {
  fn next_id(&mut self) -> uuid::Uuid {
    self.last += 1;
    uuid::Uuid::from_u128(self.last)
  }
}
