use std::{
  collections::HashMap,
  sync::{mpsc, Arc},
  thread::JoinHandle,
  time::Duration,
};

use chrono::NaiveDateTime;
use log::debug;

use crate::{clock::Clock, progress, task::Task, traits::Indexable};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
  pub id: uuid::Uuid,
  pub percentage: u8,
}

/// Starts per-task watches that report the time-left percentage on a fixed interval.
pub struct ProgressTicker {
  clock: Arc<dyn Clock>,
  interval: Duration,
  updates: mpsc::Sender<ProgressUpdate>,
}

impl ProgressTicker {
  pub fn new(clock: Arc<dyn Clock>, interval: Duration) -> (Self, mpsc::Receiver<ProgressUpdate>) {
    let (updates, receiver) = mpsc::channel();
    let ticker = Self {
      clock,
      interval,
      updates,
    };
    (ticker, receiver)
  }

  /// Reports right away, then once per interval until the returned handle is dropped.
  pub fn watch(&self, task: &Task) -> Watch {
    let id = task.id();
    let window = (task.start_time(), task.end_time());
    let clock = Arc::clone(&self.clock);
    let updates = self.updates.clone();
    let interval = self.interval;
    let (stop, stopped) = mpsc::channel::<()>();

    let handle = std::thread::spawn(move || loop {
      let percentage = progress::percentage(window.0, window.1, clock.now());
      if updates.send(ProgressUpdate { id, percentage }).is_err() {
        break;
      }
      match stopped.recv_timeout(interval) {
        Err(mpsc::RecvTimeoutError::Timeout) => continue,
        _ => break,
      }
    });
    debug!("watching task: {}", id);

    Watch {
      id,
      window,
      stop: Some(stop),
      handle: Some(handle),
    }
  }
}

/// A running watch. Dropping it stops the timer and waits for it to finish.
pub struct Watch {
  id: uuid::Uuid,
  window: (NaiveDateTime, NaiveDateTime),
  stop: Option<mpsc::Sender<()>>,
  handle: Option<JoinHandle<()>>,
}

impl Watch {
  pub fn window(&self) -> (NaiveDateTime, NaiveDateTime) {
    self.window
  }

  fn covers(&self, task: &Task) -> bool {
    self.window == (task.start_time(), task.end_time())
  }
}

impl Drop for Watch {
  fn drop(&mut self) {
    drop(self.stop.take());
    if let Some(handle) = self.handle.take() {
      let _ = handle.join();
    }
    debug!("stopped watching task: {}", self.id);
  }
}

/// Keeps one watch per visible task and collects what they report.
pub struct ProgressBoard {
  ticker: ProgressTicker,
  updates: mpsc::Receiver<ProgressUpdate>,
  watches: HashMap<uuid::Uuid, Watch>,
}

impl ProgressBoard {
  pub fn new(ticker: ProgressTicker, updates: mpsc::Receiver<ProgressUpdate>) -> Self {
    Self {
      ticker,
      updates,
      watches: HashMap::new(),
    }
  }

  /// Waits up to `timeout` for readings and returns every one that is queued.
  /// Comes back empty when nothing reported in time, e.g. while no task is watched.
  pub fn next_updates(&self, timeout: Duration) -> Vec<ProgressUpdate> {
    let mut batch = Vec::new();
    if let Ok(update) = self.updates.recv_timeout(timeout) {
      batch.push(update);
      batch.extend(self.updates.try_iter());
    }
    return batch;
  }

  /// Stops watches of tasks that were deleted, left `tasks` or got a new window, and
  /// starts watches for tasks seen for the first time.
  pub fn sync(&mut self, tasks: &[Task]) {
    let visible: HashMap<uuid::Uuid, &Task> = tasks
      .iter()
      .filter(|task| !task.is_deleted())
      .map(|task| (task.id(), task))
      .collect();

    self.watches.retain(|id, watch| match visible.get(id) {
      Some(task) => watch.covers(task),
      None => false,
    });

    for (id, task) in visible {
      if !self.watches.contains_key(&id) {
        let watch = self.ticker.watch(task);
        self.watches.insert(id, watch);
      }
    }
  }

  pub fn is_watching(&self, id: uuid::Uuid) -> bool {
    self.watches.contains_key(&id)
  }

  pub fn watch_window(&self, id: uuid::Uuid) -> Option<(NaiveDateTime, NaiveDateTime)> {
    self.watches.get(&id).map(|watch| watch.window())
  }

  pub fn len(&self) -> usize {
    self.watches.len()
  }

  pub fn is_empty(&self) -> bool {
    self.watches.is_empty()
  }
}
