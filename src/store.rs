use std::sync::Arc;

use chrono::NaiveDateTime;
use log::{debug, warn};

use crate::{
  action::{self, Action},
  clock::{Clock, IdGenerator},
  error::{Error, Result, StorageError},
  storage::Storage,
  summary::{self, Summary},
  task::Task,
  time::truncate_to_minute,
  traits::{self, Indexable},
};

pub const DEFAULT_STORAGE_KEY: &str = "todos";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  Applied,
  /// The action referenced a task that does not exist; nothing changed.
  Ignored,
}

/// Ordered task collection mirrored to `storage` after every change.
pub struct TaskStore {
  key: String,
  tasks: Vec<Task>,
  storage: Box<dyn Storage>,
  clock: Arc<dyn Clock>,
  ids: Box<dyn IdGenerator>,
}

impl TaskStore {
  pub fn open(
    key: &str,
    storage: Box<dyn Storage>,
    clock: Arc<dyn Clock>,
    ids: Box<dyn IdGenerator>,
  ) -> Result<Self> {
    Self::open_with_seed(key, storage, clock, ids, Vec::new())
  }

  /// Restores the collection stored under `key`, or starts from `seed` when nothing is stored.
  pub fn open_with_seed(
    key: &str,
    storage: Box<dyn Storage>,
    clock: Arc<dyn Clock>,
    ids: Box<dyn IdGenerator>,
    seed: Vec<Task>,
  ) -> Result<Self> {
    // a stored `null` counts as nothing stored
    let stored: Option<Vec<Task>> = match storage.load(key)? {
      Some(raw) => serde_json::from_str(&raw).map_err(StorageError::from)?,
      None => None,
    };
    let tasks = stored.unwrap_or(seed);
    debug!("restored {} tasks from key: {}", tasks.len(), key);

    Ok(Self {
      key: key.to_owned(),
      tasks,
      storage,
      clock,
      ids,
    })
  }

  /// Applies `action` and persists the result.
  ///
  /// Unknown ids are absorbed as [`Outcome::Ignored`]. On a persistence error the
  /// in-memory collection already holds the new state.
  pub fn dispatch(&mut self, action: Action) -> Result<Outcome> {
    let name = action.name();
    match action::apply(&self.tasks, action) {
      Ok(next) => {
        self.tasks = next;
        debug!("applied {}, {} tasks", name, self.tasks.len());
        self.persist()?;
        Ok(Outcome::Applied)
      }
      Err(Error::NotFound(id)) => {
        warn!("{} ignored: task with id: {} not found", name, id);
        Ok(Outcome::Ignored)
      }
      Err(err) => Err(err),
    }
  }

  /// Adds a task. Missing window bounds default to the current minute.
  pub fn create(
    &mut self,
    title: &str,
    start_time: Option<NaiveDateTime>,
    end_time: Option<NaiveDateTime>,
  ) -> Result<Task> {
    let now = truncate_to_minute(self.clock.now());
    let mut id = self.ids.next_id();
    while self.task_by_id(id).is_some() {
      id = self.ids.next_id();
    }

    let applied = self.dispatch(Action::Create {
      id,
      title: title.to_owned(),
      start_time: start_time.unwrap_or(now),
      end_time: end_time.unwrap_or(now),
    });
    let created = self.task_by_id(id).cloned();
    match (applied, created) {
      (Ok(_), Some(task)) => Ok(task),
      (Ok(_), None) => Err(Error::NotFound(id)),
      (Err(err), _) => Err(err),
    }
  }

  pub fn delete(&mut self, id: uuid::Uuid) -> Result<Outcome> {
    self.dispatch(Action::Delete(id))
  }

  pub fn toggle_completed(&mut self, id: uuid::Uuid) -> Result<Outcome> {
    self.dispatch(Action::ToggleCompleted(id))
  }

  pub fn toggle_important(&mut self, id: uuid::Uuid) -> Result<Outcome> {
    self.dispatch(Action::ToggleImportant(id))
  }

  /// Replaces the stored record. Callers merge the fields they want to keep.
  pub fn update(&mut self, task: Task) -> Result<Outcome> {
    self.dispatch(Action::Update(task))
  }

  pub fn reschedule(
    &mut self,
    id: uuid::Uuid,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
  ) -> Result<Outcome> {
    let mut task = match self.task_by_id(id) {
      Some(task) => task.clone(),
      None => {
        warn!("reschedule ignored: task with id: {} not found", id);
        return Ok(Outcome::Ignored);
      }
    };
    task.set_window(start_time, end_time);
    self.update(task)
  }

  pub fn task_by_id(&self, id: uuid::Uuid) -> Option<&Task> {
    self.tasks.iter().find(|task| task.id() == id)
  }

  pub fn resolve_id(&self, id: &str) -> Option<uuid::Uuid> {
    traits::resolve_id(&self.tasks, id)
  }

  /// Every task, deleted ones included, in insertion order.
  pub fn tasks(&self) -> &[Task] {
    &self.tasks
  }

  pub fn active(&self) -> Vec<&Task> {
    summary::active(&self.tasks)
  }

  pub fn summary(&self) -> Summary {
    Summary::of(&self.tasks)
  }

  pub fn clock(&self) -> Arc<dyn Clock> {
    Arc::clone(&self.clock)
  }

  pub fn now(&self) -> NaiveDateTime {
    self.clock.now()
  }

  fn persist(&mut self) -> Result<()> {
    let serialized = serde_json::to_string_pretty(&self.tasks).map_err(StorageError::from)?;
    self.storage.save(&self.key, &serialized)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;
  use crate::{
    clock::{FixedClock, SequentialIds},
    storage::MemoryStorage,
    time::parse_datetime,
  };

  fn at(input: &str) -> NaiveDateTime {
    parse_datetime(input, chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()).unwrap()
  }

  /// Lets a test keep looking at what the store wrote.
  #[derive(Clone, Default)]
  struct SharedStorage(Rc<RefCell<MemoryStorage>>);

  impl Storage for SharedStorage {
    fn load(&self, key: &str) -> std::result::Result<Option<String>, StorageError> {
      self.0.borrow().load(key)
    }

    fn save(&mut self, key: &str, value: &str) -> std::result::Result<(), StorageError> {
      self.0.borrow_mut().save(key, value)
    }
  }

  fn open(storage: &SharedStorage) -> TaskStore {
    TaskStore::open(
      DEFAULT_STORAGE_KEY,
      Box::new(storage.clone()),
      Arc::new(FixedClock::new(at("2025-01-01T08:30"))),
      Box::new(SequentialIds::default()),
    )
    .unwrap()
  }

  fn stored_tasks(storage: &SharedStorage) -> Vec<Task> {
    let raw = storage.0.borrow().get(DEFAULT_STORAGE_KEY).unwrap().to_owned();
    serde_json::from_str(&raw).unwrap()
  }

  #[test]
  fn create_persists_snapshot() {
    let storage = SharedStorage::default();
    let mut store = open(&storage);

    let task = store
      .create(" Buy milk ", Some(at("09:00")), Some(at("10:00")))
      .unwrap();

    assert_eq!(task.title(), "Buy milk");
    assert_eq!(task.id(), uuid::Uuid::from_u128(1));
    assert_eq!(stored_tasks(&storage), store.tasks().to_vec());
  }

  #[test]
  fn create_defaults_window_to_now() {
    let storage = SharedStorage::default();
    let mut store = open(&storage);

    let task = store.create("Stretch", None, None).unwrap();
    assert_eq!(task.start_time(), at("2025-01-01T08:30"));
    assert_eq!(task.end_time(), at("2025-01-01T08:30"));
  }

  #[test]
  fn blank_title_is_rejected_without_writing() {
    let storage = SharedStorage::default();
    let mut store = open(&storage);

    let err = store.create("   ", None, None).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(store.tasks().is_empty());
    assert!(storage.0.borrow().get(DEFAULT_STORAGE_KEY).is_none());
  }

  #[test]
  fn create_then_delete_keeps_record() {
    let storage = SharedStorage::default();
    let mut store = open(&storage);

    let task = store.create("Buy milk", None, None).unwrap();
    assert_eq!(store.delete(task.id()).unwrap(), Outcome::Applied);

    let summary = store.summary();
    assert_eq!(summary.total, 0);
    assert_eq!(summary.deleted, 1);
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(stored_tasks(&storage).len(), 1);
    assert!(stored_tasks(&storage)[0].is_deleted());
  }

  #[test]
  fn unknown_id_is_ignored() {
    let storage = SharedStorage::default();
    let mut store = open(&storage);
    store.create("Buy milk", None, None).unwrap();
    let before = store.tasks().to_vec();

    let ghost = uuid::Uuid::from_u128(99);
    assert_eq!(store.toggle_completed(ghost).unwrap(), Outcome::Ignored);
    assert_eq!(store.toggle_important(ghost).unwrap(), Outcome::Ignored);
    assert_eq!(store.delete(ghost).unwrap(), Outcome::Ignored);
    assert_eq!(
      store
        .update(Task::new(ghost, "ghost", at("09:00"), at("10:00")))
        .unwrap(),
      Outcome::Ignored
    );
    assert_eq!(
      store.reschedule(ghost, at("09:00"), at("10:00")).unwrap(),
      Outcome::Ignored
    );
    assert_eq!(store.tasks(), &before[..]);
  }

  #[test]
  fn reschedule_keeps_other_fields() {
    let storage = SharedStorage::default();
    let mut store = open(&storage);
    let task = store.create("Buy milk", None, None).unwrap();
    store.toggle_important(task.id()).unwrap();

    store
      .reschedule(task.id(), at("12:00"), at("13:00"))
      .unwrap();

    let stored = store.task_by_id(task.id()).unwrap();
    assert!(stored.is_important());
    assert_eq!(stored.title(), "Buy milk");
    assert_eq!(stored.start_time(), at("12:00"));
    assert_eq!(stored.end_time(), at("13:00"));
  }

  #[test]
  fn reopening_restores_collection() {
    let storage = SharedStorage::default();
    let expected = {
      let mut store = open(&storage);
      let first = store.create("Buy milk", Some(at("09:00")), Some(at("10:00"))).unwrap();
      store.create("Walk the dog", None, None).unwrap();
      store.toggle_completed(first.id()).unwrap();
      store.tasks().to_vec()
    };

    let reopened = open(&storage);
    assert_eq!(reopened.tasks(), &expected[..]);
  }

  #[test]
  fn ids_are_not_reused_after_reopen() {
    let storage = SharedStorage::default();
    {
      let mut store = open(&storage);
      store.create("Buy milk", None, None).unwrap();
    }

    // a fresh generator starts from 1 again
    let mut store = open(&storage);
    let second = store.create("Walk the dog", None, None).unwrap();
    assert_eq!(second.id(), uuid::Uuid::from_u128(2));
    assert_eq!(store.tasks().len(), 2);
  }

  #[test]
  fn seed_is_used_when_nothing_is_stored() {
    let seed = vec![Task::new(
      uuid::Uuid::from_u128(7),
      "Welcome",
      at("09:00"),
      at("10:00"),
    )];
    let store = TaskStore::open_with_seed(
      DEFAULT_STORAGE_KEY,
      Box::new(MemoryStorage::new()),
      Arc::new(FixedClock::new(at("08:00"))),
      Box::new(SequentialIds::default()),
      seed.clone(),
    )
    .unwrap();
    assert_eq!(store.tasks(), &seed[..]);
  }

  #[test]
  fn stored_null_reads_as_nothing_stored() {
    let store = TaskStore::open(
      DEFAULT_STORAGE_KEY,
      Box::new(MemoryStorage::with_value(DEFAULT_STORAGE_KEY, "null")),
      Arc::new(FixedClock::new(at("08:00"))),
      Box::new(SequentialIds::default()),
    )
    .unwrap();
    assert!(store.tasks().is_empty());
  }

  #[test]
  fn corrupt_snapshot_is_a_persistence_error() {
    let result = TaskStore::open(
      DEFAULT_STORAGE_KEY,
      Box::new(MemoryStorage::with_value(DEFAULT_STORAGE_KEY, "{not json")),
      Arc::new(FixedClock::new(at("08:00"))),
      Box::new(SequentialIds::default()),
    );
    assert!(matches!(result, Err(Error::Persistence(StorageError::Json(_)))));
  }

  #[test]
  fn failed_write_keeps_in_memory_change() {
    let storage = SharedStorage::default();
    let mut store = open(&storage);
    let task = store.create("Buy milk", None, None).unwrap();

    storage.0.borrow_mut().set_read_only(true);
    let err = store.toggle_completed(task.id()).unwrap_err();

    assert!(matches!(err, Error::Persistence(_)));
    assert!(store.task_by_id(task.id()).unwrap().is_completed());
    assert!(!stored_tasks(&storage)[0].is_completed());
  }

  #[test]
  fn resolves_short_ids() {
    let storage = SharedStorage::default();
    let mut store = open(&storage);
    let task = store.create("Buy milk", None, None).unwrap();

    let short = traits::shorten_id(task.id());
    assert_eq!(store.resolve_id(&short), Some(task.id()));
  }
}
