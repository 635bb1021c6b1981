#[derive(Debug, thiserror::Error)]
pub enum StorageError {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("malformed stored data: {0}")]
  Json(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// The action was rejected before touching the collection.
  #[error("invalid task: {0}")]
  Validation(String),

  #[error("task with id: {0} not found")]
  NotFound(uuid::Uuid),

  /// Reading or writing the persisted collection failed. The in-memory state is kept.
  #[error("persistence error: {0}")]
  Persistence(#[from] StorageError),

  #[error("config error: {0}")]
  Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
