use crate::error::StorageError;

/// Durable text store addressed by key. `save` replaces the whole value.
pub trait Storage {
  fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
  fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}
