use std::collections::HashMap;

use crate::error::StorageError;

use super::storage::Storage;

/// Keeps values in process memory. Optionally refuses writes to exercise failure paths.
#[derive(Default, Debug, Clone)]
pub struct MemoryStorage {
  values: HashMap<String, String>,
  read_only: bool,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_value(key: &str, value: &str) -> Self {
    let mut storage = Self::default();
    storage.values.insert(key.to_owned(), value.to_owned());
    return storage;
  }

  pub fn set_read_only(&mut self, read_only: bool) {
    self.read_only = read_only;
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.values.get(key).map(|value| value.as_str())
  }
}

impl Storage for MemoryStorage {
  fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
    Ok(self.values.get(key).cloned())
  }

  fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
    if self.read_only {
      return Err(StorageError::Io(std::io::Error::new(
        std::io::ErrorKind::PermissionDenied,
        format!("storage is read-only, can't write {}", key),
      )));
    }
    self.values.insert(key.to_owned(), value.to_owned());
    Ok(())
  }
}
