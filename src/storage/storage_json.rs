use std::io::{Read, Write};

use log::debug;

use crate::error::StorageError;

use super::storage::Storage;

/// One `<key>.json` file per key inside `database_folder`.
pub struct JsonFileStorage {
  database_folder: std::path::PathBuf,
}

impl JsonFileStorage {
  pub fn new(database_folder: &str) -> Result<Self, StorageError> {
    std::fs::create_dir_all(database_folder)?;
    debug!("todos data folder: {}", database_folder);

    Ok(Self {
      database_folder: std::path::PathBuf::from(database_folder),
    })
  }

  pub fn storage_path(&self, key: &str) -> Result<std::path::PathBuf, StorageError> {
    let is_plain_name = !key.is_empty()
      && key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !is_plain_name {
      return Err(StorageError::Io(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        format!("storage key {:?} is not a plain name", key),
      )));
    }
    return Ok(self.database_folder.join(format!("{}.json", key)));
  }
}

impl Storage for JsonFileStorage {
  fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
    let filepath = self.storage_path(key)?;
    let mut file = match std::fs::File::open(&filepath) {
      Ok(file) => file,
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
      Err(err) => return Err(err.into()),
    };

    let mut content = String::new();
    file.read_to_string(&mut content)?;
    debug!("restored {} bytes from: {}", content.len(), filepath.display());

    if content.trim().is_empty() {
      return Ok(None);
    }
    return Ok(Some(content));
  }

  fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
    let filepath = self.storage_path(key)?;
    // readers only ever see the old or the new snapshot
    let mut file = tempfile::Builder::new()
      .prefix(&format!(".{}", key))
      .suffix(".tmp")
      .tempfile_in(&self.database_folder)?;
    file.write_all(value.as_bytes())?;
    file.flush()?;
    file.as_file().sync_all()?;
    file.persist(&filepath).map_err(|err| err.error)?;

    debug!("saved {} bytes to: {}", value.len(), filepath.display());
    Ok(())
  }
}
