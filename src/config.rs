use crate::{
  error::{Error, Result},
  store::DEFAULT_STORAGE_KEY,
  ticker::DEFAULT_REFRESH_INTERVAL,
};

const TODOS_DEFAULT_STORAGE_DIR: &str = ".todos";
const TODOS_DEFAULT_CONFIG_NAME: &str = ".todos.json";
const TODOS_CONFIG_ENV: &str = "TODOS_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Config {
  pub storage_dir_path: String,
  #[serde(default = "default_storage_key")]
  pub storage_key: String,
  #[serde(default = "default_refresh_interval_secs")]
  pub refresh_interval_secs: u64,
}

fn default_storage_key() -> String {
  DEFAULT_STORAGE_KEY.to_owned()
}

fn default_refresh_interval_secs() -> u64 {
  DEFAULT_REFRESH_INTERVAL.as_secs()
}

impl Config {
  /// Reads `$TODOS_CONFIG` or `~/.todos.json`, writing defaults there on first run.
  pub fn new() -> Result<Self> {
    let home_env =
      std::env::var("HOME").map_err(|err| Error::Config(format!("HOME is not set: {}", err)))?;
    let home = std::path::Path::new(home_env.as_str());

    let config_file_path = match std::env::var(TODOS_CONFIG_ENV) {
      Ok(file_path) => std::path::PathBuf::from(file_path),
      Err(_) => home.join(TODOS_DEFAULT_CONFIG_NAME),
    };

    let default_config = Self::with_storage_dir(home.join(TODOS_DEFAULT_STORAGE_DIR));
    return Self::load_or_create(&config_file_path, default_config);
  }

  pub fn with_storage_dir(storage_dir: std::path::PathBuf) -> Self {
    Self {
      storage_dir_path: storage_dir.to_string_lossy().into_owned(),
      storage_key: default_storage_key(),
      refresh_interval_secs: default_refresh_interval_secs(),
    }
  }

  pub fn load_or_create(config_file_path: &std::path::Path, default_config: Self) -> Result<Self> {
    let config_err = |err: String| Error::Config(format!("{}: {}", config_file_path.display(), err));

    if !config_file_path.exists() {
      let file = std::fs::File::create(config_file_path).map_err(|err| config_err(err.to_string()))?;
      serde_json::to_writer_pretty(file, &default_config).map_err(|err| config_err(err.to_string()))?;
      log::debug!("wrote default config to: {}", config_file_path.display());
      return Ok(default_config);
    }

    let file = std::fs::File::open(config_file_path).map_err(|err| config_err(err.to_string()))?;
    let config: Self = serde_json::from_reader(file).map_err(|err| config_err(err.to_string()))?;
    if config.refresh_interval_secs == 0 {
      return Err(config_err("refresh_interval_secs must be positive".to_owned()));
    }
    return Ok(config);
  }

  pub fn refresh_interval(&self) -> std::time::Duration {
    std::time::Duration::from_secs(self.refresh_interval_secs)
  }
}
