extern crate chrono;
extern crate colored;
extern crate serde;
extern crate serde_json;
extern crate uuid;

pub mod action;
pub mod clock;
pub mod config;
pub mod duration_fmt;
pub mod error;
pub mod progress;
pub mod storage;
pub mod store;
pub mod summary;
pub mod task;
pub mod ticker;
pub mod time;
pub mod traits;
pub mod viewer;

pub use config::Config;
pub use error::{Error, Result};
pub use store::{Outcome, TaskStore};
