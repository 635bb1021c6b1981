mod storage;
mod storage_json;
mod storage_memory;

pub use storage::Storage;
pub use storage_json::JsonFileStorage;
pub use storage_memory::MemoryStorage;
