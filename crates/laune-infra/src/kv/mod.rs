//! Key-value backends - files on disk and an in-memory fallback.

mod file;
mod memory;

pub use file::FileKeyValueStore;
pub use memory::InMemoryKeyValueStore;
