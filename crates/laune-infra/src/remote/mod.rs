//! Remote shared store - the adapter and an in-memory document for tests and demos.

mod adapter;
mod memory;

#[cfg(test)]
mod tests;

pub use adapter::{RemoteStoreAdapter, SyncMode};
pub use memory::InMemoryDocumentStore;
