//! # Laune Core
//!
//! The domain layer of the Laune mood map.
//! Posts, the 24 hour expiry policy, and the ports that storage and
//! network adapters implement. No I/O happens in this crate.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::{DomainError, ErrorKind, StoreError, Synced};
