//! # Laune Shared
//!
//! Wire formats every client must agree on: the shared post document and
//! the GitHub Gist payloads that carry it.

pub mod document;
pub mod dto;

pub use document::{DocumentError, SharedDocument};
