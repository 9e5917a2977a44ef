//! GitHub Gist transport for the shared document.

mod config;

pub use config::GistConfig;

#[cfg(feature = "gist")]
mod client;
#[cfg(feature = "gist")]
pub use client::GistDocumentStore;
