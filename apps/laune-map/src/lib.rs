//! # Laune Map
//!
//! Headless client for the mood map: keeps the visible posts of the last
//! 24 hours in step with the shared document and mirrors them as markers.

pub mod background;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod map;
pub mod state;
pub mod telemetry;
