//! Storage Layer
//!
//! Persistent configuration and course catalog files.

pub mod catalog;
pub mod config;

pub use catalog::load_catalog;
pub use config::ConfigService;
