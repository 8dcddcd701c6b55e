// src/config/mod.rs

//! Optional `Taskdag.toml` configuration.
//!
//! - `model.rs`: serde data model with defaults.
//! - `loader.rs`: locating and reading the file.
//! - `validate.rs`: range checks (`TryFrom<RawConfig> for Config`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_config, load_from_path};
pub use model::{CheckpointSection, Config, DocumentSection, RawConfig, ReplanSection};
