//! Loaders for the engine settings file and the component manifest

pub mod manifest;
pub mod settings;

pub use manifest::{load_manifest, parse_manifest};
pub use settings::{apply_overrides, load_config, parse_config, CONFIG_FILE};
