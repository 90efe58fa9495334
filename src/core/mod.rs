//! Core module - configuration, regulation lookup and work file storage

pub mod config;
pub mod lookup;
pub mod workfile;

pub use config::{Config, ConfigError};
pub use lookup::{LoadError, LookupTable, RegulationRow};
pub use workfile::WorkfileError;
