//! CLI command implementations

pub mod assess;
pub mod completions;
pub mod export;
pub mod hazard;
pub mod improvements;
pub mod info;
pub mod init;
pub mod process;
pub mod rollup;
