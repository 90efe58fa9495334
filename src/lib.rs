//! riskreg: occupational risk assessment register
//!
//! Builds a per-process risk assessment (위험성평가) from a regulation
//! lookup table, scores each hazard by likelihood and severity, and exports
//! the result as a multi-sheet spreadsheet.

pub mod cli;
pub mod core;
pub mod entities;
pub mod report;
