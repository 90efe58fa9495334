//! Register data model
//!
//! The hazard classification, rating scales, risk entries, processes and the
//! assessment register that owns them.

pub mod category;
pub mod entry;
pub mod process;
pub mod rating;
pub mod register;

pub use category::{HazardCategorySet, MajorCategory};
pub use entry::{EntryPatch, RiskEntry};
pub use process::{ItemList, Process};
pub use rating::{
    risk_score, Likelihood, PostImprovementRisk, RiskBand, Severity, ValidationError,
    HIGH_RISK_THRESHOLD,
};
pub use register::{AssessmentRegister, CompanyInfo, Regenerated, RegisterError, WorkplaceInfo};
