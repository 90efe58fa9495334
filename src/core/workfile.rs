//! YAML work file holding a register between invocations

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::entities::AssessmentRegister;

#[derive(Debug, Error)]
pub enum WorkfileError {
    #[error("work file not found: {0} (run `riskreg init` first)")]
    NotFound(PathBuf),

    #[error("work file already exists: {0}")]
    Exists(PathBuf),

    #[error("invalid work file {path}: {message}")]
    Syntax { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot serialize register: {0}")]
    Serialize(String),
}

/// Parse a register from YAML text; `filename` is only used in errors
pub fn parse_register(content: &str, filename: &Path) -> Result<AssessmentRegister, WorkfileError> {
    let register: AssessmentRegister =
        serde_yml::from_str(content).map_err(|e| WorkfileError::Syntax {
            path: filename.to_path_buf(),
            message: e.to_string(),
        })?;
    Ok(register.normalized())
}

/// Load and normalize the register stored at `path`
pub fn load(path: &Path) -> Result<AssessmentRegister, WorkfileError> {
    if !path.exists() {
        return Err(WorkfileError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    let register = parse_register(&content, path)?;
    debug!(
        path = %path.display(),
        processes = register.processes().len(),
        entries = register.entry_count(),
        "loaded work file"
    );
    Ok(register)
}

/// Write the register to `path`, replacing its contents
pub fn save(path: &Path, register: &AssessmentRegister) -> Result<(), WorkfileError> {
    let yaml = serde_yml::to_string(register).map_err(|e| WorkfileError::Serialize(e.to_string()))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, yaml)?;
    debug!(path = %path.display(), "saved work file");
    Ok(())
}

/// Create a new work file; refuses to overwrite unless `force`
pub fn create(path: &Path, register: &AssessmentRegister, force: bool) -> Result<(), WorkfileError> {
    if path.exists() && !force {
        return Err(WorkfileError::Exists(path.to_path_buf()));
    }
    save(path, register)?;
    info!(path = %path.display(), "created work file");
    Ok(())
}
