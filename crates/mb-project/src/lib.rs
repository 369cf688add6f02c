//! mb-project: project file format, validation and construction.
//!
//! Contains:
//! - schema (serde definitions for the on-disk format)
//! - validate (structural validation)
//! - build (runtime objects out of validated definitions)

pub mod build;
pub mod schema;
pub mod validate;

use std::path::Path;

pub use build::Project;
pub use schema::*;
pub use validate::{ValidationError, validate_project};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unrecognized project file extension: {}", .path.display())]
    UnknownFormat { path: std::path::PathBuf },

    #[error("No {kind} named '{name}' in the project")]
    UnknownId { kind: &'static str, name: String },

    #[error("Process error: {0}")]
    Process(#[from] mb_process::ProcessError),

    #[error("Chain error: {0}")]
    Chain(#[from] mb_chain::ChainError),

    #[error("Factory error: {0}")]
    Factory(#[from] mb_factory::FactoryError),
}

pub fn from_yaml_str(text: &str) -> ProjectResult<Project> {
    let def: ProjectDef = serde_yaml::from_str(text)?;
    Project::new(def)
}

pub fn from_json_str(text: &str) -> ProjectResult<Project> {
    let def: ProjectDef = serde_json::from_str(text)?;
    Project::new(def)
}

pub fn load_yaml(path: &Path) -> ProjectResult<Project> {
    from_yaml_str(&std::fs::read_to_string(path)?)
}

pub fn load_json(path: &Path) -> ProjectResult<Project> {
    from_json_str(&std::fs::read_to_string(path)?)
}

/// Load a project, picking the format from the file extension.
pub fn load(path: &Path) -> ProjectResult<Project> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("yaml" | "yml") => load_yaml(path),
        Some("json") => load_json(path),
        _ => Err(ProjectError::UnknownFormat {
            path: path.to_path_buf(),
        }),
    }
}

pub fn save_yaml(path: &Path, project: &Project) -> ProjectResult<()> {
    std::fs::write(path, serde_yaml::to_string(project.def())?)?;
    Ok(())
}

pub fn save_json(path: &Path, project: &Project) -> ProjectResult<()> {
    std::fs::write(path, serde_json::to_string_pretty(project.def())?)?;
    Ok(())
}
