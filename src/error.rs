use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OceanError {
    #[error("file system error: {0}")]
    Io(#[from] std::io::Error),

    #[error("run description error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("\"{0}\" key not found in run description")]
    KeyNotFound(String),

    #[error("\"{0}\" key in run description is not a string")]
    NotAString(String),

    #[error("{path} not found - did you forget to build it?", path = .0.display())]
    ToolNotFound(PathBuf),

    #[error("rebuild tool failed for {0}")]
    RebuildFailed(String),
}

pub type Result<T> = std::result::Result<T, OceanError>;
