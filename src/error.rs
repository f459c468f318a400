use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrmError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No job with count {0}")]
    JobNotFound(String),

    #[error("Unknown technician: {0}")]
    UnknownTechnician(String),

    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    #[error("Stage already exists: {0}")]
    StageExists(String),

    #[error("Stage still has jobs: {0}")]
    StageInUse(String),

    #[error("Unknown form field: {0}")]
    UnknownField(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("System role cannot be removed: {0}")]
    SystemRole(String),

    #[error("Unknown permission key: {0}")]
    UnknownPermission(String),

    #[error("Unknown supply: {0}")]
    UnknownSupply(String),

    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CrmError>;
