use crate::model::RecordId;
use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CabinetError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Record #{0} doesn't exist")]
    RecordNotFound(RecordId),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Corrupted slot at offset {offset}: {reason}")]
    CorruptedSlot { offset: u64, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Api Error: {0}")]
    Api(String),
}

impl CabinetError {
    /// True for failures that leave the store untouched and only concern one input.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CabinetError::Validation(_) | CabinetError::RecordNotFound(_) | CabinetError::Format(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CabinetError>;
