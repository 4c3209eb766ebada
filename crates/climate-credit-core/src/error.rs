use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClimateCreditError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Malformed range '{range}' in {table}: {reason}")]
    MalformedRange {
        table: String,
        range: String,
        reason: String,
    },

    #[error("Reference data error in {table}: {reason}")]
    ReferenceData { table: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ClimateCreditError {
    pub(crate) fn reference(table: &str, reason: impl Into<String>) -> Self {
        ClimateCreditError::ReferenceData {
            table: table.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for ClimateCreditError {
    fn from(e: serde_json::Error) -> Self {
        ClimateCreditError::SerializationError(e.to_string())
    }
}
