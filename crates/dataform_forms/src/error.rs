#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// A required field of the declarative structure is missing or malformed.
    #[error("invalid structure: {0}")]
    InvalidStructure(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FormError {
    pub fn missing_name(kind: &str) -> Self {
        FormError::InvalidStructure(format!("{} name is null", kind))
    }
}

pub type FormResult<T> = Result<T, FormError>;
