use thiserror::Error;

/// Errors the analysis engine can surface to a caller.
///
/// Analysis is all-or-nothing: any of these means no report was produced.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The payload was absent, not an object, or an empty object.
    #[error("No data provided for analysis")]
    EmptyInput,

    /// The payload was an object but a field had the wrong shape.
    #[error("Invalid project data: {0}")]
    InvalidInput(String),

    /// A derived figure came out NaN or infinite.
    #[error("Analysis produced a non-finite value for '{field}'")]
    NonFinite { field: String },
}

impl AnalysisError {
    /// HTTP status the boundary should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            AnalysisError::EmptyInput | AnalysisError::InvalidInput(_) => 400,
            AnalysisError::NonFinite { .. } => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::InvalidInput(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AnalysisError::EmptyInput.status_code(), 400);
        assert_eq!(AnalysisError::InvalidInput("x".into()).status_code(), 400);
        let err = AnalysisError::NonFinite { field: "budget".into() };
        assert_eq!(err.status_code(), 500);
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_empty_input_message() {
        assert_eq!(
            AnalysisError::EmptyInput.to_string(),
            "No data provided for analysis"
        );
    }
}
