use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Column '{column}' not found in {source_name}")]
    MissingColumn { source_name: String, column: String },

    #[error("Record {id} not found in store")]
    RecordNotFound { id: u64 },

    #[error("Store error: {message}")]
    StoreError { message: String },

    #[error("Invalid change at position {index}: {reason}")]
    InvalidChange { index: usize, reason: String },

    #[error("Review batch was already applied at {applied_at}")]
    BatchAlreadyApplied { applied_at: String },

    #[error("Review batch was detected against store {expected}, not {actual}")]
    BatchStoreMismatch { expected: String, actual: String },

    #[error("Change index {index} out of range (batch has {len} changes)")]
    ChangeIndexOutOfRange { index: usize, len: usize },

    #[error("Apply aborted at change {index} after {applied} applied: {source}")]
    ApplyAborted {
        applied: usize,
        index: usize,
        #[source]
        source: Box<SyncError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Review,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl SyncError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::ConfigValidationError { .. }
            | SyncError::InvalidConfigValueError { .. }
            | SyncError::MissingConfigError { .. } => ErrorCategory::Configuration,
            SyncError::CsvError(_) | SyncError::MissingColumn { .. } => ErrorCategory::Input,
            SyncError::SerializationError(_)
            | SyncError::InvalidChange { .. }
            | SyncError::BatchAlreadyApplied { .. }
            | SyncError::BatchStoreMismatch { .. }
            | SyncError::ChangeIndexOutOfRange { .. } => ErrorCategory::Review,
            SyncError::IoError(_)
            | SyncError::RecordNotFound { .. }
            | SyncError::StoreError { .. }
            | SyncError::ApplyAborted { .. } => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SyncError::ChangeIndexOutOfRange { .. }
            | SyncError::BatchAlreadyApplied { .. }
            | SyncError::BatchStoreMismatch { .. } => ErrorSeverity::Medium,
            SyncError::ApplyAborted { .. } | SyncError::StoreError { .. } => {
                ErrorSeverity::Critical
            }
            _ => ErrorSeverity::High,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SyncError::ApplyAborted { applied, source, .. } => format!(
                "Applying changes failed after {} change(s) were written: {}",
                applied, source
            ),
            SyncError::MissingColumn { source_name, column } => format!(
                "The file {} has no column named '{}'",
                source_name, column
            ),
            SyncError::InvalidChange { index, .. } => {
                format!("The review file is damaged near change #{}", index)
            }
            SyncError::BatchAlreadyApplied { applied_at } => {
                format!("This review file was already applied at {}", applied_at)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "Check the configuration file and command-line flags",
            ErrorCategory::Input => "Check the roster headers against [roster.columns]",
            ErrorCategory::Review => "Re-run `detect` to produce a fresh review file",
            ErrorCategory::Storage => {
                "Nothing was committed; fix the store and re-run `detect` before applying again"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_aborted_is_critical_storage_error() {
        let err = SyncError::ApplyAborted {
            applied: 2,
            index: 3,
            source: Box::new(SyncError::RecordNotFound { id: 9 }),
        };
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().contains("after 2 change(s)"));
        assert!(err.to_string().contains("Record 9 not found"));
    }

    #[test]
    fn test_config_errors_have_high_severity() {
        let err = SyncError::MissingConfigError {
            field: "store.path".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_spent_batch_is_review_error() {
        let err = SyncError::BatchAlreadyApplied {
            applied_at: "2026-01-01T00:00:00+00:00".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Review);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.user_friendly_message().contains("already applied"));
    }
}
