use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Catalog error for marker '{marker}': {message}")]
    CatalogError { marker: String, message: String },

    #[error("Invalid pattern for marker '{marker}' ({pattern}): {message}")]
    InvalidPattern {
        marker: String,
        pattern: String,
        message: String,
    },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Input error for '{path}': {message}")]
    InputError { path: String, message: String },

    #[error("Analysis task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Catalog,
    Input,
    Processing,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReportError::ConfigValidationError { .. }
            | ReportError::InvalidConfigValueError { .. }
            | ReportError::MissingConfigError { .. }
            | ReportError::TomlError(_) => ErrorCategory::Configuration,
            ReportError::CatalogError { .. } | ReportError::InvalidPattern { .. } => {
                ErrorCategory::Catalog
            }
            ReportError::InputError { .. } => ErrorCategory::Input,
            ReportError::TaskError(_) => ErrorCategory::Processing,
            ReportError::IoError(_)
            | ReportError::CsvError(_)
            | ReportError::SerializationError(_)
            | ReportError::ZipError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Catalog => ErrorSeverity::High,
            ErrorCategory::Processing | ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ReportError::TomlError(_) | ReportError::ConfigValidationError { .. } => {
                "Check the configuration file for syntax errors and required sections"
            }
            ReportError::InvalidConfigValueError { .. } | ReportError::MissingConfigError { .. } => {
                "Fix the reported configuration value and run again"
            }
            ReportError::CatalogError { .. } => {
                "Check the marker definition: keys must be unique and low must not exceed high"
            }
            ReportError::InvalidPattern { .. } => {
                "Each marker pattern must be a valid regex with exactly one capture group"
            }
            ReportError::InputError { .. } => {
                "Make sure the input file exists and contains extracted report text"
            }
            ReportError::IoError(_) => "Check file permissions and available disk space",
            ReportError::CsvError(_) | ReportError::SerializationError(_) => {
                "Report rendering failed; re-run with --verbose for details"
            }
            ReportError::ZipError(_) => "Disable bundling or check the output directory",
            ReportError::TaskError(_) => "Lower the concurrency setting and run again",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Catalog => format!("Marker catalog problem: {}", self),
            ErrorCategory::Input => format!("Could not read report text: {}", self),
            ErrorCategory::Processing => format!("Report analysis was interrupted: {}", self),
            ErrorCategory::Output => format!("Could not write report: {}", self),
        }
    }

    /// 依嚴重程度決定程式結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_errors_are_high_severity() {
        let err = ReportError::CatalogError {
            marker: "hdl".to_string(),
            message: "low is greater than high".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Catalog);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("hdl"));
    }

    #[test]
    fn test_io_error_maps_to_output() {
        let err: ReportError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert_eq!(err.category(), ErrorCategory::Output);
        assert_eq!(err.exit_code(), 3);
        assert!(err.user_friendly_message().starts_with("Could not write report"));
    }

    #[test]
    fn test_input_error_is_retryable() {
        let err = ReportError::InputError {
            path: "report.txt".to_string(),
            message: "not found".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(err.exit_code(), 2);
    }
}
