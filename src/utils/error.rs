use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReqrunError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to launch '{program}': {source}")]
    SpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Installer failed for '{target}' (exit code {code:?})")]
    InstallError { target: String, code: Option<i32> },

    #[error("Distribution lookup failed: {message}")]
    LookupError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Installer,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReqrunError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReqrunError::FileNotFound { .. } => ErrorCategory::Input,
            ReqrunError::ConfigError { .. }
            | ReqrunError::InvalidConfigValueError { .. }
            | ReqrunError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            ReqrunError::InstallError { .. } | ReqrunError::LookupError { .. } => {
                ErrorCategory::Installer
            }
            ReqrunError::IoError(_)
            | ReqrunError::SerializationError(_)
            | ReqrunError::SpawnError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 單一套件安裝失敗不影響整體流程
            ReqrunError::InstallError { .. } | ReqrunError::LookupError { .. } => {
                ErrorSeverity::Low
            }
            ReqrunError::FileNotFound { .. }
            | ReqrunError::ConfigError { .. }
            | ReqrunError::InvalidConfigValueError { .. }
            | ReqrunError::ConfigValidationError { .. } => ErrorSeverity::High,
            ReqrunError::SerializationError(_) => ErrorSeverity::Medium,
            ReqrunError::IoError(_) | ReqrunError::SpawnError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ReqrunError::FileNotFound { .. } => "File not found. Try again.".to_string(),
            ReqrunError::SpawnError { program, .. } => {
                format!("Could not start '{}'", program)
            }
            ReqrunError::InstallError { target, .. } => {
                format!("Could not install '{}'", target)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Check the path of the file you want to run",
            ErrorCategory::Configuration => "Fix the configuration file or command-line options",
            ErrorCategory::Installer => "Run pip manually for this package to see the full output",
            ErrorCategory::System => "Make sure the Python interpreter passed with --python exists",
        }
    }
}

pub type Result<T> = std::result::Result<T, ReqrunError>;
