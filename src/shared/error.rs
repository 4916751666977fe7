use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes allow schedulers and CI systems to tell an empty inventory
/// apart from argument mistakes and genuine failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Scan completed (violations, if any, were reported through the sinks)
    Success = 0,
    /// The data model contained no IAM policies to scan
    NoPoliciesFound = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (rule book, inventory, file I/O, notification, etc.)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::NoPoliciesFound => write!(f, "No Policies Found (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Application-specific errors for IAM policy scanning.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("No policies found in data model '{model_name}'. Exiting.")]
    NoPoliciesFound { model_name: String },

    #[error("Inventory snapshot not found: {path}\n\n💡 Hint: {suggestion}")]
    InventoryNotFound { path: PathBuf, suggestion: String },

    #[error("Failed to parse inventory snapshot: {path}\nDetails: {details}\n\n💡 Hint: The snapshot must be a JSON array of inventory records")]
    InventoryParseError { path: PathBuf, details: String },

    #[error("Failed to parse IAM policy data for {full_name}\nDetails: {details}")]
    PolicyDataParse { full_name: String, details: String },

    #[error("Invalid rule book: {path}\nDetails: {details}\n\n💡 Hint: Please verify the rules file against the documented YAML layout")]
    RuleBookError { path: PathBuf, details: String },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },

    #[error("Failed to read file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file exists and you have read permissions")]
    FileReadError { path: PathBuf, details: String },

    #[error("Invalid output path: {path}\nReason: {reason}\n\n💡 Hint: Please specify a local directory for scanner output")]
    InvalidOutputPath { path: PathBuf, reason: String },

    #[error("Failed to send notification: {details}")]
    NotificationError { details: String },

    /// Validation error for builder patterns and configuration
    #[error("Validation error: {message}")]
    Validation { message: String },
}
