use std::path::PathBuf;

/// Mail settings for the end-of-scan summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSettings {
    pub sender: String,
    pub recipient: String,
}

/// ScanRequest - Internal request DTO for the IAM policy scan use case
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// Name of the data model (inventory snapshot) to scan
    pub model_name: String,
    /// Snapshot timestamp, formatted as YYYYMMDDTHHMMSSZ
    pub snapshot_timestamp: String,
    /// Directory receiving the violations CSV; no CSV is written when unset
    pub output_path: Option<PathBuf>,
    /// Summary mail settings; only used together with `output_path`
    pub email: Option<EmailSettings>,
}

impl ScanRequest {
    pub fn new(model_name: String, snapshot_timestamp: String) -> Self {
        Self {
            model_name,
            snapshot_timestamp,
            output_path: None,
            email: None,
        }
    }

    pub fn with_output_path(mut self, output_path: PathBuf) -> Self {
        self.output_path = Some(output_path);
        self
    }

    pub fn with_email(mut self, email: EmailSettings) -> Self {
        self.email = Some(email);
        self
    }
}
