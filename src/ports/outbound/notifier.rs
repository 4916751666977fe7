use crate::ports::outbound::ViolationWriteError;
use crate::scanning::domain::{FlatViolation, ResourceCounts};
use crate::shared::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Status sent once a scan has finished and its output is written
pub const SCANNER_DONE: &str = "scanner_done";

/// Summary of a finished scan, delivered to whoever is notified
#[derive(Debug, Clone, Serialize)]
pub struct ScanNotificationPayload {
    pub email_description: String,
    pub email_sender: String,
    pub email_recipient: String,
    pub output_csv_name: String,
    pub output_filename: String,
    pub now_utc: DateTime<Utc>,
    pub all_violations: Vec<FlatViolation>,
    pub resource_counts: ResourceCounts,
    pub violation_errors: Vec<ViolationWriteError>,
}

/// Structured notification message: a status plus its payload
#[derive(Debug, Clone, Serialize)]
pub struct NotificationMessage {
    pub status: String,
    pub payload: ScanNotificationPayload,
}

impl NotificationMessage {
    pub fn scanner_done(payload: ScanNotificationPayload) -> Self {
        Self {
            status: SCANNER_DONE.to_string(),
            payload,
        }
    }
}

/// Notifier port for dispatching scan results (email, webhook, ...)
pub trait Notifier {
    /// Delivers `message`
    ///
    /// # Errors
    /// Returns an error if delivery fails; the scan treats this as fatal
    fn process(&self, message: &NotificationMessage) -> Result<()>;
}
