use crate::ports::outbound::notifier::SCANNER_DONE;
use crate::ports::outbound::{NotificationMessage, Notifier, ScanNotificationPayload};
use crate::shared::error::ScanError;
use crate::shared::Result;
use serde::Serialize;
use std::time::Duration;

/// SendGrid v3 mail endpoint
const SENDGRID_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, Serialize)]
struct MailRequest {
    personalizations: Vec<Personalization>,
    from: Address,
    subject: String,
    content: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Personalization {
    to: Vec<Address>,
}

#[derive(Debug, Serialize)]
struct Address {
    email: String,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(rename = "type")]
    content_type: String,
    value: String,
}

/// SendGridNotifier adapter mailing the scan summary through SendGrid
///
/// Only `scanner_done` messages are mailed; other statuses are ignored.
/// Transient failures are retried a few times before giving up.
pub struct SendGridNotifier {
    client: reqwest::blocking::Client,
    api_key: String,
    endpoint: String,
    max_retries: u32,
}

impl SendGridNotifier {
    /// Creates a notifier sending with `api_key`
    ///
    /// # Errors
    /// Returns an error if the key is empty or the HTTP client cannot be built
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ScanError::Validation {
                message: "SendGrid API key cannot be empty".to_string(),
            }
            .into());
        }

        let user_agent = format!("iam-scan/{}", env!("CARGO_PKG_VERSION"));
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            api_key,
            endpoint: SENDGRID_ENDPOINT.to_string(),
            max_retries: 3,
        })
    }

    /// Sends to `endpoint` instead of the public SendGrid API
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    fn subject(payload: &ScanNotificationPayload) -> String {
        format!(
            "{} Complete - {} violation(s) found",
            payload.email_description,
            payload.all_violations.len()
        )
    }

    fn body(payload: &ScanNotificationPayload) -> String {
        let mut lines = vec![
            format!(
                "{} finished at {}.",
                payload.email_description,
                payload.now_utc.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            String::new(),
            "Resources scanned:".to_string(),
        ];
        for (kind, count) in payload.resource_counts.iter() {
            lines.push(format!("  {}: {}", kind, count));
        }
        lines.push(String::new());
        lines.push(format!(
            "Violations found: {}",
            payload.all_violations.len()
        ));
        if !payload.violation_errors.is_empty() {
            lines.push(format!(
                "Violations not saved: {}",
                payload.violation_errors.len()
            ));
        }
        lines.push(format!("Output file: {}", payload.output_filename));
        lines.join("\n")
    }

    fn build_request(payload: &ScanNotificationPayload) -> MailRequest {
        MailRequest {
            personalizations: vec![Personalization {
                to: vec![Address {
                    email: payload.email_recipient.clone(),
                }],
            }],
            from: Address {
                email: payload.email_sender.clone(),
            },
            subject: Self::subject(payload),
            content: vec![Content {
                content_type: "text/plain".to_string(),
                value: Self::body(payload),
            }],
        }
    }

    fn send(&self, request: &MailRequest) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()?;

        if !response.status().is_success() {
            anyhow::bail!("SendGrid API returned status code {}", response.status());
        }
        Ok(())
    }

    fn send_with_retry(&self, request: &MailRequest) -> Result<()> {
        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            match self.send(request) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    last_error = Some(e);
                    if attempt < self.max_retries {
                        std::thread::sleep(Duration::from_millis(200 * attempt as u64));
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("No delivery attempt was made")))
    }
}

impl Notifier for SendGridNotifier {
    fn process(&self, message: &NotificationMessage) -> Result<()> {
        if message.status != SCANNER_DONE {
            return Ok(());
        }

        let request = Self::build_request(&message.payload);
        self.send_with_retry(&request).map_err(|e| {
            ScanError::NotificationError {
                details: e.to_string(),
            }
            .into()
        })
    }
}
