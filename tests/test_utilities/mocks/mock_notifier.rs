use iam_scan::prelude::*;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Mock Notifier that records every message it is asked to deliver
///
/// Also records whether the CSV named in each payload existed at the moment
/// the message was processed.
#[derive(Default, Clone)]
pub struct MockNotifier {
    pub messages: Arc<Mutex<Vec<NotificationMessage>>>,
    pub csv_present: Arc<Mutex<Vec<bool>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<NotificationMessage> {
        self.messages.lock().unwrap().clone()
    }

    pub fn csv_present(&self) -> Vec<bool> {
        self.csv_present.lock().unwrap().clone()
    }
}

impl Notifier for MockNotifier {
    fn process(&self, message: &NotificationMessage) -> Result<()> {
        let present = Path::new(&message.payload.output_csv_name).is_file();
        self.csv_present.lock().unwrap().push(present);
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }
}
