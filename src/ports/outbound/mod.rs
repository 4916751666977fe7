/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to interact with external systems (data model, rule book, file system,
/// mail delivery, console).
pub mod csv_writer;
pub mod notifier;
pub mod policy_repository;
pub mod progress_reporter;
pub mod rules_engine;
pub mod violation_writer;

pub use csv_writer::{CsvFile, CsvWriter};
pub use notifier::{NotificationMessage, Notifier, ScanNotificationPayload};
pub use policy_repository::PolicyRepository;
pub use progress_reporter::ProgressReporter;
pub use rules_engine::RulesEngine;
pub use violation_writer::{ScanContext, ViolationWriteError, ViolationWriter};
