//! iam-scan - IAM policy scanner for inventory snapshots
//!
//! This library resolves the IAM bindings every resource effectively holds
//! (buckets inherit storage roles from their project, folders and
//! organization), evaluates them against a YAML rule book and flattens the
//! resulting violations into one row per member, following hexagonal
//! architecture and Domain-Driven Design principles.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`scanning`): Pure business logic and domain models
//! - **Application Layer** (`application`): Use cases and DTOs
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): Concrete implementations of ports
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use iam_scan::prelude::*;
//! use std::path::{Path, PathBuf};
//!
//! # fn main() -> Result<()> {
//! // Create adapters
//! let policy_repository = InventoryReader::new(PathBuf::from("inventory"));
//! let rules_engine = YamlRulesEngine::from_path(Path::new("rules.yaml"))?;
//! let csv_writer = TempCsvWriter::new();
//! let progress_reporter = StderrProgressReporter::new();
//!
//! // Create use case without violation store or notifier
//! let use_case = ScanIamPoliciesUseCase::new(
//!     policy_repository,
//!     rules_engine,
//!     csv_writer,
//!     progress_reporter,
//!     None::<JsonLinesViolationStore>,
//!     None::<SendGridNotifier>,
//! );
//!
//! // Execute
//! let request = ScanRequest::new("model_20240101".to_string(), "20240101T000000Z".to_string())
//!     .with_output_path(PathBuf::from("out"));
//! let response = use_case.execute(request)?;
//!
//! for row in &response.violations {
//!     println!("{} {} {}", row.full_name, row.violation_data.role, row.violation_data.member);
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod ports;
pub mod scanning;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::{
        InventoryReader, JsonLinesViolationStore, TempCsvWriter,
    };
    pub use crate::adapters::outbound::network::SendGridNotifier;
    pub use crate::adapters::outbound::rules::{RuleBook, RuleMode, YamlRulesEngine};
    pub use crate::application::dto::{EmailSettings, ScanRequest, ScanResponse};
    pub use crate::application::use_cases::ScanIamPoliciesUseCase;
    pub use crate::ports::outbound::{
        CsvFile, CsvWriter, NotificationMessage, Notifier, PolicyRepository, ProgressReporter,
        RulesEngine, ScanContext, ViolationWriteError, ViolationWriter,
    };
    pub use crate::scanning::domain::{
        Binding, FlatViolation, Member, PolicyRecord, Resource, ResourceCounts, ResourceKind,
        Violation, ViolationType,
    };
    pub use crate::scanning::services::{
        AncestorResolver, PolicyClassifier, ViolationAggregator, ViolationFlattener,
    };
    pub use crate::shared::Result;
}
