/// Mock implementations for testing
mod mock_notifier;
mod mock_policy_repository;
mod mock_progress_reporter;
mod mock_violation_writer;

pub use mock_notifier::MockNotifier;
pub use mock_policy_repository::MockPolicyRepository;
pub use mock_progress_reporter::MockProgressReporter;
pub use mock_violation_writer::MockViolationWriter;
