/// Use cases - Application business logic
mod scan_iam_policies;

pub use scan_iam_policies::{ScanIamPoliciesUseCase, TIMESTAMP_FORMAT};
