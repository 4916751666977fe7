use iam_scan::prelude::*;
use iam_scan::scanning::domain::ParentRef;

/// Mock PolicyRepository serving a fixed data model
pub struct MockPolicyRepository {
    policies: Vec<PolicyRecord>,
    should_fail: bool,
}

impl MockPolicyRepository {
    pub fn new() -> Self {
        Self {
            policies: Vec::new(),
            should_fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            policies: Vec::new(),
            should_fail: true,
        }
    }

    /// Adds a policy attached to the resource at `full_name`
    pub fn with_policy(mut self, resource_type: &str, name: &str, full_name: &str, data: &str) -> Self {
        self.policies.push(PolicyRecord::new(
            format!("policy-{}", name),
            ParentRef::new(resource_type, name, full_name),
            data,
        ));
        self
    }
}

impl PolicyRepository for MockPolicyRepository {
    fn fetch_iam_policies(&self, _model_name: &str) -> Result<Vec<PolicyRecord>> {
        if self.should_fail {
            anyhow::bail!("Mock data model unavailable");
        }
        Ok(self.policies.clone())
    }
}
