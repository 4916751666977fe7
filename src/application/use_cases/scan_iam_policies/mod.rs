use crate::application::dto::{ScanRequest, ScanResponse};
use crate::ports::outbound::{
    CsvFile, CsvWriter, NotificationMessage, Notifier, PolicyRepository, ProgressReporter,
    RulesEngine, ScanContext, ScanNotificationPayload, ViolationWriteError, ViolationWriter,
};
use crate::scanning::domain::{FlatViolation, PolicyTuple, ResourceCounts, Violation};
use crate::scanning::services::{
    AncestorResolver, ClassifiedPolicies, PolicyClassifier, ViolationAggregator,
    ViolationFlattener,
};
use crate::shared::error::ScanError;
use crate::shared::Result;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Resource name of the exported violations, used for the CSV temp file
const VIOLATIONS_RESOURCE_NAME: &str = "violations";

/// Prefix and suffix of the CSV copied into the output directory
const SCANNER_OUTPUT_CSV_PREFIX: &str = "scanner_output_iam";

/// Description used in the summary notification
const EMAIL_DESCRIPTION: &str = "Policy Scan";

/// Timestamp layout of snapshot timestamps and output file names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// ScanIamPoliciesUseCase - Core use case for scanning IAM policies
///
/// Retrieves the IAM policies of one data model, resolves the bindings
/// buckets inherit from their ancestors, evaluates every policy against the
/// rule book and hands the flattened violations to the configured sinks.
///
/// # Type Parameters
/// * `PREPO` - PolicyRepository implementation
/// * `RE` - RulesEngine implementation
/// * `CW` - CsvWriter implementation
/// * `PR` - ProgressReporter implementation
/// * `VW` - ViolationWriter implementation (optional)
/// * `N` - Notifier implementation (optional)
pub struct ScanIamPoliciesUseCase<PREPO, RE, CW, PR, VW, N> {
    policy_repository: PREPO,
    rules_engine: RE,
    csv_writer: CW,
    progress_reporter: PR,
    violation_writer: Option<VW>,
    notifier: Option<N>,
}

impl<PREPO, RE, CW, PR, VW, N> ScanIamPoliciesUseCase<PREPO, RE, CW, PR, VW, N>
where
    PREPO: PolicyRepository,
    RE: RulesEngine,
    CW: CsvWriter,
    PR: ProgressReporter,
    VW: ViolationWriter,
    N: Notifier,
{
    /// Creates a new ScanIamPoliciesUseCase with injected dependencies
    ///
    /// The rules engine must already hold its rule book.
    pub fn new(
        policy_repository: PREPO,
        rules_engine: RE,
        csv_writer: CW,
        progress_reporter: PR,
        violation_writer: Option<VW>,
        notifier: Option<N>,
    ) -> Self {
        Self {
            policy_repository,
            rules_engine,
            csv_writer,
            progress_reporter,
            violation_writer,
            notifier,
        }
    }

    /// Runs the scan
    ///
    /// # Errors
    /// - [`ScanError::NoPoliciesFound`] when the data model holds no IAM
    ///   policy on a supported resource
    /// - Any retrieval, rules engine, CSV or notification failure
    ///
    /// Violation store row failures are not errors; they are returned in
    /// [`ScanResponse::violation_errors`].
    pub fn execute(&self, request: ScanRequest) -> Result<ScanResponse> {
        // Step 1: Retrieve and classify policies
        let classified = self.retrieve(&request)?;

        // Step 2: Fold inherited storage bindings into buckets
        let resolved = self.resolve_ancestor_bindings(&classified.tuples);

        // Step 3: Evaluate every policy against the rule book
        let violations = self.find_violations(&resolved)?;

        // Step 4: Flatten and emit
        self.output_results(&request, &violations, classified)
    }

    /// Loads the model's policies and turns them into typed tuples
    fn retrieve(&self, request: &ScanRequest) -> Result<ClassifiedPolicies> {
        self.progress_reporter.report(&format!(
            "📖 Loading IAM policies from data model: {}",
            request.model_name
        ));

        let records = self
            .policy_repository
            .fetch_iam_policies(&request.model_name)?;
        let classified = PolicyClassifier::classify(records)?;

        if classified.skipped_records > 0 {
            self.progress_reporter.report(&format!(
                "   - Skipped {} policy(ies) on unsupported resource types",
                classified.skipped_records
            ));
        }
        if classified.dropped_bindings > 0 {
            self.progress_reporter.report_error(&format!(
                "⚠️  Warning: Dropped {} binding(s) that could not be parsed",
                classified.dropped_bindings
            ));
        }

        if classified.tuples.is_empty() {
            self.progress_reporter
                .report_error("⚠️  Warning: No policies found. Exiting.");
            return Err(ScanError::NoPoliciesFound {
                model_name: request.model_name.clone(),
            }
            .into());
        }

        self.progress_reporter.report(&format!(
            "✅ Detected {} IAM policy(ies)",
            classified.resource_counts.total()
        ));
        for (kind, count) in classified.resource_counts.iter() {
            self.progress_reporter
                .report(&format!("   - {}: {}", kind, count));
        }

        Ok(classified)
    }

    fn resolve_ancestor_bindings(&self, tuples: &[PolicyTuple]) -> Vec<PolicyTuple> {
        self.progress_reporter
            .report("🌳 Resolving bindings inherited from ancestors...");

        let resolved = AncestorResolver::resolve(tuples);

        self.progress_reporter.report(&format!(
            "   - Inherited bindings added to {} bucket(s)",
            AncestorResolver::count_changed(tuples, &resolved)
        ));
        resolved
    }

    fn find_violations(&self, tuples: &[PolicyTuple]) -> Result<Vec<Violation>> {
        self.progress_reporter.report(&format!(
            "🔍 Finding IAM policy violations ({} rule(s))...",
            self.rules_engine.rule_count()
        ));

        let total = tuples.len();
        let mut evaluated = 0;
        let violations = ViolationAggregator::find_violations(tuples, |tuple| {
            evaluated += 1;
            self.progress_reporter.report_progress(
                evaluated,
                total,
                Some(tuple.resource().full_name()),
            );
            self.rules_engine.find_policy_violations(
                tuple.resource(),
                tuple.record(),
                tuple.bindings(),
            )
        })?;

        self.progress_reporter.report_completion(&format!(
            "✅ Policy evaluation complete: {} violation(s) found",
            violations.len()
        ));
        Ok(violations)
    }

    fn output_results(
        &self,
        request: &ScanRequest,
        violations: &[Violation],
        classified: ClassifiedPolicies,
    ) -> Result<ScanResponse> {
        let memberless_violations = ViolationFlattener::count_memberless(violations);
        if memberless_violations > 0 {
            self.progress_reporter.report_error(&format!(
                "⚠️  Warning: {} violation(s) name no member and are left out of the output",
                memberless_violations
            ));
        }
        let rows: Vec<FlatViolation> = ViolationFlattener::flatten(violations).collect();

        let context = ScanContext {
            scan_id: Uuid::new_v4(),
            snapshot_timestamp: request.snapshot_timestamp.clone(),
        };
        let violation_errors = self.write_to_store(&context, &rows)?;

        let mut csv_output = None;
        let mut notification_sent = false;
        if let Some(output_path) = &request.output_path {
            let now_utc = Utc::now();
            // The temp CSV lives until `csv_file` drops, after notification
            let (csv_file, published) = self.write_csv_output(output_path, &rows, now_utc)?;
            notification_sent = self.notify(
                request,
                &rows,
                &classified.resource_counts,
                &violation_errors,
                csv_file.path().display().to_string(),
                &published,
                now_utc,
            )?;
            csv_output = Some(published);
        }

        Ok(ScanResponse {
            scan_id: context.scan_id,
            resource_counts: classified.resource_counts,
            violations: rows,
            violation_errors,
            csv_output,
            notification_sent,
            dropped_bindings: classified.dropped_bindings,
            memberless_violations,
        })
    }

    /// Persists rows to the violation store, if one is configured
    fn write_to_store(
        &self,
        context: &ScanContext,
        rows: &[FlatViolation],
    ) -> Result<Vec<ViolationWriteError>> {
        let Some(writer) = &self.violation_writer else {
            return Ok(Vec::new());
        };

        self.progress_reporter.report("💾 Saving violations...");
        let errors = writer.write_violations(context, rows)?;

        for error in &errors {
            self.progress_reporter.report_error(&format!(
                "⚠️  Warning: Violation row {} ({} / {} / {}) was not saved: {}",
                error.row, error.resource_id, error.rule_name, error.member, error.reason
            ));
        }
        self.progress_reporter.report(&format!(
            "   - Saved {} of {} violation row(s)",
            rows.len().saturating_sub(errors.len()),
            rows.len()
        ));
        Ok(errors)
    }

    /// Writes the CSV and copies it into the output directory
    ///
    /// # Returns
    /// The written CSV, still on disk while the handle lives, and the path of
    /// its published copy
    fn write_csv_output(
        &self,
        output_path: &Path,
        rows: &[FlatViolation],
        now_utc: DateTime<Utc>,
    ) -> Result<(CsvFile, PathBuf)> {
        self.progress_reporter.report("📝 Writing violations to csv...");

        let csv_file = self
            .csv_writer
            .write_csv(VIOLATIONS_RESOURCE_NAME, rows, true)?;
        self.progress_reporter
            .report(&format!("   - CSV filename: {}", csv_file.name()));

        let published = self.csv_writer.publish_csv(
            &csv_file,
            output_path,
            &Self::output_filename(now_utc),
        )?;
        self.progress_reporter
            .report_completion(&format!("✅ Output complete: {}", published.display()));

        Ok((csv_file, published))
    }

    /// Sends the summary notification when mail settings and a notifier are present
    #[allow(clippy::too_many_arguments)]
    fn notify(
        &self,
        request: &ScanRequest,
        rows: &[FlatViolation],
        resource_counts: &ResourceCounts,
        violation_errors: &[ViolationWriteError],
        output_csv_name: String,
        published: &Path,
        now_utc: DateTime<Utc>,
    ) -> Result<bool> {
        let (Some(email), Some(notifier)) = (&request.email, &self.notifier) else {
            return Ok(false);
        };

        let output_filename = published
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| Self::output_filename(now_utc));

        let message = NotificationMessage::scanner_done(ScanNotificationPayload {
            email_description: EMAIL_DESCRIPTION.to_string(),
            email_sender: email.sender.clone(),
            email_recipient: email.recipient.clone(),
            output_csv_name,
            output_filename,
            now_utc,
            all_violations: rows.to_vec(),
            resource_counts: resource_counts.clone(),
            violation_errors: violation_errors.to_vec(),
        });

        self.progress_reporter
            .report(&format!("📧 Sending scan summary to {}", email.recipient));
        notifier.process(&message)?;
        Ok(true)
    }

    /// File name of the CSV copy in the output directory
    pub fn output_filename(now_utc: DateTime<Utc>) -> String {
        format!(
            "{}.{}.csv",
            SCANNER_OUTPUT_CSV_PREFIX,
            now_utc.format(TIMESTAMP_FORMAT)
        )
    }
}
