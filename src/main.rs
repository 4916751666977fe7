mod cli;
mod config;

use chrono::{NaiveDateTime, Utc};
use cli::Args;
use config::{
    discover_config, load_config_from_path, looks_like_email, ConfigFile, CONFIG_FILENAME,
};
use iam_scan::adapters::outbound::console::StderrProgressReporter;
use iam_scan::adapters::outbound::filesystem::{
    InventoryReader, JsonLinesViolationStore, TempCsvWriter,
};
use iam_scan::adapters::outbound::network::SendGridNotifier;
use iam_scan::adapters::outbound::rules::YamlRulesEngine;
use iam_scan::application::dto::{EmailSettings, ScanRequest, ScanResponse};
use iam_scan::application::use_cases::{ScanIamPoliciesUseCase, TIMESTAMP_FORMAT};
use iam_scan::shared::error::{ExitCode, ScanError};
use iam_scan::shared::Result;
use std::path::{Path, PathBuf};
use std::process;

/// Everything a scan run needs, after merging CLI and config file
#[derive(Debug)]
struct ScanSettings {
    rules: PathBuf,
    inventory: PathBuf,
    model_name: String,
    snapshot_timestamp: String,
    output_path: Option<PathBuf>,
    violations_db: Option<PathBuf>,
    email: Option<EmailSettings>,
    sendgrid_api_key: Option<String>,
}

fn main() {
    let exit_code = match run() {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            let exit_code = exit_code_for(&e);

            eprintln!("\n❌ An error occurred:\n");
            eprintln!("{}", e);

            // Display error chain
            let mut source = e.source();
            while let Some(err) = source {
                eprintln!("\nCaused by: {}", err);
                source = err.source();
            }

            eprintln!();
            exit_code
        }
    };

    process::exit(exit_code.as_i32());
}

fn exit_code_for(error: &anyhow::Error) -> ExitCode {
    match error.downcast_ref::<ScanError>() {
        Some(ScanError::NoPoliciesFound { .. }) => ExitCode::NoPoliciesFound,
        Some(ScanError::Validation { .. }) => ExitCode::InvalidArguments,
        _ => ExitCode::ApplicationError,
    }
}

fn run() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Load config file (explicit path or auto-discovery)
    let config = match &args.config {
        Some(path) => {
            let config = load_config_from_path(path)?;
            eprintln!("📄 Loaded config from: {}", path.display());
            config
        }
        None => match discover_config(&std::env::current_dir()?)? {
            Some(config) => {
                eprintln!("📄 Auto-discovered config file: {}", CONFIG_FILENAME);
                config
            }
            None => ConfigFile::default(),
        },
    };

    let settings = resolve_settings(args, config)?;

    // Build the rule book before any policy is retrieved
    let rules_engine = YamlRulesEngine::from_path(&settings.rules)?;

    // Create adapters (Dependency Injection)
    let policy_repository = InventoryReader::new(settings.inventory.clone());
    let csv_writer = TempCsvWriter::new();
    let progress_reporter = StderrProgressReporter::new();
    let violation_writer = settings
        .violations_db
        .clone()
        .map(JsonLinesViolationStore::new);
    let notifier = match (&settings.email, &settings.sendgrid_api_key) {
        (Some(_), Some(api_key)) => Some(SendGridNotifier::new(api_key.as_str())?),
        _ => None,
    };

    let use_case = ScanIamPoliciesUseCase::new(
        policy_repository,
        rules_engine,
        csv_writer,
        progress_reporter,
        violation_writer,
        notifier,
    );

    let mut request = ScanRequest::new(settings.model_name, settings.snapshot_timestamp);
    if let Some(output_path) = settings.output_path {
        request = request.with_output_path(output_path);
    }
    if let Some(email) = settings.email {
        request = request.with_email(email);
    }

    let response = use_case.execute(request)?;
    print_summary(&response);

    Ok(())
}

/// Merges CLI arguments over config file values and validates the result
fn resolve_settings(args: Args, config: ConfigFile) -> Result<ScanSettings> {
    let rules = args.rules.or(config.rules).ok_or_else(|| ScanError::Validation {
        message: "No rule book given. Use --rules or set 'rules' in the config file.".to_string(),
    })?;

    let model_name = args
        .model_name
        .or(config.model_name)
        .ok_or_else(|| ScanError::Validation {
            message: "No data model given. Use --model or set 'model_name' in the config file."
                .to_string(),
        })?;

    let inventory = args
        .inventory
        .or(config.inventory)
        .unwrap_or_else(|| PathBuf::from("."));
    validate_inventory_dir(&inventory)?;

    let snapshot_timestamp = match args.snapshot_timestamp {
        Some(timestamp) => validate_snapshot_timestamp(timestamp)?,
        None => Utc::now().format(TIMESTAMP_FORMAT).to_string(),
    };

    let email_sender = args.email_sender.or(config.email_sender);
    let email_recipient = args.email_recipient.or(config.email_recipient);
    let sendgrid_api_key = args.sendgrid_api_key.or(config.sendgrid_api_key);

    let email = match (email_sender, email_recipient) {
        (Some(sender), Some(recipient)) => {
            for address in [&sender, &recipient] {
                if !looks_like_email(address) {
                    return Err(ScanError::Validation {
                        message: format!("'{}' is not an email address", address),
                    }
                    .into());
                }
            }
            if sendgrid_api_key.is_none() {
                return Err(ScanError::Validation {
                    message: "Mail settings need a SendGrid API key. Use --sendgrid-api-key, \
                              SENDGRID_API_KEY or set 'sendgrid_api_key' in the config file."
                        .to_string(),
                }
                .into());
            }
            Some(EmailSettings { sender, recipient })
        }
        (None, None) => None,
        _ => {
            return Err(ScanError::Validation {
                message: "Both an email sender and an email recipient are needed to send the \
                          scan summary."
                    .to_string(),
            }
            .into())
        }
    };

    Ok(ScanSettings {
        rules,
        inventory,
        model_name,
        snapshot_timestamp,
        output_path: args.output_path.or(config.output_path),
        violations_db: args.violations_db.or(config.violations_db),
        email,
        sendgrid_api_key,
    })
}

fn validate_snapshot_timestamp(timestamp: String) -> Result<String> {
    NaiveDateTime::parse_from_str(&timestamp, TIMESTAMP_FORMAT).map_err(|e| {
        ScanError::Validation {
            message: format!(
                "Invalid snapshot timestamp '{}': {}. Expected format YYYYMMDDTHHMMSSZ",
                timestamp, e
            ),
        }
    })?;
    Ok(timestamp)
}

fn validate_inventory_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ScanError::Validation {
            message: format!("Inventory directory does not exist: {}", path.display()),
        }
        .into());
    }

    // Security check: Reject symbolic links for the inventory directory
    let metadata = std::fs::symlink_metadata(path).map_err(|e| ScanError::Validation {
        message: format!("Failed to read inventory directory metadata: {}", e),
    })?;

    if metadata.is_symlink() {
        return Err(ScanError::Validation {
            message: format!(
                "Security: Inventory directory {} is a symbolic link. For security reasons, symbolic links are not allowed.",
                path.display()
            ),
        }
        .into());
    }

    if !path.is_dir() {
        return Err(ScanError::Validation {
            message: format!("Inventory path is not a directory: {}", path.display()),
        }
        .into());
    }

    Ok(())
}

fn print_summary(response: &ScanResponse) {
    eprintln!();
    eprintln!("📊 Scan summary (scan id {})", response.scan_id);
    eprintln!("   - Policies scanned: {}", response.resource_counts.total());
    eprintln!("   - Violations: {}", response.violation_count());
    if !response.violation_errors.is_empty() {
        eprintln!(
            "   - Violations not saved: {}",
            response.violation_errors.len()
        );
    }
    if let Some(csv) = &response.csv_output {
        eprintln!("   - CSV: {}", csv.display());
    }
    if response.notification_sent {
        eprintln!("   - Summary mail sent");
    }
}
