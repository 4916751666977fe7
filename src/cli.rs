use clap::Parser;
use std::path::PathBuf;

/// Scan IAM policies of an inventory snapshot against a rule book
#[derive(Parser, Debug)]
#[command(name = "iam-scan")]
#[command(version)]
#[command(
    about = "Scan IAM policies of an inventory snapshot against a rule book",
    long_about = "Scan IAM policies of an inventory snapshot against a rule book.\n\n\
                  Buckets are checked with the storage roles they inherit from their \
                  project, folders and organization. Violations are saved to the \
                  violation store, written as CSV to the output path and mailed as a \
                  summary when mail settings are given."
)]
pub struct Args {
    /// Rule book (YAML)
    #[arg(short, long, value_name = "PATH")]
    pub rules: Option<PathBuf>,

    /// Directory holding <model>.json inventory snapshots (defaults to current directory)
    #[arg(short, long, value_name = "DIR")]
    pub inventory: Option<PathBuf>,

    /// Name of the data model to scan
    #[arg(short, long = "model", value_name = "NAME")]
    pub model_name: Option<String>,

    /// Snapshot timestamp, formatted YYYYMMDDTHHMMSSZ (defaults to now, UTC)
    #[arg(short = 't', long, value_name = "TIMESTAMP")]
    pub snapshot_timestamp: Option<String>,

    /// Directory receiving the violations CSV (no CSV is written when omitted)
    #[arg(short, long, value_name = "DIR")]
    pub output_path: Option<PathBuf>,

    /// JSON-lines file receiving violation rows
    #[arg(long, value_name = "PATH")]
    pub violations_db: Option<PathBuf>,

    /// Sender address of the summary mail
    #[arg(long, value_name = "ADDRESS")]
    pub email_sender: Option<String>,

    /// Recipient address of the summary mail
    #[arg(long, value_name = "ADDRESS")]
    pub email_recipient: Option<String>,

    /// SendGrid API key used to send the summary mail
    #[arg(long, value_name = "KEY", env = "SENDGRID_API_KEY", hide_env_values = true)]
    pub sendgrid_api_key: Option<String>,

    /// Path to config file (default: auto-discover iam-scan.config.yml in current directory)
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
