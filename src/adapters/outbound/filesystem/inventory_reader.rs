use crate::ports::outbound::PolicyRepository;
use crate::scanning::domain::{ParentRef, PolicyRecord};
use crate::shared::error::ScanError;
use crate::shared::security::read_input_file;
use crate::shared::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Inventory record type holding an IAM policy
const IAM_POLICY_TYPE: &str = "iam_policy";

/// One record of an inventory snapshot
#[derive(Debug, Deserialize)]
struct InventoryRecord {
    #[serde(rename = "type")]
    record_type: String,
    name: String,
    #[serde(default)]
    parent: Option<InventoryParent>,
    /// Policy document, either as a JSON string or inline
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct InventoryParent {
    #[serde(rename = "type")]
    resource_type: String,
    name: String,
    full_name: String,
}

impl InventoryRecord {
    fn into_policy_record(self) -> Option<PolicyRecord> {
        let parent = self.parent?;
        let data = match self.data {
            serde_json::Value::String(s) => s,
            serde_json::Value::Null => String::from("{}"),
            other => other.to_string(),
        };
        Some(PolicyRecord::new(
            self.name,
            ParentRef::new(parent.resource_type, parent.name, parent.full_name),
            data,
        ))
    }
}

/// InventoryReader adapter serving data models from JSON snapshots on disk
///
/// Each data model is a file `<inventory_dir>/<model_name>.json` holding an
/// array of inventory records. Only `iam_policy` records with a parent are
/// returned.
pub struct InventoryReader {
    inventory_dir: PathBuf,
}

impl InventoryReader {
    pub fn new(inventory_dir: PathBuf) -> Self {
        Self { inventory_dir }
    }

    fn snapshot_path(&self, model_name: &str) -> Result<PathBuf> {
        if model_name.is_empty()
            || model_name.contains(['/', '\\'])
            || model_name == "."
            || model_name == ".."
        {
            return Err(ScanError::Validation {
                message: format!("Invalid data model name: '{}'", model_name),
            }
            .into());
        }
        Ok(self.inventory_dir.join(format!("{}.json", model_name)))
    }

    fn parse_snapshot(path: &Path, content: &str) -> Result<Vec<PolicyRecord>> {
        let records: Vec<InventoryRecord> =
            serde_json::from_str(content).map_err(|e| ScanError::InventoryParseError {
                path: path.to_path_buf(),
                details: e.to_string(),
            })?;

        Ok(records
            .into_iter()
            .filter(|r| r.record_type == IAM_POLICY_TYPE)
            .filter_map(InventoryRecord::into_policy_record)
            .collect())
    }
}

impl PolicyRepository for InventoryReader {
    fn fetch_iam_policies(&self, model_name: &str) -> Result<Vec<PolicyRecord>> {
        let path = self.snapshot_path(model_name)?;

        if !path.exists() {
            return Err(ScanError::InventoryNotFound {
                path: path.clone(),
                suggestion: format!(
                    "No data model named '{}' in inventory directory \"{}\".\n   \
                     Please check the --model option or the --inventory directory.",
                    model_name,
                    self.inventory_dir.display()
                ),
            }
            .into());
        }

        let content = read_input_file(&path, "inventory snapshot").map_err(|e| {
            ScanError::FileReadError {
                path: path.clone(),
                details: e.to_string(),
            }
        })?;

        Self::parse_snapshot(&path, &content)
    }
}
