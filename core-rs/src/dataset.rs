//! Dataset identity and storage kinds

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{PublishError, Result};

/// Storage engine backing a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StorageKind {
    /// Disk-backed TDB2 store, survives triplestore restarts
    #[default]
    Persistent,
    /// In-memory store, lost on restart
    InMemory,
}

impl StorageKind {
    /// Value of the `dbType` form field on the admin endpoint
    pub fn db_type(&self) -> &'static str {
        match self {
            StorageKind::Persistent => "tdb2",
            StorageKind::InMemory => "mem",
        }
    }
}

impl FromStr for StorageKind {
    type Err = PublishError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "persistent" | "tdb2" | "tdb" => Ok(StorageKind::Persistent),
            "in-memory" | "inmemory" | "memory" | "mem" => Ok(StorageKind::InMemory),
            other => Err(PublishError::InvalidInput(format!(
                "Unknown storage kind '{}' (expected persistent or in-memory)",
                other
            ))),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Persistent => f.write_str("persistent"),
            StorageKind::InMemory => f.write_str("in-memory"),
        }
    }
}

/// Outcome of `ensure_dataset`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetState {
    Created,
    AlreadyExisted,
}

impl DatasetState {
    /// Always true: both outcomes leave the dataset in place
    pub fn exists(&self) -> bool {
        true
    }

    pub fn was_created(&self) -> bool {
        matches!(self, DatasetState::Created)
    }
}

/// Validate a dataset name before it is used in a URL path
///
/// Names are non-empty and limited to characters that need no escaping in a
/// path segment.
pub fn validate_dataset_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(PublishError::InvalidInput("Dataset name cannot be empty".to_string()));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(PublishError::InvalidInput(format!(
            "Dataset name '{}' contains invalid character '{}'",
            name, bad
        )));
    }
    Ok(())
}

/// Entry of the admin dataset listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInfo {
    /// Dataset name without the leading `/`
    pub name: String,
    pub active: bool,
}

#[derive(Deserialize)]
struct AdminListing {
    #[serde(default)]
    datasets: Vec<AdminDataset>,
}

#[derive(Deserialize)]
struct AdminDataset {
    #[serde(rename = "ds.name")]
    name: String,
    #[serde(rename = "ds.state", default)]
    state: bool,
}

/// Decode the body of `GET /$/datasets`
pub fn parse_dataset_listing(body: &str) -> Result<Vec<DatasetInfo>> {
    let listing: AdminListing = serde_json::from_str(body)?;
    Ok(listing
        .datasets
        .into_iter()
        .map(|ds| DatasetInfo {
            name: ds.name.trim_start_matches('/').to_string(),
            active: ds.state,
        })
        .collect())
}
