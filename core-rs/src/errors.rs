//! Error types for the Ontology Publisher

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::drivers::TransportError;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Triplestore at {base_url} not ready after {waited:?}: {detail}")]
    InfrastructureUnreachable {
        base_url: String,
        waited: Duration,
        detail: String,
    },

    #[error("Artifact not found: {}", .path.display())]
    ArtifactNotFound { path: PathBuf },

    #[error("Artifact is empty: {}", .path.display())]
    ArtifactEmpty { path: PathBuf },

    #[error("Upload to {graph} in dataset '{dataset}' rejected ({}): {body}", status_label(.status))]
    UploadRejected {
        dataset: String,
        graph: String,
        status: Option<u16>,
        body: String,
    },

    #[error("Upload to {graph} in dataset '{dataset}' was accepted but produced zero triples")]
    EmptyLoadDetected { dataset: String, graph: String },

    #[error("Verification query for {graph} in dataset '{dataset}' failed: {reason}")]
    VerificationQueryFailed {
        dataset: String,
        graph: String,
        reason: String,
    },

    #[error("Creating dataset '{dataset}' failed (status {status}): {body}")]
    DatasetCreationFailed {
        dataset: String,
        status: u16,
        body: String,
    },

    #[error("Clearing {graph} in dataset '{dataset}' rejected ({}): {body}", status_label(.status))]
    ClearRejected {
        dataset: String,
        graph: String,
        status: Option<u16>,
        body: String,
    },

    #[error("Query against dataset '{dataset}' failed: {reason}")]
    QueryFailed { dataset: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("status {}", code),
        None => "no response".to_string(),
    }
}

impl PublishError {
    /// Stable name of the failure kind, printed by the CLI
    pub fn kind(&self) -> &'static str {
        match self {
            PublishError::InfrastructureUnreachable { .. } => "InfrastructureUnreachable",
            PublishError::ArtifactNotFound { .. } => "ArtifactNotFound",
            PublishError::ArtifactEmpty { .. } => "ArtifactEmpty",
            PublishError::UploadRejected { .. } => "UploadRejected",
            PublishError::EmptyLoadDetected { .. } => "EmptyLoadDetected",
            PublishError::VerificationQueryFailed { .. } => "VerificationQueryFailed",
            PublishError::DatasetCreationFailed { .. } => "DatasetCreationFailed",
            PublishError::ClearRejected { .. } => "ClearRejected",
            PublishError::QueryFailed { .. } => "QueryFailed",
            PublishError::InvalidInput(_) => "InvalidInput",
            PublishError::Config(_) => "Config",
            PublishError::Transport(_) => "Transport",
            PublishError::Io(_) => "Io",
            PublishError::Yaml(_) => "Yaml",
            PublishError::Json(_) => "Json",
        }
    }

    /// Workflow phase the error was raised in
    pub fn phase(&self) -> &'static str {
        match self {
            PublishError::InfrastructureUnreachable { .. } => "readiness",
            PublishError::DatasetCreationFailed { .. } => "dataset",
            PublishError::ArtifactNotFound { .. }
            | PublishError::ArtifactEmpty { .. }
            | PublishError::InvalidInput(_) => "validate",
            PublishError::UploadRejected { .. } => "upload",
            PublishError::EmptyLoadDetected { .. }
            | PublishError::VerificationQueryFailed { .. } => "verify",
            PublishError::ClearRejected { .. } => "clear",
            PublishError::QueryFailed { .. } => "query",
            PublishError::Config(_) | PublishError::Yaml(_) => "config",
            PublishError::Transport(_) | PublishError::Io(_) | PublishError::Json(_) => "io",
        }
    }
}

impl From<TransportError> for PublishError {
    fn from(err: TransportError) -> Self {
        PublishError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PublishError>;
