/**
 * publisher module
 *
 * - publisher: OntologyPublisher (ensure dataset, upload, verify, clear)
 * - readiness: bounded health-endpoint wait
 * - report: per-artifact results and batch reports
 */

pub mod publisher;
pub mod readiness;
pub mod report;

pub use publisher::OntologyPublisher;
pub use readiness::wait_until_ready;
pub use report::{
    ArtifactOutcome, BatchMode, BatchReport, DatasetStats, InheritanceCheck, NamespaceCheck, PublishResult,
};
