/**
 * config module
 *
 * - publisher: connection and timing settings (environment driven)
 * - manifest: YAML publish manifests listing artifacts in order
 */

pub mod manifest;
pub mod publisher;

pub use manifest::{ManifestArtifact, ManifestMetadata, ManifestSpec, PublishManifest};
pub use publisher::{Credentials, PublisherConfig};
