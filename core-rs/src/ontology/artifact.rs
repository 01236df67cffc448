/**
 * artifact.rs
 * Ontology artifacts: a local RDF file, the graph it targets and its serialization
 *
 * An artifact is immutable once built and is only ever read by the publisher.
 * Reading happens through `load_payload`, which enforces the local preconditions
 * (file exists, file is non-empty) before any network traffic is attempted.
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::errors::{PublishError, Result};

/// RDF serialization of an artifact, sent as the upload `Content-Type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    Turtle,
    RdfXml,
    NTriples,
    N3,
    JsonLd,
    #[serde(rename = "trig")]
    TriG,
}

impl ContentType {
    /// MIME type understood by the graph store protocol endpoint
    pub fn mime(&self) -> &'static str {
        match self {
            ContentType::Turtle => "text/turtle",
            ContentType::RdfXml => "application/rdf+xml",
            ContentType::NTriples => "application/n-triples",
            ContentType::N3 => "text/n3",
            ContentType::JsonLd => "application/ld+json",
            ContentType::TriG => "application/trig",
        }
    }

    /// Infer the serialization from a file extension
    ///
    /// Unknown or missing extensions fall back to RDF/XML, which is what
    /// `.owl` files exported by most ontology editors contain.
    ///
    /// # Example
    /// ```
    /// use ontopub_core::ontology::ContentType;
    /// use std::path::Path;
    ///
    /// assert_eq!(ContentType::from_path(Path::new("core.ttl")), ContentType::Turtle);
    /// assert_eq!(ContentType::from_path(Path::new("gist.owl")), ContentType::RdfXml);
    /// ```
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("ttl") => ContentType::Turtle,
            Some("owl") | Some("rdf") | Some("xml") => ContentType::RdfXml,
            Some("nt") => ContentType::NTriples,
            Some("n3") => ContentType::N3,
            Some("jsonld") => ContentType::JsonLd,
            Some("trig") => ContentType::TriG,
            _ => ContentType::RdfXml,
        }
    }
}

impl FromStr for ContentType {
    type Err = PublishError;

    /// Accepts short names (`turtle`, `rdf-xml`, ...) or full MIME types
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "turtle" | "ttl" | "text/turtle" => Ok(ContentType::Turtle),
            "rdf-xml" | "rdfxml" | "xml" | "owl" | "application/rdf+xml" => Ok(ContentType::RdfXml),
            "n-triples" | "ntriples" | "nt" | "application/n-triples" => Ok(ContentType::NTriples),
            "n3" | "text/n3" => Ok(ContentType::N3),
            "json-ld" | "jsonld" | "application/ld+json" => Ok(ContentType::JsonLd),
            "trig" | "application/trig" => Ok(ContentType::TriG),
            other => Err(PublishError::InvalidInput(format!(
                "Unknown RDF content type: '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// Absolute IRI of a named graph
///
/// Only constructible through [`GraphIri::parse`], so the value can always be
/// embedded between `<` and `>` in a SPARQL request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphIri(String);

impl GraphIri {
    /// Validate an IRI reference
    ///
    /// Rejects control characters and whitespace, plus the characters the
    /// SPARQL IRIREF production excludes: angle brackets, double quote,
    /// braces, `|`, `^`, backtick and backslash.
    pub fn parse(iri: impl Into<String>) -> Result<Self> {
        let iri = iri.into();
        let trimmed = iri.trim();
        if trimmed.is_empty() {
            return Err(PublishError::InvalidInput("Graph IRI cannot be empty".to_string()));
        }
        if let Some(bad) = trimmed.chars().find(|&c| is_excluded_from_iriref(c)) {
            return Err(PublishError::InvalidInput(format!(
                "Graph IRI contains {:?}, which is not allowed in an IRI reference: '{}'",
                bad, trimmed
            )));
        }
        if !trimmed.contains(':') {
            return Err(PublishError::InvalidInput(format!(
                "Graph IRI must be absolute (missing scheme): '{}'",
                trimmed
            )));
        }
        Ok(GraphIri(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_excluded_from_iriref(c: char) -> bool {
    c <= ' ' || c.is_whitespace() || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\')
}

impl fmt::Display for GraphIri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for GraphIri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for GraphIri {
    type Err = PublishError;

    fn from_str(s: &str) -> Result<Self> {
        GraphIri::parse(s)
    }
}

/// Graph an artifact is uploaded into
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GraphTarget {
    /// The dataset's default (unnamed) graph
    Default,
    /// A named graph addressed by a validated IRI
    Named(GraphIri),
}

impl GraphTarget {
    /// Build a named target, rejecting IRIs that cannot be embedded in SPARQL
    pub fn named(iri: impl Into<String>) -> Result<Self> {
        GraphIri::parse(iri).map(GraphTarget::Named)
    }

    pub fn iri(&self) -> Option<&str> {
        match self {
            GraphTarget::Default => None,
            GraphTarget::Named(iri) => Some(iri.as_str()),
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, GraphTarget::Default)
    }
}

impl fmt::Display for GraphTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphTarget::Default => f.write_str("default graph"),
            GraphTarget::Named(iri) => write!(f, "<{}>", iri),
        }
    }
}

/// A file plus its target graph and serialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OntologyArtifact {
    path: PathBuf,
    graph: GraphTarget,
    content_type: ContentType,
}

impl OntologyArtifact {
    pub fn new(path: impl Into<PathBuf>, graph: GraphTarget, content_type: ContentType) -> Self {
        Self {
            path: path.into(),
            graph,
            content_type,
        }
    }

    /// Build an artifact whose content type is inferred from the file extension
    pub fn inferred(path: impl Into<PathBuf>, graph: GraphTarget) -> Self {
        let path = path.into();
        let content_type = ContentType::from_path(&path);
        Self::new(path, graph, content_type)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn graph(&self) -> &GraphTarget {
        &self.graph
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Short label for reports (file name, falling back to the full path)
    pub fn label(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Read the artifact bytes, enforcing the local preconditions
    ///
    /// Returns `ArtifactNotFound` when the path does not exist or is not a
    /// regular file, `ArtifactEmpty` when it holds zero bytes.
    pub async fn load_payload(&self) -> Result<Vec<u8>> {
        let metadata = match tokio::fs::metadata(&self.path).await {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(PublishError::ArtifactNotFound { path: self.path.clone() });
            }
            Err(e) => return Err(e.into()),
        };

        if !metadata.is_file() {
            return Err(PublishError::ArtifactNotFound { path: self.path.clone() });
        }
        if metadata.len() == 0 {
            return Err(PublishError::ArtifactEmpty { path: self.path.clone() });
        }

        let bytes = tokio::fs::read(&self.path).await?;
        if bytes.is_empty() {
            // truncated between stat and read
            return Err(PublishError::ArtifactEmpty { path: self.path.clone() });
        }
        Ok(bytes)
    }
}

/// Parses the CLI form `PATH[=GRAPH_IRI]`
///
/// Without `=GRAPH_IRI` the artifact targets the default graph.
impl FromStr for OntologyArtifact {
    type Err = PublishError;

    fn from_str(s: &str) -> Result<Self> {
        let (path, graph) = match s.split_once('=') {
            Some((path, iri)) => (path.trim(), GraphTarget::named(iri)?),
            None => (s.trim(), GraphTarget::Default),
        };
        if path.is_empty() {
            return Err(PublishError::InvalidInput(format!(
                "Artifact specification '{}' has no path",
                s
            )));
        }
        Ok(OntologyArtifact::inferred(path, graph))
    }
}
