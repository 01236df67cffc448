/**
 * query.rs
 * Query and update builders for SPARQL
 *
 * Every count query binds its result to `?count` so that responses can be
 * decoded uniformly by `SparqlResults::count`.
 */

use std::fmt;

use super::artifact::GraphTarget;

const OWL_PREFIXES: &str = r#"PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
PREFIX owl: <http://www.w3.org/2002/07/owl#>"#;

const RDFS_PREFIX: &str = "PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>";

/// Variable every count query binds
pub const COUNT_VARIABLE: &str = "count";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparqlQuery {
    query: String,
}

impl SparqlQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.query
    }

    /// Triple count scoped to one graph
    ///
    /// # Example
    /// ```
    /// use ontopub_core::ontology::{GraphTarget, SparqlQuery};
    ///
    /// let graph = GraphTarget::named("http://example.org/core").unwrap();
    /// let query = SparqlQuery::triple_count(&graph);
    /// assert!(query.as_str().contains("GRAPH <http://example.org/core>"));
    /// ```
    pub fn triple_count(graph: &GraphTarget) -> Self {
        Self::new(format!(
            "SELECT (COUNT(*) AS ?{}) WHERE {{ {} }}",
            COUNT_VARIABLE,
            scoped(graph, "?s ?p ?o")
        ))
    }

    /// Distinct `owl:Class` count scoped to one graph
    pub fn class_count(graph: &GraphTarget) -> Self {
        Self::distinct_typed_count(graph, "owl:Class")
    }

    /// Distinct `owl:ObjectProperty` count scoped to one graph
    pub fn object_property_count(graph: &GraphTarget) -> Self {
        Self::distinct_typed_count(graph, "owl:ObjectProperty")
    }

    fn distinct_typed_count(graph: &GraphTarget, rdf_type: &str) -> Self {
        Self::new(format!(
            "{}\nSELECT (COUNT(DISTINCT ?term) AS ?{}) WHERE {{ {} }}",
            OWL_PREFIXES,
            COUNT_VARIABLE,
            scoped(graph, &format!("?term rdf:type {} .", rdf_type))
        ))
    }

    /// Triple count over the whole dataset (default graph plus all named graphs)
    pub fn dataset_triple_count() -> Self {
        Self::new(format!(
            "SELECT (COUNT(*) AS ?{}) WHERE {{ {{ ?s ?p ?o }} UNION {{ GRAPH ?g {{ ?s ?p ?o }} }} }}",
            COUNT_VARIABLE
        ))
    }

    /// Distinct subject count over the whole dataset
    pub fn dataset_subject_count() -> Self {
        Self::dataset_distinct_count("?s")
    }

    /// Distinct predicate count over the whole dataset
    pub fn dataset_predicate_count() -> Self {
        Self::dataset_distinct_count("?p")
    }

    fn dataset_distinct_count(var: &str) -> Self {
        Self::new(format!(
            "SELECT (COUNT(DISTINCT {}) AS ?{}) WHERE {{ {{ ?s ?p ?o }} UNION {{ GRAPH ?g {{ ?s ?p ?o }} }} }}",
            var, COUNT_VARIABLE
        ))
    }

    /// Count `owl:Class` terms whose IRI lives in `namespace`, in any graph
    pub fn namespace_class_count(namespace: &str) -> Self {
        Self::new(format!(
            r#"{}
SELECT (COUNT(DISTINCT ?class) AS ?{}) WHERE {{
    {{ ?class rdf:type owl:Class }} UNION {{ GRAPH ?g {{ ?class rdf:type owl:Class }} }}
    FILTER(isIRI(?class) && STRSTARTS(STR(?class), "{}"))
}}"#,
            OWL_PREFIXES,
            COUNT_VARIABLE,
            escape_literal(namespace)
        ))
    }

    /// Count `rdfs:subClassOf` links from classes in `sub_namespace` to
    /// classes in `super_namespace`, in any graph
    ///
    /// A bridge ontology that really extends a core ontology has at least one.
    pub fn inheritance_count(sub_namespace: &str, super_namespace: &str) -> Self {
        Self::new(format!(
            r#"{}
SELECT (COUNT(*) AS ?{}) WHERE {{
    SELECT DISTINCT ?sub ?super WHERE {{
        {{ ?sub rdfs:subClassOf ?super }} UNION {{ GRAPH ?g {{ ?sub rdfs:subClassOf ?super }} }}
        FILTER(isIRI(?sub) && isIRI(?super)
            && STRSTARTS(STR(?sub), "{}")
            && STRSTARTS(STR(?super), "{}"))
    }}
}}"#,
            RDFS_PREFIX,
            COUNT_VARIABLE,
            escape_literal(sub_namespace),
            escape_literal(super_namespace)
        ))
    }
}

impl fmt::Display for SparqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.query)
    }
}

/// SPARQL Update request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparqlUpdate {
    update: String,
}

impl SparqlUpdate {
    /// `CLEAR DEFAULT` or `CLEAR GRAPH <iri>`
    ///
    /// # Example
    /// ```
    /// use ontopub_core::ontology::{GraphTarget, SparqlUpdate};
    ///
    /// assert_eq!(SparqlUpdate::clear(&GraphTarget::Default).as_str(), "CLEAR DEFAULT");
    /// ```
    pub fn clear(graph: &GraphTarget) -> Self {
        let update = match graph {
            GraphTarget::Default => "CLEAR DEFAULT".to_string(),
            GraphTarget::Named(iri) => format!("CLEAR GRAPH <{}>", iri),
        };
        Self { update }
    }

    pub fn as_str(&self) -> &str {
        &self.update
    }
}

fn scoped(graph: &GraphTarget, pattern: &str) -> String {
    match graph {
        GraphTarget::Default => pattern.to_string(),
        GraphTarget::Named(iri) => format!("GRAPH <{}> {{ {} }}", iri, pattern),
    }
}

fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
