/**
 * ontology module
 *
 * - artifact: ontology files, their target graphs and RDF serializations
 * - query: SPARQL query and update builders
 * - results: SPARQL results JSON decoding
 */

pub mod artifact;
pub mod query;
pub mod results;

pub use artifact::{ContentType, GraphIri, GraphTarget, OntologyArtifact};
pub use query::{SparqlQuery, SparqlUpdate};
pub use results::{parse_count, ResultsError, SparqlResults};
