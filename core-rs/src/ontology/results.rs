//! Decoding of `application/sparql-results+json` responses
//!
//! Only the parts of the W3C results format the publisher reads are modelled:
//! the head variables, the solution bindings and the ASK boolean.

use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

use super::query::COUNT_VARIABLE;

/// Problems turning a results document into a typed value
#[derive(Error, Debug)]
pub enum ResultsError {
    #[error("malformed SPARQL results JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("result has no solutions")]
    NoSolutions,

    #[error("binding '?{0}' missing from first solution")]
    MissingBinding(String),

    #[error("binding '?{variable}' is not a non-negative integer: '{value}'")]
    NotAnInteger { variable: String, value: String },
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ResultsHead {
    #[serde(default)]
    pub vars: Vec<String>,
}

/// One RDF term in a solution
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RdfTerm {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(default)]
    pub datatype: Option<String>,
    #[serde(rename = "xml:lang", default)]
    pub lang: Option<String>,
}

pub type Solution = HashMap<String, RdfTerm>;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ResultsBody {
    #[serde(default)]
    pub bindings: Vec<Solution>,
}

/// A decoded SPARQL results document
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SparqlResults {
    #[serde(default = "empty_head")]
    pub head: ResultsHead,
    #[serde(default)]
    pub results: Option<ResultsBody>,
    #[serde(default)]
    pub boolean: Option<bool>,
}

fn empty_head() -> ResultsHead {
    ResultsHead { vars: Vec::new() }
}

impl SparqlResults {
    pub fn parse(body: &str) -> Result<Self, ResultsError> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn solutions(&self) -> &[Solution] {
        self.results
            .as_ref()
            .map(|r| r.bindings.as_slice())
            .unwrap_or(&[])
    }

    /// Integer value of `?variable` in the first solution
    pub fn integer(&self, variable: &str) -> Result<u64, ResultsError> {
        let first = self.solutions().first().ok_or(ResultsError::NoSolutions)?;
        let term = first
            .get(variable)
            .ok_or_else(|| ResultsError::MissingBinding(variable.to_string()))?;

        term.value
            .trim()
            .parse::<u64>()
            .map_err(|_| ResultsError::NotAnInteger {
                variable: variable.to_string(),
                value: term.value.clone(),
            })
    }

    /// Value of the `?count` binding produced by every `SparqlQuery` count builder
    pub fn count(&self) -> Result<u64, ResultsError> {
        self.integer(COUNT_VARIABLE)
    }
}

/// Parse a results body and read its `?count` binding in one step
pub fn parse_count(body: &str) -> Result<u64, ResultsError> {
    SparqlResults::parse(body)?.count()
}
