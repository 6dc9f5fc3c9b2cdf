//! Upstream payload shapes for the associations and batch-read endpoints.
//!
//! Only the fields the pipeline reads are modelled; everything else in the
//! upstream JSON is ignored on deserialize.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Response of the contact → custom object associations lookup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssociationsResponse {
    #[serde(default)]
    pub results: Vec<AssociationResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssociationResult {
    pub id: String,
}

impl AssociationsResponse {
    pub fn into_ids(self) -> Vec<String> {
        self.results.into_iter().map(|r| r.id).collect()
    }
}

/// Body of a batch-read request.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReadRequest<'a> {
    pub properties: Vec<&'a str>,
    pub inputs: Vec<BatchReadInput<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReadInput<'a> {
    pub id: &'a str,
}

impl<'a> BatchReadRequest<'a> {
    pub fn new(properties: Vec<&'a str>, ids: &'a [String]) -> Self {
        Self {
            properties,
            inputs: ids
                .iter()
                .map(|id| BatchReadInput { id: id.as_str() })
                .collect(),
        }
    }
}

/// Response of a batch-read request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchReadResponse {
    #[serde(default)]
    pub results: Vec<RawRecord>,
}

/// A custom-object record as returned upstream: an id and an untyped
/// property bag whose values may be null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawRecord {
    pub id: String,
    #[serde(default)]
    pub properties: HashMap<String, Option<String>>,
}
