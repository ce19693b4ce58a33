//! Per-endpoint request builders and response decoders.
//!
//! # Design
//! Each endpoint is a small value implementing `Operation`: `request` builds
//! an `HttpRequest` against an `ApiConfig`, and `decode` turns the raw body
//! into a domain value. Neither touches the network, so both are tested here
//! with plain byte strings. Leniency lives in `decode` and is specific to the
//! endpoint: the list drops bad entries, the detail lookup does not.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::ApiConfig;
use crate::http::HttpRequest;
use crate::types::{sort_by_name, DessertDetail, DessertResult};

/// A structurally unusable response body.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("response contained no usable entries")]
    Empty,
}

/// Describes one API endpoint.
pub trait Operation {
    type Output;

    fn request(&self, config: &ApiConfig) -> HttpRequest;

    fn decode(&self, body: &[u8]) -> Result<Self::Output, DecodeError>;
}

/// `{ "meals": [...] }`. MealDB answers `"meals": null` when nothing matches.
#[derive(Deserialize)]
struct Envelope {
    meals: Option<Vec<Value>>,
}

impl Envelope {
    fn parse(body: &[u8]) -> Result<Vec<Value>, DecodeError> {
        let envelope: Envelope = serde_json::from_slice(body)?;
        Ok(envelope.meals.unwrap_or_default())
    }
}

/// Lists every dessert in the configured category.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetDesserts;

impl Operation for GetDesserts {
    type Output = Vec<DessertResult>;

    fn request(&self, config: &ApiConfig) -> HttpRequest {
        let mut url = config.filter_url().clone();
        url.query_pairs_mut().append_pair("c", config.category());
        HttpRequest::get(url)
    }

    fn decode(&self, body: &[u8]) -> Result<Self::Output, DecodeError> {
        let entries = Envelope::parse(body)?;
        let total = entries.len();

        let mut desserts: Vec<DessertResult> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(dessert) => Some(dessert),
                Err(err) => {
                    tracing::debug!(index, error = %err, "skipping malformed dessert entry");
                    None
                }
            })
            .collect();

        if desserts.is_empty() {
            return Err(DecodeError::Empty);
        }
        if desserts.len() < total {
            tracing::warn!(
                kept = desserts.len(),
                dropped = total - desserts.len(),
                "dessert list contained malformed entries"
            );
        }

        sort_by_name(&mut desserts);
        Ok(desserts)
    }
}

/// Looks up the full recipe for one dessert id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetDessertDetail {
    dessert_id: String,
}

impl GetDessertDetail {
    pub fn new(dessert_id: impl Into<String>) -> Self {
        Self {
            dessert_id: dessert_id.into(),
        }
    }

    pub fn dessert_id(&self) -> &str {
        &self.dessert_id
    }
}

impl Operation for GetDessertDetail {
    type Output = DessertDetail;

    fn request(&self, config: &ApiConfig) -> HttpRequest {
        let mut url = config.lookup_url().clone();
        url.query_pairs_mut().append_pair("i", &self.dessert_id);
        HttpRequest::get(url)
    }

    fn decode(&self, body: &[u8]) -> Result<Self::Output, DecodeError> {
        let entry = Envelope::parse(body)?
            .into_iter()
            .next()
            .ok_or(DecodeError::Empty)?;
        Ok(serde_json::from_value(entry)?)
    }
}
