use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;

use crate::domain::IdentifierSet;
use crate::error::AtlasError;

/// Row ceiling imposed on every term lookup. Bounds memory and latency of
/// the read-side aggregation queries.
pub const MAX_RESULT_ROWS: usize = 10_000;

pub trait IndexClient: Send + Sync {
    /// Fetch up to `limit` values of `value_field` from documents whose
    /// `term_field` matches any of `terms`. Only the requested field is
    /// projected.
    fn lookup_by_term(
        &self,
        term_field: &str,
        terms: &IdentifierSet,
        value_field: &str,
        limit: usize,
    ) -> Result<Vec<String>, AtlasError>;
}

#[derive(Clone)]
pub struct IndexHttpClient {
    client: Client,
    base_url: String,
}

impl IndexHttpClient {
    pub fn new(base_url: &str) -> Result<Self, AtlasError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("sc-atlas/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| AtlasError::IndexHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| AtlasError::IndexHttp(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl IndexClient for IndexHttpClient {
    fn lookup_by_term(
        &self,
        term_field: &str,
        terms: &IdentifierSet,
        value_field: &str,
        limit: usize,
    ) -> Result<Vec<String>, AtlasError> {
        let term_query = terms.iter().cloned().collect::<Vec<_>>().join(" OR ");
        let url = format!("{}/select", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", format!("{term_field}:({term_query})").as_str()),
                ("fl", value_field),
                ("rows", limit.to_string().as_str()),
                ("wt", "json"),
            ])
            .send()
            .map_err(|err| AtlasError::IndexHttp(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "index request failed".to_string());
            return Err(AtlasError::IndexStatus { status, message });
        }

        let body: Value = response
            .json()
            .map_err(|err| AtlasError::IndexHttp(err.to_string()))?;
        let docs = body["response"]["docs"]
            .as_array()
            .cloned()
            .unwrap_or_default();

        let mut values = Vec::new();
        for doc in docs {
            match &doc[value_field] {
                Value::String(value) => values.push(value.clone()),
                Value::Array(items) => {
                    for item in items {
                        if let Some(value) = item.as_str() {
                            values.push(value.to_string());
                        }
                    }
                }
                _ => {}
            }
            if values.len() >= limit {
                values.truncate(limit);
                break;
            }
        }
        Ok(values)
    }
}
