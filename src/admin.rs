use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::domain::Accession;
use crate::error::AtlasError;

/// Per-accession catalog mutations driven by the batch harness. The actual
/// loading work happens behind the admin endpoints.
pub trait AdminClient: Send + Sync {
    fn create_experiment(&self, accession: &Accession, is_private: bool)
    -> Result<(), AtlasError>;
    fn update_experiment_design(&self, accession: &Accession) -> Result<(), AtlasError>;
}

#[derive(Clone)]
pub struct AdminHttpClient {
    client: Client,
    base_url: String,
}

impl AdminHttpClient {
    pub fn new(base_url: &str) -> Result<Self, AtlasError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("sc-atlas/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| AtlasError::AdminHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(600))
            .build()
            .map_err(|err| AtlasError::AdminHttp(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn post(&self, url: &str) -> Result<(), AtlasError> {
        let response = self
            .client
            .post(url)
            .send()
            .map_err(|err| AtlasError::AdminHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "admin request failed".to_string());
            return Err(AtlasError::AdminStatus { status, message });
        }
        Ok(())
    }
}

impl AdminClient for AdminHttpClient {
    fn create_experiment(
        &self,
        accession: &Accession,
        is_private: bool,
    ) -> Result<(), AtlasError> {
        self.post(&format!(
            "{}/experiments/{accession}?private={is_private}",
            self.base_url
        ))
    }

    fn update_experiment_design(&self, accession: &Accession) -> Result<(), AtlasError> {
        self.post(&format!(
            "{}/experiments/{accession}/design",
            self.base_url
        ))
    }
}
