//! Client for the external NER service.
//!
//! # Responsibility
//! - Send a free-form sentence to `POST {base}/ner` and decode the entities.
//! - Probe service liveness through `GET {base}/`.
//!
//! # Invariants
//! - Calls are blocking and bounded by connect/read timeouts.
//! - Sentence text is never written to logs; only its length is.

use crate::model::entity::{NerResponse, NerStatus};
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

const USER_AGENT: &str = concat!("nertodo/", env!("CARGO_PKG_VERSION"));

pub type NerResult<T> = Result<T, NerError>;

/// Failure talking to the NER service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NerError {
    /// Sentence was empty after trimming; no request was sent.
    InvalidInput,
    /// Transport failure or non-2xx status.
    Http(String),
    /// Body could not be decoded into the expected envelope.
    Decode(String),
}

impl Display for NerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput => write!(f, "ner input cannot be empty"),
            Self::Http(message) => write!(f, "ner request failed: {message}"),
            Self::Decode(message) => write!(f, "ner response invalid: {message}"),
        }
    }
}

impl Error for NerError {}

/// Entity extraction backend.
pub trait NerClient {
    fn extract(&self, input: &str) -> NerResult<NerResponse>;
}

#[derive(Serialize)]
struct NerRequest<'a> {
    input: &'a str,
}

/// Blocking HTTP client for the NER service.
pub struct HttpNerClient {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpNerClient {
    /// Builds a client for `base_url` (for example `http://localhost:8000`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self { base_url, agent }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Queries the service root for its status envelope.
    pub fn health(&self) -> NerResult<NerStatus> {
        let url = format!("{}/", self.base_url);
        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|err| NerError::Http(err.to_string()))?;
        read_json(response)
    }
}

impl NerClient for HttpNerClient {
    fn extract(&self, input: &str) -> NerResult<NerResponse> {
        let input = input.trim();
        if input.is_empty() {
            return Err(NerError::InvalidInput);
        }

        let started_at = Instant::now();
        let url = format!("{}/ner", self.base_url);
        let result = self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_string(&encode_request(input)?)
            .map_err(|err| NerError::Http(err.to_string()))
            .and_then(read_json::<NerResponse>);

        match &result {
            Ok(response) => info!(
                "event=ner_extract module=ner status=ok input_chars={} entities={} success={} duration_ms={}",
                input.chars().count(),
                response.data.len(),
                response.success,
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=ner_extract module=ner status=error input_chars={} duration_ms={} error={err}",
                input.chars().count(),
                started_at.elapsed().as_millis()
            ),
        }
        result
    }
}

fn encode_request(input: &str) -> NerResult<String> {
    serde_json::to_string(&NerRequest { input }).map_err(|err| NerError::Decode(err.to_string()))
}

fn read_json<T: DeserializeOwned>(response: ureq::Response) -> NerResult<T> {
    let body = response
        .into_string()
        .map_err(|err| NerError::Http(err.to_string()))?;
    decode_body(&body)
}

fn decode_body<T: DeserializeOwned>(body: &str) -> NerResult<T> {
    serde_json::from_str(body).map_err(|err| NerError::Decode(err.to_string()))
}
