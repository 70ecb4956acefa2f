// src/services/reasoner.rs
//! External reasoning service client.
//!
//! Everything here degrades instead of erroring: a missing credential, a
//! timeout, a non-JSON body or an empty reply all collapse to `None`, and
//! the caller treats `None` as "no result" for that one record. The service
//! is outside our trust boundary; we attempt to parse, else treat the reply
//! as absent.

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;

use crate::config::ReasonerConfig;

const API_VERSION: &str = "2023-06-01";

/// One blocking completion round-trip. `None` means "no result", never an
/// error worth aborting a batch for.
pub trait Reasoner {
    fn complete(&self, system: &str, user: &str) -> Option<String>;
}

/// Messages-API client over blocking HTTP with a hard per-call deadline.
pub struct HttpReasoner {
    client: reqwest::blocking::Client,
    api_url: String,
    model: String,
    max_tokens: u32,
    timeout: Duration,
    api_key: Option<String>,
}

impl HttpReasoner {
    /// Reads the API key from the configured environment variable. An absent
    /// key is not an error: the reasoner simply answers `None` to every call.
    pub fn from_config(cfg: &ReasonerConfig) -> Self {
        let api_key = std::env::var(&cfg.api_key_env)
            .ok()
            .filter(|k| !k.is_empty());
        if api_key.is_none() {
            tracing::warn!(
                "no credential in ${}; reasoning calls will return no result",
                cfg.api_key_env
            );
        }
        Self {
            client: reqwest::blocking::Client::new(),
            api_url: cfg.api_url.clone(),
            model: cfg.model.clone(),
            max_tokens: cfg.max_tokens,
            timeout: Duration::from_secs(cfg.timeout_secs),
            api_key,
        }
    }
}

impl Reasoner for HttpReasoner {
    fn complete(&self, system: &str, user: &str) -> Option<String> {
        let key = self.api_key.as_deref()?;
        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": system,
            "messages": [{"role": "user", "content": user}],
        });
        let response = match self
            .client
            .post(&self.api_url)
            .timeout(self.timeout)
            .header("x-api-key", key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
        {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!("reasoning service call failed: {err}");
                return None;
            }
        };
        let value: Value = match response.json() {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!("reasoning service returned non-JSON body: {err}");
                return None;
            }
        };
        let text = value
            .get("content")?
            .get(0)?
            .get("text")?
            .as_str()?
            .trim()
            .to_string();
        if text.is_empty() { None } else { Some(text) }
    }
}

/// Best-effort structured decode of a reply that may be wrapped in a
/// markdown code fence, with or without a `json` tag. Decode failure is
/// `None`, never an error; this is the single place that heuristic lives.
pub fn decode_fenced_json<T: DeserializeOwned>(raw: &str) -> Option<T> {
    serde_json::from_str(strip_fence(raw)).ok()
}

fn strip_fence(raw: &str) -> &str {
    let text = raw.trim();
    if !text.starts_with("```") {
        return text;
    }
    let Some(inner) = text.split("```").nth(1) else {
        return text;
    };
    inner.strip_prefix("json").unwrap_or(inner).trim()
}
