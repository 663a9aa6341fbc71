//! Composite batch protocol.
//!
//! The store has no multi-resource transaction primitive; dependent writes
//! are expressed as one composite request whose steps chain through prior
//! steps' Location headers, resolved server-side. The placeholder grammar
//! (`{0}` in resources, `$.N.Headers.Location` in parameters) stays inside
//! this module.
//!
//! Success is defined by the terminal step, a GET read-back of the primary
//! created resource: status 200 there means the whole composite applied.
//! Anything else is a composite failure carrying the full per-step response
//! map. The store may retain orphans from a mid-chain failure; cleaning
//! those up is operational, not a correctness concern for callers.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::error::ApiError;
use super::transport::{Method, Transport, TransportRequest};

/// Identifier of a step within one plan ("1", "2", …).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StepKey(u32);

impl StepKey {
    pub fn key_string(self) -> String {
        self.0.to_string()
    }

    /// Parameter expression for this step's Location header.
    fn location_ref(self) -> String {
        format!("$.{}.Headers.Location", self.0)
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One sub-operation of a composite request.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchStep {
    pub method: Method,
    pub resource: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parent_ids: Vec<String>,
}

impl BatchStep {
    pub fn post(resource: impl Into<String>, content: Value) -> Self {
        Self {
            method: Method::Post,
            resource: resource.into(),
            content: Some(content),
            parameters: Vec::new(),
            parent_ids: Vec::new(),
        }
    }

    /// POST to a sub-resource of the element/attribute a prior step created.
    pub fn post_under(parent: StepKey, suffix: &str, content: Value) -> Self {
        Self {
            method: Method::Post,
            resource: format!("{{0}}{suffix}"),
            content: Some(content),
            parameters: vec![parent.location_ref()],
            parent_ids: vec![parent.key_string()],
        }
    }

    /// PUT to a sub-resource of the resource a prior step created.
    pub fn put_under(parent: StepKey, suffix: &str, content: Value) -> Self {
        Self {
            method: Method::Put,
            resource: format!("{{0}}{suffix}"),
            content: Some(content),
            parameters: vec![parent.location_ref()],
            parent_ids: vec![parent.key_string()],
        }
    }

    /// Terminal read-back of the resource a prior step created.
    pub fn read_back(created: StepKey) -> Self {
        Self {
            method: Method::Get,
            resource: "{0}".to_string(),
            content: None,
            parameters: vec![created.location_ref()],
            parent_ids: vec![created.key_string()],
        }
    }

    /// Add ordering dependencies beyond the location source.
    pub fn after(mut self, keys: &[StepKey]) -> Self {
        for key in keys {
            let key = key.key_string();
            if !self.parent_ids.contains(&key) {
                self.parent_ids.push(key);
            }
        }
        self
    }
}

/// An ordered collection of dependent steps, submitted as one call.
#[derive(Clone, Debug, Default)]
pub struct BatchPlan {
    steps: Vec<BatchStep>,
}

impl BatchPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: BatchStep) -> StepKey {
        self.steps.push(step);
        StepKey(self.steps.len() as u32)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn into_request(self) -> Result<TransportRequest, ApiError> {
        let mut map = serde_json::Map::new();
        for (index, step) in self.steps.into_iter().enumerate() {
            let key = StepKey(index as u32 + 1).key_string();
            let value = serde_json::to_value(step)
                .map_err(|err| ApiError::decode(format!("batch step encode failed: {err}")))?;
            map.insert(key, value);
        }
        Ok(TransportRequest::post("batch", Value::Object(map)))
    }
}

/// Per-step outcome from the store.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct StepResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub content: Value,
}

impl StepResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers.get("Location").map(String::as_str)
    }
}

/// The parsed response map of a submitted plan.
#[derive(Clone, Debug)]
pub struct BatchOutcome {
    responses: BTreeMap<String, StepResponse>,
}

impl BatchOutcome {
    pub fn step(&self, key: StepKey) -> Option<&StepResponse> {
        self.responses.get(&key.key_string())
    }

    /// Enforce the composite success contract: the terminal read-back must
    /// have status 200; any other outcome is a composite failure embedding
    /// every step response for diagnosis.
    pub fn expect_ok(&self, terminal: StepKey) -> Result<&StepResponse, BatchError> {
        match self.responses.get(&terminal.key_string()) {
            Some(step) if step.status == 200 => Ok(step),
            _ => Err(BatchError {
                terminal: terminal.key_string(),
                responses: self.responses.clone(),
            }),
        }
    }
}

/// Composite failure: the terminal read-back did not come back 200.
#[derive(Debug, Error, Clone)]
pub struct BatchError {
    pub terminal: String,
    /// Raw per-step responses, kept whole for diagnosis.
    pub responses: BTreeMap<String, StepResponse>,
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "composite batch failed")?;
        let mut failed: Vec<(&String, u16)> = self
            .responses
            .iter()
            .filter(|(_, step)| !(200..300).contains(&step.status))
            .map(|(key, step)| (key, step.status))
            .collect();
        failed.sort_by_key(|(key, _)| key.parse::<u32>().unwrap_or(u32::MAX));
        if failed.is_empty() {
            write!(f, ": terminal step {} missing from response", self.terminal)?;
        } else {
            write!(f, ":")?;
            for (key, status) in failed {
                write!(f, " step {key} -> {status};")?;
            }
        }
        Ok(())
    }
}

/// Submit a plan as a single outbound call and parse the response map.
///
/// Transport errors abort before any state change; inspecting the outcome
/// for composite success is the caller's next step (`expect_ok`).
pub async fn execute<T: Transport>(
    transport: &T,
    plan: BatchPlan,
) -> Result<BatchOutcome, ApiError> {
    let response = transport.send(plan.into_request()?).await?;
    let responses: BTreeMap<String, StepResponse> = serde_json::from_value(response.body)
        .map_err(|err| ApiError::decode(format!("batch response decode failed: {err}")))?;
    Ok(BatchOutcome { responses })
}
