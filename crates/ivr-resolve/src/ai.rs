//! Contract for the external AI-assisted field mapper.
//!
//! The engine only ever talks to the mapper through this typed
//! request/response pair; transport, prompting and timeouts live behind
//! the [`AiMapper`] trait.

use std::collections::BTreeMap;
use std::time::Duration;

use ivr_model::{FieldType, Transformation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Maximum attempts for one logical mapping call.
pub const AI_RETRY_LIMIT: usize = 3;

/// Fixed pause between retry attempts.
pub const AI_RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// One target field described to the mapper, with type annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetFieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
}

/// Request sent to the mapping service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiMappingRequest {
    /// Source field names with a string rendering of their values.
    pub source_fields: BTreeMap<String, String>,
    /// Target template fields with type annotations.
    pub target_fields: Vec<TargetFieldSpec>,
    /// Truncated sample values to anchor the mapping.
    pub sample_data: BTreeMap<String, String>,
    /// Free-text hint naming the manufacturer and form.
    pub context: String,
}

/// One suggested mapping for a target field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiFieldSuggestion {
    pub value: Value,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation: Option<Transformation>,
}

/// Response from the mapping service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiMappingResponse {
    /// Suggested values keyed by target field name.
    pub mappings: BTreeMap<String, AiFieldSuggestion>,
    #[serde(default)]
    pub unmapped_source_fields: Vec<String>,
    #[serde(default)]
    pub unmapped_target_fields: Vec<String>,
    pub overall_confidence: f64,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub tokens_used: u64,
}

/// Failures of the mapping service. All variants are caught at the
/// engine boundary and downgrade the resolution to its deterministic
/// result; none propagate to callers.
#[derive(Debug, Error)]
pub enum AiMapperError {
    #[error("mapping request timed out after {0:?}")]
    Timeout(Duration),
    #[error("mapping service returned HTTP {status}")]
    Http { status: u16 },
    #[error("malformed mapping response")]
    MalformedResponse(#[from] serde_json::Error),
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

/// External AI-assisted mapper collaborator.
pub trait AiMapper: Send + Sync {
    /// Maps source fields onto target fields. Implementations own their
    /// transport and per-call timeout.
    fn map_fields(&self, request: &AiMappingRequest) -> Result<AiMappingResponse, AiMapperError>;
}

/// Wraps a mapper with a bounded retry loop and fixed backoff.
pub struct RetryingMapper<M> {
    inner: M,
    attempts: usize,
    backoff: Duration,
}

impl<M: AiMapper> RetryingMapper<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            attempts: AI_RETRY_LIMIT,
            backoff: AI_RETRY_BACKOFF,
        }
    }

    #[must_use]
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

impl<M: AiMapper> AiMapper for RetryingMapper<M> {
    fn map_fields(&self, request: &AiMappingRequest) -> Result<AiMappingResponse, AiMapperError> {
        let mut last_error = None;
        for attempt in 1..=self.attempts {
            match self.inner.map_fields(request) {
                Ok(response) => return Ok(response),
                Err(error) => {
                    tracing::warn!(attempt, max = self.attempts, %error, "mapping call failed");
                    last_error = Some(error);
                    if attempt < self.attempts {
                        std::thread::sleep(self.backoff);
                    }
                }
            }
        }
        // attempts >= 1, so last_error is set when we reach this point.
        Err(last_error.unwrap_or(AiMapperError::Timeout(Duration::ZERO)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct FlakyMapper {
        calls: Mutex<usize>,
        succeed_on: usize,
    }

    impl AiMapper for FlakyMapper {
        fn map_fields(
            &self,
            _request: &AiMappingRequest,
        ) -> Result<AiMappingResponse, AiMapperError> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            if *calls >= self.succeed_on {
                Ok(AiMappingResponse {
                    mappings: BTreeMap::new(),
                    unmapped_source_fields: Vec::new(),
                    unmapped_target_fields: Vec::new(),
                    overall_confidence: 0.9,
                    warnings: Vec::new(),
                    tokens_used: 12,
                })
            } else {
                Err(AiMapperError::Http { status: 503 })
            }
        }
    }

    fn request() -> AiMappingRequest {
        AiMappingRequest {
            source_fields: BTreeMap::new(),
            target_fields: Vec::new(),
            sample_data: BTreeMap::new(),
            context: String::new(),
        }
    }

    #[test]
    fn retries_until_success() {
        let mapper = RetryingMapper::new(FlakyMapper {
            calls: Mutex::new(0),
            succeed_on: 3,
        })
        .with_backoff(Duration::ZERO);
        assert!(mapper.map_fields(&request()).is_ok());
    }

    #[test]
    fn gives_up_after_retry_limit() {
        let flaky = FlakyMapper {
            calls: Mutex::new(0),
            succeed_on: AI_RETRY_LIMIT + 1,
        };
        let mapper = RetryingMapper::new(flaky).with_backoff(Duration::ZERO);
        let error = mapper.map_fields(&request()).unwrap_err();
        assert!(matches!(error, AiMapperError::Http { status: 503 }));
    }

    #[test]
    fn response_tolerates_missing_optional_arrays() {
        let response: AiMappingResponse = serde_json::from_str(
            r#"{
                "mappings": {
                    "Patient Name": {"value": "Jane Doe", "confidence": 0.92, "source_field": "name"}
                },
                "overall_confidence": 0.92
            }"#,
        )
        .expect("parse response");
        assert_eq!(response.mappings["Patient Name"].confidence, 0.92);
        assert!(response.unmapped_target_fields.is_empty());
        assert_eq!(response.tokens_used, 0);
    }
}
