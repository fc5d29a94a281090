//! Validation of raw model output against the analysis JSON contract
//!
//! The model is not trusted to follow the contract. Any deviation is a
//! [`RejectionReason`], which the orchestrator treats as a failed attempt.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::lexicon::find_disallowed;
use crate::schemas::DriverDraft;

pub const MIN_DRIVERS: usize = 3;
pub const MAX_DRIVERS: usize = 5;
pub const MIN_EVIDENCE_CHARS: usize = 12;

/// Text length as UTF-16 code units, so an emoji counts as two
pub fn text_length(text: &str) -> usize {
    text.encode_utf16().count()
}

// Greedy: first '{' through last '}', across newlines.
static JSON_OBJECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("json object regex should compile"));

/// Why a model response was not accepted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("no JSON object found in model output")]
    NoJsonFound,
    #[error("malformed JSON: {0}")]
    MalformedJson(String),
    #[error("missing or empty field `{0}`")]
    MissingField(String),
    #[error("expected 3..=5 drivers, got {0}")]
    DriverCountOutOfRange(usize),
    #[error("evidence for driver `{name}` is {chars} chars, need at least 12")]
    EvidenceTooShort { name: String, chars: usize },
    #[error("disallowed phrase `{0}` in {1}")]
    DisallowedContent(&'static str, &'static str),
}

impl RejectionReason {
    /// Stable snake_case label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            RejectionReason::NoJsonFound => "no_json_found",
            RejectionReason::MalformedJson(_) => "malformed_json",
            RejectionReason::MissingField(_) => "missing_field",
            RejectionReason::DriverCountOutOfRange(_) => "driver_count_out_of_range",
            RejectionReason::EvidenceTooShort { .. } => "evidence_too_short",
            RejectionReason::DisallowedContent(..) => "disallowed_content",
        }
    }
}

/// A response that passed validation; drivers are not yet classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub summary: String,
    pub drivers: Vec<DriverDraft>,
    pub structure_flow: Option<String>,
}

/// Greedy `{ ... }` span of the raw output, if any
pub fn extract_json_object(raw: &str) -> Option<&str> {
    JSON_OBJECT_RE.find(raw).map(|m| m.as_str())
}

/// Validate raw model output. Pure; the first failing check wins.
pub fn validate(raw: &str) -> Result<ParsedResponse, RejectionReason> {
    let json = extract_json_object(raw).ok_or(RejectionReason::NoJsonFound)?;
    let value: Value =
        serde_json::from_str(json).map_err(|e| RejectionReason::MalformedJson(e.to_string()))?;

    let summary = value
        .get("summary")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| RejectionReason::MissingField("summary".into()))?;

    let raw_drivers = match value.get("drivers") {
        Some(Value::Array(items)) => items,
        _ => return Err(RejectionReason::MissingField("drivers".into())),
    };

    if !(MIN_DRIVERS..=MAX_DRIVERS).contains(&raw_drivers.len()) {
        return Err(RejectionReason::DriverCountOutOfRange(raw_drivers.len()));
    }

    let mut drivers = Vec::with_capacity(raw_drivers.len());
    for (idx, item) in raw_drivers.iter().enumerate() {
        let name = item
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| RejectionReason::MissingField(format!("drivers[{idx}].name")))?;
        let evidence = item
            .get("evidence")
            .and_then(Value::as_str)
            .ok_or_else(|| RejectionReason::MissingField(format!("drivers[{idx}].evidence")))?;

        let chars = text_length(evidence);
        if chars < MIN_EVIDENCE_CHARS {
            return Err(RejectionReason::EvidenceTooShort {
                name: name.to_string(),
                chars,
            });
        }
        // Any roleCategory the model sends is dropped; classification is ours.
        drivers.push(DriverDraft::new(name, evidence));
    }

    if let Some(pattern) = find_disallowed(summary) {
        return Err(RejectionReason::DisallowedContent(pattern, "summary"));
    }

    let structure_flow = value
        .get("structure_flow")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if let Some(flow) = structure_flow
        && let Some(pattern) = find_disallowed(flow)
    {
        return Err(RejectionReason::DisallowedContent(pattern, "structure_flow"));
    }

    Ok(ParsedResponse {
        summary: summary.to_string(),
        drivers,
        structure_flow: structure_flow.map(str::to_string),
    })
}
