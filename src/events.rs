//! Ephemeral event logging
//!
//! Two streams, both written through `tracing` and never persisted:
//! analysis diagnostics from the orchestrator ([`AnalysisSink`]) and client
//! page events posted to `/api/events` ([`ClientEvent`]).

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schemas::QuestionType;

/// Result of a single model call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Validated,
    TransportFailure { message: String },
    Rejected { reason: String },
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Validated)
    }
}

/// Diagnostic emitted after every attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptRecord {
    pub request_id: String,
    /// 1-based
    pub attempt: u32,
    pub outcome: AttemptOutcome,
    pub elapsed_ms: u64,
}

/// Flat record emitted once per completed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisLogRecord {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub input_length: usize,
    pub driver_count: usize,
    pub question_type: QuestionType,
    pub is_fallback: bool,
}

/// Logging collaborator. Implementations must not block and cannot fail.
pub trait AnalysisSink: Send + Sync {
    fn attempt(&self, record: &AttemptRecord);
    fn completed(&self, record: &AnalysisLogRecord);
}

/// Writes records as structured tracing events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl AnalysisSink for TracingSink {
    fn attempt(&self, record: &AttemptRecord) {
        match &record.outcome {
            AttemptOutcome::Validated => tracing::info!(
                request_id = %record.request_id,
                attempt = record.attempt,
                elapsed_ms = record.elapsed_ms,
                "analysis.attempt.validated"
            ),
            AttemptOutcome::TransportFailure { message } => tracing::warn!(
                request_id = %record.request_id,
                attempt = record.attempt,
                elapsed_ms = record.elapsed_ms,
                error = %message,
                "analysis.attempt.transport_failure"
            ),
            AttemptOutcome::Rejected { reason } => tracing::warn!(
                request_id = %record.request_id,
                attempt = record.attempt,
                elapsed_ms = record.elapsed_ms,
                reason = %reason,
                "analysis.attempt.rejected"
            ),
        }
    }

    fn completed(&self, record: &AnalysisLogRecord) {
        tracing::info!(
            request_id = %record.request_id,
            timestamp = %record.timestamp.to_rfc3339(),
            input_length = record.input_length,
            driver_count = record.driver_count,
            question_type = %record.question_type,
            is_fallback = record.is_fallback,
            "analysis.completed"
        );
    }
}

/// Keeps records in memory; for tests and embedding callers that inspect them
#[derive(Debug, Default)]
pub struct MemorySink {
    attempts: Mutex<Vec<AttemptRecord>>,
    completed: Mutex<Vec<AnalysisLogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> Vec<AttemptRecord> {
        self.attempts.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn completed_records(&self) -> Vec<AnalysisLogRecord> {
        self.completed.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl AnalysisSink for MemorySink {
    fn attempt(&self, record: &AttemptRecord) {
        if let Ok(mut v) = self.attempts.lock() {
            v.push(record.clone());
        }
    }

    fn completed(&self, record: &AnalysisLogRecord) {
        if let Ok(mut v) = self.completed.lock() {
            v.push(record.clone());
        }
    }
}

/// Page events the web client reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    LandingView,
    LandingYes,
    LandingNo,
    WriteView,
    Submit,
    ResultView,
    FeedbackHelpful,
    FeedbackReuse,
}

/// Payload posted to `/api/events`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientEvent {
    pub event: EventType,
    pub ts: String,
    #[serde(default)]
    pub pseudo_user_id: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Log a client event with the server receive time. Returns the logged line.
pub fn log_client_event(event: &ClientEvent) -> Value {
    let mut line = serde_json::to_value(event).unwrap_or(Value::Null);
    if let Some(obj) = line.as_object_mut() {
        obj.insert(
            "server_timestamp".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
    }
    tracing::info!(event = %line, "client.event");
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_event_parses_snake_case_names() {
        let event: ClientEvent = serde_json::from_value(json!({
            "event": "feedback_helpful",
            "ts": "2026-01-01T00:00:00Z",
            "pseudo_user_id": "u",
            "session_id": "s",
            "path": "/result",
            "data": {"helpful": "Y"}
        }))
        .unwrap();
        assert_eq!(event.event, EventType::FeedbackHelpful);
    }

    #[test]
    fn unknown_event_name_is_rejected() {
        let parsed: Result<ClientEvent, _> =
            serde_json::from_value(json!({"event": "page_scroll", "ts": "t"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn logged_line_carries_server_timestamp() {
        let event: ClientEvent =
            serde_json::from_value(json!({"event": "submit", "ts": "t"})).unwrap();
        let line = log_client_event(&event);
        assert_eq!(line["event"], "submit");
        assert!(line["server_timestamp"].is_string());
    }

    #[test]
    fn memory_sink_keeps_order() {
        let sink = MemorySink::new();
        for attempt in 1..=2 {
            sink.attempt(&AttemptRecord {
                request_id: "r".into(),
                attempt,
                outcome: AttemptOutcome::Validated,
                elapsed_ms: 0,
            });
        }
        let attempts: Vec<u32> = sink.attempts().iter().map(|r| r.attempt).collect();
        assert_eq!(attempts, vec![1, 2]);
    }
}
