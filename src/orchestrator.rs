//! Bounded-retry analysis pipeline
//!
//! `Idle -> Calling(attempt) -> Validated | Retrying | ExhaustedFallback`.
//! Every attempt is one model call followed by validation; a transport error
//! and a rejected response count the same. Retries are sequential. When the
//! budget runs out the canned [`fallback_result`] is returned, so callers
//! always get an [`AnalysisResult`].

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;
use uuid::Uuid;

use crate::classifier::classify;
use crate::clients::{ChatMessage, ClientError, CompletionClient, OpenAiClient};
use crate::config::Config;
use crate::error::{DecisionLabError, Result};
use crate::events::{AnalysisLogRecord, AnalysisSink, AttemptOutcome, AttemptRecord, TracingSink};
use crate::prompts::{ANALYSIS_PROMPT_ID, analysis_messages};
use crate::schemas::{AnalysisResult, DisallowedCheck, DriverDraft, QuestionType};
use crate::selector::{RandomSource, select};
use crate::validator::{
    MAX_DRIVERS, MIN_DRIVERS, ParsedResponse, RejectionReason, text_length, validate,
};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Why an attempt did not produce a usable response
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("transport failure: {0}")]
    Transport(#[from] ClientError),
    #[error("response rejected: {0}")]
    Rejected(#[from] RejectionReason),
}

impl AttemptError {
    fn to_outcome(&self) -> AttemptOutcome {
        match self {
            AttemptError::Transport(e) => AttemptOutcome::TransportFailure {
                message: e.to_string(),
            },
            AttemptError::Rejected(r) => AttemptOutcome::Rejected {
                reason: r.kind().to_string(),
            },
        }
    }
}

/// Full outcome of one request, for callers that need more than the result
#[derive(Debug, Clone)]
pub struct Outcome {
    pub result: AnalysisResult,
    pub question_type: QuestionType,
    pub attempts: u32,
    pub is_fallback: bool,
}

struct Fallback {
    result: AnalysisResult,
    question_type: QuestionType,
}

static FALLBACK: Lazy<Fallback> = Lazy::new(|| {
    let canned = ParsedResponse {
        summary: "입력하신 내용을 분석하는 데 어려움이 있었습니다. 다시 시도해 주세요."
            .to_string(),
        drivers: vec![
            DriverDraft::new("결정의 무게", "선택을 앞두고 부담이 점점 커지는 상태로 보입니다"),
            DriverDraft::new("불확실한 전망", "선택 이후의 결과를 아직 예측하기 어려운 상태입니다"),
            DriverDraft::new("반복되는 생각", "같은 고민이 머릿속에서 계속 되풀이되는 상태입니다"),
        ],
        structure_flow: None,
    };
    let (result, question_type) = assemble(canned, &mut rand::thread_rng());
    Fallback {
        result,
        question_type,
    }
});

/// Canned result used when no attempt validates. Built once, through the
/// ordinary classifier and selector.
pub fn fallback_result() -> &'static AnalysisResult {
    &FALLBACK.result
}

/// Classify, select and assemble the final result
fn assemble(parsed: ParsedResponse, rng: &mut dyn RandomSource) -> (AnalysisResult, QuestionType) {
    let drivers = classify(&parsed.drivers);
    let selection = select(&drivers, rng);
    let linked_driver = Some(selection.linked_driver).filter(|name| !name.is_empty());

    let result = AnalysisResult {
        summary: parsed.summary,
        drivers,
        structure_flow: parsed.structure_flow,
        meta_question: selection.question,
        linked_driver,
        disallowed_check: DisallowedCheck::default(),
    };
    (result, selection.question_type)
}

fn is_well_formed(result: &AnalysisResult) -> bool {
    (MIN_DRIVERS..=MAX_DRIVERS).contains(&result.drivers.len())
        && result.drivers.iter().all(|d| d.role_category.is_some())
        && result.linked_driver_is_bound()
}

pub struct Orchestrator<C, S = TracingSink> {
    client: C,
    sink: S,
    max_attempts: u32,
}

impl<C: CompletionClient, S: AnalysisSink> Orchestrator<C, S> {
    pub fn new(client: C, sink: S) -> Self {
        Self {
            client,
            sink,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Produce a result for `user_text` with a freshly seeded template draw
    pub async fn produce_result(&self, user_text: &str) -> AnalysisResult {
        let mut rng = StdRng::from_entropy();
        self.run(user_text, &mut rng).await.result
    }

    /// Like [`Self::produce_result`] but with an explicit randomness source
    pub async fn produce_result_with<R>(&self, user_text: &str, rng: &mut R) -> AnalysisResult
    where
        R: RandomSource + Send,
    {
        self.run(user_text, rng).await.result
    }

    /// Run the retry loop and report how the result was reached
    pub async fn run<R>(&self, user_text: &str, rng: &mut R) -> Outcome
    where
        R: RandomSource + Send,
    {
        let request_id = Uuid::new_v4().to_string();
        let messages = analysis_messages(user_text);
        tracing::debug!(
            request_id = %request_id,
            prompt = ANALYSIS_PROMPT_ID,
            input_length = text_length(user_text),
            "analysis.start"
        );

        let mut attempt = 0;
        while attempt < self.max_attempts {
            attempt += 1;
            let started = Instant::now();
            let res = self.attempt_once(&messages).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            match res {
                Ok(parsed) => {
                    self.sink.attempt(&AttemptRecord {
                        request_id: request_id.clone(),
                        attempt,
                        outcome: AttemptOutcome::Validated,
                        elapsed_ms,
                    });
                    let (result, question_type) = assemble(parsed, rng);
                    if is_well_formed(&result) {
                        return self.finish(
                            &request_id,
                            user_text,
                            result,
                            question_type,
                            attempt,
                            false,
                        );
                    }
                    tracing::error!(request_id = %request_id, "assembled result broke invariants");
                    break;
                }
                Err(err) => {
                    self.sink.attempt(&AttemptRecord {
                        request_id: request_id.clone(),
                        attempt,
                        outcome: err.to_outcome(),
                        elapsed_ms,
                    });
                }
            }
        }

        tracing::warn!(
            request_id = %request_id,
            attempts = attempt,
            "Using fallback result after retries"
        );
        self.finish(
            &request_id,
            user_text,
            FALLBACK.result.clone(),
            FALLBACK.question_type,
            attempt,
            true,
        )
    }

    async fn attempt_once(
        &self,
        messages: &[ChatMessage],
    ) -> std::result::Result<ParsedResponse, AttemptError> {
        let raw = self.client.complete(messages).await?;
        Ok(validate(&raw)?)
    }

    fn finish(
        &self,
        request_id: &str,
        user_text: &str,
        result: AnalysisResult,
        question_type: QuestionType,
        attempts: u32,
        is_fallback: bool,
    ) -> Outcome {
        self.sink.completed(&AnalysisLogRecord {
            request_id: request_id.to_string(),
            timestamp: Utc::now(),
            input_length: text_length(user_text),
            driver_count: result.drivers.len(),
            question_type,
            is_fallback,
        });
        Outcome {
            result,
            question_type,
            attempts,
            is_fallback,
        }
    }
}

/// Anything that turns a narrative into a result; the HTTP layer holds one of these
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, user_text: &str) -> AnalysisResult;
}

#[async_trait]
impl<C: CompletionClient, S: AnalysisSink> Analyzer for Orchestrator<C, S> {
    async fn analyze(&self, user_text: &str) -> AnalysisResult {
        self.produce_result(user_text).await
    }
}

/// Whether `text` meets the caller-side minimum length, in UTF-16 units
pub fn input_is_long_enough(text: &str, min_chars: usize) -> bool {
    text_length(text) >= min_chars
}

/// Build the production analyzer. `None` when no API key is configured.
pub fn build_analyzer(config: &Config) -> Result<Option<Arc<dyn Analyzer>>> {
    let Some(api_key) = config.runtime.openai_api_key.as_deref() else {
        tracing::warn!("OPENAI_API_KEY not configured; /api/analyze will fail");
        return Ok(None);
    };
    let client =
        OpenAiClient::new(&config.llm, api_key).map_err(|e| DecisionLabError::Transport {
            message: e.to_string(),
        })?;
    let orchestrator =
        Orchestrator::new(client, TracingSink).with_max_attempts(config.analysis.max_attempts);
    Ok(Some(Arc::new(orchestrator)))
}
