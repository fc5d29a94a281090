#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use decision_lab::clients::{ChatMessage, ClientError, CompletionClient};

/// Replays canned responses in order; runs dry with `EmptyContent`
pub struct ScriptedClient {
    responses: Mutex<VecDeque<Result<String, ClientError>>>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    pub fn new(responses: Vec<Result<String, ClientError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ClientError> {
        assert_eq!(messages.len(), 2);
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ClientError::EmptyContent))
    }
}

pub const NARRATIVE: &str = "지금 회사에 오래 다녔는데 이직 제안을 받았습니다. 새로운 곳에서 실패할까 봐 두렵고, 주변 사람들이 어떻게 볼지도 신경이 쓰입니다.";

/// A response that passes validation: Amplify, Sustain, Fixate drivers,
/// with the identity lexicon winning on the third one
pub fn valid_response() -> String {
    serde_json::json!({
        "summary": "현재 직장에 대한 익숙함과 새로운 환경에 대한 두려움이 동시에 작동하고 있습니다.",
        "drivers": [
            {"name": "실패에 대한 두려움", "evidence": "새 직장에서 실패할까 봐 두려운 마음이 크다"},
            {"name": "익숙함에 머무름", "evidence": "지금 회사에 오랫동안 익숙해져 계속 머무르고 싶다"},
            {"name": "남들의 시선", "evidence": "남들의 평가와 시선이 머릿속에서 떠나지 않는다"}
        ],
        "structure_flow": "두려움이 익숙함을 붙드는 이유가 되고, 타인의 시선이 그 고리를 유지합니다."
    })
    .to_string()
}
