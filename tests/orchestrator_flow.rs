mod common;

use common::{NARRATIVE, ScriptedClient, valid_response};
use decision_lab::clients::ClientError;
use decision_lab::events::{AttemptOutcome, MemorySink};
use decision_lab::orchestrator::{Orchestrator, fallback_result};
use decision_lab::schemas::{QuestionType, RoleCategory};
use decision_lab::selector::templates;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn orchestrator(responses: Vec<Result<String, ClientError>>) -> Orchestrator<ScriptedClient, MemorySink> {
    Orchestrator::new(ScriptedClient::new(responses), MemorySink::new())
}

#[tokio::test]
async fn valid_first_response_is_classified_and_linked() {
    let orch = orchestrator(vec![Ok(valid_response())]);
    let outcome = orch.run(NARRATIVE, &mut StdRng::seed_from_u64(1)).await;

    assert!(!outcome.is_fallback);
    assert_eq!(outcome.attempts, 1);
    let roles: Vec<_> = outcome
        .result
        .drivers
        .iter()
        .map(|d| d.role_category)
        .collect();
    assert_eq!(
        roles,
        vec![
            Some(RoleCategory::Amplify),
            Some(RoleCategory::Sustain),
            Some(RoleCategory::Fixate)
        ]
    );
    assert_eq!(outcome.question_type, QuestionType::C);
    assert_eq!(outcome.result.linked_driver.as_deref(), Some("남들의 시선"));
    assert!(templates(QuestionType::C).contains(&outcome.result.meta_question.as_str()));
    assert!(outcome.result.structure_flow.is_some());
}

#[tokio::test]
async fn malformed_then_valid_uses_second_attempt() {
    let orch = orchestrator(vec![
        Ok("죄송합니다, JSON을 만들 수 없습니다.".to_string()),
        Ok(valid_response()),
    ]);
    let outcome = orch.run(NARRATIVE, &mut StdRng::seed_from_u64(2)).await;

    assert!(!outcome.is_fallback);
    assert_eq!(outcome.attempts, 2);
    assert_eq!(outcome.result.drivers.len(), 3);

    let attempts = orch.sink().attempts();
    assert_eq!(attempts.len(), 2);
    assert_eq!(
        attempts[0].outcome,
        AttemptOutcome::Rejected {
            reason: "no_json_found".to_string()
        }
    );
    assert!(attempts[1].outcome.is_success());
    assert_eq!(attempts[0].request_id, attempts[1].request_id);
}

#[tokio::test]
async fn exhausted_attempts_return_fallback() {
    let advice = serde_json::json!({
        "summary": "지금 회사에 남는 것이 더 나은 선택입니다.",
        "drivers": []
    })
    .to_string();
    let orch = orchestrator(vec![Ok("{not json".to_string()), Ok(advice), Ok(valid_response())]);
    let outcome = orch.run(NARRATIVE, &mut StdRng::seed_from_u64(3)).await;

    assert!(outcome.is_fallback);
    assert_eq!(outcome.attempts, 2);
    assert_eq!(&outcome.result, fallback_result());
    assert_eq!(orch.sink().attempts().len(), 2);

    let completed = orch.sink().completed_records();
    assert_eq!(completed.len(), 1);
    assert!(completed[0].is_fallback);
    assert_eq!(completed[0].driver_count, 3);
}

#[tokio::test]
async fn transport_failure_counts_as_an_attempt() {
    let orch = orchestrator(vec![
        Err(ClientError::Request("connection reset".to_string())),
        Ok(valid_response()),
    ]);
    let outcome = orch.run(NARRATIVE, &mut StdRng::seed_from_u64(4)).await;

    assert!(!outcome.is_fallback);
    assert_eq!(outcome.attempts, 2);
    assert!(matches!(
        orch.sink().attempts()[0].outcome,
        AttemptOutcome::TransportFailure { .. }
    ));
}

#[tokio::test]
async fn max_attempts_bounds_model_calls() {
    let client_responses = vec![
        Ok("no json".to_string()),
        Ok("still none".to_string()),
        Ok("nope".to_string()),
        Ok(valid_response()),
    ];
    let orch = orchestrator(client_responses).with_max_attempts(3);
    let outcome = orch.run(NARRATIVE, &mut StdRng::seed_from_u64(5)).await;

    assert!(outcome.is_fallback);
    assert_eq!(outcome.attempts, 3);
    assert_eq!(orch.sink().attempts().len(), 3);
}

#[tokio::test]
async fn zero_attempts_is_raised_to_one() {
    let orch = orchestrator(vec![Ok(valid_response())]).with_max_attempts(0);
    assert_eq!(orch.max_attempts(), 1);
    let result = orch
        .produce_result_with(NARRATIVE, &mut StdRng::seed_from_u64(6))
        .await;
    assert_eq!(result.drivers.len(), 3);
}

#[tokio::test]
async fn completed_record_reports_input_length_in_characters() {
    let orch = orchestrator(vec![Ok(valid_response())]);
    let _ = orch.produce_result(NARRATIVE).await;

    let completed = orch.sink().completed_records();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].input_length, NARRATIVE.encode_utf16().count());
    assert_eq!(completed[0].question_type, QuestionType::C);
    assert!(!completed[0].is_fallback);
}
