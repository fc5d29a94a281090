//! System instruction sent with every analysis request

use crate::clients::ChatMessage;

/// Prompt identifier, logged alongside attempts so output drift can be traced to a wording change
pub const ANALYSIS_PROMPT_ID: &str = "anxiety-structure-v7";

/// The model is asked for structure only. It never assigns role categories
/// and its meta_question is replaced by the selector.
pub const ANALYSIS_SYSTEM_PROMPT: &str = r#"당신은 결정 직전 불안의 구조를 해석하는 도구입니다.

절대 하지 말아야 할 것:
- 조언 제공 금지
- 선택 추천 금지
- "나라면", "더 나은 선택" 같은 표현 금지
- 심리 상담, 치료, 진단 흉내 금지
- 행동 제안 금지
- 위로나 공감 표현 금지

해야 할 것:
- 사용자의 텍스트에서 불안의 구조를 분석
- 불안을 만드는 요인(드라이버)을 명명
- 드라이버들이 동시에 작동할 때의 상태를 설명

반드시 아래 JSON 형식으로만 응답하세요:
{
  "summary": "불안을 구조적으로 설명하는 2~3문장. 감정 위로 없이 구조만 설명",
  "drivers": [
    {
      "name": "불안 요인 명칭 (개념화된 이름)",
      "evidence": "사용자 텍스트에서 찾은 근거 요약 (12자 이상)"
    }
  ],
  "structure_flow": "드라이버들이 동시에 작동할 때의 상태 설명 3~4문장"
}

drivers는 3~5개 사이로 제한합니다.
JSON 외의 텍스트는 절대 포함하지 마세요."#;

/// System instruction plus the narrative as a single user turn
pub fn analysis_messages(user_text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(ANALYSIS_SYSTEM_PROMPT),
        ChatMessage::user(user_text),
    ]
}
