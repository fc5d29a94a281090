//! Meta-question selection
//!
//! Scores the whole driver set against [`QUESTION_LEXICON`] to choose a
//! question type, draws one of that type's templates, and links the question
//! to the driver that scored highest for the chosen type.

use rand::Rng;

use crate::lexicon::{KeywordMatcher, QUESTION_LEXICON, SubstringMatcher};
use crate::schemas::{Driver, QuestionType, TypeScores};

/// Source of the single non-deterministic choice in the engine
pub trait RandomSource {
    /// Index in `0..len`. `len` is never zero.
    fn pick_index(&mut self, len: usize) -> usize;
}

impl<R: Rng> RandomSource for R {
    fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 { 0 } else { self.gen_range(0..len) }
    }
}

const REPETITION_TEMPLATES: &[&str] = &[
    "이 불안이 반복될 때마다, 당신이 가장 먼저 붙잡는 생각은 무엇인가요?",
    "같은 장면이 되풀이된다면, 그 장면 속에서 매번 달라지지 않는 것은 무엇인가요?",
];

const CONTROL_TEMPLATES: &[&str] = &[
    "지금 통제할 수 없다고 느끼는 것 중, 실제로 아직 정해지지 않은 것은 무엇인가요?",
    "결과를 알 수 없다는 사실이 이 결정 안에서 어떤 자리를 차지하고 있나요?",
];

const IDENTITY_TEMPLATES: &[&str] = &[
    "이 결정이 당신에 대해 무엇을 증명해야 한다고 느끼고 있나요?",
    "다른 사람의 시선을 지운다면, 이 결정은 어떻게 다르게 보이나요?",
];

/// Fixed question templates for a type, in draw order
pub fn templates(question_type: QuestionType) -> &'static [&'static str] {
    match question_type {
        QuestionType::A => REPETITION_TEMPLATES,
        QuestionType::B => CONTROL_TEMPLATES,
        QuestionType::C => IDENTITY_TEMPLATES,
    }
}

/// Outcome of selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub question_type: QuestionType,
    pub question: String,
    /// Exact name of a driver, or empty when there were no drivers
    pub linked_driver: String,
}

/// Aggregate and per-type best-driver scores for a driver set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scoreboard {
    pub aggregate: TypeScores,
    best: [Option<(usize, usize)>; 3],
}

impl Scoreboard {
    pub fn compute(drivers: &[Driver], matcher: &dyn KeywordMatcher) -> Self {
        let mut board = Scoreboard::default();
        for (idx, driver) in drivers.iter().enumerate() {
            let text = driver.scoring_text();
            for (slot, ty) in QuestionType::PRIORITY.into_iter().enumerate() {
                let score = QUESTION_LEXICON.score(ty, &text, matcher);
                board.aggregate.add(ty, score);
                // Strictly greater: the first driver to reach a maximum keeps it.
                let current = board.best[slot].map(|(_, s)| s).unwrap_or(0);
                if score > current {
                    board.best[slot] = Some((idx, score));
                }
            }
        }
        board
    }

    /// Highest aggregate type, ties resolved A > B > C
    pub fn winning_type(&self) -> QuestionType {
        let mut best = QuestionType::A;
        let mut best_score = self.aggregate.get(QuestionType::A);
        for ty in QuestionType::PRIORITY {
            let score = self.aggregate.get(ty);
            if score > best_score {
                best_score = score;
                best = ty;
            }
        }
        best
    }

    /// Index of the driver that first reached the top non-zero score for `ty`
    pub fn candidate(&self, ty: QuestionType) -> Option<usize> {
        let slot = QuestionType::PRIORITY.iter().position(|t| *t == ty)?;
        self.best[slot].map(|(idx, _)| idx)
    }
}

/// Select a meta-question with substring matching
pub fn select(drivers: &[Driver], rng: &mut dyn RandomSource) -> Selection {
    select_with(drivers, &SubstringMatcher, rng)
}

/// Select a meta-question with an explicit matching strategy
pub fn select_with(
    drivers: &[Driver],
    matcher: &dyn KeywordMatcher,
    rng: &mut dyn RandomSource,
) -> Selection {
    let board = Scoreboard::compute(drivers, matcher);
    let question_type = board.winning_type();

    let options = templates(question_type);
    let question = options[rng.pick_index(options.len()).min(options.len() - 1)].to_string();

    let linked_driver = board
        .candidate(question_type)
        .and_then(|idx| drivers.get(idx))
        .or_else(|| drivers.first())
        .map(|d| d.name.clone())
        .unwrap_or_default();

    tracing::debug!(
        question_type = %question_type,
        a = board.aggregate.get(QuestionType::A),
        b = board.aggregate.get(QuestionType::B),
        c = board.aggregate.get(QuestionType::C),
        linked_driver = %linked_driver,
        "meta-question selected"
    );

    Selection {
        question_type,
        question,
        linked_driver,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    struct Fixed(usize);

    impl RandomSource for Fixed {
        fn pick_index(&mut self, _len: usize) -> usize {
            self.0
        }
    }

    fn driver(name: &str, evidence: &str) -> Driver {
        Driver {
            name: name.into(),
            evidence: evidence.into(),
            role_category: None,
        }
    }

    #[test]
    fn repetition_heavy_drivers_select_type_a() {
        let drivers = vec![
            driver("반복되는 회피", "매번 같은 상황에서 미루게 된다"),
            driver("결과에 대한 걱정", "잘 안 되면 어떡하나 싶다"),
            driver("주변의 시선", "동료들이 어떻게 생각할지 신경 쓰인다"),
        ];
        let sel = select(&drivers, &mut Fixed(0));
        assert_eq!(sel.question_type, QuestionType::A);
        assert_eq!(sel.linked_driver, "반복되는 회피");
        assert_eq!(sel.question, REPETITION_TEMPLATES[0]);
    }

    #[test]
    fn aggregate_tie_prefers_a_over_b() {
        // A: 패턴 (1)  B: 통제 (1)
        let drivers = vec![
            driver("같은 패턴", "비슷한 일이 생기면 그렇게 된다"),
            driver("통제감", "상황이 손에서 벗어난 느낌이 든다"),
            driver("이직 제안", "연봉 조건이 지금 회사와 다르다"),
        ];
        let board = Scoreboard::compute(&drivers, &SubstringMatcher);
        assert_eq!(
            board.aggregate.get(QuestionType::A),
            board.aggregate.get(QuestionType::B)
        );
        let sel = select(&drivers, &mut Fixed(1));
        assert_eq!(sel.question_type, QuestionType::A);
        assert_eq!(sel.linked_driver, "같은 패턴");
        assert_eq!(sel.question, REPETITION_TEMPLATES[1]);
    }

    #[test]
    fn b_beats_c_on_tie() {
        let drivers = vec![
            driver("위험 부담", "잘못되면 되돌릴 수 없다는 생각"),
            driver("평가", "상사가 나를 어떻게 볼지 모른다"),
        ];
        let sel = select(&drivers, &mut Fixed(0));
        assert_eq!(sel.question_type, QuestionType::B);
        assert_eq!(sel.linked_driver, "위험 부담");
    }

    #[test]
    fn first_driver_to_reach_maximum_keeps_the_link() {
        let drivers = vec![
            driver("자존감", "남들과 비교하게 된다"),
            driver("기대", "부모님의 기대와 평가가 무겁다"),
            driver("인정 욕구", "능력을 인정받고 싶다"),
        ];
        // C per-driver: 3 (자존, 남들, 비교), 2 (기대, 평가), 2 (인정, 능력)
        let sel = select(&drivers, &mut Fixed(0));
        assert_eq!(sel.question_type, QuestionType::C);
        assert_eq!(sel.linked_driver, "자존감");

        let drivers = vec![
            driver("기대", "부모님의 기대와 평가가 무겁다"),
            driver("인정 욕구", "능력을 인정받고 싶다"),
        ];
        let sel = select(&drivers, &mut Fixed(0));
        assert_eq!(sel.linked_driver, "기대");
    }

    #[test]
    fn no_hits_falls_back_to_first_driver() {
        let drivers = vec![
            driver("이직 제안", "연봉 조건이 지금 회사와 다르다"),
            driver("출퇴근 거리", "새 회사가 집에서 한 시간 거리다"),
        ];
        let sel = select(&drivers, &mut Fixed(0));
        assert_eq!(sel.question_type, QuestionType::A);
        assert_eq!(sel.linked_driver, "이직 제안");
    }

    #[test]
    fn empty_drivers_link_to_empty_name() {
        let sel = select(&[], &mut Fixed(0));
        assert_eq!(sel.question_type, QuestionType::A);
        assert_eq!(sel.linked_driver, "");
        assert!(REPETITION_TEMPLATES.contains(&sel.question.as_str()));
    }

    #[test]
    fn out_of_range_pick_is_clamped() {
        let sel = select(&[], &mut Fixed(99));
        assert_eq!(sel.question, REPETITION_TEMPLATES[1]);
    }

    #[test]
    fn seeded_rng_draws_from_the_selected_templates() {
        let drivers = vec![driver("통제 불능", "결과를 예측할 수 없어 불확실하다")];
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let sel = select(&drivers, &mut rng);
            assert_eq!(sel.question_type, QuestionType::B);
            assert!(CONTROL_TEMPLATES.contains(&sel.question.as_str()));
        }
    }

    #[test]
    fn every_type_has_two_templates() {
        for ty in QuestionType::PRIORITY {
            assert_eq!(templates(ty).len(), 2);
        }
    }
}
