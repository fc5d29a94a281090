//! Static keyword tables for role and question-type scoring
//!
//! Keywords are lowercase substrings. Matching is plain containment against
//! lowercased text, so a keyword also hits inside longer words. The
//! [`KeywordMatcher`] trait is the seam for swapping in tokenized matching
//! without touching the scoring code in the classifier and selector.

use crate::schemas::{QuestionType, RoleCategory};

/// Strategy for counting how many keywords of a set occur in a text
pub trait KeywordMatcher: Send + Sync {
    /// `text` is already lowercased. Returns the number of distinct keywords hit.
    fn hits(&self, text: &str, keywords: &[&str]) -> usize;
}

/// Substring containment, one hit per keyword regardless of repetitions
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl KeywordMatcher for SubstringMatcher {
    fn hits(&self, text: &str, keywords: &[&str]) -> usize {
        keywords.iter().filter(|kw| text.contains(*kw)).count()
    }
}

/// Ordered mapping from category label to keyword set
#[derive(Debug)]
pub struct Lexicon<K: 'static> {
    entries: &'static [(K, &'static [&'static str])],
}

impl<K: Copy + PartialEq> Lexicon<K> {
    pub const fn new(entries: &'static [(K, &'static [&'static str])]) -> Self {
        Self { entries }
    }

    /// Keywords for `category`; empty when the table has no entry for it
    pub fn keywords(&self, category: K) -> &'static [&'static str] {
        self.entries
            .iter()
            .find(|(k, _)| *k == category)
            .map(|(_, kws)| *kws)
            .unwrap_or(&[])
    }

    /// Hit count of `category` keywords in an already-lowercased text
    pub fn score(&self, category: K, text: &str, matcher: &dyn KeywordMatcher) -> usize {
        matcher.hits(text, self.keywords(category))
    }
}

const AMPLIFY_KEYWORDS: &[&str] = &[
    "불안", "두려", "걱정", "공포", "최악", "커지", "증폭", "악화", "압박", "부담", "조급",
    "fear", "panic", "worse", "pressure",
];

const SUSTAIN_KEYWORDS: &[&str] = &[
    "계속", "지속", "유지", "익숙", "습관", "매일", "오랫동안", "여전히", "버티", "머무",
    "continue", "habit", "always",
];

const FIXATE_KEYWORDS: &[&str] = &[
    "집착", "고착", "반복", "되풀이", "맴돌", "벗어나지", "머릿속", "떠나지", "붙잡", "곱씹",
    "stuck", "obsess", "replay",
];

const REPETITION_KEYWORDS: &[&str] = &[
    "반복", "매번", "또다시", "되풀이", "패턴", "미루", "습관", "늘 같은", "again", "pattern",
    "every time",
];

const CONTROL_KEYWORDS: &[&str] = &[
    "통제", "불확실", "예측", "모르겠", "알 수 없", "확신", "변수", "위험", "결과", "control",
    "uncertain", "risk",
];

const IDENTITY_KEYWORDS: &[&str] = &[
    "평가", "시선", "인정", "자존", "능력", "비교", "기대", "실망", "남들", "judg", "expect",
    "worth",
];

/// Role taxonomy: how a driver functions within the anxiety structure
pub static ROLE_LEXICON: Lexicon<RoleCategory> = Lexicon::new(&[
    (RoleCategory::Amplify, AMPLIFY_KEYWORDS),
    (RoleCategory::Sustain, SUSTAIN_KEYWORDS),
    (RoleCategory::Fixate, FIXATE_KEYWORDS),
]);

/// Question taxonomy: repetition pattern (A), control and uncertainty (B),
/// identity and evaluation (C)
pub static QUESTION_LEXICON: Lexicon<QuestionType> = Lexicon::new(&[
    (QuestionType::A, REPETITION_KEYWORDS),
    (QuestionType::B, CONTROL_KEYWORDS),
    (QuestionType::C, IDENTITY_KEYWORDS),
]);

/// Advice, recommendation and endorsement phrasing that a summary must not contain
pub const DISALLOWED_PATTERNS: &[&str] = &[
    "하세요",
    "해보세요",
    "추천",
    "권장",
    "권합니다",
    "나라면",
    "더 나은 선택",
    "최선의 선택",
    "하는 것이 좋",
    "하는 게 좋",
    "해야 합니다",
    "should",
    "recommend",
    "i suggest",
    "you must",
    "better choice",
    "best option",
];

/// First disallowed pattern found in `text`, compared case-insensitively
pub fn find_disallowed(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    DISALLOWED_PATTERNS
        .iter()
        .copied()
        .find(|pattern| lower.contains(pattern))
}
