//! Data model shared by the validator, classifier, selector and HTTP layer

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a driver functions inside the anxiety structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleCategory {
    Amplify,
    Sustain,
    Fixate,
}

impl RoleCategory {
    /// Scoring order; on equal scores the earlier entry wins.
    pub const PRIORITY: [RoleCategory; 3] = [
        RoleCategory::Amplify,
        RoleCategory::Fixate,
        RoleCategory::Sustain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleCategory::Amplify => "amplify",
            RoleCategory::Sustain => "sustain",
            RoleCategory::Fixate => "fixate",
        }
    }
}

impl fmt::Display for RoleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reflective question taxonomy: repetition (A), control (B), identity (C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    A,
    B,
    C,
}

impl QuestionType {
    /// Scoring order; on equal aggregate scores the earlier entry wins.
    pub const PRIORITY: [QuestionType; 3] = [QuestionType::A, QuestionType::B, QuestionType::C];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::A => "A",
            QuestionType::B => "B",
            QuestionType::C => "C",
        }
    }

    fn index(&self) -> usize {
        match self {
            QuestionType::A => 0,
            QuestionType::B => 1,
            QuestionType::C => 2,
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-type scores indexed by [`QuestionType`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeScores([usize; 3]);

impl TypeScores {
    pub fn get(&self, ty: QuestionType) -> usize {
        self.0[ty.index()]
    }

    pub fn add(&mut self, ty: QuestionType, hits: usize) {
        self.0[ty.index()] += hits;
    }
}

fn scoring_text(name: &str, evidence: &str) -> String {
    format!("{} {}", name, evidence).to_lowercase()
}

/// A driver as extracted from the model, before classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverDraft {
    pub name: String,
    pub evidence: String,
}

impl DriverDraft {
    pub fn new(name: impl Into<String>, evidence: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            evidence: evidence.into(),
        }
    }

    /// Lowercased `name evidence` text that both lexicons are scored against
    pub fn scoring_text(&self) -> String {
        scoring_text(&self.name, &self.evidence)
    }
}

/// A named, evidenced factor contributing to the user's anxiety
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub name: String,
    pub evidence: String,
    #[serde(rename = "roleCategory", skip_serializing_if = "Option::is_none")]
    pub role_category: Option<RoleCategory>,
}

impl Driver {
    pub fn scoring_text(&self) -> String {
        scoring_text(&self.name, &self.evidence)
    }
}

/// Post-hoc content flags. Always false: non-conforming text is rejected upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisallowedCheck {
    pub contains_advice: bool,
    pub contains_recommendation: bool,
    pub contains_rankings: bool,
}

/// Final structured report returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub drivers: Vec<Driver>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure_flow: Option<String>,
    pub meta_question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_driver: Option<String>,
    pub disallowed_check: DisallowedCheck,
}

impl AnalysisResult {
    /// True when `linked_driver` is absent or names one of `drivers` exactly
    pub fn linked_driver_is_bound(&self) -> bool {
        match &self.linked_driver {
            None => true,
            Some(name) => self.drivers.iter().any(|d| &d.name == name),
        }
    }
}

/// HTTP envelope for `/api/analyze`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<AnalysisResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResponse {
    pub fn ok(data: AnalysisResult) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}
