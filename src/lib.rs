//! decision-lab: structural analysis of pre-decision anxiety narratives.
//!
//! A language model names the anxiety drivers; everything else
//! (validation, role classification, meta-question selection, retry and
//! fallback) is deterministic and local.

pub mod classifier;
pub mod clients;
pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod lexicon;
pub mod orchestrator;
pub mod prompts;
pub mod schemas;
pub mod selector;
pub mod validator;

pub use error::{DecisionLabError, Result};
pub use orchestrator::{Analyzer, Orchestrator, fallback_result};
pub use schemas::{AnalysisResult, Driver, QuestionType, RoleCategory};
