//! Role classification for extracted drivers
//!
//! Each driver is scored against [`ROLE_LEXICON`] over its lowercased
//! `name evidence` text. The highest score wins, ties resolve in
//! [`RoleCategory::PRIORITY`] order and a driver with no hits at all is
//! `sustain`. A batch that comes out entirely `sustain` carries no structure,
//! so its first driver is promoted to `amplify`.

use crate::lexicon::{KeywordMatcher, ROLE_LEXICON, SubstringMatcher};
use crate::schemas::{Driver, DriverDraft, RoleCategory};

/// Classify drivers with substring keyword matching
pub fn classify(drivers: &[DriverDraft]) -> Vec<Driver> {
    classify_with(drivers, &SubstringMatcher)
}

/// Classify drivers with an explicit matching strategy
pub fn classify_with(drivers: &[DriverDraft], matcher: &dyn KeywordMatcher) -> Vec<Driver> {
    let mut classified: Vec<Driver> = drivers
        .iter()
        .map(|d| Driver {
            name: d.name.clone(),
            evidence: d.evidence.clone(),
            role_category: Some(role_for(d, matcher)),
        })
        .collect();

    apply_collapse_correction(&mut classified);
    classified
}

/// Category for a single driver, before the batch-level correction
pub fn role_for(driver: &DriverDraft, matcher: &dyn KeywordMatcher) -> RoleCategory {
    let text = driver.scoring_text();

    let mut best = RoleCategory::Sustain;
    let mut best_score = 0;
    for category in RoleCategory::PRIORITY {
        let score = ROLE_LEXICON.score(category, &text, matcher);
        if score > best_score {
            best_score = score;
            best = category;
        }
    }
    best
}

fn apply_collapse_correction(drivers: &mut [Driver]) {
    let all_sustain = drivers
        .iter()
        .all(|d| d.role_category == Some(RoleCategory::Sustain));
    if all_sustain && let Some(first) = drivers.first_mut() {
        tracing::debug!("all drivers classified sustain, promoting first to amplify");
        first.role_category = Some(RoleCategory::Amplify);
    }
}
