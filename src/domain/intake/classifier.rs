//! Deterministic keyword classifier.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

use super::detection::DetectionSource;
use super::policy::AreaCandidate;
use super::services::{AreaClassifier, AreaProfile, ClassificationError};
use crate::domain::foundation::text;

const NAME_WEIGHT: u32 = 2;
const TERM_WEIGHT: u32 = 1;
const MIN_TOKEN_LEN: usize = 3;
const MAX_CONFIDENCE: u32 = 95;

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "los", "las", "del", "una", "uno", "unos", "unas", "que", "por", "para", "con", "sin",
        "hay", "esta", "estan", "este", "esto", "muy", "sus", "pero", "como", "aqui", "todo",
        "desde", "tiene", "tienen", "mas", "nos", "hace", "favor", "ayuda", "problema", "the",
        "and",
    ]
    .into_iter()
    .collect()
});

/// Scores areas by shared words with the problem text.
///
/// Area-name words weigh 2, description and option words weigh 1. The
/// confidence grows with the lead of the best area over the runner-up:
/// `50 + 15 * lead`, capped at 95. A tie therefore never clears a typical
/// threshold.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordAreaClassifier;

impl KeywordAreaClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous core of `classify`.
    pub fn score(&self, problem: &str, areas: &[AreaProfile]) -> Option<AreaCandidate> {
        let problem_stems: HashSet<String> = terms(problem).map(|t| stem(&t)).collect();
        if problem_stems.is_empty() {
            return None;
        }

        let mut scored: Vec<(usize, u32, Vec<String>)> = areas
            .iter()
            .enumerate()
            .map(|(index, area)| {
                let (score, hits) = score_area(area, &problem_stems);
                (index, score, hits)
            })
            .collect();
        scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let (index, best, hits) = scored.first().cloned()?;
        if best == 0 {
            return None;
        }
        let runner_up = scored.get(1).map(|s| s.1).unwrap_or(0);
        let confidence = (50 + 15 * (best - runner_up)).min(MAX_CONFIDENCE);

        Some(AreaCandidate {
            index,
            confidence: confidence as u8,
            rationale: format!("coincidencias: {}", hits.join(", ")),
        })
    }
}

#[async_trait]
impl AreaClassifier for KeywordAreaClassifier {
    fn source(&self) -> DetectionSource {
        DetectionSource::Rules
    }

    async fn classify(
        &self,
        problem: &str,
        areas: &[AreaProfile],
    ) -> Result<Option<AreaCandidate>, ClassificationError> {
        Ok(self.score(problem, areas))
    }
}

fn score_area(area: &AreaProfile, problem_stems: &HashSet<String>) -> (u32, Vec<String>) {
    let mut weights: HashMap<String, u32> = HashMap::new();
    let mut add = |text: &str, weight: u32| {
        for term in terms(text) {
            let entry = weights.entry(stem(&term)).or_insert(0);
            *entry = (*entry).max(weight);
        }
    };

    add(&area.name, NAME_WEIGHT);
    add(&area.description, TERM_WEIGHT);
    for word in &area.vocabulary {
        add(word, TERM_WEIGHT);
    }

    let mut hits: Vec<String> = Vec::new();
    let mut score = 0;
    for (term, weight) in &weights {
        if problem_stems.contains(term) {
            score += weight;
            hits.push(term.clone());
        }
    }
    hits.sort();
    (score, hits)
}

fn terms(text: &str) -> impl Iterator<Item = String> {
    text::tokens(text, MIN_TOKEN_LEN)
        .into_iter()
        .filter(|t| !STOPWORDS.contains(t.as_str()))
}

/// Crude plural folding: drops a trailing `s` and keeps six characters.
fn stem(token: &str) -> String {
    let base = if token.chars().count() > 3 {
        token.strip_suffix('s').unwrap_or(token)
    } else {
        token
    };
    base.chars().take(6).collect()
}
