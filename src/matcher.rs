//! Matcher: scores free-text input against every catalog entry.
//!
//! Each entry gets a keyword score (a fixed bonus per keyword found as a
//! substring of the input) plus a question-similarity score. The highest
//! total wins if it clears the threshold; the first entry wins ties.
//!
//! # Performance
//! - O(n*k) keyword checks where n=entries, k=keywords per entry
//! - O(n*w1*w2) word-pair checks for similarity

use crate::knowledge::{KnowledgeEntry, KnowledgeStore};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

/// Reply for empty or whitespace-only input
pub const EMPTY_INPUT_MESSAGE: &str =
    "Please type a question or message, and I'll do my best to help you learn about SmartServe!";

/// Reply when no entry clears the threshold
pub const FALLBACK_MESSAGE: &str = "I'm not sure I understand that question. Could you try rephrasing? You can ask me about SmartServe's features, benefits, pricing, how it works, complaint handling, or any other aspect of our AI-powered platform. For example, try asking 'What is SmartServe?' or 'How does the AI analysis work?'";

lazy_static! {
    static ref RE_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

// ============================================================================
// Scoring Weights
// ============================================================================

/// Scoring weights for the two match types
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    /// Added for every keyword found in the input (uncapped)
    pub keyword: f64,
    /// Input equals the question
    pub exact: f64,
    /// Input contains the question or vice versa
    pub containment: f64,
    /// Best total must be strictly greater than this
    pub threshold: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            keyword: 0.3,
            exact: 1.0,
            containment: 0.8,
            threshold: 0.2,
        }
    }
}

// ============================================================================
// Match Result
// ============================================================================

/// The best-scoring entry with its score breakdown
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult<'a> {
    #[serde(skip)]
    pub entry: &'a KnowledgeEntry,
    /// Position of the entry in the catalog
    pub index: usize,
    pub keyword_score: f64,
    pub similarity_score: f64,
    pub total: f64,
    /// Keywords that hit the input
    pub evidence: Vec<String>,
}

impl MatchResult<'_> {
    /// Whether the total clears the answer threshold.
    pub fn is_confident(&self, weights: &ScoringWeights) -> bool {
        self.total > weights.threshold
    }
}

/// Lowercase and trim user input.
pub fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Compare two strings: exact match, containment, then word-overlap ratio.
///
/// The overlap counts every word pair that is equal or where one word contains
/// the other, so repeated short words can push the ratio above 1.
pub fn calculate_similarity(a: &str, b: &str, weights: &ScoringWeights) -> f64 {
    let s1 = a.to_lowercase();
    let s2 = b.to_lowercase();

    if s1 == s2 {
        return weights.exact;
    }
    if s1.contains(&s2) || s2.contains(&s1) {
        return weights.containment;
    }

    let words1: Vec<&str> = RE_WHITESPACE.split(&s1).collect();
    let words2: Vec<&str> = RE_WHITESPACE.split(&s2).collect();

    let mut matches = 0usize;
    for w1 in &words1 {
        for w2 in &words2 {
            if w1 == w2 || w1.contains(w2) || w2.contains(w1) {
                matches += 1;
            }
        }
    }

    matches as f64 / words1.len().max(words2.len()) as f64
}

// ============================================================================
// Matcher
// ============================================================================

/// Linear-scan matcher over a borrowed knowledge store.
pub struct Matcher<'a> {
    store: &'a KnowledgeStore,
    weights: ScoringWeights,
}

impl<'a> Matcher<'a> {
    pub fn new(store: &'a KnowledgeStore) -> Self {
        Self::with_weights(store, ScoringWeights::default())
    }

    pub fn with_weights(store: &'a KnowledgeStore, weights: ScoringWeights) -> Self {
        Self { store, weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score a single entry against already-normalized input.
    pub fn score_entry(
        &self,
        normalized: &str,
        index: usize,
        entry: &'a KnowledgeEntry,
    ) -> MatchResult<'a> {
        let mut keyword_score = 0.0;
        let mut evidence: Vec<String> = Vec::new();

        for keyword in &entry.keywords {
            if normalized.contains(keyword.to_lowercase().as_str()) {
                keyword_score += self.weights.keyword;
                evidence.push(format!("keyword:{}", keyword));
            }
        }

        let similarity_score = calculate_similarity(normalized, &entry.question, &self.weights);

        MatchResult {
            entry,
            index,
            keyword_score,
            similarity_score,
            total: keyword_score + similarity_score,
            evidence,
        }
    }

    /// Highest-scoring entry for the input, regardless of threshold.
    ///
    /// Returns `None` for empty input or when every entry scores zero.
    pub fn best_match(&self, input: &str) -> Option<MatchResult<'a>> {
        let normalized = normalize(input);
        if normalized.is_empty() {
            return None;
        }

        let mut best: Option<MatchResult<'a>> = None;
        let mut best_score = 0.0;

        for (index, entry) in self.store.entries().iter().enumerate() {
            let scored = self.score_entry(&normalized, index, entry);
            // Strictly greater: first-seen entry wins ties
            if scored.total > best_score {
                best_score = scored.total;
                best = Some(scored);
            }
        }

        if let Some(m) = &best {
            debug!(
                "Best match #{} '{}' (keyword {:.2} + similarity {:.2} = {:.2})",
                m.index, m.entry.question, m.keyword_score, m.similarity_score, m.total
            );
        }

        best
    }

    /// Answer for the input: the best entry's answer above the threshold,
    /// otherwise a fixed fallback. Never fails.
    pub fn find_answer(&self, input: &str) -> String {
        if normalize(input).is_empty() {
            return EMPTY_INPUT_MESSAGE.to_string();
        }

        match self.best_match(input) {
            Some(m) if m.is_confident(&self.weights) => m.entry.answer.clone(),
            _ => {
                debug!("No entry cleared threshold {}", self.weights.threshold);
                FALLBACK_MESSAGE.to_string()
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
