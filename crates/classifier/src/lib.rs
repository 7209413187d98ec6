//! Query classification — scoring a query against the category registry.
//!
//! Two signals per category, combined with configurable weights:
//!
//! - **keyword score**: how many distinct keywords occur as substrings of
//!   the normalized query
//! - **example score**: the best token Jaccard overlap between the query
//!   and the category's example queries
//!
//! The highest combined score wins; ties go to the earlier-registered
//! category. When nothing scores, the registry's fallback category is
//! assigned with confidence 0.0. Classification never fails and has no
//! side effects.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crabdesk_core::category::{CategoryDefinition, CategoryRegistry};
use crabdesk_core::classify::{CategoryScore, ClassificationResult};

/// A classifier over one registry with fixed weights.
pub struct Classifier {
    registry: Arc<CategoryRegistry>,
    keyword_weight: f32,
    example_weight: f32,
}

impl Classifier {
    pub fn new(registry: Arc<CategoryRegistry>, keyword_weight: f32, example_weight: f32) -> Self {
        Self { registry, keyword_weight, example_weight }
    }

    /// Classify a query. Deterministic for a given registry and weights.
    pub fn classify(&self, query: &str) -> ClassificationResult {
        let normalized = query.trim().to_lowercase();
        let query_tokens = tokens(&normalized);

        let mut scores = Vec::with_capacity(self.registry.len());
        let mut winner: Option<(usize, f32)> = None;

        for (index, category) in self.registry.list().iter().enumerate() {
            let score = self.score_category(category, &normalized, &query_tokens);
            // Strict comparison: an equal score never displaces an
            // earlier-registered category.
            if score.combined > 0.0
                && winner.is_none_or(|(_, best)| score.combined > best)
            {
                winner = Some((index, score.combined));
            }
            scores.push(score);
        }

        let result = match winner {
            Some((index, combined)) => {
                let category = &self.registry.list()[index];
                ClassificationResult {
                    category: category.id.clone(),
                    confidence: self.confidence(category, combined),
                    route: category.route,
                    scores,
                }
            }
            None => {
                let fallback = self.registry.fallback();
                ClassificationResult {
                    category: fallback.id.clone(),
                    confidence: 0.0,
                    route: fallback.route,
                    scores,
                }
            }
        };

        debug!(
            category = %result.category,
            confidence = result.confidence,
            "query classified"
        );
        result
    }

    fn score_category(
        &self,
        category: &CategoryDefinition,
        normalized: &str,
        query_tokens: &HashSet<String>,
    ) -> CategoryScore {
        let keyword_hits = category
            .keywords
            .iter()
            .filter(|kw| !kw.is_empty() && normalized.contains(kw.to_lowercase().as_str()))
            .count();

        let example_score = category
            .examples
            .iter()
            .map(|example| jaccard(query_tokens, &tokens(&example.to_lowercase())))
            .fold(0.0_f32, f32::max);

        let combined =
            self.keyword_weight * keyword_hits as f32 + self.example_weight * example_score;

        CategoryScore {
            category: category.id.clone(),
            keyword_hits,
            example_score,
            combined,
        }
    }

    /// Normalize a winning score by the category's maximum possible score
    /// (every keyword matched plus a perfect example overlap).
    fn confidence(&self, category: &CategoryDefinition, combined: f32) -> f32 {
        let max_possible =
            self.keyword_weight * category.keywords.len() as f32 + self.example_weight;
        if max_possible <= 0.0 {
            return 0.0;
        }
        (combined / max_possible).clamp(0.0, 1.0)
    }
}

/// Alphanumeric tokens of a string, lowercased by the caller.
fn tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

/// Token Jaccard overlap: |a ∩ b| / |a ∪ b|. 0.0 when either side is empty.
fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f32 / union as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crabdesk_core::category::RoutePreference;

    fn builtin_classifier() -> Classifier {
        Classifier::new(Arc::new(CategoryRegistry::builtin()), 1.0, 1.0)
    }

    fn category(id: &str, keywords: &[&str]) -> CategoryDefinition {
        CategoryDefinition {
            id: id.into(),
            description: id.into(),
            prompt_template: "{query} {context}".into(),
            examples: vec![],
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            route: RoutePreference::Support,
        }
    }

    #[test]
    fn password_reset_classifies_to_account_security() {
        let result = builtin_classifier().classify("How do I reset my password?");
        assert_eq!(result.category, "account_security");
        assert!(result.confidence > 0.0);
        assert!(result.confidence <= 1.0);
        assert_eq!(result.route, RoutePreference::Support);
    }

    #[test]
    fn unmatched_query_falls_back_with_zero_confidence() {
        let result = builtin_classifier().classify("zzz qqq xyzzy");
        assert_eq!(result.category, "general_support");
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.route, RoutePreference::Knowledge);
    }

    #[test]
    fn empty_query_falls_back() {
        let result = builtin_classifier().classify("   ");
        assert_eq!(result.category, "general_support");
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn classification_is_deterministic() {
        let classifier = builtin_classifier();
        let a = classifier.classify("my package never arrived, where is my order?");
        let b = classifier.classify("my package never arrived, where is my order?");
        assert_eq!(a.category, b.category);
        assert_eq!(a.confidence, b.confidence);
    }

    #[test]
    fn tie_goes_to_earlier_registered_category() {
        let registry = CategoryRegistry::new(
            vec![
                category("first", &["blue"]),
                category("second", &["blue"]),
                category("misc", &[]),
            ],
            "misc",
        )
        .unwrap();
        let classifier = Classifier::new(Arc::new(registry), 1.0, 1.0);

        let result = classifier.classify("I bought a blue one");
        assert_eq!(result.category, "first");
        assert_eq!(result.scores[0].combined, result.scores[1].combined);
    }

    #[test]
    fn repeated_keyword_counts_once() {
        let result = builtin_classifier().classify("password password password");
        let account = result
            .scores
            .iter()
            .find(|s| s.category == "account_security")
            .unwrap();
        assert_eq!(account.keyword_hits, 1);
    }

    #[test]
    fn scores_cover_every_category_in_registry_order() {
        let registry = CategoryRegistry::builtin();
        let expected: Vec<_> = registry.list().iter().map(|c| c.id.clone()).collect();
        let result = builtin_classifier().classify("where is my refund");
        let got: Vec<_> = result.scores.iter().map(|s| s.category.clone()).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn exact_example_match_scores_full_overlap() {
        let result = builtin_classifier().classify("How do I reset my password?");
        let account = result
            .scores
            .iter()
            .find(|s| s.category == "account_security")
            .unwrap();
        assert!((account.example_score - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn confidence_stays_in_unit_range() {
        let classifier = builtin_classifier();
        let queries = [
            "password reset login account locked security authentication 2fa two-factor",
            "return refund exchange money back warranty replacement defective",
            "hello",
        ];
        for q in queries {
            let result = classifier.classify(q);
            assert!(result.confidence >= 0.0, "{q}");
            assert!(result.confidence <= 1.0, "{q}");
        }
    }

    #[test]
    fn jaccard_of_disjoint_sets_is_zero() {
        let a = tokens("alpha beta");
        let b = tokens("gamma delta");
        assert_eq!(jaccard(&a, &b), 0.0);
    }

    #[test]
    fn jaccard_ignores_punctuation() {
        let a = tokens("how do i reset my password?");
        let b = tokens("how do i reset my password");
        assert!((jaccard(&a, &b) - 1.0).abs() < f32::EPSILON);
    }
}
