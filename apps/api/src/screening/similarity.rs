//! Lexical résumé/job similarity: TF-IDF over exactly the two input documents,
//! compared by cosine similarity.
//!
//! Weighting follows the usual vectorizer defaults: lower-cased tokens of two
//! or more word characters, English stop words removed, raw term counts,
//! smoothed idf `ln((1 + n) / (1 + df)) + 1`, L2-normalised rows.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use regex::Regex;

use crate::screening::stop_words::is_stop_word;

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("static token regex"))
}

/// Lower-cases `text` and returns its non-stop-word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    token_regex()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|t| !is_stop_word(t))
        .map(str::to_string)
        .collect()
}

fn term_counts(tokens: &[String]) -> HashMap<&str, f64> {
    let mut counts = HashMap::new();
    for t in tokens {
        *counts.entry(t.as_str()).or_insert(0.0) += 1.0;
    }
    counts
}

/// Builds L2-normalised TF-IDF vectors for `docs` over their shared vocabulary.
/// Returns `None` when the vocabulary is empty.
pub fn tfidf_vectors(docs: &[&str]) -> Option<Vec<Vec<f64>>> {
    let tokenized: Vec<Vec<String>> = docs.iter().map(|d| tokenize(d)).collect();
    let counts: Vec<HashMap<&str, f64>> = tokenized.iter().map(|t| term_counts(t)).collect();

    // BTreeMap keeps the column order deterministic.
    let mut df: BTreeMap<&str, f64> = BTreeMap::new();
    for doc in &counts {
        for term in doc.keys() {
            *df.entry(term).or_insert(0.0) += 1.0;
        }
    }
    if df.is_empty() {
        return None;
    }

    let n = docs.len() as f64;
    let idf: Vec<(&str, f64)> = df
        .iter()
        .map(|(term, df)| (*term, ((1.0 + n) / (1.0 + df)).ln() + 1.0))
        .collect();

    let vectors = counts
        .iter()
        .map(|doc| {
            let mut row: Vec<f64> = idf
                .iter()
                .map(|(term, w)| doc.get(term).copied().unwrap_or(0.0) * w)
                .collect();
            let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                row.iter_mut().for_each(|v| *v /= norm);
            }
            row
        })
        .collect();

    Some(vectors)
}

pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|v| v * v).sum::<f64>().sqrt();
    let nb = b.iter().map(|v| v * v).sum::<f64>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na * nb)
}

/// Similarity of `resume_text` to `job_text` as a percentage rounded to two decimals.
/// Blank input or an all-stop-word vocabulary scores 0.
pub fn match_resume(resume_text: &str, job_text: &str) -> f64 {
    if resume_text.trim().is_empty() || job_text.trim().is_empty() {
        return 0.0;
    }
    let Some(vectors) = tfidf_vectors(&[resume_text, job_text]) else {
        return 0.0;
    };
    let score = cosine_similarity(&vectors[0], &vectors[1]) * 100.0;
    (score * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_texts_score_100() {
        let text = "Senior Python engineer with SQL and Docker experience";
        assert_eq!(match_resume(text, text), 100.0);
    }

    #[test]
    fn test_disjoint_vocabularies_score_zero() {
        let score = match_resume("python django postgres", "welding forklift carpentry");
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_empty_input_scores_zero() {
        assert_eq!(match_resume("", "python developer"), 0.0);
        assert_eq!(match_resume("python developer", "   "), 0.0);
    }

    #[test]
    fn test_stop_words_only_scores_zero() {
        assert_eq!(match_resume("the and of", "with from into"), 0.0);
    }

    #[test]
    fn test_partial_overlap_is_between_bounds() {
        let score = match_resume(
            "python sql machine learning pandas",
            "python docker kubernetes backend",
        );
        assert!(score > 0.0 && score < 100.0, "score was {score}");
    }

    #[test]
    fn test_score_is_deterministic() {
        let a = "react typescript frontend developer";
        let b = "frontend engineer react";
        assert_eq!(match_resume(a, b), match_resume(a, b));
    }

    #[test]
    fn test_tokenize_drops_single_chars_and_stop_words() {
        let tokens = tokenize("I know C and the Rust language");
        assert_eq!(tokens, vec!["know", "rust", "language"]);
    }

    #[test]
    fn test_vectors_are_unit_length() {
        let vectors = tfidf_vectors(&["python sql", "python rust rust"]).unwrap();
        for row in vectors {
            let norm: f64 = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }
}
