//! Résumé quality evaluation by the model server.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm_client::prompts::evaluation_prompt;
use crate::llm_client::LlmClient;
use crate::screening::provenance::Sourced;

pub const FALLBACK_SCORE: i64 = 50;
pub const FALLBACK_SUMMARY: &str = "Could not evaluate resume.";
const MISSING_SUMMARY: &str = "No summary provided.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeEvaluation {
    /// 0 – 100
    pub score: i64,
    pub summary: String,
}

impl ResumeEvaluation {
    pub fn fallback() -> Self {
        Self {
            score: FALLBACK_SCORE,
            summary: FALLBACK_SUMMARY.to_string(),
        }
    }
}

fn score_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Score:\s*([0-9]+)").expect("static score regex"))
}

fn summary_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)Summary:\s*(.*)").expect("static summary regex"))
}

/// Reads `Score:` / `Summary:` fields from the model's reply.
/// A missing field takes its default; `None` only when both are absent.
pub fn parse_evaluation(text: &str) -> Option<ResumeEvaluation> {
    let score = score_regex()
        .captures(text)
        // Only overflow fails to parse an ASCII digit run.
        .and_then(|c| c[1].parse::<i64>().ok().or(Some(i64::MAX)))
        .map(|s| s.clamp(0, 100));
    let summary = summary_regex()
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty());

    if score.is_none() && summary.is_none() {
        return None;
    }

    Some(ResumeEvaluation {
        score: score.unwrap_or(FALLBACK_SCORE),
        summary: summary.unwrap_or_else(|| MISSING_SUMMARY.to_string()),
    })
}

pub async fn evaluate_resume(llm: &LlmClient, resume_text: &str) -> Sourced<ResumeEvaluation> {
    match llm.generate(&evaluation_prompt(resume_text)).await {
        Ok(text) => match parse_evaluation(&text) {
            Some(evaluation) => Sourced::model(evaluation),
            None => {
                warn!("Resume evaluation reply had neither Score nor Summary; using fallback");
                Sourced::fallback(ResumeEvaluation::fallback())
            }
        },
        Err(e) => {
            warn!("Resume evaluation failed: {e}; using fallback");
            Sourced::fallback(ResumeEvaluation::fallback())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_score_and_multiline_summary() {
        let reply = "Score: 82\nSummary: Strong backend profile.\nLacks cloud exposure.";
        let eval = parse_evaluation(reply).unwrap();
        assert_eq!(eval.score, 82);
        assert_eq!(eval.summary, "Strong backend profile.\nLacks cloud exposure.");
    }

    #[test]
    fn test_parse_clamps_score() {
        let eval = parse_evaluation("Score: 140\nSummary: ok").unwrap();
        assert_eq!(eval.score, 100);
    }

    #[test]
    fn test_parse_huge_score_clamps_instead_of_failing() {
        let eval = parse_evaluation("Score: 99999999999999999999999").unwrap();
        assert_eq!(eval.score, 100);
    }

    #[test]
    fn test_parse_non_ascii_digits_are_not_a_score() {
        let eval = parse_evaluation("Score: \u{664}\u{660}\nSummary: ok").unwrap();
        assert_eq!(eval.score, 50);
        assert_eq!(eval.summary, "ok");
    }

    #[test]
    fn test_parse_missing_summary_uses_default() {
        let eval = parse_evaluation("Score: 70").unwrap();
        assert_eq!(eval.score, 70);
        assert_eq!(eval.summary, "No summary provided.");
    }

    #[test]
    fn test_parse_missing_score_uses_default() {
        let eval = parse_evaluation("Summary: decent").unwrap();
        assert_eq!(eval.score, 50);
    }

    #[test]
    fn test_parse_unstructured_reply_is_none() {
        assert_eq!(parse_evaluation("I cannot evaluate this document."), None);
    }

    #[test]
    fn test_fallback_values() {
        let eval = ResumeEvaluation::fallback();
        assert_eq!(eval.score, 50);
        assert_eq!(eval.summary, "Could not evaluate resume.");
    }
}
