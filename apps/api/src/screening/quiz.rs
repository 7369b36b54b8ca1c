//! Quiz generation and grading.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm_client::prompts::quiz_prompt;
use crate::llm_client::{extract_json_array, strip_json_fences, LlmClient, LlmError};
use crate::screening::provenance::Sourced;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

/// A question as shown to the candidate, without the answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicQuestion {
    pub index: usize,
    pub question: String,
    pub options: Vec<String>,
}

impl QuizQuestion {
    fn new(question: &str, options: [&str; 4], answer: &str) -> Self {
        Self {
            question: question.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            answer: answer.to_string(),
        }
    }

    /// Answerable: non-empty prompt and the answer is one of the options.
    pub fn is_well_formed(&self) -> bool {
        !self.question.trim().is_empty() && self.options.iter().any(|o| o == &self.answer)
    }

    pub fn public(&self, index: usize) -> PublicQuestion {
        PublicQuestion {
            index,
            question: self.question.clone(),
            options: self.options.clone(),
        }
    }
}

/// Static bank served whenever the model cannot produce a usable quiz.
pub fn fallback_questions() -> Vec<QuizQuestion> {
    vec![
        QuizQuestion::new(
            "What is polymorphism?",
            ["Many forms", "Database", "Networking", "None"],
            "Many forms",
        ),
        QuizQuestion::new(
            "What is inheritance?",
            ["Class hierarchy", "Variables", "Loop", "None"],
            "Class hierarchy",
        ),
        QuizQuestion::new(
            "What is encapsulation?",
            ["Data hiding", "Speed", "Sorting", "None"],
            "Data hiding",
        ),
        QuizQuestion::new(
            "What does API stand for?",
            ["Application Programming Interface", "Apple Pie", "Array", "None"],
            "Application Programming Interface",
        ),
        QuizQuestion::new(
            "What is a primary key?",
            ["Unique identifier", "String", "Foreign key", "None"],
            "Unique identifier",
        ),
    ]
}

/// Parses the model's free text into questions, keeping only well-formed ones.
pub fn parse_quiz_response(text: &str) -> Result<Vec<QuizQuestion>, LlmError> {
    let text = strip_json_fences(text);
    let payload = extract_json_array(text).unwrap_or(text);
    let questions: Vec<QuizQuestion> = serde_json::from_str(payload)?;

    let total = questions.len();
    let valid: Vec<QuizQuestion> = questions.into_iter().filter(|q| q.is_well_formed()).collect();
    if valid.len() < total {
        warn!(
            "Discarded {} of {} generated questions whose answer is not among the options",
            total - valid.len(),
            total
        );
    }
    Ok(valid)
}

/// Asks the model for a quiz tailored to the candidate.
pub async fn generate_quiz(
    llm: &LlmClient,
    experience: i64,
    skills: &str,
) -> Sourced<Vec<QuizQuestion>> {
    let result = match llm.generate(&quiz_prompt(experience, skills)).await {
        Ok(text) => parse_quiz_response(&text),
        Err(e) => Err(e),
    };

    match result {
        Ok(questions) if !questions.is_empty() => Sourced::model(questions),
        Ok(_) => {
            warn!("Model returned no usable quiz questions; serving fallback bank");
            Sourced::fallback(fallback_questions())
        }
        Err(e) => {
            warn!("Quiz generation failed: {e}; serving fallback bank");
            Sourced::fallback(fallback_questions())
        }
    }
}

/// Percentage of correct answers, truncated. `answers[i]` answers `questions[i]`.
pub fn grade_quiz(questions: &[QuizQuestion], answers: &[Option<String>]) -> i64 {
    if questions.is_empty() {
        return 0;
    }
    let correct = questions
        .iter()
        .enumerate()
        .filter(|(i, q)| {
            answers
                .get(*i)
                .and_then(|a| a.as_deref())
                .is_some_and(|a| a == q.answer)
        })
        .count();
    (correct * 100 / questions.len()) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(items: &[Option<&str>]) -> Vec<Option<String>> {
        items.iter().map(|a| a.map(str::to_string)).collect()
    }

    #[test]
    fn test_fallback_bank_is_five_well_formed_questions() {
        let bank = fallback_questions();
        assert_eq!(bank.len(), 5);
        assert!(bank.iter().all(QuizQuestion::is_well_formed));
    }

    #[test]
    fn test_parse_extracts_array_from_prose() {
        let text = r#"Here you go:
[{"question": "2+2?", "options": ["3", "4", "5", "6"], "answer": "4"}]
Hope that helps!"#;
        let questions = parse_quiz_response(text).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].answer, "4");
    }

    #[test]
    fn test_parse_drops_questions_with_foreign_answer() {
        let text = r#"[
            {"question": "Q1", "options": ["a", "b", "c", "d"], "answer": "a"},
            {"question": "Q2", "options": ["a", "b", "c", "d"], "answer": "z"}
        ]"#;
        let questions = parse_quiz_response(text).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "Q1");
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(parse_quiz_response("[{\"question\": ").is_err());
        assert!(parse_quiz_response("no json at all").is_err());
    }

    #[test]
    fn test_grade_all_correct() {
        let bank = fallback_questions();
        let all: Vec<Option<String>> = bank.iter().map(|q| Some(q.answer.clone())).collect();
        assert_eq!(grade_quiz(&bank, &all), 100);
    }

    #[test]
    fn test_grade_truncates_and_handles_missing_answers() {
        let bank = &fallback_questions()[..3];
        let given = answers(&[Some("Many forms"), None]);
        // 1 of 3 = 33.3 → 33
        assert_eq!(grade_quiz(bank, &given), 33);
    }

    #[test]
    fn test_grade_empty_quiz_is_zero() {
        assert_eq!(grade_quiz(&[], &answers(&[Some("x")])), 0);
    }

    #[test]
    fn test_public_view_hides_answer() {
        let q = &fallback_questions()[0];
        let public = serde_json::to_value(q.public(0)).unwrap();
        assert!(public.get("answer").is_none());
        assert_eq!(public["options"].as_array().unwrap().len(), 4);
    }
}
