//! Résumé text and skill extraction.
//!
//! Two independent signals are produced from the lower-cased text:
//! - `count`: how many entries of the short core list appear as substrings
//! - `skills`: the recognised subset of the broad vocabulary, found either as a
//!   whole token or inside a phrase (text between punctuation or line breaks)

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Core list whose substring hits feed the numeric skills feature.
pub const CORE_SKILLS: &[&str] = &[
    "python",
    "java",
    "c++",
    "sql",
    "html",
    "css",
    "machine learning",
    "flask",
];

/// Vocabulary recognised for the stored skills list.
pub const SKILL_VOCABULARY: &[&str] = &[
    "python", "java", "c++", "c#", "javascript", "typescript", "ruby", "php", "go", "rust",
    "sql", "nosql", "mongodb", "postgresql", "mysql", "redis",
    "html", "css", "react", "angular", "vue", "node.js", "express", "django", "flask", "fastapi",
    "machine learning", "deep learning", "nlp", "computer vision", "tensorflow", "pytorch",
    "scikit-learn",
    "aws", "azure", "gcp", "docker", "kubernetes", "ci/cd", "jenkins", "git", "linux",
];

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to extract text from PDF '{path}': {message}")]
    Pdf { path: String, message: String },

    #[error("Unsupported document type: {0}")]
    Unsupported(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillReport {
    pub count: i64,
    /// Sorted, comma-joined.
    pub skills: String,
}

impl SkillReport {
    pub fn skill_list(&self) -> Vec<&str> {
        self.skills
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Reads a résumé into plain text. PDFs go through `pdf-extract`; `.txt` and `.md` are read verbatim.
pub fn extract_resume_text(path: &Path) -> Result<String, ExtractError> {
    let display = path.display().to_string();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => {
            let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
                path: display.clone(),
                source,
            })?;
            // pdf-extract panics on some malformed inputs instead of erroring.
            match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes)) {
                Ok(Ok(text)) => Ok(text),
                Ok(Err(e)) => Err(ExtractError::Pdf {
                    path: display,
                    message: e.to_string(),
                }),
                Err(_) => Err(ExtractError::Pdf {
                    path: display,
                    message: "parser panicked".to_string(),
                }),
            }
        }
        "txt" | "md" => std::fs::read_to_string(path).map_err(|source| ExtractError::Io {
            path: display,
            source,
        }),
        other => Err(ExtractError::Unsupported(other.to_string())),
    }
}

/// Like [`extract_resume_text`], but an unreadable document yields "".
pub fn extract_resume_text_or_empty(path: &Path) -> String {
    extract_resume_text(path).unwrap_or_else(|e| {
        warn!("Resume text extraction failed: {e}");
        String::new()
    })
}

/// Runs both skill signals over already-extracted text.
pub fn extract_skills_from_text(text: &str) -> SkillReport {
    let text = text.to_lowercase();
    if text.trim().is_empty() {
        return SkillReport::default();
    }

    let count = CORE_SKILLS.iter().filter(|s| text.contains(*s)).count() as i64;

    let mut found: BTreeSet<&str> = BTreeSet::new();

    for token in tokens(&text) {
        if let Some(skill) = SKILL_VOCABULARY.iter().find(|s| **s == token) {
            found.insert(skill);
        }
    }

    // Substring hits inside a phrase count too, so "javascript" also yields "java".
    for phrase in phrases(&text) {
        for skill in SKILL_VOCABULARY {
            if phrase.contains(skill) {
                found.insert(skill);
            }
        }
    }

    SkillReport {
        count,
        skills: found.into_iter().collect::<Vec<_>>().join(", "),
    }
}

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c.is_whitespace() || ",;:()[]{}|\"'!?•*".contains(c))
        .map(|t| t.trim_matches('.'))
        .filter(|t| !t.is_empty())
}

fn phrases(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| "\n\r,;:()[]{}|•*".contains(c))
        .map(str::trim)
        .filter(|p| !p.is_empty())
}
