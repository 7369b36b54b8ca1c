// Prompt templates for the local model server.
// Placeholders in `{braces}` are substituted with `str::replace` before sending.

/// Quiz generation prompt. Replace `{experience}` and `{skills}`.
pub const QUIZ_PROMPT_TEMPLATE: &str = "Generate exactly 5 multiple choice questions for a \
    technical interview. Candidate has {experience} years experience and skills: {skills}. \
    Output ONLY valid JSON containing an array of objects. Each object must have 'question' \
    (string), 'options' (array of 4 strings), and 'answer' (the exact string from options \
    that is correct).";

/// Résumé evaluation prompt. Replace `{resume_text}`.
pub const EVALUATION_PROMPT_TEMPLATE: &str = "Evaluate the following resume text. Provide a \
    score out of 100 based on quality, and a brief summary. Format exactly like:\n\
    Score: [number]\n\
    Summary: [your summary]\n\
    Resume Text: {resume_text}";

/// Characters of résumé text forwarded to the model.
pub const EVALUATION_TEXT_LIMIT: usize = 1500;

pub fn quiz_prompt(experience: i64, skills: &str) -> String {
    QUIZ_PROMPT_TEMPLATE
        .replace("{experience}", &experience.to_string())
        .replace("{skills}", skills)
}

pub fn evaluation_prompt(resume_text: &str) -> String {
    let truncated: String = resume_text.chars().take(EVALUATION_TEXT_LIMIT).collect();
    EVALUATION_PROMPT_TEMPLATE.replace("{resume_text}", &truncated)
}
