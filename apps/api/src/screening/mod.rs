// Screening pipeline: document text and skills, lexical similarity,
// model-backed quiz and résumé evaluation, the selection classifier,
// and job matching. Everything that talks to the model server or the
// classifier reports whether its value is genuine or a fallback.

pub mod decision;
pub mod evaluator;
pub mod extractor;
pub mod matching;
pub mod provenance;
pub mod quiz;
pub mod similarity;
pub mod stop_words;
pub mod training;
