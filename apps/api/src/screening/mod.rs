// Résumé screening: upload validation, text extraction, language analysis,
// fuzzy skill scoring and ranking, plus the HTML and JSON handlers on top.

pub mod extract;
pub mod files;
pub mod handlers;
pub mod matching;
pub mod nlp;
pub mod page;
pub mod profile;
pub mod ranking;
