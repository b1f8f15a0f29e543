//! Candidate profile extraction — name, skills and experience lines from analyzed résumé text.

use std::collections::HashSet;

use crate::screening::nlp::{tokenize, AnalyzedText, EntityLabel};

pub const UNKNOWN_CANDIDATE: &str = "Unknown";

const EXPERIENCE_MARKERS: &[&str] = &["years", "experience"];

/// Splits the comma-separated skill list from the form into lower-case keywords.
/// Blank entries are dropped; repeats keep their first position.
pub fn parse_skill_keywords(input: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    input
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

/// The first person entity in the document, or `"Unknown"`.
pub fn extract_candidate_name(analysis: &AnalyzedText) -> String {
    analysis
        .entities
        .iter()
        .find(|e| e.label == EntityLabel::Person)
        .map(|e| e.text.clone())
        .unwrap_or_else(|| UNKNOWN_CANDIDATE.to_string())
}

/// A skill keyword prepared for matching against analyzed text.
struct KeywordPattern {
    folded: String,
    tokens: Vec<String>,
    /// Bytes of the keyword before its first token (`.` in `.net`).
    lead: usize,
    /// Bytes of the keyword after its last token.
    trail: usize,
}

impl KeywordPattern {
    fn new(keyword: &str) -> Option<Self> {
        let tokens = tokenize(keyword);
        let first = tokens.first()?;
        let last = tokens.last()?;
        Some(Self {
            folded: fold(keyword),
            lead: first.span.start,
            trail: keyword.len() - last.span.end,
            tokens: tokens.iter().map(|t| t.text.to_lowercase()).collect(),
        })
    }

    /// The keyword's surface form in `analysis` when it starts at token `start`.
    fn match_at<'a>(
        &self,
        analysis: &'a AnalyzedText,
        lowered: &[String],
        start: usize,
    ) -> Option<&'a str> {
        let end = start + self.tokens.len();
        if lowered.get(start..end)? != &self.tokens[..] {
            return None;
        }
        let from = analysis.tokens[start].span.start.checked_sub(self.lead)?;
        let to = analysis.tokens[end - 1].span.end + self.trail;
        let surface = analysis.text.get(from..to)?;
        (fold(surface) == self.folded).then_some(surface)
    }
}

/// Lower-cased with whitespace runs collapsed to one space.
fn fold(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Returns `(skills, experience)`.
///
/// A skill is found when the résumé's tokens contain the keyword's tokens
/// consecutively and the text they cover, punctuation included, equals the
/// keyword case-insensitively. Each skill is reported once, in the surface
/// form of its first appearance. Experience is every sentence mentioning
/// "years" or "experience".
pub fn extract_skills_and_experience(
    analysis: &AnalyzedText,
    skill_keywords: &[String],
) -> (Vec<String>, Vec<String>) {
    let patterns: Vec<KeywordPattern> = skill_keywords
        .iter()
        .filter_map(|kw| KeywordPattern::new(kw))
        .collect();
    let lowered: Vec<String> = analysis.tokens.iter().map(|t| t.text.to_lowercase()).collect();

    let mut seen = HashSet::new();
    let mut skills = Vec::new();
    for start in 0..lowered.len() {
        for pattern in &patterns {
            if let Some(surface) = pattern.match_at(analysis, &lowered, start) {
                if seen.insert(fold(surface)) {
                    skills.push(surface.split_whitespace().collect::<Vec<_>>().join(" "));
                }
            }
        }
    }

    let experience = analysis
        .sentences
        .iter()
        .filter(|sentence| {
            let lower = sentence.to_lowercase();
            EXPERIENCE_MARKERS.iter().any(|marker| lower.contains(marker))
        })
        .cloned()
        .collect();

    (skills, experience)
}
