//! Language pipeline — tokens, sentences and person entities for résumé text.
//!
//! `TextAnalyzer` is the seam for a model-backed pipeline. `AppState` holds an
//! `Arc<dyn TextAnalyzer>`; the default `HeuristicAnalyzer` is pure Rust,
//! deterministic and needs no model download.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

/// How many non-empty lines from the top of a résumé are searched for a name.
const NAME_SEARCH_LINES: usize = 10;

/// Words that mark a line as a heading, contact detail or job title rather than a name.
const NON_NAME_WORDS: &[&str] = &[
    "resume", "résumé", "curriculum", "vitae", "cv", "profile", "summary", "objective",
    "experience", "education", "skills", "contact", "references", "projects", "certifications",
    "professional", "work", "history", "employment", "page", "phone", "mobile", "email",
    "address", "linkedin", "github", "portfolio", "personal", "details", "information",
    "languages", "achievements", "awards", "publications", "interests", "hobbies", "about",
    "career", "technical", "core", "competencies", "qualifications", "senior", "junior",
    "principal", "lead", "engineer", "developer", "manager", "designer", "analyst", "scientist",
    "consultant", "architect", "intern", "director", "specialist", "administrator", "officer",
    "coordinator", "assistant", "university", "college", "school", "inc", "ltd", "llc",
];

/// Lower-case surname particles allowed between capitalised name words.
const NAME_PARTICLES: &[&str] = &[
    "van", "von", "de", "da", "del", "der", "di", "la", "le", "du", "bin", "al", "dos",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityLabel {
    Person,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub label: EntityLabel,
    pub text: String,
}

/// A word token and where it sits in the analyzed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// Byte range into the source text.
    pub span: Range<usize>,
}

impl Token {
    fn new(text: &str, span: Range<usize>) -> Self {
        Self {
            text: text.to_string(),
            span,
        }
    }
}

/// Output of one pipeline run over a document.
#[derive(Debug, Clone, Default)]
pub struct AnalyzedText {
    pub text: String,
    pub tokens: Vec<Token>,
    pub sentences: Vec<String>,
    pub entities: Vec<Entity>,
}

pub trait TextAnalyzer: Send + Sync {
    fn analyze(&self, text: &str) -> AnalyzedText;
}

/// Rule-based pipeline: UAX #29 word and sentence segmentation plus a
/// layout heuristic for the candidate's name.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicAnalyzer;

impl TextAnalyzer for HeuristicAnalyzer {
    fn analyze(&self, text: &str) -> AnalyzedText {
        AnalyzedText {
            text: text.to_string(),
            tokens: tokenize(text),
            sentences: split_sentences(text),
            entities: find_person(text)
                .map(|text| Entity {
                    label: EntityLabel::Person,
                    text,
                })
                .into_iter()
                .collect(),
        }
    }
}

/// Word tokens in document order. Punctuation-only segments are dropped,
/// except `+` and `#` directly after a word, which are glued on (`C++`, `C#`).
/// A possessive `'s` is split off into its own token (`Rust's` → `Rust`, `'s`).
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut last_end: Option<usize> = None;

    for (start, segment) in text.split_word_bound_indices() {
        let end = start + segment.len();
        let glues = matches!(segment, "+" | "#") && last_end == Some(start);
        if glues {
            if let Some(last) = tokens.last_mut() {
                last.text.push_str(segment);
                last.span.end = end;
                last_end = Some(end);
            }
        } else if segment.chars().any(char::is_alphanumeric) {
            match possessive_stem(segment) {
                Some(stem) => {
                    let split = start + stem.len();
                    tokens.push(Token::new(stem, start..split));
                    tokens.push(Token::new(&segment[stem.len()..], split..end));
                }
                None => tokens.push(Token::new(segment, start..end)),
            }
            last_end = Some(end);
        } else {
            last_end = None;
        }
    }
    tokens
}

fn possessive_stem(segment: &str) -> Option<&str> {
    ["'s", "'S", "’s", "’S"]
        .into_iter()
        .find_map(|suffix| segment.strip_suffix(suffix))
        .filter(|stem| stem.chars().any(char::is_alphanumeric))
}

fn wrapped_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([^\s.!?:;])[ \t]*\r?\n[ \t]*(\p{Ll})").expect("wrapped line regex is valid")
    })
}

/// Sentences in document order, trimmed. Hard-wrapped lines (a newline
/// followed by a lower-case letter, with no terminal punctuation before it)
/// are rejoined first, so a sentence wrapped by a PDF layout stays whole.
pub fn split_sentences(text: &str) -> Vec<String> {
    // Matches cannot overlap, so a one-character line needs another pass.
    let mut unwrapped = text.to_string();
    loop {
        let joined = wrapped_line_re()
            .replace_all(&unwrapped, "$1 $2")
            .into_owned();
        if joined == unwrapped {
            break;
        }
        unwrapped = joined;
    }
    unwrapped
        .split_sentence_bounds()
        .map(str::trim)
        .filter(|s| s.chars().any(char::is_alphanumeric))
        .map(String::from)
        .collect()
}

fn name_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)^[ \t]*(?:full[ \t]+)?name[ \t]*[:\-][ \t]*(.+?)[ \t]*$")
            .expect("name label regex is valid")
    })
}

/// Finds the candidate's name: an explicit `Name:` line wins, otherwise the
/// first name-shaped line near the top of the document.
fn find_person(text: &str) -> Option<String> {
    let labelled = name_label_re()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .find_map(|m| leading_segment(m.as_str()).filter(|s| is_person_name(s)));
    if labelled.is_some() {
        return labelled.map(String::from);
    }

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(NAME_SEARCH_LINES)
        .filter_map(leading_segment)
        .find(|segment| is_person_name(segment))
        .map(String::from)
}

/// The part of a line before the first contact-detail separator.
fn leading_segment(line: &str) -> Option<&str> {
    let end = [" | ", "|", ",", " - ", " – ", " — ", "•", "\t"]
        .iter()
        .filter_map(|sep| line.find(sep))
        .min()
        .unwrap_or(line.len());
    let segment = line[..end].trim();
    (!segment.is_empty()).then_some(segment)
}

fn is_person_name(candidate: &str) -> bool {
    if candidate
        .chars()
        .any(|c| c.is_ascii_digit() || c == '@' || c == '/' || c == ':')
    {
        return false;
    }

    let words: Vec<&str> = candidate.split_whitespace().collect();
    if !(2..=4).contains(&words.len()) {
        return false;
    }

    let last = words.len() - 1;
    words.iter().enumerate().all(|(i, word)| {
        let lower = word.trim_end_matches('.').to_lowercase();
        if NON_NAME_WORDS.contains(&lower.as_str()) {
            return false;
        }
        if i != 0 && i != last && NAME_PARTICLES.contains(word) {
            return true;
        }
        is_name_word(word)
    })
}

/// `Jane`, `JANE`, `O'Neil`, `Smith-Jones`, or an initial such as `Q.`.
fn is_name_word(word: &str) -> bool {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_uppercase() {
        return false;
    }
    let rest: Vec<char> = chars.collect();
    if rest == ['.'] || rest.is_empty() {
        return true;
    }
    rest.iter().all(|&c| c.is_alphabetic() || matches!(c, '\'' | '’' | '-'))
        && rest.last().is_some_and(|c| c.is_alphabetic())
}
