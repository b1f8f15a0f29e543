//! Fuzzy skill matching — how strongly each candidate skill appears in the job description.
//!
//! Scores are on a 0 – 100 scale. `partial_ratio` slides the shorter string
//! over the longer one and keeps the best window, so a short skill such as
//! "rust" scores 100 against any job description that mentions it and
//! degrades gracefully for near-misses ("postgres" vs "postgresql").

use serde::{Deserialize, Serialize};

/// Match strength of one skill against the job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMatch {
    pub skill: String,
    pub score: f64,
}

/// Best normalised-Levenshtein similarity (× 100) of the shorter string
/// against every window of the longer, including windows that overhang
/// either end.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (short, long, short_str, long_str) = if a_chars.len() <= b_chars.len() {
        (a_chars, b_chars, a, b)
    } else {
        (b_chars, a_chars, b, a)
    };

    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }
    if long_str.contains(short_str) {
        return 100.0;
    }

    let m = short.len();
    let n = long.len();

    let full_windows = (0..=n - m).map(|start| &long[start..start + m]);
    let head_windows = (1..m).map(|len| &long[..len]);
    let tail_windows = (1..m).map(|len| &long[n - len..]);

    let mut best = 0.0_f64;
    for window in full_windows.chain(head_windows).chain(tail_windows) {
        let window: String = window.iter().collect();
        let similarity = strsim::normalized_levenshtein(short_str, &window) * 100.0;
        if similarity > best {
            best = similarity;
        }
    }
    best.clamp(0.0, 100.0)
}

/// Scores every skill against the job description, case-insensitively.
pub fn calculate_skill_match(job_description: &str, skills: &[String]) -> Vec<SkillMatch> {
    let jd_lower = job_description.to_lowercase();
    skills
        .iter()
        .map(|skill| SkillMatch {
            skill: skill.clone(),
            score: partial_ratio(&skill.to_lowercase(), &jd_lower),
        })
        .collect()
}

/// Mean of the per-skill scores, rounded to two decimals. Zero when there are no skills.
pub fn average_score(matches: &[SkillMatch]) -> f64 {
    if matches.is_empty() {
        return 0.0;
    }
    let total: f64 = matches.iter().map(|m| m.score).sum();
    round2(total / matches.len() as f64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
