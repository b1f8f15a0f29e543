//! Candidate ranking — turns extracted résumés into scored, ordered candidates.

use std::cmp::Ordering;

use chrono::Utc;
use uuid::Uuid;

use crate::models::candidate::{Candidate, ResumeText};
use crate::screening::matching::{average_score, calculate_skill_match};
use crate::screening::nlp::TextAnalyzer;
use crate::screening::profile::{extract_candidate_name, extract_skills_and_experience};

/// Analyzes and scores each résumé, returning candidates best-first.
/// Equal scores keep upload order.
pub fn rank_candidates(
    analyzer: &dyn TextAnalyzer,
    job_description: &str,
    resumes: &[ResumeText],
    skill_keywords: &[String],
) -> Vec<Candidate> {
    let mut rankings: Vec<Candidate> = resumes
        .iter()
        .map(|resume| {
            let analysis = analyzer.analyze(&resume.content);
            let name = extract_candidate_name(&analysis);
            let (skills, experience) = extract_skills_and_experience(&analysis, skill_keywords);
            let score = average_score(&calculate_skill_match(job_description, &skills));

            Candidate {
                id: Uuid::new_v4(),
                name,
                source_file: resume.filename.clone(),
                score,
                skills,
                experience,
                screened_at: Utc::now(),
            }
        })
        .collect();

    sort_by_score(&mut rankings);
    rankings
}

/// Re-scores every candidate's stored skills against a (possibly new) job
/// description and re-sorts the list.
pub fn rescore_candidates(job_description: &str, candidates: &mut [Candidate]) {
    for candidate in candidates.iter_mut() {
        candidate.score = average_score(&calculate_skill_match(job_description, &candidate.skills));
    }
    sort_by_score(candidates);
}

/// Descending by score; stable, so ties keep their current order.
fn sort_by_score(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}
