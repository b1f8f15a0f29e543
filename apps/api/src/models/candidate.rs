use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One screened résumé, as shown in the ranked list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    /// Filename of the uploaded résumé.
    pub source_file: String,
    /// Mean skill match against the current job description, 0 – 100, two decimals.
    pub score: f64,
    pub skills: Vec<String>,
    pub experience: Vec<String>,
    pub screened_at: DateTime<Utc>,
}

/// A résumé after text extraction, before analysis.
#[derive(Debug, Clone)]
pub struct ResumeText {
    pub filename: String,
    pub content: String,
}
