//! Axum route handlers for screening: the HTML page and its JSON twin.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::candidate::{Candidate, ResumeText};
use crate::screening::extract::extract_text;
use crate::screening::files::is_allowed_file;
use crate::screening::nlp::TextAnalyzer;
use crate::screening::page::render_page;
use crate::screening::profile::parse_skill_keywords;
use crate::screening::ranking::{rank_candidates, rescore_candidates};
use crate::session::{ScreeningSession, SessionId};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Bytes,
}

/// The screening form as submitted. Text fields stay `None` when absent.
#[derive(Debug, Default)]
pub struct ScreeningForm {
    pub job_description: Option<String>,
    pub skills: Option<String>,
    pub resumes: Vec<UploadedFile>,
}

impl ScreeningForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = ScreeningForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("job_description") => form.job_description = Some(field.text().await?),
                Some("skills") => form.skills = Some(field.text().await?),
                Some("resumes") => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    let data = field.bytes().await?;
                    form.resumes.push(UploadedFile { filename, data });
                }
                other => debug!("Ignoring unexpected form field {other:?}"),
            }
        }
        Ok(form)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Screening flow
// ────────────────────────────────────────────────────────────────────────────

async fn load_session(state: &AppState, id: SessionId) -> Result<ScreeningSession, AppError> {
    state
        .sessions
        .load(id.0)
        .await
        .map(Option::unwrap_or_default)
        .map_err(|e| AppError::Session(format!("{e:#}")))
}

async fn save_session(
    state: &AppState,
    id: SessionId,
    session: &ScreeningSession,
) -> Result<(), AppError> {
    state
        .sessions
        .save(id.0, session)
        .await
        .map_err(|e| AppError::Session(format!("{e:#}")))
}

/// Extracts and ranks the uploaded résumés. CPU-bound; run off the async runtime.
fn screen_uploads(
    analyzer: &dyn TextAnalyzer,
    job_description: &str,
    uploads: &[UploadedFile],
    skill_keywords: &[String],
) -> Vec<Candidate> {
    let resumes: Vec<ResumeText> = uploads
        .iter()
        .filter(|upload| {
            let allowed = is_allowed_file(&upload.filename);
            if !allowed {
                debug!("Skipping upload with disallowed name {:?}", upload.filename);
            }
            allowed
        })
        .map(|upload| ResumeText {
            filename: upload.filename.clone(),
            content: extract_text(&upload.filename, &upload.data),
        })
        .collect();

    rank_candidates(analyzer, job_description, &resumes, skill_keywords)
}

/// Runs one form submission against the browser's session and returns the updated session.
pub async fn run_screening(
    state: &AppState,
    session_id: SessionId,
    form: ScreeningForm,
) -> Result<ScreeningSession, AppError> {
    let job_description = form
        .job_description
        .ok_or_else(|| AppError::Validation("job_description is required".to_string()))?;
    let skills = form
        .skills
        .ok_or_else(|| AppError::Validation("skills is required".to_string()))?;

    let mut session = load_session(state, session_id).await?;
    session.job_description = job_description.clone();
    session.skills = skills.clone();

    let skill_keywords = parse_skill_keywords(&skills);
    let uploaded = form.resumes.len();
    let analyzer = Arc::clone(&state.analyzer);
    let jd = job_description.clone();
    let uploads = form.resumes;

    let new_candidates = tokio::task::spawn_blocking(move || {
        screen_uploads(analyzer.as_ref(), &jd, &uploads, &skill_keywords)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("screening task failed: {e}")))?;

    info!(
        "Session {}: screened {} of {} uploads",
        session_id.0,
        new_candidates.len(),
        uploaded
    );

    session.candidates.extend(new_candidates);
    rescore_candidates(&job_description, &mut session.candidates);
    session.updated_at = Some(Utc::now());

    save_session(state, session_id, &session).await?;
    Ok(session)
}

async fn screen_form(
    state: &AppState,
    session_id: SessionId,
    multipart: Multipart,
) -> Result<ScreeningSession, AppError> {
    let form = ScreeningForm::from_multipart(multipart).await?;
    run_screening(state, session_id, form).await
}

async fn clear_session(state: &AppState, session_id: SessionId) -> Result<(), AppError> {
    state
        .sessions
        .clear(session_id.0)
        .await
        .map_err(|e| AppError::Session(format!("{e:#}")))?;
    info!("Session {}: cleared", session_id.0);
    Ok(())
}

/// Attaches the refreshed session cookie to the outcome, error bodies included.
fn with_session_cookie(
    state: &AppState,
    session_id: SessionId,
    result: Result<impl IntoResponse, AppError>,
) -> Response {
    let cookie = [(
        header::SET_COOKIE,
        session_id.cookie_header(state.config.session_ttl_secs),
    )];
    match result {
        Ok(body) => (cookie, body).into_response(),
        Err(err) => (cookie, err).into_response(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HTML handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /
pub async fn handle_index(State(state): State<AppState>, session_id: SessionId) -> Response {
    let result = load_session(&state, session_id).await;
    with_session_cookie(&state, session_id, result.map(|s| Html(render_page(&s))))
}

/// POST /
pub async fn handle_screen(
    State(state): State<AppState>,
    session_id: SessionId,
    multipart: Multipart,
) -> Response {
    let result = screen_form(&state, session_id, multipart).await;
    with_session_cookie(&state, session_id, result.map(|s| Html(render_page(&s))))
}

/// POST /clear
pub async fn handle_clear(State(state): State<AppState>, session_id: SessionId) -> Response {
    let result = clear_session(&state, session_id).await;
    with_session_cookie(&state, session_id, result.map(|()| Redirect::to("/")))
}

// ────────────────────────────────────────────────────────────────────────────
// JSON handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/screening
pub async fn handle_get_screening(
    State(state): State<AppState>,
    session_id: SessionId,
) -> Response {
    let result = load_session(&state, session_id).await;
    with_session_cookie(&state, session_id, result.map(Json))
}

/// POST /api/v1/screening
pub async fn handle_api_screen(
    State(state): State<AppState>,
    session_id: SessionId,
    multipart: Multipart,
) -> Response {
    let result = screen_form(&state, session_id, multipart).await;
    with_session_cookie(&state, session_id, result.map(Json))
}

/// DELETE /api/v1/screening
pub async fn handle_api_clear(State(state): State<AppState>, session_id: SessionId) -> Response {
    let result = clear_session(&state, session_id).await;
    with_session_cookie(&state, session_id, result.map(|()| StatusCode::NO_CONTENT))
}
