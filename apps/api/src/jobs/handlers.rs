//! Axum route handlers for job postings and saved jobs.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::search::{search_jobs, JobHit, JobSearchParams};
use crate::matching::recommend::{
    recommend_candidates_for_job, RecommendedCandidate, DEFAULT_RECOMMENDATION_LIMIT,
};
use crate::matching::skills::SkillSet;
use crate::models::job::{Job, JobInput, SavedJobEntry};
use crate::models::profile::Profile;
use crate::state::AppState;

pub const MAX_RECOMMENDATION_LIMIT: usize = 100;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

impl LimitQuery {
    /// Defaults to 12. Anything outside `1..=100` is rejected.
    pub fn resolve(&self) -> Result<usize, AppError> {
        match self.limit {
            None => Ok(DEFAULT_RECOMMENDATION_LIMIT),
            Some(n) if (1..=MAX_RECOMMENDATION_LIMIT).contains(&n) => Ok(n),
            Some(n) => Err(AppError::Validation(format!(
                "limit must be between 1 and {MAX_RECOMMENDATION_LIMIT}, got {n}"
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobSearchResponse {
    pub total: usize,
    pub jobs: Vec<JobHit>,
}

#[derive(Debug, Serialize)]
pub struct JobDetailResponse {
    pub job: Job,
    pub required_skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct JobWriteRequest {
    /// Profile id of the recruiter posting or editing.
    pub recruiter_id: Uuid,
    #[serde(flatten)]
    pub job: JobInput,
}

#[derive(Debug, Deserialize)]
pub struct UserRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SaveToggleResponse {
    pub job_id: Uuid,
    pub saved: bool,
    pub message: &'static str,
}

async fn load_active_job(state: &AppState, id: Uuid) -> Result<Job, AppError> {
    state
        .store
        .get_job(id)
        .await?
        .filter(|job| job.is_active)
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

pub(crate) async fn load_recruiter(state: &AppState, id: Uuid) -> Result<Profile, AppError> {
    let profile = state
        .store
        .get_profile(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {id} not found")))?;
    if !profile.is_recruiter() {
        return Err(AppError::Forbidden);
    }
    Ok(profile)
}

/// The job, active or not, if `recruiter_id` is the recruiter who posted it.
pub(crate) async fn load_owned_job(
    state: &AppState,
    id: Uuid,
    recruiter_id: Uuid,
) -> Result<Job, AppError> {
    let recruiter = load_recruiter(state, recruiter_id).await?;
    let job = state
        .store
        .get_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    if job.posted_by != recruiter.user_id {
        return Err(AppError::Forbidden);
    }
    Ok(job)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/jobs
pub async fn handle_search_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobSearchParams>,
) -> Result<Json<JobSearchResponse>, AppError> {
    let filter = params.into_filter()?;
    let jobs = state.store.list_active_jobs().await?;
    let hits = search_jobs(jobs, &filter);
    Ok(Json(JobSearchResponse {
        total: hits.len(),
        jobs: hits,
    }))
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(req): Json<JobWriteRequest>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    req.job.validate().map_err(AppError::Validation)?;
    let recruiter = load_recruiter(&state, req.recruiter_id).await?;

    let job = req
        .job
        .into_job(Uuid::new_v4(), recruiter.user_id, state.clock.now());
    state.store.create_job(&job).await?;
    tracing::info!(job_id = %job.id, posted_by = %job.posted_by, "Job posted: {}", job.title);

    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobDetailResponse>, AppError> {
    let job = load_active_job(&state, id).await?;
    let required_skills = SkillSet::parse(Some(&job.required_skills))
        .tokens()
        .to_vec();
    Ok(Json(JobDetailResponse {
        job,
        required_skills,
    }))
}

/// PUT /api/v1/jobs/:id
/// Only the posting recruiter may edit. Inactive postings stay editable so they can
/// be reopened.
pub async fn handle_update_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<JobWriteRequest>,
) -> Result<Json<Job>, AppError> {
    req.job.validate().map_err(AppError::Validation)?;
    let existing = load_owned_job(&state, id, req.recruiter_id).await?;

    let job = req
        .job
        .into_job(existing.id, existing.posted_by, existing.posted_date);
    state.store.update_job(&job).await?;
    tracing::info!(job_id = %id, "Job updated: {}", job.title);

    Ok(Json(job))
}

/// GET /api/v1/jobs/:id/candidates?limit=
pub async fn handle_recommended_candidates(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<RecommendedCandidate>>, AppError> {
    let limit = params.resolve()?;
    let job = load_active_job(&state, id).await?;
    let recs = recommend_candidates_for_job(state.store.as_ref(), &job, limit).await?;
    Ok(Json(recs))
}

/// POST /api/v1/jobs/:id/save
/// Toggles: saves the job, or removes it when it was already saved.
pub async fn handle_toggle_saved_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UserRequest>,
) -> Result<Json<SaveToggleResponse>, AppError> {
    load_active_job(&state, id).await?;

    let saved = if state
        .store
        .save_job(req.user_id, id, state.clock.now())
        .await?
    {
        true
    } else {
        state.store.unsave_job(req.user_id, id).await?;
        false
    };

    Ok(Json(SaveToggleResponse {
        job_id: id,
        saved,
        message: if saved {
            "Job saved!"
        } else {
            "Job removed from saved jobs."
        },
    }))
}

/// GET /api/v1/saved-jobs?user_id=
pub async fn handle_list_saved_jobs(
    State(state): State<AppState>,
    Query(params): Query<UserRequest>,
) -> Result<Json<Vec<SavedJobEntry>>, AppError> {
    Ok(Json(state.store.list_saved_jobs(params.user_id).await?))
}
