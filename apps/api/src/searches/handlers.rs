//! Axum route handlers for saved candidate searches.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::Profile;
use crate::models::search::{MatchedCandidate, NewSavedSearch, SavedCandidateSearch};
use crate::searches::tracker::SweepReport;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecruiterQuery {
    pub recruiter_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SweepQuery {
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Deserialize)]
pub struct ActiveToggle {
    pub recruiter_id: Uuid,
    pub is_active: bool,
}

async fn load_owned_search(
    state: &AppState,
    id: Uuid,
    recruiter_id: Uuid,
) -> Result<SavedCandidateSearch, AppError> {
    let search = state
        .store
        .get_saved_search(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Saved search {id} not found")))?;
    if search.recruiter_id != recruiter_id {
        return Err(AppError::Forbidden);
    }
    Ok(search)
}

/// POST /api/v1/searches
pub async fn handle_create_search(
    State(state): State<AppState>,
    Json(req): Json<NewSavedSearch>,
) -> Result<(StatusCode, Json<SavedCandidateSearch>), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".to_string()));
    }

    let recruiter = state
        .store
        .get_profile(req.recruiter_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", req.recruiter_id)))?;
    if !recruiter.is_recruiter() {
        return Err(AppError::Forbidden);
    }

    let search = req.into_search(state.clock.now());
    state.store.create_saved_search(&search).await?;
    tracing::info!(search_id = %search.id, recruiter_id = %search.recruiter_id, "Saved search created");

    Ok((StatusCode::CREATED, Json(search)))
}

/// GET /api/v1/searches?recruiter_id=
pub async fn handle_list_searches(
    State(state): State<AppState>,
    Query(params): Query<RecruiterQuery>,
) -> Result<Json<Vec<SavedCandidateSearch>>, AppError> {
    Ok(Json(
        state.store.list_saved_searches(params.recruiter_id).await?,
    ))
}

/// GET /api/v1/searches/:id?recruiter_id=
pub async fn handle_get_search(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<RecruiterQuery>,
) -> Result<Json<SavedCandidateSearch>, AppError> {
    Ok(Json(
        load_owned_search(&state, id, params.recruiter_id).await?,
    ))
}

/// PATCH /api/v1/searches/:id/active
pub async fn handle_set_search_active(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ActiveToggle>,
) -> Result<StatusCode, AppError> {
    load_owned_search(&state, id, req.recruiter_id).await?;
    state.store.set_search_active(id, req.is_active).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/searches/:id/candidates?recruiter_id=
/// Live evaluation of the search criteria.
pub async fn handle_search_candidates(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<RecruiterQuery>,
) -> Result<Json<Vec<Profile>>, AppError> {
    let search = load_owned_search(&state, id, params.recruiter_id).await?;
    Ok(Json(
        state.tracker().find_candidates_for_search(&search).await?,
    ))
}

/// GET /api/v1/searches/:id/new-matches?recruiter_id=
/// Candidates that would be recorded by the next check. Does not record them.
pub async fn handle_new_matches(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<RecruiterQuery>,
) -> Result<Json<Vec<Profile>>, AppError> {
    let search = load_owned_search(&state, id, params.recruiter_id).await?;
    Ok(Json(
        state.tracker().find_new_matches_for_search(&search).await?,
    ))
}

/// GET /api/v1/searches/:id/matches?recruiter_id=
pub async fn handle_list_matches(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<RecruiterQuery>,
) -> Result<Json<Vec<MatchedCandidate>>, AppError> {
    load_owned_search(&state, id, params.recruiter_id).await?;
    Ok(Json(state.store.list_matches(id).await?))
}

/// POST /api/v1/searches/check-matches?dry_run=
/// Scheduled sweep entry point, meant for an external periodic trigger.
pub async fn handle_check_matches(
    State(state): State<AppState>,
    Query(params): Query<SweepQuery>,
) -> Result<Json<SweepReport>, AppError> {
    Ok(Json(state.tracker().run_sweep(params.dry_run).await?))
}
