//! Axum route handlers for profiles and their job recommendations.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::handlers::LimitQuery;
use crate::matching::recommend::{recommend_jobs_for_profile, RecommendedJob};
use crate::models::profile::{Profile, ProfileUpdate};
use crate::state::AppState;

async fn load_profile(state: &AppState, id: Uuid) -> Result<Profile, AppError> {
    state
        .store
        .get_profile(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {id} not found")))
}

/// GET /api/v1/profiles/:id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(load_profile(&state, id).await?))
}

/// GET /api/v1/profiles/by-username/:username
/// Public profile lookup. A private profile reads as not found.
pub async fn handle_get_public_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Profile>, AppError> {
    state
        .store
        .get_profile_by_username(&username)
        .await?
        .filter(|p| p.is_public)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Profile {username} not found")))
}

/// PUT /api/v1/profiles/:id
///
/// After the write, the profile is checked against every active saved search.
/// Match tracking failures are logged and never fail the save.
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Profile>, AppError> {
    let mut profile = load_profile(&state, id).await?;
    profile.apply_update(update, state.clock.now());
    state.store.update_profile(&profile).await?;

    match state.tracker().on_profile_saved(&profile).await {
        Ok(report) if report.matches_created > 0 => {
            tracing::info!(
                profile_id = %id,
                matches_created = report.matches_created,
                notifications_sent = report.notifications_sent,
                "Profile matched saved searches"
            );
        }
        Ok(_) => {}
        Err(e) => {
            tracing::error!(profile_id = %id, "Saved-search matching failed after profile save: {e:?}");
        }
    }

    Ok(Json(profile))
}

/// GET /api/v1/profiles/:id/recommendations?limit=
/// Seekers only.
pub async fn handle_recommended_jobs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<RecommendedJob>>, AppError> {
    let limit = params.resolve()?;
    let profile = load_profile(&state, id).await?;
    if !profile.is_seeker() {
        return Err(AppError::Forbidden);
    }
    let recs = recommend_jobs_for_profile(state.store.as_ref(), &profile, limit).await?;
    Ok(Json(recs))
}
