//! Axum route handlers for job applications: applying, the applicant's own
//! dashboard, and the recruiter's per-job pipeline.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::handlers::load_owned_job;
use crate::models::job::{ApplicationStatus, ApplicationWithJob, Job, JobApplication};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub applicant_id: Uuid,
    #[serde(default)]
    pub cover_note: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    /// Must be the user who posted the job.
    pub recruiter_user_id: Uuid,
    pub status: ApplicationStatus,
}

#[derive(Debug, Deserialize)]
pub struct MyApplicationsQuery {
    pub applicant_id: Uuid,
    pub status: Option<ApplicationStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ApplicantQuery {
    pub applicant_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct PipelineQuery {
    pub recruiter_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: ApplicationStatus,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct MyApplicationsResponse {
    /// Counts over all of the applicant's applications, before the status filter.
    pub status_counts: Vec<StatusCount>,
    pub applications: Vec<ApplicationWithJob>,
}

#[derive(Debug, Serialize)]
pub struct PipelineStage {
    pub status: ApplicationStatus,
    pub applications: Vec<JobApplication>,
}

#[derive(Debug, Serialize)]
pub struct PipelineResponse {
    pub job: Job,
    pub stages: Vec<PipelineStage>,
}

/// One count per pipeline status, in pipeline order. Zero counts included.
pub fn count_by_status(applications: &[JobApplication]) -> Vec<StatusCount> {
    ApplicationStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: applications
                .iter()
                .filter(|a| a.status == status.as_str())
                .count(),
        })
        .collect()
}

/// Groups applications into pipeline columns, keeping their order within each.
pub fn group_by_status(applications: Vec<JobApplication>) -> Vec<PipelineStage> {
    let mut stages: Vec<PipelineStage> = ApplicationStatus::ALL
        .into_iter()
        .map(|status| PipelineStage {
            status,
            applications: Vec::new(),
        })
        .collect();
    for application in applications {
        match stages
            .iter_mut()
            .find(|s| s.status.as_str() == application.status)
        {
            Some(stage) => stage.applications.push(application),
            None => tracing::warn!(
                application_id = %application.id,
                status = %application.status,
                "Application has an unknown status, left out of the pipeline"
            ),
        }
    }
    stages
}

/// POST /api/v1/jobs/:id/applications
pub async fn handle_apply(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ApplyRequest>,
) -> Result<(StatusCode, Json<JobApplication>), AppError> {
    state
        .store
        .get_job(id)
        .await?
        .filter(|job| job.is_active)
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;

    let now = state.clock.now();
    let application = JobApplication {
        id: Uuid::new_v4(),
        job_id: id,
        applicant_id: req.applicant_id,
        status: ApplicationStatus::Applied.as_str().to_string(),
        cover_note: req.cover_note,
        applied_date: now,
        last_updated: now,
        recruiter_notes: String::new(),
    };

    if !state.store.create_application(&application).await? {
        return Err(AppError::Conflict(
            "You have already applied to this job".to_string(),
        ));
    }
    tracing::info!(job_id = %id, applicant_id = %req.applicant_id, "Application submitted");
    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /api/v1/applications?applicant_id=&status=
pub async fn handle_my_applications(
    State(state): State<AppState>,
    Query(params): Query<MyApplicationsQuery>,
) -> Result<Json<MyApplicationsResponse>, AppError> {
    let all = state
        .store
        .list_applications_for_applicant(params.applicant_id)
        .await?;
    let status_counts = count_by_status(&all);

    let shown: Vec<JobApplication> = match params.status {
        Some(status) => all
            .into_iter()
            .filter(|a| a.status == status.as_str())
            .collect(),
        None => all,
    };

    let job_ids: Vec<Uuid> = shown.iter().map(|a| a.job_id).collect();
    let jobs = state.store.get_jobs(&job_ids).await?;
    let applications = shown
        .into_iter()
        .filter_map(|application| {
            let job = jobs.iter().find(|j| j.id == application.job_id)?.clone();
            Some(ApplicationWithJob { application, job })
        })
        .collect();

    Ok(Json(MyApplicationsResponse {
        status_counts,
        applications,
    }))
}

/// GET /api/v1/applications/:id?applicant_id=
/// Someone else's application reads as not found.
pub async fn handle_get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ApplicantQuery>,
) -> Result<Json<ApplicationWithJob>, AppError> {
    let not_found = || AppError::NotFound(format!("Application {id} not found"));
    let application = state
        .store
        .get_application(id)
        .await?
        .filter(|a| a.applicant_id == params.applicant_id)
        .ok_or_else(not_found)?;
    let job = state
        .store
        .get_job(application.job_id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(ApplicationWithJob { application, job }))
}

/// GET /api/v1/jobs/:id/pipeline?recruiter_id=
pub async fn handle_application_pipeline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<PipelineQuery>,
) -> Result<Json<PipelineResponse>, AppError> {
    let job = load_owned_job(&state, id, params.recruiter_id).await?;
    let applications = state.store.list_applications_for_job(id).await?;
    Ok(Json(PipelineResponse {
        job,
        stages: group_by_status(applications),
    }))
}

/// PATCH /api/v1/applications/:id/status
pub async fn handle_update_application_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<Json<JobApplication>, AppError> {
    let application = state
        .store
        .get_application(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))?;
    let job = state
        .store
        .get_job(application.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", application.job_id)))?;
    if job.posted_by != req.recruiter_user_id {
        return Err(AppError::Forbidden);
    }

    let now = state.clock.now();
    state
        .store
        .update_application_status(id, req.status, now)
        .await?;
    tracing::info!(
        application_id = %id,
        status = req.status.as_str(),
        "Moved application to {}",
        req.status.display()
    );

    Ok(Json(JobApplication {
        status: req.status.as_str().to_string(),
        last_updated: now,
        ..application
    }))
}
