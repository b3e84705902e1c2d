//! Recommendation entry points: jobs for a seeker, candidates for a job.
//!
//! The `rank_*` functions are pure over materialised pools; the `recommend_*`
//! functions load those pools from the store.

use std::collections::HashSet;

use anyhow::Result;
use serde::Serialize;
use uuid::Uuid;

use crate::matching::matcher::{skill_overlap, DisplaySide};
use crate::matching::ranker::rank_by_score_and_recency;
use crate::matching::skills::SkillSet;
use crate::models::job::Job;
use crate::models::profile::Profile;
use crate::store::JobBoardStore;

pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 12;

#[derive(Debug, Clone, Serialize)]
pub struct RecommendedJob {
    pub job: Job,
    pub matched_skills: Vec<String>,
    pub score: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendedCandidate {
    pub candidate: Profile,
    pub matched_skills: Vec<String>,
    pub score: usize,
}

/// Active jobs not in `excluded`, matched skills shown in the job's own wording,
/// ranked by score then posting date.
pub fn rank_jobs_for_profile(
    profile: &Profile,
    jobs: Vec<Job>,
    excluded: &HashSet<Uuid>,
    limit: usize,
) -> Vec<RecommendedJob> {
    let seeker_skills = SkillSet::parse(profile.skills.as_deref());
    if seeker_skills.is_empty() {
        return Vec::new();
    }

    let matched: Vec<RecommendedJob> = jobs
        .into_iter()
        .filter(|job| job.is_active && !excluded.contains(&job.id))
        .filter_map(|job| {
            let job_skills = SkillSet::parse(Some(&job.required_skills));
            let overlap = skill_overlap(&seeker_skills, &job_skills, DisplaySide::Job)?;
            Some(RecommendedJob {
                job,
                matched_skills: overlap.matched_skills,
                score: overlap.score,
            })
        })
        .collect();

    rank_by_score_and_recency(matched, |r| (r.score, r.job.posted_date), limit)
}

/// Public seekers whose user is not in `excluded_users`, matched skills shown in
/// the candidate's own wording, ranked by score then account join date.
pub fn rank_candidates_for_job(
    job: &Job,
    candidates: Vec<Profile>,
    excluded_users: &HashSet<Uuid>,
    limit: usize,
) -> Vec<RecommendedCandidate> {
    let job_skills = SkillSet::parse(Some(&job.required_skills));
    if job_skills.is_empty() {
        return Vec::new();
    }

    let matched: Vec<RecommendedCandidate> = candidates
        .into_iter()
        .filter(|c| c.is_seeker() && c.is_public && !excluded_users.contains(&c.user_id))
        .filter_map(|candidate| {
            let candidate_skills = SkillSet::parse(candidate.skills.as_deref());
            let overlap = skill_overlap(&candidate_skills, &job_skills, DisplaySide::Candidate)?;
            Some(RecommendedCandidate {
                candidate,
                matched_skills: overlap.matched_skills,
                score: overlap.score,
            })
        })
        .collect();

    rank_by_score_and_recency(matched, |r| (r.score, r.candidate.date_joined), limit)
}

/// Excludes jobs the profile's user already applied to or saved.
/// A profile without skills short-circuits before any store access.
pub async fn recommend_jobs_for_profile(
    store: &dyn JobBoardStore,
    profile: &Profile,
    limit: usize,
) -> Result<Vec<RecommendedJob>> {
    if SkillSet::parse(profile.skills.as_deref()).is_empty() {
        return Ok(Vec::new());
    }

    let mut excluded = store.applied_job_ids(profile.user_id).await?;
    excluded.extend(store.saved_job_ids(profile.user_id).await?);
    let jobs = store.list_active_jobs().await?;

    Ok(rank_jobs_for_profile(profile, jobs, &excluded, limit))
}

/// Excludes seekers who already applied to the job.
pub async fn recommend_candidates_for_job(
    store: &dyn JobBoardStore,
    job: &Job,
    limit: usize,
) -> Result<Vec<RecommendedCandidate>> {
    if SkillSet::parse(Some(&job.required_skills)).is_empty() {
        return Ok(Vec::new());
    }

    let applicants = store.applicant_ids(job.id).await?;
    let candidates = store.list_public_seekers().await?;

    Ok(rank_candidates_for_job(job, candidates, &applicants, limit))
}
