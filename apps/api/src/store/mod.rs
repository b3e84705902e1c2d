//! Persistence seam. Handlers, recommendations and the match tracker only see
//! `JobBoardStore`; `AppState` carries it as `Arc<dyn JobBoardStore>`.

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::job::{ApplicationStatus, Job, JobApplication, SavedJobEntry};
use crate::models::profile::Profile;
use crate::models::search::{CandidateSearchMatch, MatchedCandidate, SavedCandidateSearch};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgJobBoardStore;

#[async_trait]
pub trait JobBoardStore: Send + Sync {
    // Profiles
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>>;
    async fn get_profile_by_username(&self, username: &str) -> Result<Option<Profile>>;
    async fn update_profile(&self, profile: &Profile) -> Result<()>;
    /// Public profiles with the seeker role.
    async fn list_public_seekers(&self) -> Result<Vec<Profile>>;

    // Jobs
    async fn get_job(&self, id: Uuid) -> Result<Option<Job>>;
    /// Jobs with the given ids, inactive ones included. Unknown ids are skipped.
    async fn get_jobs(&self, ids: &[Uuid]) -> Result<Vec<Job>>;
    async fn list_active_jobs(&self) -> Result<Vec<Job>>;
    async fn create_job(&self, job: &Job) -> Result<()>;
    /// Overwrites every editable column. Identity, poster and posting date stay.
    async fn update_job(&self, job: &Job) -> Result<()>;
    async fn applied_job_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>>;
    async fn saved_job_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>>;
    /// User ids of everyone who applied to the job.
    async fn applicant_ids(&self, job_id: Uuid) -> Result<HashSet<Uuid>>;
    /// Returns `false` when the job was already saved by this user.
    async fn save_job(&self, user_id: Uuid, job_id: Uuid, at: DateTime<Utc>) -> Result<bool>;
    /// Returns `false` when there was nothing to remove.
    async fn unsave_job(&self, user_id: Uuid, job_id: Uuid) -> Result<bool>;
    /// Newest first.
    async fn list_saved_jobs(&self, user_id: Uuid) -> Result<Vec<SavedJobEntry>>;
    /// Returns `false` when the applicant already applied to this job.
    async fn create_application(&self, application: &JobApplication) -> Result<bool>;
    async fn get_application(&self, id: Uuid) -> Result<Option<JobApplication>>;
    /// Newest first.
    async fn list_applications_for_applicant(&self, applicant_id: Uuid)
        -> Result<Vec<JobApplication>>;
    /// Oldest first.
    async fn list_applications_for_job(&self, job_id: Uuid) -> Result<Vec<JobApplication>>;
    async fn update_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> Result<()>;

    // Saved searches
    async fn create_saved_search(&self, search: &SavedCandidateSearch) -> Result<()>;
    async fn get_saved_search(&self, id: Uuid) -> Result<Option<SavedCandidateSearch>>;
    async fn list_saved_searches(&self, recruiter_id: Uuid) -> Result<Vec<SavedCandidateSearch>>;
    async fn list_active_searches(&self) -> Result<Vec<SavedCandidateSearch>>;
    async fn set_search_active(&self, id: Uuid, is_active: bool) -> Result<()>;
    async fn touch_last_checked(&self, id: Uuid, at: DateTime<Utc>) -> Result<()>;
    async fn touch_last_notified(&self, id: Uuid, at: DateTime<Utc>) -> Result<()>;

    // Match records
    async fn matched_candidate_ids(&self, search_id: Uuid) -> Result<HashSet<Uuid>>;
    /// Get-or-create keyed on (search, candidate). The flag is `true` only when
    /// this call inserted the record.
    async fn get_or_create_match(
        &self,
        search_id: Uuid,
        candidate_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(CandidateSearchMatch, bool)>;
    async fn list_matches(&self, search_id: Uuid) -> Result<Vec<MatchedCandidate>>;
    async fn unnotified_matches(&self, search_id: Uuid) -> Result<Vec<MatchedCandidate>>;
    async fn mark_notified(&self, match_ids: &[Uuid], at: DateTime<Utc>) -> Result<()>;
}
