use std::collections::{HashMap, HashSet};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::job::{ApplicationStatus, Job, JobApplication, SavedJob, SavedJobEntry};
use crate::models::profile::{Profile, ROLE_SEEKER};
use crate::models::search::{CandidateSearchMatch, MatchedCandidate, SavedCandidateSearch};
use crate::store::JobBoardStore;

/// Profiles are always read joined with their user account.
const PROFILE_SELECT: &str = r#"
    SELECT p.id, p.user_id, u.username, u.first_name, u.last_name,
           u.email AS account_email, p.email, p.role, p.headline, p.bio,
           p.location, p.skills, p.is_public, u.date_joined, p.updated_at
    FROM profiles p
    JOIN users u ON u.id = p.user_id
"#;

/// Postgres-backed store. Uniqueness of (saved_search_id, candidate_id),
/// (job_id, applicant_id) and (user_id, job_id) is enforced by the schema.
#[derive(Clone)]
pub struct PgJobBoardStore {
    pool: PgPool,
}

impl PgJobBoardStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        info!("Connecting to PostgreSQL...");
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;
        info!("PostgreSQL connection pool established");
        Ok(Self::new(pool))
    }

    async fn profiles_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Profile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("{PROFILE_SELECT} WHERE p.id = ANY($1)");
        Ok(sqlx::query_as::<_, Profile>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn attach_candidates(
        &self,
        records: Vec<CandidateSearchMatch>,
    ) -> Result<Vec<MatchedCandidate>> {
        let ids: Vec<Uuid> = records.iter().map(|m| m.candidate_id).collect();
        let profiles: HashMap<Uuid, Profile> = self
            .profiles_by_ids(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(records
            .into_iter()
            .filter_map(|record| match profiles.get(&record.candidate_id) {
                Some(candidate) => Some(MatchedCandidate {
                    candidate: candidate.clone(),
                    record,
                }),
                None => {
                    debug!(match_id = %record.id, "Match record points at a missing profile");
                    None
                }
            })
            .collect())
    }
}

#[async_trait]
impl JobBoardStore for PgJobBoardStore {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
        let sql = format!("{PROFILE_SELECT} WHERE p.id = $1");
        Ok(sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_profile_by_username(&self, username: &str) -> Result<Option<Profile>> {
        let sql = format!("{PROFILE_SELECT} WHERE u.username = $1");
        Ok(sqlx::query_as::<_, Profile>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_profile(&self, profile: &Profile) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE profiles
            SET email = $2, headline = $3, bio = $4, location = $5,
                skills = $6, is_public = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(profile.id)
        .bind(&profile.email)
        .bind(&profile.headline)
        .bind(&profile.bio)
        .bind(&profile.location)
        .bind(&profile.skills)
        .bind(profile.is_public)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_public_seekers(&self) -> Result<Vec<Profile>> {
        let sql = format!("{PROFILE_SELECT} WHERE p.role = $1 AND p.is_public");
        Ok(sqlx::query_as::<_, Profile>(&sql)
            .bind(ROLE_SEEKER)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<Job>> {
        Ok(sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_jobs(&self, ids: &[Uuid]) -> Result<Vec<Job>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_active_jobs(&self) -> Result<Vec<Job>> {
        Ok(sqlx::query_as::<_, Job>(
            "SELECT * FROM jobs WHERE is_active ORDER BY posted_date DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn create_job(&self, job: &Job) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO jobs
                (id, title, company, description, location, salary_min, salary_max,
                 required_skills, work_type, visa_sponsorship, job_type, experience_level,
                 latitude, longitude, posted_date, application_deadline, is_active,
                 contact_email, posted_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.description)
        .bind(&job.location)
        .bind(job.salary_min)
        .bind(job.salary_max)
        .bind(&job.required_skills)
        .bind(&job.work_type)
        .bind(job.visa_sponsorship)
        .bind(&job.job_type)
        .bind(&job.experience_level)
        .bind(job.latitude)
        .bind(job.longitude)
        .bind(job.posted_date)
        .bind(job.application_deadline)
        .bind(job.is_active)
        .bind(&job.contact_email)
        .bind(job.posted_by)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_job(&self, job: &Job) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE jobs
            SET title = $2, company = $3, description = $4, location = $5,
                salary_min = $6, salary_max = $7, required_skills = $8,
                work_type = $9, visa_sponsorship = $10, job_type = $11,
                experience_level = $12, latitude = $13, longitude = $14,
                application_deadline = $15, is_active = $16, contact_email = $17
            WHERE id = $1
            "#,
        )
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.description)
        .bind(&job.location)
        .bind(job.salary_min)
        .bind(job.salary_max)
        .bind(&job.required_skills)
        .bind(&job.work_type)
        .bind(job.visa_sponsorship)
        .bind(&job.job_type)
        .bind(&job.experience_level)
        .bind(job.latitude)
        .bind(job.longitude)
        .bind(job.application_deadline)
        .bind(job.is_active)
        .bind(&job.contact_email)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn applied_job_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT job_id FROM job_applications WHERE applicant_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(ids.into_iter().collect())
    }

    async fn saved_job_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar("SELECT job_id FROM saved_jobs WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.into_iter().collect())
    }

    async fn applicant_ids(&self, job_id: Uuid) -> Result<HashSet<Uuid>> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT applicant_id FROM job_applications WHERE job_id = $1")
                .bind(job_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(ids.into_iter().collect())
    }

    async fn save_job(&self, user_id: Uuid, job_id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO saved_jobs (id, user_id, job_id, saved_date)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, job_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(job_id)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn unsave_job(&self, user_id: Uuid, job_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM saved_jobs WHERE user_id = $1 AND job_id = $2")
            .bind(user_id)
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_saved_jobs(&self, user_id: Uuid) -> Result<Vec<SavedJobEntry>> {
        let saved: Vec<SavedJob> = sqlx::query_as(
            "SELECT * FROM saved_jobs WHERE user_id = $1 ORDER BY saved_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = saved.iter().map(|s| s.job_id).collect();
        let jobs: HashMap<Uuid, Job> = self
            .get_jobs(&ids)
            .await?
            .into_iter()
            .map(|j| (j.id, j))
            .collect();

        Ok(saved
            .into_iter()
            .filter_map(|saved| {
                let job = jobs.get(&saved.job_id)?.clone();
                Some(SavedJobEntry { saved, job })
            })
            .collect())
    }

    async fn create_application(&self, application: &JobApplication) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO job_applications
                (id, job_id, applicant_id, status, cover_note,
                 applied_date, last_updated, recruiter_notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (job_id, applicant_id) DO NOTHING
            "#,
        )
        .bind(application.id)
        .bind(application.job_id)
        .bind(application.applicant_id)
        .bind(&application.status)
        .bind(&application.cover_note)
        .bind(application.applied_date)
        .bind(application.last_updated)
        .bind(&application.recruiter_notes)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_application(&self, id: Uuid) -> Result<Option<JobApplication>> {
        Ok(
            sqlx::query_as::<_, JobApplication>("SELECT * FROM job_applications WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_applications_for_applicant(
        &self,
        applicant_id: Uuid,
    ) -> Result<Vec<JobApplication>> {
        Ok(sqlx::query_as::<_, JobApplication>(
            "SELECT * FROM job_applications WHERE applicant_id = $1 ORDER BY applied_date DESC",
        )
        .bind(applicant_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_applications_for_job(&self, job_id: Uuid) -> Result<Vec<JobApplication>> {
        Ok(sqlx::query_as::<_, JobApplication>(
            "SELECT * FROM job_applications WHERE job_id = $1 ORDER BY applied_date",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query("UPDATE job_applications SET status = $2, last_updated = $3 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_saved_search(&self, search: &SavedCandidateSearch) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO saved_candidate_searches
                (id, recruiter_id, name, search_query, location, skills,
                 is_active, created_at, last_checked, last_notified)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(search.id)
        .bind(search.recruiter_id)
        .bind(&search.name)
        .bind(&search.search_query)
        .bind(&search.location)
        .bind(&search.skills)
        .bind(search.is_active)
        .bind(search.created_at)
        .bind(search.last_checked)
        .bind(search.last_notified)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_saved_search(&self, id: Uuid) -> Result<Option<SavedCandidateSearch>> {
        Ok(sqlx::query_as::<_, SavedCandidateSearch>(
            "SELECT * FROM saved_candidate_searches WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_saved_searches(&self, recruiter_id: Uuid) -> Result<Vec<SavedCandidateSearch>> {
        Ok(sqlx::query_as::<_, SavedCandidateSearch>(
            "SELECT * FROM saved_candidate_searches WHERE recruiter_id = $1 ORDER BY created_at DESC",
        )
        .bind(recruiter_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_active_searches(&self) -> Result<Vec<SavedCandidateSearch>> {
        Ok(sqlx::query_as::<_, SavedCandidateSearch>(
            "SELECT * FROM saved_candidate_searches WHERE is_active ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn set_search_active(&self, id: Uuid, is_active: bool) -> Result<()> {
        sqlx::query("UPDATE saved_candidate_searches SET is_active = $2 WHERE id = $1")
            .bind(id)
            .bind(is_active)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn touch_last_checked(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE saved_candidate_searches SET last_checked = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn touch_last_notified(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE saved_candidate_searches SET last_notified = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn matched_candidate_ids(&self, search_id: Uuid) -> Result<HashSet<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT candidate_id FROM candidate_search_matches WHERE saved_search_id = $1",
        )
        .bind(search_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().collect())
    }

    async fn get_or_create_match(
        &self,
        search_id: Uuid,
        candidate_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(CandidateSearchMatch, bool)> {
        // A concurrent insert loses the ON CONFLICT race and falls through to the SELECT.
        let inserted: Option<CandidateSearchMatch> = sqlx::query_as(
            r#"
            INSERT INTO candidate_search_matches
                (id, saved_search_id, candidate_id, first_matched_date, notified)
            VALUES ($1, $2, $3, $4, FALSE)
            ON CONFLICT (saved_search_id, candidate_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(search_id)
        .bind(candidate_id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(record) = inserted {
            return Ok((record, true));
        }

        let existing: CandidateSearchMatch = sqlx::query_as(
            "SELECT * FROM candidate_search_matches WHERE saved_search_id = $1 AND candidate_id = $2",
        )
        .bind(search_id)
        .bind(candidate_id)
        .fetch_one(&self.pool)
        .await?;
        Ok((existing, false))
    }

    async fn list_matches(&self, search_id: Uuid) -> Result<Vec<MatchedCandidate>> {
        let records: Vec<CandidateSearchMatch> = sqlx::query_as(
            r#"
            SELECT * FROM candidate_search_matches
            WHERE saved_search_id = $1
            ORDER BY first_matched_date DESC
            "#,
        )
        .bind(search_id)
        .fetch_all(&self.pool)
        .await?;
        self.attach_candidates(records).await
    }

    async fn unnotified_matches(&self, search_id: Uuid) -> Result<Vec<MatchedCandidate>> {
        let records: Vec<CandidateSearchMatch> = sqlx::query_as(
            r#"
            SELECT * FROM candidate_search_matches
            WHERE saved_search_id = $1 AND NOT notified
            ORDER BY first_matched_date
            "#,
        )
        .bind(search_id)
        .fetch_all(&self.pool)
        .await?;
        self.attach_candidates(records).await
    }

    async fn mark_notified(&self, match_ids: &[Uuid], at: DateTime<Utc>) -> Result<()> {
        if match_ids.is_empty() {
            return Ok(());
        }
        sqlx::query(
            "UPDATE candidate_search_matches SET notified = TRUE, notified_date = $2 WHERE id = ANY($1)",
        )
        .bind(match_ids)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
