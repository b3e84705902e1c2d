//! In-process `JobBoardStore` for tests. Enforces the same uniqueness rules as the schema.

use std::collections::HashSet;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::job::{ApplicationStatus, Job, JobApplication, SavedJob, SavedJobEntry};
use crate::models::profile::Profile;
use crate::models::search::{CandidateSearchMatch, MatchedCandidate, SavedCandidateSearch};
use crate::store::JobBoardStore;

#[derive(Default)]
struct Tables {
    profiles: Vec<Profile>,
    jobs: Vec<Job>,
    applications: Vec<JobApplication>,
    saved_jobs: Vec<SavedJob>,
    searches: Vec<SavedCandidateSearch>,
    matches: Vec<CandidateSearchMatch>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> R {
        let mut tables = self.tables.lock().expect("memory store poisoned");
        f(&mut tables)
    }

    pub fn insert_profile(&self, profile: Profile) {
        self.with(|t| t.profiles.push(profile));
    }

    pub fn insert_job(&self, job: Job) {
        self.with(|t| t.jobs.push(job));
    }

    pub fn insert_search(&self, search: SavedCandidateSearch) {
        self.with(|t| t.searches.push(search));
    }

    pub fn insert_application(&self, job_id: Uuid, applicant_id: Uuid) {
        let now = Utc::now();
        self.with(|t| {
            t.applications.push(JobApplication {
                id: Uuid::new_v4(),
                job_id,
                applicant_id,
                status: ApplicationStatus::Applied.as_str().to_string(),
                cover_note: String::new(),
                applied_date: now,
                last_updated: now,
                recruiter_notes: String::new(),
            })
        });
    }

    pub fn search(&self, id: Uuid) -> Option<SavedCandidateSearch> {
        self.with(|t| t.searches.iter().find(|s| s.id == id).cloned())
    }

    pub fn match_records(&self, search_id: Uuid) -> Vec<CandidateSearchMatch> {
        self.with(|t| {
            t.matches
                .iter()
                .filter(|m| m.saved_search_id == search_id)
                .cloned()
                .collect()
        })
    }

    pub fn applications(&self) -> Vec<JobApplication> {
        self.with(|t| t.applications.clone())
    }

    fn matched(t: &Tables, search_id: Uuid, only_unnotified: bool) -> Vec<MatchedCandidate> {
        t.matches
            .iter()
            .filter(|m| m.saved_search_id == search_id && !(only_unnotified && m.notified))
            .filter_map(|m| {
                let candidate = t.profiles.iter().find(|p| p.id == m.candidate_id)?;
                Some(MatchedCandidate {
                    record: m.clone(),
                    candidate: candidate.clone(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl JobBoardStore for MemoryStore {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
        Ok(self.with(|t| t.profiles.iter().find(|p| p.id == id).cloned()))
    }

    async fn get_profile_by_username(&self, username: &str) -> Result<Option<Profile>> {
        Ok(self.with(|t| t.profiles.iter().find(|p| p.username == username).cloned()))
    }

    async fn update_profile(&self, profile: &Profile) -> Result<()> {
        self.with(|t| {
            let slot = t
                .profiles
                .iter_mut()
                .find(|p| p.id == profile.id)
                .ok_or_else(|| anyhow!("profile {} not found", profile.id))?;
            *slot = profile.clone();
            Ok(())
        })
    }

    async fn list_public_seekers(&self) -> Result<Vec<Profile>> {
        Ok(self.with(|t| {
            t.profiles
                .iter()
                .filter(|p| p.is_seeker() && p.is_public)
                .cloned()
                .collect()
        }))
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<Job>> {
        Ok(self.with(|t| t.jobs.iter().find(|j| j.id == id).cloned()))
    }

    async fn get_jobs(&self, ids: &[Uuid]) -> Result<Vec<Job>> {
        Ok(self.with(|t| t.jobs.iter().filter(|j| ids.contains(&j.id)).cloned().collect()))
    }

    async fn list_active_jobs(&self) -> Result<Vec<Job>> {
        Ok(self.with(|t| t.jobs.iter().filter(|j| j.is_active).cloned().collect()))
    }

    async fn create_job(&self, job: &Job) -> Result<()> {
        self.with(|t| t.jobs.push(job.clone()));
        Ok(())
    }

    async fn update_job(&self, job: &Job) -> Result<()> {
        self.with(|t| {
            let slot = t
                .jobs
                .iter_mut()
                .find(|j| j.id == job.id)
                .ok_or_else(|| anyhow!("job {} not found", job.id))?;
            *slot = Job {
                posted_by: slot.posted_by,
                posted_date: slot.posted_date,
                ..job.clone()
            };
            Ok(())
        })
    }

    async fn applied_job_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        Ok(self.with(|t| {
            t.applications
                .iter()
                .filter(|a| a.applicant_id == user_id)
                .map(|a| a.job_id)
                .collect()
        }))
    }

    async fn saved_job_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        Ok(self.with(|t| {
            t.saved_jobs
                .iter()
                .filter(|s| s.user_id == user_id)
                .map(|s| s.job_id)
                .collect()
        }))
    }

    async fn applicant_ids(&self, job_id: Uuid) -> Result<HashSet<Uuid>> {
        Ok(self.with(|t| {
            t.applications
                .iter()
                .filter(|a| a.job_id == job_id)
                .map(|a| a.applicant_id)
                .collect()
        }))
    }

    async fn save_job(&self, user_id: Uuid, job_id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        Ok(self.with(|t| {
            if t.saved_jobs
                .iter()
                .any(|s| s.user_id == user_id && s.job_id == job_id)
            {
                return false;
            }
            t.saved_jobs.push(SavedJob {
                id: Uuid::new_v4(),
                user_id,
                job_id,
                saved_date: at,
            });
            true
        }))
    }

    async fn unsave_job(&self, user_id: Uuid, job_id: Uuid) -> Result<bool> {
        Ok(self.with(|t| {
            let before = t.saved_jobs.len();
            t.saved_jobs
                .retain(|s| !(s.user_id == user_id && s.job_id == job_id));
            t.saved_jobs.len() < before
        }))
    }

    async fn list_saved_jobs(&self, user_id: Uuid) -> Result<Vec<SavedJobEntry>> {
        Ok(self.with(|t| {
            let mut entries: Vec<SavedJobEntry> = t
                .saved_jobs
                .iter()
                .filter(|s| s.user_id == user_id)
                .filter_map(|s| {
                    let job = t.jobs.iter().find(|j| j.id == s.job_id)?;
                    Some(SavedJobEntry {
                        saved: s.clone(),
                        job: job.clone(),
                    })
                })
                .collect();
            entries.sort_by(|a, b| b.saved.saved_date.cmp(&a.saved.saved_date));
            entries
        }))
    }

    async fn create_application(&self, application: &JobApplication) -> Result<bool> {
        Ok(self.with(|t| {
            if t.applications.iter().any(|a| {
                a.job_id == application.job_id && a.applicant_id == application.applicant_id
            }) {
                return false;
            }
            t.applications.push(application.clone());
            true
        }))
    }

    async fn get_application(&self, id: Uuid) -> Result<Option<JobApplication>> {
        Ok(self.with(|t| t.applications.iter().find(|a| a.id == id).cloned()))
    }

    async fn list_applications_for_applicant(
        &self,
        applicant_id: Uuid,
    ) -> Result<Vec<JobApplication>> {
        Ok(self.with(|t| {
            let mut apps: Vec<JobApplication> = t
                .applications
                .iter()
                .filter(|a| a.applicant_id == applicant_id)
                .cloned()
                .collect();
            apps.sort_by(|a, b| b.applied_date.cmp(&a.applied_date));
            apps
        }))
    }

    async fn list_applications_for_job(&self, job_id: Uuid) -> Result<Vec<JobApplication>> {
        Ok(self.with(|t| {
            let mut apps: Vec<JobApplication> = t
                .applications
                .iter()
                .filter(|a| a.job_id == job_id)
                .cloned()
                .collect();
            apps.sort_by_key(|a| a.applied_date);
            apps
        }))
    }

    async fn update_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> Result<()> {
        self.with(|t| {
            if let Some(a) = t.applications.iter_mut().find(|a| a.id == id) {
                a.status = status.as_str().to_string();
                a.last_updated = at;
            }
        });
        Ok(())
    }

    async fn create_saved_search(&self, search: &SavedCandidateSearch) -> Result<()> {
        self.with(|t| t.searches.push(search.clone()));
        Ok(())
    }

    async fn get_saved_search(&self, id: Uuid) -> Result<Option<SavedCandidateSearch>> {
        Ok(self.search(id))
    }

    async fn list_saved_searches(&self, recruiter_id: Uuid) -> Result<Vec<SavedCandidateSearch>> {
        Ok(self.with(|t| {
            t.searches
                .iter()
                .filter(|s| s.recruiter_id == recruiter_id)
                .cloned()
                .collect()
        }))
    }

    async fn list_active_searches(&self) -> Result<Vec<SavedCandidateSearch>> {
        Ok(self.with(|t| t.searches.iter().filter(|s| s.is_active).cloned().collect()))
    }

    async fn set_search_active(&self, id: Uuid, is_active: bool) -> Result<()> {
        self.with(|t| {
            if let Some(s) = t.searches.iter_mut().find(|s| s.id == id) {
                s.is_active = is_active;
            }
        });
        Ok(())
    }

    async fn touch_last_checked(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        self.with(|t| {
            if let Some(s) = t.searches.iter_mut().find(|s| s.id == id) {
                s.last_checked = Some(at);
            }
        });
        Ok(())
    }

    async fn touch_last_notified(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        self.with(|t| {
            if let Some(s) = t.searches.iter_mut().find(|s| s.id == id) {
                s.last_notified = Some(at);
            }
        });
        Ok(())
    }

    async fn matched_candidate_ids(&self, search_id: Uuid) -> Result<HashSet<Uuid>> {
        Ok(self.with(|t| {
            t.matches
                .iter()
                .filter(|m| m.saved_search_id == search_id)
                .map(|m| m.candidate_id)
                .collect()
        }))
    }

    async fn get_or_create_match(
        &self,
        search_id: Uuid,
        candidate_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(CandidateSearchMatch, bool)> {
        Ok(self.with(|t| {
            if let Some(existing) = t
                .matches
                .iter()
                .find(|m| m.saved_search_id == search_id && m.candidate_id == candidate_id)
            {
                return (existing.clone(), false);
            }
            let record = CandidateSearchMatch {
                id: Uuid::new_v4(),
                saved_search_id: search_id,
                candidate_id,
                first_matched_date: at,
                notified: false,
                notified_date: None,
            };
            t.matches.push(record.clone());
            (record, true)
        }))
    }

    async fn list_matches(&self, search_id: Uuid) -> Result<Vec<MatchedCandidate>> {
        Ok(self.with(|t| Self::matched(t, search_id, false)))
    }

    async fn unnotified_matches(&self, search_id: Uuid) -> Result<Vec<MatchedCandidate>> {
        Ok(self.with(|t| Self::matched(t, search_id, true)))
    }

    async fn mark_notified(&self, match_ids: &[Uuid], at: DateTime<Utc>) -> Result<()> {
        self.with(|t| {
            for m in t.matches.iter_mut().filter(|m| match_ids.contains(&m.id)) {
                m.notified = true;
                m.notified_date = Some(at);
            }
        });
        Ok(())
    }
}
