use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::profile::Profile;

/// A recruiter's persisted candidate search, re-evaluated for new matches.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SavedCandidateSearch {
    pub id: Uuid,
    /// Profile id of the owning recruiter.
    pub recruiter_id: Uuid,
    pub name: String,
    pub search_query: Option<String>,
    pub location: Option<String>,
    /// Comma-separated skill terms, OR-combined.
    pub skills: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_checked: Option<DateTime<Utc>>,
    pub last_notified: Option<DateTime<Utc>>,
}

/// First-seen record of a candidate matching a saved search.
/// Unique per (saved_search_id, candidate_id) and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateSearchMatch {
    pub id: Uuid,
    pub saved_search_id: Uuid,
    pub candidate_id: Uuid,
    pub first_matched_date: DateTime<Utc>,
    pub notified: bool,
    pub notified_date: Option<DateTime<Utc>>,
}

/// A match record together with the candidate profile it points at.
#[derive(Debug, Clone, Serialize)]
pub struct MatchedCandidate {
    #[serde(rename = "match")]
    pub record: CandidateSearchMatch,
    pub candidate: Profile,
}

/// Body of `POST /api/v1/searches`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSavedSearch {
    pub recruiter_id: Uuid,
    pub name: String,
    pub search_query: Option<String>,
    pub location: Option<String>,
    pub skills: Option<String>,
}

impl NewSavedSearch {
    pub fn into_search(self, now: DateTime<Utc>) -> SavedCandidateSearch {
        SavedCandidateSearch {
            id: Uuid::new_v4(),
            recruiter_id: self.recruiter_id,
            name: self.name.trim().to_string(),
            search_query: self.search_query,
            location: self.location,
            skills: self.skills,
            is_active: true,
            created_at: now,
            last_checked: None,
            last_notified: None,
        }
    }
}
