use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const WORK_TYPES: [&str; 3] = ["remote", "onsite", "hybrid"];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub description: String,
    /// "City, State" or "Remote".
    pub location: String,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    /// Raw free-text required skills.
    pub required_skills: String,
    /// remote | onsite | hybrid
    pub work_type: String,
    pub visa_sponsorship: bool,
    pub job_type: String,
    pub experience_level: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub posted_date: DateTime<Utc>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub contact_email: String,
    /// User id of the recruiter who posted the job.
    pub posted_by: Uuid,
}

impl Job {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    Review,
    Interview,
    Offer,
    Closed,
}

impl ApplicationStatus {
    /// Pipeline order.
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Review,
        ApplicationStatus::Interview,
        ApplicationStatus::Offer,
        ApplicationStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Review => "review",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Offer => "offer",
            ApplicationStatus::Closed => "closed",
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Review => "Under Review",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Offer => "Offer",
            ApplicationStatus::Closed => "Closed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobApplication {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub status: String,
    pub cover_note: String,
    pub applied_date: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    /// Internal, never shown to the applicant.
    pub recruiter_notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SavedJob {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub saved_date: DateTime<Utc>,
}

/// A saved job together with the posting it points at.
#[derive(Debug, Clone, Serialize)]
pub struct SavedJobEntry {
    #[serde(flatten)]
    pub saved: SavedJob,
    pub job: Job,
}

/// An application together with the job it was made to.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationWithJob {
    #[serde(flatten)]
    pub application: JobApplication,
    pub job: Job,
}

fn default_job_type() -> String {
    "Full-time".to_string()
}

fn default_experience_level() -> String {
    "Mid-level".to_string()
}

fn default_true() -> bool {
    true
}

/// Body of `POST /api/v1/jobs` and `PUT /api/v1/jobs/:id`: every editable
/// field of a posting.
#[derive(Debug, Clone, Deserialize)]
pub struct JobInput {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub description: String,
    pub location: String,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    #[serde(default)]
    pub required_skills: String,
    pub work_type: String,
    #[serde(default)]
    pub visa_sponsorship: bool,
    #[serde(default = "default_job_type")]
    pub job_type: String,
    #[serde(default = "default_experience_level")]
    pub experience_level: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub application_deadline: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub contact_email: String,
}

impl JobInput {
    /// Returns the first problem found, phrased for the client.
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("title", &self.title),
            ("company", &self.company),
            ("location", &self.location),
            ("contact_email", &self.contact_email),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{field} must not be empty"));
            }
        }

        if !WORK_TYPES.contains(&self.work_type.to_ascii_lowercase().as_str()) {
            return Err(format!("work_type must be one of {}", WORK_TYPES.join(", ")));
        }

        if self.salary_min.is_some_and(|v| v < 0) || self.salary_max.is_some_and(|v| v < 0) {
            return Err("salaries must not be negative".to_string());
        }
        if let (Some(min), Some(max)) = (self.salary_min, self.salary_max) {
            if min > max {
                return Err("salary_min must not exceed salary_max".to_string());
            }
        }

        match (self.latitude, self.longitude) {
            (None, None) => {}
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                    return Err("latitude/longitude out of range".to_string());
                }
            }
            _ => return Err("latitude and longitude must be supplied together".to_string()),
        }

        Ok(())
    }

    /// Builds the stored row. Identity, poster and posting date come from the caller
    /// so an edit keeps the originals.
    pub fn into_job(self, id: Uuid, posted_by: Uuid, posted_date: DateTime<Utc>) -> Job {
        Job {
            id,
            title: self.title.trim().to_string(),
            company: self.company.trim().to_string(),
            description: self.description,
            location: self.location.trim().to_string(),
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            required_skills: self.required_skills,
            work_type: self.work_type.to_ascii_lowercase(),
            visa_sponsorship: self.visa_sponsorship,
            job_type: self.job_type,
            experience_level: self.experience_level,
            latitude: self.latitude,
            longitude: self.longitude,
            posted_date,
            application_deadline: self.application_deadline,
            is_active: self.is_active,
            contact_email: self.contact_email.trim().to_string(),
            posted_by,
        }
    }
}
