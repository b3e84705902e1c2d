use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const ROLE_SEEKER: &str = "seeker";
pub const ROLE_RECRUITER: &str = "recruiter";

/// A seeker or recruiter profile joined with its owning user account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Email on the user account.
    pub account_email: Option<String>,
    /// Editable email on the profile; preferred over the account email.
    pub email: Option<String>,
    pub role: String,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    /// Raw free-text skills, e.g. "Python, Django / React".
    pub skills: Option<String>,
    pub is_public: bool,
    pub date_joined: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn is_seeker(&self) -> bool {
        self.role == ROLE_SEEKER
    }

    pub fn is_recruiter(&self) -> bool {
        self.role == ROLE_RECRUITER
    }

    /// Full name when one is set, otherwise the username.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }

    /// Address used for notifications: profile email, then account email.
    pub fn contact_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .or_else(|| {
                self.account_email
                    .as_deref()
                    .filter(|e| !e.trim().is_empty())
            })
    }

    /// Applies a partial edit. Fields absent from the update are left untouched.
    pub fn apply_update(&mut self, update: ProfileUpdate, now: DateTime<Utc>) {
        if let Some(email) = update.email {
            self.email = Some(email);
        }
        if let Some(headline) = update.headline {
            self.headline = Some(headline);
        }
        if let Some(bio) = update.bio {
            self.bio = Some(bio);
        }
        if let Some(location) = update.location {
            self.location = Some(location);
        }
        if let Some(skills) = update.skills {
            self.skills = Some(skills);
        }
        if let Some(is_public) = update.is_public {
            self.is_public = is_public;
        }
        self.updated_at = now;
    }
}

/// Body of `PUT /api/v1/profiles/:id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub skills: Option<String>,
    pub is_public: Option<bool>,
}
