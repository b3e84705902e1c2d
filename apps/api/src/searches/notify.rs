//! Recruiter notifications for new saved-search matches.
//!
//! Delivery sits behind the `Notifier` trait (`Arc<dyn Notifier>` in `AppState`).
//! `WebhookNotifier` hands the message to a mail relay; `LogNotifier` only logs it.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::models::search::{MatchedCandidate, SavedCandidateSearch};

/// Entries listed by name in one message; the rest are summarised.
pub const MAX_LISTED_MATCHES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Relay rejected message (status {status})")]
    Rejected { status: u16 },

    #[error("Transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes notifications to the log instead of delivering them.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(
            to = %notification.to,
            subject = %notification.subject,
            "Notification (not delivered, no webhook configured):\n{}",
            notification.body
        );
        Ok(())
    }
}

/// POSTs the notification as JSON to a mail relay.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let response = self.client.post(&self.url).json(notification).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

/// Sender address and the public base URL used in links.
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub site_url: String,
    pub from_email: String,
}

impl MailSettings {
    fn base(&self) -> &str {
        self.site_url.trim_end_matches('/')
    }
}

/// Builds the batched "new candidate matches" message for one saved search.
///
/// Profile and match-list links point at the web front end under `site_url`,
/// not at this API. Its JSON counterparts are `/api/v1/profiles/by-username/:username`
/// and `/api/v1/searches/:id/matches`.
pub fn render_match_notification(
    settings: &MailSettings,
    recipient: &str,
    recruiter_username: &str,
    search: &SavedCandidateSearch,
    matches: &[MatchedCandidate],
) -> Notification {
    let base = settings.base();
    let subject = format!("New Candidate Matches for \"{}\"", search.name);

    let mut body = format!(
        "Hello {recruiter_username},\n\nWe found {} new candidate(s) that match your saved search \"{}\".\n\n",
        matches.len(),
        search.name
    );

    for (i, m) in matches.iter().take(MAX_LISTED_MATCHES).enumerate() {
        let candidate = &m.candidate;
        body.push_str(&format!("{}. {}", i + 1, candidate.display_name()));
        if let Some(headline) = candidate.headline.as_deref().filter(|h| !h.is_empty()) {
            body.push_str(&format!(" - {headline}"));
        }
        if let Some(location) = candidate.location.as_deref().filter(|l| !l.is_empty()) {
            body.push_str(&format!(" ({location})"));
        }
        body.push_str(&format!(
            "\n   View profile: {base}/accounts/u/{}/\n\n",
            candidate.username
        ));
    }

    if matches.len() > MAX_LISTED_MATCHES {
        body.push_str(&format!(
            "\n... and {} more match(es).\n",
            matches.len() - MAX_LISTED_MATCHES
        ));
    }

    body.push_str(&format!(
        "\nView all matches: {base}/jobs/searches/{}/matches/\n\nBest regards,\nJobBoard Team\n",
        search.id
    ));

    Notification {
        from: settings.from_email.clone(),
        to: recipient.to_string(),
        subject,
        body,
    }
}
