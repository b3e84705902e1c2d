//! Saved-Search Match Tracker.
//!
//! Two triggers converge on the same logic: `run_sweep` (invoked externally, e.g.
//! by cron hitting the check-matches endpoint) and `on_profile_saved` (called by
//! the profile update handler after the write). Match records are first-seen and
//! created with get-or-create, so repeating either trigger never duplicates them.

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::models::profile::Profile;
use crate::models::search::SavedCandidateSearch;
use crate::searches::criteria::candidate_matches;
use crate::searches::notify::{render_match_notification, MailSettings, Notifier};
use crate::store::JobBoardStore;

/// What happened when pending matches of one search were offered to the recruiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyOutcome {
    NothingPending,
    Sent { matches: usize },
    MissingEmail,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub dry_run: bool,
    pub searches_checked: usize,
    pub new_matches: usize,
    pub matches_created: usize,
    pub notifications_sent: usize,
    pub notification_failures: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileSaveReport {
    pub matches_created: usize,
    pub notifications_sent: usize,
}

#[derive(Clone)]
pub struct MatchTracker {
    store: Arc<dyn JobBoardStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    mail: MailSettings,
}

impl MatchTracker {
    pub fn new(
        store: Arc<dyn JobBoardStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        mail: MailSettings,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            mail,
        }
    }

    /// Public seekers currently satisfying the search criteria.
    pub async fn find_candidates_for_search(
        &self,
        search: &SavedCandidateSearch,
    ) -> Result<Vec<Profile>> {
        let seekers = self.store.list_public_seekers().await?;
        Ok(seekers
            .into_iter()
            .filter(|candidate| candidate_matches(search, candidate))
            .collect())
    }

    /// Matching candidates without a match record yet. Read-only.
    pub async fn find_new_matches_for_search(
        &self,
        search: &SavedCandidateSearch,
    ) -> Result<Vec<Profile>> {
        if !search.is_active {
            return Ok(Vec::new());
        }
        let known = self.store.matched_candidate_ids(search.id).await?;
        Ok(self
            .find_candidates_for_search(search)
            .await?
            .into_iter()
            .filter(|candidate| !known.contains(&candidate.id))
            .collect())
    }

    /// Get-or-creates a record per candidate and stamps `last_checked`.
    /// Returns how many records this call inserted.
    pub async fn create_matches_for_search(
        &self,
        search: &SavedCandidateSearch,
        candidates: &[Profile],
    ) -> Result<usize> {
        let now = self.clock.now();
        let mut created = 0;
        for candidate in candidates {
            let (_, inserted) = self
                .store
                .get_or_create_match(search.id, candidate.id, now)
                .await?;
            if inserted {
                created += 1;
            }
        }
        self.store.touch_last_checked(search.id, now).await?;
        Ok(created)
    }

    /// Sends one message covering every unnotified match of the search and marks
    /// them notified. On delivery failure nothing is marked, so the matches stay
    /// pending for the next run.
    pub async fn notify_pending(&self, search: &SavedCandidateSearch) -> Result<NotifyOutcome> {
        let pending = self.store.unnotified_matches(search.id).await?;
        if pending.is_empty() {
            return Ok(NotifyOutcome::NothingPending);
        }

        let recruiter = self.store.get_profile(search.recruiter_id).await?;
        let Some((recipient, username)) = recruiter
            .as_ref()
            .and_then(|r| r.contact_email().map(|email| (email.to_string(), r.username.clone())))
        else {
            warn!(
                search_id = %search.id,
                recruiter_id = %search.recruiter_id,
                "No email address for recruiter, skipping notification"
            );
            return Ok(NotifyOutcome::MissingEmail);
        };

        let notification =
            render_match_notification(&self.mail, &recipient, &username, search, &pending);

        if let Err(e) = self.notifier.send(&notification).await {
            error!(
                search_id = %search.id,
                recipient = %recipient,
                "Failed to send match notification: {e}"
            );
            return Ok(NotifyOutcome::Failed);
        }

        let now = self.clock.now();
        let ids: Vec<Uuid> = pending.iter().map(|m| m.record.id).collect();
        self.store.mark_notified(&ids, now).await?;
        self.store.touch_last_notified(search.id, now).await?;

        info!(
            search_id = %search.id,
            matches = pending.len(),
            "Sent match notification to {recipient}"
        );
        Ok(NotifyOutcome::Sent {
            matches: pending.len(),
        })
    }

    /// Checks every active search once. With `dry_run` nothing is written or sent.
    pub async fn run_sweep(&self, dry_run: bool) -> Result<SweepReport> {
        let mut report = SweepReport {
            dry_run,
            ..Default::default()
        };

        for search in self.store.list_active_searches().await? {
            report.searches_checked += 1;

            let new_candidates = self.find_new_matches_for_search(&search).await?;
            if new_candidates.is_empty() {
                info!(search_id = %search.id, name = %search.name, "No new matches");
                continue;
            }
            report.new_matches += new_candidates.len();
            info!(
                search_id = %search.id,
                name = %search.name,
                found = new_candidates.len(),
                "Found new matches"
            );

            if dry_run {
                continue;
            }

            report.matches_created += self
                .create_matches_for_search(&search, &new_candidates)
                .await?;

            match self.notify_pending(&search).await? {
                NotifyOutcome::Sent { .. } => report.notifications_sent += 1,
                NotifyOutcome::Failed => report.notification_failures += 1,
                NotifyOutcome::NothingPending | NotifyOutcome::MissingEmail => {}
            }
        }

        info!(
            dry_run,
            new_matches = report.new_matches,
            notifications_sent = report.notifications_sent,
            "Match sweep finished"
        );
        Ok(report)
    }

    /// Post-write hook for profile saves. Only public seekers are considered.
    pub async fn on_profile_saved(&self, profile: &Profile) -> Result<ProfileSaveReport> {
        let mut report = ProfileSaveReport::default();
        if !profile.is_seeker() || !profile.is_public {
            return Ok(report);
        }

        for search in self.store.list_active_searches().await? {
            if !candidate_matches(&search, profile) {
                continue;
            }

            let now = self.clock.now();
            let (_, created) = self
                .store
                .get_or_create_match(search.id, profile.id, now)
                .await?;
            if !created {
                continue;
            }
            report.matches_created += 1;
            self.store.touch_last_checked(search.id, now).await?;

            if let NotifyOutcome::Sent { .. } = self.notify_pending(&search).await? {
                report.notifications_sent += 1;
            }
        }

        Ok(report)
    }
}
