//! The saved-search predicate, evaluated in memory against one candidate.
//!
//! Every criterion is a case-insensitive substring test; criteria are AND-ed and a
//! blank criterion does not narrow the pool.

use crate::models::profile::Profile;
use crate::models::search::SavedCandidateSearch;

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn contains_ci(haystack: Option<&str>, needle_lower: &str) -> bool {
    haystack
        .map(|h| h.to_lowercase().contains(needle_lower))
        .unwrap_or(false)
}

/// Comma-split, trimmed, non-empty skill terms of a saved search.
pub fn skill_terms(skills: Option<&str>) -> Vec<String> {
    skills
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn matches_query(search: &SavedCandidateSearch, candidate: &Profile) -> bool {
    let Some(query) = non_blank(search.search_query.as_deref()) else {
        return true;
    };
    let query = query.trim().to_lowercase();
    [
        Some(candidate.username.as_str()),
        Some(candidate.first_name.as_str()),
        Some(candidate.last_name.as_str()),
        candidate.headline.as_deref(),
        candidate.bio.as_deref(),
    ]
    .into_iter()
    .any(|field| contains_ci(field, &query))
}

fn matches_location(search: &SavedCandidateSearch, candidate: &Profile) -> bool {
    match non_blank(search.location.as_deref()) {
        Some(location) => contains_ci(candidate.location.as_deref(), &location.to_lowercase()),
        None => true,
    }
}

fn matches_skills(search: &SavedCandidateSearch, candidate: &Profile) -> bool {
    let terms = skill_terms(search.skills.as_deref());
    if terms.is_empty() {
        return true;
    }
    terms
        .iter()
        .any(|term| contains_ci(candidate.skills.as_deref(), &term.to_lowercase()))
}

/// True when `candidate` is a public seeker satisfying every set criterion.
pub fn candidate_matches(search: &SavedCandidateSearch, candidate: &Profile) -> bool {
    candidate.is_seeker()
        && candidate.is_public
        && matches_query(search, candidate)
        && matches_location(search, candidate)
        && matches_skills(search, candidate)
}
