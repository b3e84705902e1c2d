//! Matcher: skill overlap between a candidate and a job.

use std::collections::HashSet;

use serde::Serialize;

use crate::matching::skills::SkillSet;

/// Which side's token list supplies the display casing and order of matched skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplaySide {
    Candidate,
    Job,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillOverlap {
    pub matched_skills: Vec<String>,
    /// Number of distinct shared keys.
    pub score: usize,
}

/// Returns `None` when the two sets share no key. A zero-score overlap is never produced.
pub fn skill_overlap(
    candidate: &SkillSet,
    job: &SkillSet,
    side: DisplaySide,
) -> Option<SkillOverlap> {
    let candidate_keys = candidate.key_set();
    let job_keys = job.key_set();
    let matched: HashSet<&str> = candidate_keys.intersection(&job_keys).copied().collect();
    if matched.is_empty() {
        return None;
    }

    let owner = match side {
        DisplaySide::Candidate => candidate,
        DisplaySide::Job => job,
    };

    Some(SkillOverlap {
        matched_skills: owner.display_for(&matched),
        score: matched.len(),
    })
}

/// Convenience over raw skill strings.
pub fn match_raw(
    candidate_skills: Option<&str>,
    job_skills: Option<&str>,
    side: DisplaySide,
) -> Option<SkillOverlap> {
    skill_overlap(
        &SkillSet::parse(candidate_skills),
        &SkillSet::parse(job_skills),
        side,
    )
}
