use chrono::{DateTime, Utc};

/// Sorts the whole pool by descending `(score, recency)` and only then truncates.
/// Order among exact ties on both keys is unspecified.
pub fn rank_by_score_and_recency<T, F>(mut items: Vec<T>, key: F, limit: usize) -> Vec<T>
where
    F: Fn(&T) -> (usize, DateTime<Utc>),
{
    items.sort_unstable_by(|a, b| key(b).cmp(&key(a)));
    items.truncate(limit);
    items
}
