// Saved candidate searches: match predicate, first-seen match tracking,
// scheduled sweep and profile-save hook, recruiter notifications.

pub mod criteria;
pub mod handlers;
pub mod notify;
pub mod tracker;
