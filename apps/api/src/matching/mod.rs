// Skill matching, recommendation ranking, and geographic filtering.
// Everything here except `recommend`'s store-backed entry points is pure.

pub mod geo;
pub mod matcher;
pub mod ranker;
pub mod recommend;
pub mod skills;
