pub mod applications;
pub mod handlers;
pub mod search;
