pub mod insights;
pub mod search;
pub mod tweet;
