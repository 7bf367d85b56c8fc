pub mod date_range;
pub mod hashtag;
pub mod sort;
