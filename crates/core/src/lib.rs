pub mod domain;
pub mod error;
pub mod export;
pub mod format;
pub mod session;
pub mod types;

pub use error::CoreError;
