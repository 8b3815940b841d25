pub mod classify;
pub mod error;
pub mod posts;
pub mod ranking;
pub mod types;
