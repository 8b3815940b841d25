//! Application services orchestrating domain logic over repositories.

pub mod error;
pub mod feed;
pub mod interactions;
pub mod posts;
pub mod profile;
pub mod reports;
pub mod repos;
pub mod search;
pub mod trending;
