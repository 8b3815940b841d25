pub mod discovery;
pub mod feed;
pub mod posts;
pub mod social;
