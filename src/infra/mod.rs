//! Infrastructure adapters: Postgres repositories, HTTP surface,
//! telemetry, moderation gateway.

pub mod db;
pub mod error;
pub mod http;
pub mod moderation;
pub mod telemetry;
