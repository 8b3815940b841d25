//! Candor: a social-feed backend whose core is the feed ranking and
//! recommendation engine.
//!
//! Layers, leaf-first:
//! - `domain`: records, the category taxonomy, and the pure scorer.
//! - `cache`: the bounded-TTL feed cache and its invalidation pipeline.
//! - `application`: repository traits and the services orchestrating
//!   scoring, enrichment, and writes.
//! - `infra`: Postgres adapters, the HTTP surface, telemetry, and the
//!   moderation-gate client.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
