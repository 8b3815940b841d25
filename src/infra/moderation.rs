//! Content moderation gateway.
//!
//! Posting runs every submission through a gate before persisting it.
//! The HTTP gate calls an external toxicity classifier; when that is
//! unreachable it falls back to the word list, so moderation degrades
//! rather than disappearing.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::error::InfraError;

/// Classifier score above which a post is rejected.
const TOXICITY_THRESHOLD: f64 = 0.7;

/// Offline fallback word list. Deliberately tiny; the classifier does
/// the real work.
const BLOCKED_WORDS: &[&str] = &["hate", "kill", "stupid"];

#[async_trait]
pub trait ModerationGate: Send + Sync {
    async fn is_toxic(&self, content: &str) -> Result<bool, InfraError>;
}

/// Word-list screen, also used as the fallback of the HTTP gate.
pub struct WordListGate;

#[async_trait]
impl ModerationGate for WordListGate {
    async fn is_toxic(&self, content: &str) -> Result<bool, InfraError> {
        Ok(contains_blocked_word(content))
    }
}

fn contains_blocked_word(content: &str) -> bool {
    let lowered = content.to_lowercase();
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| BLOCKED_WORDS.contains(&word))
}

#[derive(Debug, Deserialize)]
struct ClassifierLabel {
    label: String,
    score: f64,
}

/// Gate backed by an external text classifier endpoint.
pub struct HttpModerationGate {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpModerationGate {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, InfraError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| InfraError::moderation(err.to_string()))?;
        Ok(Self { client, endpoint })
    }

    async fn classify(&self, content: &str) -> Result<bool, InfraError> {
        let labels: Vec<ClassifierLabel> = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "inputs": content }))
            .send()
            .await
            .map_err(|err| InfraError::moderation(err.to_string()))?
            .error_for_status()
            .map_err(|err| InfraError::moderation(err.to_string()))?
            .json()
            .await
            .map_err(|err| InfraError::moderation(err.to_string()))?;

        let toxic = labels
            .iter()
            .any(|l| l.label.eq_ignore_ascii_case("toxic") && l.score > TOXICITY_THRESHOLD);
        debug!(toxic, labels = labels.len(), "moderation classifier verdict");
        Ok(toxic)
    }
}

#[async_trait]
impl ModerationGate for HttpModerationGate {
    async fn is_toxic(&self, content: &str) -> Result<bool, InfraError> {
        match self.classify(content).await {
            Ok(toxic) => Ok(toxic),
            Err(err) => {
                warn!(error = %err, "classifier unavailable, falling back to word list");
                Ok(contains_blocked_word(content))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_list_matches_whole_words_only() {
        assert!(contains_blocked_word("I hate Mondays"));
        assert!(contains_blocked_word("STUPID idea"));
        // Substrings inside larger words do not match.
        assert!(!contains_blocked_word("whatever"));
        assert!(!contains_blocked_word("skill issue"));
    }

    #[tokio::test]
    async fn word_list_gate_passes_clean_content() {
        let gate = WordListGate;
        assert!(!gate.is_toxic("lovely weather today").await.unwrap());
        assert!(gate.is_toxic("I hate this").await.unwrap());
    }
}
