//! Keyword classification and tag extraction.
//!
//! Both run exactly once, at post creation. Classification assigns a
//! concrete category when the client sent none (or the aggregate
//! `All`); tag extraction supplies fallback tags when the client sent
//! none.

use std::collections::HashMap;

use super::types::Category;

const CAREER_KEYWORDS: [&str; 6] = ["job", "work", "interview", "resume", "boss", "salary"];
const STARTUP_KEYWORDS: [&str; 5] = ["startup", "business", "founder", "money", "fund"];
const ACADEMIC_KEYWORDS: [&str; 5] = ["exam", "grade", "college", "gpa", "study"];
const RELATIONSHIP_KEYWORDS: [&str; 5] = ["breakup", "divorce", "dating", "love", "lonely"];
const HEALTH_KEYWORDS: [&str; 5] = ["health", "sick", "doctor", "hospital", "pain"];

const MAX_EXTRACTED_TAGS: usize = 3;
const MIN_TAG_LEN: usize = 4;

const STOPWORDS: [&str; 24] = [
    "that", "this", "with", "from", "have", "what", "when", "where", "will", "been", "were",
    "they", "them", "then", "than", "just", "like", "about", "into", "your", "because", "really",
    "very", "much",
];

/// Infer a concrete category from post content. Keyword tables are
/// checked in priority order; anything unmatched lands in `Life`.
pub fn classify_category(content: &str) -> Category {
    let text = content.to_lowercase();
    let contains_any = |words: &[&str]| words.iter().any(|word| text.contains(word));

    if contains_any(&CAREER_KEYWORDS) {
        Category::Career
    } else if contains_any(&STARTUP_KEYWORDS) {
        Category::Startup
    } else if contains_any(&ACADEMIC_KEYWORDS) {
        Category::Academic
    } else if contains_any(&RELATIONSHIP_KEYWORDS) {
        Category::Relationship
    } else if contains_any(&HEALTH_KEYWORDS) {
        Category::Health
    } else {
        Category::Life
    }
}

/// Extract up to three salient words as fallback tags: lowercase,
/// stopword-filtered, ranked by frequency then first appearance.
pub fn extract_tags(content: &str) -> Vec<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    let lowered = content.to_lowercase();

    for (position, raw) in lowered.split_whitespace().enumerate() {
        let word = raw.trim_matches(|c: char| !c.is_alphanumeric());
        if word.len() < MIN_TAG_LEN || STOPWORDS.contains(&word) {
            continue;
        }
        let entry = counts.entry(word).or_insert((0, position));
        entry.0 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(word, (count, first))| (word, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(MAX_EXTRACTED_TAGS)
        .map(|(word, _, _)| word.to_string())
        .collect()
}
