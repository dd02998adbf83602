//! Metric extractor.
//!
//! Turns one document snapshot into word, link, and tag metrics. Links are
//! taken as the host resolved them; only tags are normalized here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Frontmatter keys that carry tags
pub const TAG_FIELDS: &[&str] = &["tags", "tag"];

/// Host-assigned document identifier (a vault-relative path for `leveld`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Structured metadata the host computed for a document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetadata {
    /// Outgoing links, already resolved by the host
    pub links: Vec<String>,
    /// Frontmatter key-value map, if the document has one
    pub frontmatter: Option<BTreeMap<String, Value>>,
    /// Inline tag annotations as the host reports them (`#tag`)
    pub inline_tags: Vec<String>,
}

/// One document as seen during a single recompute pass
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub id: DocumentId,
    pub content: String,
    pub metadata: DocumentMetadata,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

impl DocumentSnapshot {
    pub fn new(id: DocumentId, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            metadata: DocumentMetadata::default(),
            created: None,
            modified: None,
        }
    }

    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_times(
        mut self,
        created: Option<DateTime<Utc>>,
        modified: Option<DateTime<Utc>>,
    ) -> Self {
        self.created = created;
        self.modified = modified;
        self
    }
}

/// Per-document metrics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMetrics {
    pub word_count: u64,
    pub link_count: u64,
    pub tags: BTreeSet<String>,
}

/// Extract metrics from a document snapshot
pub fn extract(doc: &DocumentSnapshot) -> DocumentMetrics {
    DocumentMetrics {
        word_count: count_words(&doc.content),
        link_count: doc.metadata.links.len() as u64,
        tags: collect_tags(&doc.metadata),
    }
}

/// Number of whitespace-delimited non-empty tokens
pub fn count_words(content: &str) -> u64 {
    content.split_whitespace().count() as u64
}

/// Merge frontmatter `tags`, frontmatter `tag` and inline tags into one set
pub fn collect_tags(metadata: &DocumentMetadata) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();

    if let Some(frontmatter) = &metadata.frontmatter {
        for field in TAG_FIELDS {
            if let Some(value) = frontmatter.get(*field) {
                tags.extend(frontmatter_tags(value));
            }
        }
    }

    tags.extend(metadata.inline_tags.iter().filter_map(|t| normalize_tag(t)));
    tags
}

/// Tags held by one frontmatter value (scalar or list)
pub fn frontmatter_tags(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(coerce_scalar)
            .filter_map(|raw| normalize_tag(&raw))
            .collect(),
        other => coerce_scalar(other)
            .and_then(|raw| normalize_tag(&raw))
            .into_iter()
            .collect(),
    }
}

/// Coerce a frontmatter value to tag text. `null` carries no tag.
fn coerce_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested => Some(nested.to_string()),
    }
}

/// Lower-case, trim, and drop one leading `#`. Empty tags are rejected.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let bare = trimmed.strip_prefix('#').unwrap_or(trimmed).trim();
    if bare.is_empty() {
        return None;
    }
    Some(bare.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frontmatter(value: Value) -> Option<BTreeMap<String, Value>> {
        match value {
            Value::Object(map) => Some(map.into_iter().collect()),
            _ => None,
        }
    }

    #[test]
    fn test_word_count_ignores_runs_of_whitespace() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   \n\t "), 0);
        assert_eq!(count_words("one two  three\nfour\tfive"), 5);
        assert_eq!(count_words("  leading and trailing  "), 3);
    }

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("  Rust "), Some("rust".to_string()));
        assert_eq!(normalize_tag("#Project/Alpha"), Some("project/alpha".to_string()));
        assert_eq!(normalize_tag("#"), None);
        assert_eq!(normalize_tag("   "), None);
    }

    #[test]
    fn test_tags_merge_all_three_sources() {
        let metadata = DocumentMetadata {
            links: vec![],
            frontmatter: frontmatter(json!({
                "tags": ["Rust", " async "],
                "tag": "Notes",
            })),
            inline_tags: vec!["#rust".to_string(), "#Ideas".to_string()],
        };

        let tags = collect_tags(&metadata);
        let expected: BTreeSet<String> = ["async", "ideas", "notes", "rust"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(tags, expected);
    }

    #[test]
    fn test_malformed_frontmatter_values_are_coerced() {
        let value = json!([2024, true, null, "  ", {"k": 1}]);
        let tags = frontmatter_tags(&value);
        assert_eq!(tags, vec!["2024", "true", "{\"k\":1}"]);

        assert_eq!(frontmatter_tags(&json!(3.5)), vec!["3.5"]);
        assert!(frontmatter_tags(&Value::Null).is_empty());
    }

    #[test]
    fn test_extract_counts_host_links() {
        let doc = DocumentSnapshot::new(DocumentId::new("a.md"), "hello linked world").with_metadata(
            DocumentMetadata {
                links: vec!["b".to_string(), "c".to_string(), "b".to_string()],
                frontmatter: None,
                inline_tags: vec![],
            },
        );

        let metrics = extract(&doc);
        assert_eq!(metrics.word_count, 3);
        assert_eq!(metrics.link_count, 3);
        assert!(metrics.tags.is_empty());
    }
}
