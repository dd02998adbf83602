//! Corpus aggregation.
//!
//! Folds per-document metrics into corpus totals. The fold only sums counts
//! and unions tag sets, so processing order never changes the result.

use crate::metrics::DocumentMetrics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Corpus-level totals, recomputed from scratch on every pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VaultStats {
    pub total_notes: u64,
    pub total_connections: u64,
    pub total_tags: u64,
    pub total_words: u64,
    pub total_files: u64,
}

/// Running fold over the documents of one pass
#[derive(Debug, Default)]
pub struct StatsAccumulator {
    documents: u64,
    connections: u64,
    words: u64,
    tags: BTreeSet<String>,
    failed: u64,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a successfully processed document
    pub fn add(&mut self, metrics: DocumentMetrics) {
        self.documents += 1;
        self.connections += metrics.link_count;
        self.words += metrics.word_count;
        self.tags.extend(metrics.tags);
    }

    /// Count a document that could not be processed. It stays out of every total.
    pub fn skip(&mut self) {
        self.failed += 1;
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    pub fn finish(&self) -> VaultStats {
        VaultStats {
            total_notes: self.documents,
            total_connections: self.connections,
            total_tags: self.tags.len() as u64,
            total_words: self.words,
            total_files: self.documents,
        }
    }
}

/// Aggregate a whole corpus of extraction results
pub fn aggregate<I, E>(results: I) -> VaultStats
where
    I: IntoIterator<Item = Result<DocumentMetrics, E>>,
{
    let mut acc = StatsAccumulator::new();
    for result in results {
        match result {
            Ok(metrics) => acc.add(metrics),
            Err(_) => acc.skip(),
        }
    }
    acc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(words: u64, links: u64, tags: &[&str]) -> DocumentMetrics {
        DocumentMetrics {
            word_count: words,
            link_count: links,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_empty_corpus() {
        let stats = aggregate(Vec::<Result<DocumentMetrics, ()>>::new());
        assert_eq!(stats, VaultStats::default());
    }

    #[test]
    fn test_totals_and_distinct_tags() {
        let stats = aggregate::<_, ()>(vec![
            Ok(metrics(120, 2, &["rust", "notes"])),
            Ok(metrics(30, 0, &["rust"])),
            Ok(metrics(0, 5, &[])),
        ]);

        assert_eq!(stats.total_notes, 3);
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_connections, 7);
        assert_eq!(stats.total_words, 150);
        assert_eq!(stats.total_tags, 2);
    }

    #[test]
    fn test_failures_are_excluded() {
        let mut acc = StatsAccumulator::new();
        acc.add(metrics(10, 1, &["a"]));
        acc.skip();
        acc.skip();

        let stats = acc.finish();
        assert_eq!(acc.failed(), 2);
        assert_eq!(stats.total_notes, 1);
        assert_eq!(stats.total_files, 1);
        assert_eq!(stats.total_words, 10);
    }

    #[test]
    fn test_order_independent() {
        let docs = vec![
            metrics(10, 1, &["a", "b"]),
            metrics(20, 2, &["b", "c"]),
            metrics(30, 3, &["d"]),
        ];
        let forward = aggregate::<_, ()>(docs.iter().cloned().map(Ok));
        let reverse = aggregate::<_, ()>(docs.iter().rev().cloned().map(Ok));
        assert_eq!(forward, reverse);
        assert_eq!(forward.total_tags, 4);
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let json = serde_json::to_value(VaultStats {
            total_notes: 1,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(json["totalNotes"], 1);
        assert_eq!(json["totalFiles"], 0);
    }
}
