//! Annotation Merger: external annotation records → per-word annotations.
//!
//! Annotation records live in a separate record store with its own key space. Each
//! record carries an external "word index" field that we explicitly map onto the
//! canonical index — the two domains happen to line up in practice, but we validate
//! every record rather than assume it.
//!
//! The merge is additive and idempotent:
//! - annotations append, deduplicated by `(source_id, target_ref)`
//! - record metadata shallow-merges into `Word::extra`, keyed writes overwriting
//!   keyed writes, never the word's identity fields
//! - malformed or out-of-range records are counted in [`MergeReport`] and skipped,
//!   never thrown

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::transcript::{Annotation, Transcript};

/// Default name of the external word-index field.
const DEFAULT_INDEX_FIELD: &str = "word index";

/// Default name of the field holding annotation (issue) references.
const DEFAULT_ISSUES_FIELD: &str = "BR issues";

/// A record as returned by the external annotation store.
#[derive(Debug, Deserialize, Clone)]
pub struct AnnotationRecord {
    /// The store's opaque record key.
    pub id: String,

    #[serde(default, rename = "createdTime")]
    pub created_time: Option<String>,

    /// Arbitrary annotation fields, including the external word index.
    #[serde(default)]
    pub fields: serde_json::Map<String, Value>,
}

/// What happened during a merge. Problems are counted, not raised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Words that received a record.
    pub matched: usize,

    /// Records skipped because the index field was missing or unparseable.
    pub skipped_malformed: usize,

    /// Records whose external index points past the end of the word sequence.
    pub out_of_range: usize,
}

/// Merges annotation records into a transcript.
///
/// The field names are configurable because they belong to the external store's
/// schema, not ours; the defaults match the production record layout.
#[derive(Debug, Clone)]
pub struct Merger {
    index_field: String,
    issues_field: String,
}

impl Default for Merger {
    fn default() -> Self {
        Self::new()
    }
}

impl Merger {
    pub fn new() -> Self {
        Self {
            index_field: DEFAULT_INDEX_FIELD.to_string(),
            issues_field: DEFAULT_ISSUES_FIELD.to_string(),
        }
    }

    /// Use non-default field names for the external index and issue references.
    pub fn with_fields(index_field: impl Into<String>, issues_field: impl Into<String>) -> Self {
        Self {
            index_field: index_field.into(),
            issues_field: issues_field.into(),
        }
    }

    /// Merge `records` into `transcript`, returning what happened.
    ///
    /// Words with no matching record are left untouched. Running the same merge
    /// twice produces the same transcript as running it once.
    pub fn merge(&self, transcript: &mut Transcript, records: &[AnnotationRecord]) -> MergeReport {
        let mut report = MergeReport::default();
        let mut by_index: HashMap<usize, &AnnotationRecord> = HashMap::new();

        for record in records {
            match self.external_index(record) {
                Some(index) if index < transcript.len() => {
                    // Later records win, matching the store's own "last write" view.
                    by_index.insert(index, record);
                }
                Some(index) => {
                    debug!(index, record = %record.id, "annotation index out of range");
                    report.out_of_range += 1;
                }
                None => {
                    debug!(record = %record.id, "annotation record missing a usable word index");
                    report.skipped_malformed += 1;
                }
            }
        }

        for word in &mut transcript.words {
            let Some(record) = by_index.get(&word.index) else {
                continue;
            };
            report.matched += 1;

            for target_ref in self.issue_refs(record) {
                let annotation = Annotation {
                    source_id: record.id.clone(),
                    target_ref,
                };
                if !word.annotations.contains(&annotation) {
                    word.annotations.push(annotation);
                }
            }

            // Shallow-merge record metadata. The index field is the join key, not data;
            // identity fields live outside `extra` and cannot be overwritten here.
            for (key, value) in &record.fields {
                if key != &self.index_field {
                    word.extra.insert(key.clone(), value.clone());
                }
            }
            if let Some(created) = &record.created_time {
                word.extra
                    .insert("createdTime".to_string(), Value::String(created.clone()));
            }
        }

        report
    }

    /// Parse the external word index. The store emits both JSON numbers and numeric
    /// strings; anything else is malformed.
    fn external_index(&self, record: &AnnotationRecord) -> Option<usize> {
        match record.fields.get(&self.index_field)? {
            Value::Number(n) => n.as_u64().map(|n| n as usize),
            Value::String(s) => s.trim().parse::<usize>().ok(),
            _ => None,
        }
    }

    /// Issue references from the record: an array of strings, or a single string.
    fn issue_refs(&self, record: &AnnotationRecord) -> Vec<String> {
        match record.fields.get(&self.issues_field) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            Some(Value::String(s)) => vec![s.clone()],
            _ => Vec::new(),
        }
    }
}
