//! Canonical transcript data model.
//!
//! Every upstream payload shape is normalized into this one structure: a flat,
//! globally indexed word sequence with absolute start times. The index is a word's
//! identity — it is assigned once at ingestion and survives annotation merging and
//! time lookups unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A per-word annotation attached by the merger.
///
/// Annotations are owned by the external annotation store; we only hold read-only
/// copies. `source_id` is the store's opaque record key, `target_ref` identifies the
/// category/issue the annotation points at.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub source_id: String,
    pub target_ref: String,
}

/// The atomic unit of the canonical transcript.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Word {
    /// Globally unique, monotonically increasing across the whole transcript.
    /// Assigned once by the indexer and never reused.
    pub index: usize,

    pub text: String,

    /// Absolute start time in seconds. Non-decreasing in index order (zero-duration
    /// markers make it non-strict).
    pub start_time: f64,

    /// The owning paragraph. A word belongs to exactly one paragraph.
    pub paragraph_index: usize,

    /// Layout hint: render a line break after this word.
    #[serde(default, skip_serializing_if = "is_false")]
    pub line_break_after: bool,

    /// Layout hint: start a new paragraph after this word. Mutually exclusive with
    /// `line_break_after`; the paragraph break wins when both would apply.
    #[serde(default, skip_serializing_if = "is_false")]
    pub new_paragraph_after: bool,

    /// Annotations attached by the merger, in merge order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,

    /// Annotation-record metadata shallow-merged in by key. Identity fields
    /// (`index`, `text`, `start_time`) are never written through this map.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn is_false(b: &bool) -> bool {
    !b
}

/// The canonical, indexed, annotation-merged word sequence.
///
/// Rebuilt on every fetch; nothing in this subsystem mutates it in place except the
/// merger, which only appends annotations and metadata.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Transcript {
    pub words: Vec<Word>,
}

impl Transcript {
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Find the active word for a playback time: the word with the greatest
    /// `start_time <= time`, ties broken toward the higher index.
    ///
    /// Start times are non-decreasing in index order (an indexer guarantee), so this
    /// is a single binary search. Returns `None` before the first word starts, or on
    /// an empty transcript.
    pub fn word_at(&self, time: f64) -> Option<usize> {
        let n = self.words.partition_point(|w| w.start_time <= time);
        if n == 0 {
            return None;
        }
        Some(self.words[n - 1].index)
    }
}
