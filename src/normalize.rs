//! Transcript Normalizer: raw upstream shapes → normalized paragraphs.
//!
//! This module is intentionally small and orchestration-focused:
//! - `input` handles shape detection
//! - `normalize` flattens every shape into the same paragraph structure
//! - `indexer` resolves absolute timestamps and assigns indices
//!
//! Normalization is a pure function of its input. The one piece of knowledge added
//! here is the offset *unit*: sample-based for the wrapped shapes, second-based for
//! flat word arrays. The indexer converts based on that tag instead of guessing.

use serde_json::Value;

use crate::error::Result;
use crate::input::{RawTranscript, RawWord};

/// The unit a paragraph's `start_offset` is expressed in.
///
/// This is a property of the source format, recorded at normalization time so the
/// indexer never has to infer units from magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetUnit {
    /// Offset counts samples at [`crate::indexer::SAMPLE_RATE`].
    Samples,

    /// Offset is already in seconds.
    Seconds,
}

/// A paragraph with a known offset unit, ready for indexing.
#[derive(Debug, Clone)]
pub struct NormalizedParagraph {
    pub start_offset: f64,
    pub offset_unit: OffsetUnit,
    pub words: Vec<RawWord>,
}

/// Flatten a detected payload into the common paragraph structure.
///
/// - `SpeechWrapper` keeps its paragraph list; offsets are sample-based.
/// - `OffsetAlignment` becomes a single paragraph; offsets are sample-based.
/// - `FlatWords` becomes a single paragraph at offset 0; word start times are
///   already absolute seconds.
pub fn normalize(raw: RawTranscript) -> Vec<NormalizedParagraph> {
    match raw {
        RawTranscript::SpeechWrapper(paragraphs) => paragraphs
            .into_iter()
            .map(|p| NormalizedParagraph {
                start_offset: p.start_offset,
                offset_unit: OffsetUnit::Samples,
                words: p.alignment,
            })
            .collect(),

        RawTranscript::OffsetAlignment(p) => vec![NormalizedParagraph {
            start_offset: p.start_offset,
            offset_unit: OffsetUnit::Samples,
            words: p.alignment,
        }],

        RawTranscript::FlatWords(words) => vec![NormalizedParagraph {
            start_offset: 0.0,
            offset_unit: OffsetUnit::Seconds,
            words,
        }],
    }
}

/// Detect and normalize in one step.
///
/// Unrecognized shapes fail with [`crate::error::Error::Format`]; downstream stages
/// tolerate an empty paragraph list, so callers that must not fail (the loader)
/// catch that case, log it, and continue with no words.
pub fn normalize_value(value: &Value) -> Result<Vec<NormalizedParagraph>> {
    Ok(normalize(RawTranscript::detect(value)?))
}
