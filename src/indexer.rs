//! Word Indexer: normalized paragraphs → the canonical indexed transcript.
//!
//! We walk paragraphs in order, resolve each word's absolute start time against the
//! paragraph offset, and hand out one global counter value per word. The resulting
//! index is the word's identity for every later stage (merging, highlighting), so it
//! is assigned exactly once, after ordering is settled, and never reused.

use tracing::warn;

use crate::normalize::{NormalizedParagraph, OffsetUnit};
use crate::transcript::{Transcript, Word};

/// Sample rate used by sample-based paragraph offsets.
///
/// Upstream aligners that report offsets in samples all run at 16 kHz; this is a
/// collaborator-supplied constant, not something we detect.
pub const SAMPLE_RATE: u32 = 16_000;

/// Resolve timestamps and assign global word indices.
///
/// Guarantees on the output:
/// - `index` is unique and strictly increasing in sequence order, starting at 0
/// - `start_time` is non-decreasing in index order
/// - words keep their paragraph membership; a paragraph with no words contributes
///   nothing (and no error)
///
/// Inputs that violate start-time monotonicity are reordered (stable sort) before
/// indices are assigned, so the guarantees hold by construction.
pub fn index_words(paragraphs: Vec<NormalizedParagraph>) -> Transcript {
    let mut resolved: Vec<Word> = Vec::new();

    for (paragraph_index, paragraph) in paragraphs.into_iter().enumerate() {
        let offset_seconds = match paragraph.offset_unit {
            OffsetUnit::Samples => paragraph.start_offset / f64::from(SAMPLE_RATE),
            OffsetUnit::Seconds => paragraph.start_offset,
        };

        let mut words: Vec<Word> = paragraph
            .words
            .into_iter()
            .map(|raw| {
                // A paragraph break and a line break on the same word collapse to the
                // paragraph break.
                let new_paragraph_after = raw.new_paragraph_after;
                let line_break_after = raw.line_break_after && !new_paragraph_after;
                Word {
                    index: 0, // assigned below, once ordering is settled
                    text: raw.word,
                    start_time: raw.start + offset_seconds,
                    paragraph_index,
                    line_break_after,
                    new_paragraph_after,
                    ..Word::default()
                }
            })
            .collect();

        // Aligners occasionally emit locally out-of-order words; reorder within the
        // paragraph rather than reject the payload.
        words.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        resolved.extend(words);
    }

    // A regression *across* paragraphs means the paragraph offsets themselves are
    // inconsistent. Reorder the whole sequence so the monotonicity invariant still
    // holds, and say so.
    let monotone = resolved
        .windows(2)
        .all(|pair| pair[0].start_time <= pair[1].start_time);
    if !monotone {
        warn!("paragraph offsets out of order; reordering words by start time");
        resolved.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
    }

    for (index, word) in resolved.iter_mut().enumerate() {
        word.index = index;
    }

    Transcript { words: resolved }
}
