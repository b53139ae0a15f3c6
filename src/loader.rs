//! High-level transcript loading: media lookup, fetch bookkeeping, and the
//! normalize → index → merge pipeline.
//!
//! The loader owns the long-lived pieces the pipeline needs:
//! - the media store collaborator (audio id → mp3/transcript URLs)
//! - an explicit media-info cache, owned here rather than living in module-level
//!   statics, so its lifecycle is the loader's lifecycle
//! - the in-flight bookkeeping that makes transcript switching safe
//!
//! Fetching itself belongs to the surrounding runtime (HTTP client, event loop).
//! The loader brackets it instead: [`TranscriptLoader::begin`] hands out a ticket
//! before the fetch starts, and [`TranscriptLoader::complete`] accepts the payload
//! only if that ticket still corresponds to the selected transcript. A response
//! that arrives after the user switched away is detected by ticket comparison and
//! discarded — stale data never overwrites the newly selected transcript. A second
//! `begin` for a key already in flight is suppressed (no new ticket), which is all
//! the request-coalescing this subsystem needs.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::indexer::index_words;
use crate::merge::{AnnotationRecord, MergeReport, Merger};
use crate::normalize::normalize_value;
use crate::transcript::Transcript;

/// Media-store record for one audio identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaInfo {
    pub mp3_url: String,
    pub transcript_url: String,
}

/// The media store collaborator: audio id → URLs.
pub trait MediaStore {
    fn media_for(&self, audio_id: &str) -> Result<MediaInfo>;
}

/// Proof that a fetch was started through the loader.
///
/// Completion is only accepted for the ticket belonging to the currently selected
/// transcript; anything else is stale and discarded.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    id: Uuid,
    audio_id: String,

    /// Where the caller should fetch from.
    pub media: MediaInfo,
}

impl LoadTicket {
    pub fn audio_id(&self) -> &str {
        &self.audio_id
    }
}

/// The finished product: playable URL plus the canonical transcript.
#[derive(Debug, Clone)]
pub struct LoadedTranscript {
    pub mp3_url: String,
    pub transcript: Transcript,
    pub merge_report: MergeReport,
}

/// Owns the loading pipeline for one transcript view.
pub struct TranscriptLoader<S: MediaStore> {
    store: S,
    merger: Merger,

    /// The transcript key the UI currently wants. Completions for anything else
    /// are stale.
    selected: Option<String>,

    /// The one fetch we consider live, if any.
    in_flight: Option<Uuid>,

    media_cache: HashMap<String, MediaInfo>,
}

impl<S: MediaStore> TranscriptLoader<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            merger: Merger::new(),
            selected: None,
            in_flight: None,
            media_cache: HashMap::new(),
        }
    }

    /// Use a non-default merger (external stores with different field names).
    pub fn with_merger(store: S, merger: Merger) -> Self {
        Self {
            merger,
            ..Self::new(store)
        }
    }

    /// Select `audio_id` and start a load for it.
    ///
    /// Returns `Ok(None)` when a fetch for the same key is already in flight — the
    /// caller should simply wait for that one. Selecting a *different* key always
    /// starts a new load and implicitly stales the previous ticket.
    pub fn begin(&mut self, audio_id: &str) -> Result<Option<LoadTicket>> {
        if self.in_flight.is_some() && self.selected.as_deref() == Some(audio_id) {
            trace!(audio_id, "load already in flight; suppressed");
            return Ok(None);
        }

        let media = match self.media_cache.get(audio_id) {
            Some(cached) => cached.clone(),
            None => {
                let fetched = self.store.media_for(audio_id)?;
                self.media_cache
                    .insert(audio_id.to_string(), fetched.clone());
                fetched
            }
        };

        let ticket = LoadTicket {
            id: Uuid::new_v4(),
            audio_id: audio_id.to_string(),
            media,
        };
        self.selected = Some(audio_id.to_string());
        self.in_flight = Some(ticket.id);

        Ok(Some(ticket))
    }

    /// Deliver a fetched transcript payload (plus annotation records) for a ticket.
    ///
    /// Returns `None` — leaving all state untouched — when the ticket is stale:
    /// either a newer load replaced it or the selection moved to another key.
    ///
    /// A payload in an unrecognized shape degrades to an empty transcript with a
    /// warning; the UI renders no words rather than crashing on a bad upstream
    /// response.
    pub fn complete(
        &mut self,
        ticket: &LoadTicket,
        transcript_json: &Value,
        records: &[AnnotationRecord],
    ) -> Option<LoadedTranscript> {
        let live = self.in_flight == Some(ticket.id)
            && self.selected.as_deref() == Some(ticket.audio_id.as_str());
        if !live {
            trace!(audio_id = %ticket.audio_id, "stale transcript response discarded");
            return None;
        }
        self.in_flight = None;

        let paragraphs = match normalize_value(transcript_json) {
            Ok(paragraphs) => paragraphs,
            Err(Error::Format(detail)) => {
                warn!(audio_id = %ticket.audio_id, %detail, "unrecognized transcript format; rendering empty");
                Vec::new()
            }
            Err(err) => {
                warn!(audio_id = %ticket.audio_id, %err, "transcript payload unusable; rendering empty");
                Vec::new()
            }
        };

        let mut transcript = index_words(paragraphs);
        let merge_report = self.merger.merge(&mut transcript, records);
        debug!(
            audio_id = %ticket.audio_id,
            words = transcript.len(),
            matched = merge_report.matched,
            skipped = merge_report.skipped_malformed,
            out_of_range = merge_report.out_of_range,
            "transcript loaded"
        );

        Some(LoadedTranscript {
            mp3_url: ticket.media.mp3_url.clone(),
            transcript,
            merge_report,
        })
    }

    /// The currently selected transcript key, if any.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Whether a load is currently in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Drop cached media info (e.g. after URLs expire).
    pub fn clear_media_cache(&mut self) {
        self.media_cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    struct FakeStore {
        calls: Cell<usize>,
    }

    impl FakeStore {
        fn new() -> Self {
            Self { calls: Cell::new(0) }
        }
    }

    impl MediaStore for FakeStore {
        fn media_for(&self, audio_id: &str) -> Result<MediaInfo> {
            self.calls.set(self.calls.get() + 1);
            Ok(MediaInfo {
                mp3_url: format!("https://media.test/{audio_id}.mp3"),
                transcript_url: format!("https://media.test/{audio_id}.json"),
            })
        }
    }

    fn flat_payload() -> Value {
        json!([
            { "word": "hello", "start": 0.0 },
            { "word": "there", "start": 0.6 }
        ])
    }

    #[test]
    fn load_round_trip_produces_canonical_transcript() {
        let mut loader = TranscriptLoader::new(FakeStore::new());

        let ticket = loader.begin("clip-1").unwrap().unwrap();
        assert_eq!(ticket.audio_id(), "clip-1");
        assert!(loader.is_loading());

        let loaded = loader.complete(&ticket, &flat_payload(), &[]).unwrap();
        assert_eq!(loaded.mp3_url, "https://media.test/clip-1.mp3");
        assert_eq!(loaded.transcript.len(), 2);
        assert_eq!(loaded.transcript.words[1].index, 1);
        assert!(!loader.is_loading());
    }

    #[test]
    fn second_begin_for_same_key_is_suppressed() {
        let mut loader = TranscriptLoader::new(FakeStore::new());

        let ticket = loader.begin("clip-1").unwrap().unwrap();
        assert!(loader.begin("clip-1").unwrap().is_none());

        // The original ticket still completes normally.
        assert!(loader.complete(&ticket, &flat_payload(), &[]).is_some());
    }

    #[test]
    fn late_response_for_previous_selection_is_discarded() {
        let mut loader = TranscriptLoader::new(FakeStore::new());

        let stale = loader.begin("clip-1").unwrap().unwrap();
        let fresh = loader.begin("clip-2").unwrap().unwrap();

        // clip-1's response arrives after the switch: discarded, state untouched.
        assert!(loader.complete(&stale, &flat_payload(), &[]).is_none());
        assert_eq!(loader.selected(), Some("clip-2"));
        assert!(loader.is_loading());

        let loaded = loader.complete(&fresh, &flat_payload(), &[]).unwrap();
        assert_eq!(loaded.mp3_url, "https://media.test/clip-2.mp3");
    }

    #[test]
    fn completing_twice_with_the_same_ticket_is_stale_the_second_time() {
        let mut loader = TranscriptLoader::new(FakeStore::new());
        let ticket = loader.begin("clip-1").unwrap().unwrap();

        assert!(loader.complete(&ticket, &flat_payload(), &[]).is_some());
        assert!(loader.complete(&ticket, &flat_payload(), &[]).is_none());
    }

    #[test]
    fn unrecognized_payload_degrades_to_empty_transcript() {
        let mut loader = TranscriptLoader::new(FakeStore::new());
        let ticket = loader.begin("clip-1").unwrap().unwrap();

        let loaded = loader
            .complete(&ticket, &json!({ "surprise": true }), &[])
            .unwrap();
        assert!(loaded.transcript.is_empty());
        assert_eq!(loaded.mp3_url, "https://media.test/clip-1.mp3");
    }

    #[test]
    fn media_info_is_cached_per_loader() {
        let mut loader = TranscriptLoader::new(FakeStore::new());

        let t1 = loader.begin("clip-1").unwrap().unwrap();
        loader.complete(&t1, &flat_payload(), &[]);
        let t2 = loader.begin("clip-1").unwrap().unwrap();
        loader.complete(&t2, &flat_payload(), &[]);

        assert_eq!(loader.store.calls.get(), 1);

        loader.clear_media_cache();
        let t3 = loader.begin("clip-1").unwrap().unwrap();
        loader.complete(&t3, &flat_payload(), &[]);
        assert_eq!(loader.store.calls.get(), 2);
    }

    #[test]
    fn annotations_flow_through_the_pipeline() {
        let mut loader = TranscriptLoader::new(FakeStore::new());
        let ticket = loader.begin("clip-1").unwrap().unwrap();

        let records: Vec<AnnotationRecord> = serde_json::from_value(json!([
            { "id": "rec1", "fields": { "word index": 1, "BR issues": ["th-sound"] } }
        ]))
        .unwrap();

        let loaded = loader.complete(&ticket, &flat_payload(), &records).unwrap();
        assert_eq!(loaded.merge_report.matched, 1);
        assert_eq!(loaded.transcript.words[1].annotations[0].target_ref, "th-sound");
    }
}
