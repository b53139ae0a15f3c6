use serde_json::json;

use wordline::indexer::index_words;
use wordline::loader::{MediaInfo, MediaStore, TranscriptLoader};
use wordline::merge::{AnnotationRecord, Merger};
use wordline::normalize::normalize_value;
use wordline::playback::{Driver, PlaybackSync, SeekOutcome};
use wordline::query::{MemoryLexicon, QueryOpts, query_phoneme};
use wordline::transcript::Transcript;

fn pipeline(payload: &serde_json::Value) -> anyhow::Result<Transcript> {
    Ok(index_words(normalize_value(payload)?))
}

#[test]
fn all_three_shapes_normalize_to_the_same_words() -> anyhow::Result<()> {
    // Equivalent content: two words at absolute 2.0s and 2.4s. The wrapped shapes
    // express the paragraph offset in samples (32000 / 16000 = 2s).
    let wrapped = json!({
        "speech": {
            "transcripts": [{
                "start_offset": 32000,
                "alignment": [
                    { "word": "hello", "start": 0.0 },
                    { "word": "there", "start": 0.4 }
                ]
            }]
        }
    });
    let rooted = json!({
        "start_offset": 32000,
        "alignment": [
            { "word": "hello", "start": 0.0 },
            { "word": "there", "start": 0.4 }
        ]
    });
    let flat = json!([
        { "word": "hello", "start": 2.0 },
        { "word": "there", "start": 2.4 }
    ]);

    let a = pipeline(&wrapped)?;
    let b = pipeline(&rooted)?;
    let c = pipeline(&flat)?;

    for t in [&a, &b, &c] {
        assert_eq!(t.len(), 2);
    }
    for (wa, (wb, wc)) in a.words.iter().zip(b.words.iter().zip(c.words.iter())) {
        assert_eq!(wa.index, wb.index);
        assert_eq!(wa.index, wc.index);
        assert_eq!(wa.text, wb.text);
        assert_eq!(wa.text, wc.text);
        assert!((wa.start_time - wb.start_time).abs() < 1e-9);
        assert!((wa.start_time - wc.start_time).abs() < 1e-9);
    }
    Ok(())
}

#[test]
fn indices_are_unique_and_times_non_decreasing() -> anyhow::Result<()> {
    let payload = json!({
        "speech": {
            "transcripts": [
                { "start_offset": 0, "alignment": [
                    { "word": "a", "start": 0.0 },
                    { "word": "b", "start": 0.0 },
                    { "word": "c", "start": 0.5 }
                ]},
                { "start_offset": 16000, "alignment": [
                    { "word": "d", "start": 0.0 },
                    { "word": "e", "start": 0.25 }
                ]}
            ]
        }
    });

    let t = pipeline(&payload)?;
    assert_eq!(t.len(), 5);
    for pair in t.words.windows(2) {
        assert!(pair[0].index < pair[1].index);
        assert!(pair[0].start_time <= pair[1].start_time);
    }
    Ok(())
}

#[test]
fn merging_twice_equals_merging_once() -> anyhow::Result<()> {
    let payload = json!([
        { "word": "the", "start": 0.0 },
        { "word": "cat", "start": 0.3 },
        { "word": "sat", "start": 0.7 }
    ]);
    let records: Vec<AnnotationRecord> = serde_json::from_value(json!([
        { "id": "recA", "fields": { "word index": 1, "BR issues": ["trap-vowel"], "Note": "flat" } },
        { "id": "recB", "fields": { "word index": "2", "BR issues": ["final-t"] } }
    ]))?;

    let merger = Merger::new();
    let mut once = pipeline(&payload)?;
    merger.merge(&mut once, &records);

    let mut twice = pipeline(&payload)?;
    merger.merge(&mut twice, &records);
    merger.merge(&mut twice, &records);

    for (a, b) in once.words.iter().zip(twice.words.iter()) {
        assert_eq!(a.annotations, b.annotations);
        assert_eq!(a.extra, b.extra);
    }
    assert_eq!(once.words[1].annotations.len(), 1);
    assert_eq!(once.words[2].annotations[0].target_ref, "final-t");
    Ok(())
}

#[test]
fn active_word_lookup_breaks_ties_toward_higher_index() -> anyhow::Result<()> {
    let payload = json!([
        { "word": "w0", "start": 0.0 },
        { "word": "w1", "start": 1.2 },
        { "word": "w2", "start": 3.5 },
        { "word": "w3", "start": 3.5 },
        { "word": "w4", "start": 7.0 }
    ]);
    let t = pipeline(&payload)?;
    assert_eq!(t.word_at(3.6), Some(3));
    Ok(())
}

#[test]
fn playback_conflict_resolves_to_the_first_driver() -> anyhow::Result<()> {
    let t = pipeline(&json!([
        { "word": "a", "start": 0.0 },
        { "word": "b", "start": 1.0 },
        { "word": "c", "start": 2.0 }
    ]))?;

    let mut sync = PlaybackSync::new();
    sync.load(&t);

    // A timeline seek is mid-flight when the audio element's timeupdate fires.
    assert!(sync.begin_seek(Driver::Timeline, 2.2));
    assert_eq!(sync.on_time_update(0.9), SeekOutcome::Dropped);
    let settled = sync.settle();

    assert_eq!(
        settled,
        SeekOutcome::Applied {
            time: 2.2,
            active_word: Some(2)
        }
    );
    assert_eq!(sync.current_time(), 2.2);

    // Mirroring the settled time back from the audio side converges instead of
    // oscillating: one more update, then a fixed point.
    assert_eq!(
        sync.on_time_update(2.2),
        SeekOutcome::Applied {
            time: 2.2,
            active_word: Some(2)
        }
    );
    Ok(())
}

struct StaticStore;

impl MediaStore for StaticStore {
    fn media_for(&self, audio_id: &str) -> wordline::Result<MediaInfo> {
        Ok(MediaInfo {
            mp3_url: format!("https://cdn.test/{audio_id}.mp3"),
            transcript_url: format!("https://cdn.test/{audio_id}.json"),
        })
    }
}

#[test]
fn switching_transcripts_mid_fetch_discards_the_stale_response() -> anyhow::Result<()> {
    let mut loader = TranscriptLoader::new(StaticStore);

    let first = loader.begin("before")?.expect("ticket");
    let second = loader.begin("after")?.expect("ticket");

    let stale_payload = json!([{ "word": "stale", "start": 0.0 }]);
    let fresh_payload = json!([{ "word": "fresh", "start": 0.0 }]);

    assert!(loader.complete(&first, &stale_payload, &[]).is_none());

    let loaded = loader.complete(&second, &fresh_payload, &[]).expect("fresh load");
    assert_eq!(loaded.transcript.words[0].text, "fresh");
    assert_eq!(loaded.mp3_url, "https://cdn.test/after.mp3");
    Ok(())
}

fn fixture_lexicon() -> MemoryLexicon {
    let mut lex = MemoryLexicon::default();
    lex.insert("see", "S IY1", Some(3000.0));
    lex.insert("people", "P IY1 P AH0 L", Some(2500.0));
    lex.insert("city", "S IH1 T IY0", Some(2000.0));
    lex.insert("pretty", "P R IH1 T IY0", Some(1500.0));
    lex.insert("believe", "B IH0 L IY1 V", Some(1000.0));
    lex.insert("spin", "S P IH1 N", Some(500.0));
    lex.insert("unknown", "AH0 N OW1 N", None);
    lex
}

#[test]
fn fleece_with_primary_stress_matches_only_iy1() -> anyhow::Result<()> {
    let results = query_phoneme(&fixture_lexicon(), "FLEECE", &QueryOpts::default())?;

    assert!(!results.is_empty());
    for entry in &results {
        assert!(entry.transcription.contains("IY1"), "{entry:?}");
        assert!(!entry.transcription.contains("IY0"), "{entry:?}");
        assert!(!entry.transcription.contains("IY2"), "{entry:?}");
    }
    let words: Vec<&str> = results.iter().map(|e| e.word.as_str()).collect();
    assert_eq!(words, vec!["see", "people", "believe"]);
    Ok(())
}

#[test]
fn consonant_query_ignores_stress() -> anyhow::Result<()> {
    let results = query_phoneme(&fixture_lexicon(), "P", &QueryOpts::default())?;

    let words: Vec<&str> = results.iter().map(|e| e.word.as_str()).collect();
    assert_eq!(words, vec!["people", "pretty", "spin"]);
    Ok(())
}

#[test]
fn bad_query_inputs_are_surfaced() {
    let lex = fixture_lexicon();

    let err = query_phoneme(&lex, "zzz", &QueryOpts::default()).unwrap_err();
    assert!(matches!(err, wordline::Error::UnknownPhoneme(_)));

    let err = query_phoneme(
        &lex,
        "FLEECE",
        &QueryOpts {
            stress: Some(String::new()),
            limit: 0,
        },
    )
    .unwrap_err();
    assert!(matches!(err, wordline::Error::InvalidStress(_)));
}
