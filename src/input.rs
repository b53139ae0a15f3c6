//! Raw upstream transcript payloads and shape detection.
//!
//! Transcripts arrive from several upstream sources in three recognized JSON shapes.
//! We resolve the shape exactly once, at this boundary, into a tagged variant —
//! later stages never probe properties to figure out what they were handed.
//!
//! Recognized shapes, in detection order:
//! - `SpeechWrapper`: `{ "speech": { "transcripts": [paragraph, ...] } }`
//! - `OffsetAlignment`: `{ "start_offset": n, "alignment": [word, ...] }` (one implicit paragraph)
//! - `FlatWords`: `[word, ...]` with no paragraph wrapper (absolute start times)

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// A word as reported by an upstream aligner, before indexing.
///
/// `start` is paragraph-local for the wrapped shapes and absolute for `FlatWords`;
/// the indexer resolves it against the paragraph offset either way.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawWord {
    pub word: String,

    #[serde(default)]
    pub start: f64,

    #[serde(default)]
    pub end: Option<f64>,

    /// Layout hints carried by hand-edited transcripts. Mutually exclusive.
    #[serde(default, rename = "lineBreakAfter")]
    pub line_break_after: bool,

    #[serde(default, rename = "newParagraphAfter")]
    pub new_paragraph_after: bool,
}

/// A paragraph as reported upstream: an offset plus its aligned words.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawParagraph {
    #[serde(default)]
    pub start_offset: f64,

    /// Missing `alignment` is treated as a paragraph with zero words, not an error.
    #[serde(default)]
    pub alignment: Vec<RawWord>,
}

/// An upstream transcript payload, resolved to exactly one recognized shape.
#[derive(Debug, Clone)]
pub enum RawTranscript {
    /// Paragraph list under a `speech.transcripts` wrapper. Offsets are in samples.
    SpeechWrapper(Vec<RawParagraph>),

    /// A single implicit paragraph with `start_offset` and `alignment` at the root.
    /// Offsets are in samples.
    OffsetAlignment(RawParagraph),

    /// A flat word array with absolute, second-based start times.
    FlatWords(Vec<RawWord>),
}

impl RawTranscript {
    /// Classify a payload into one of the recognized shapes.
    ///
    /// Fails with [`Error::Format`] on anything else (including an empty array,
    /// which carries no evidence of being a word list). Callers running the full
    /// pipeline degrade that to an empty transcript; see `loader`.
    pub fn detect(value: &Value) -> Result<Self> {
        if let Some(transcripts) = value.pointer("/speech/transcripts") {
            let paragraphs: Vec<RawParagraph> =
                serde_json::from_value(transcripts.clone()).map_err(shape_err)?;
            return Ok(Self::SpeechWrapper(paragraphs));
        }

        if value.get("start_offset").is_some() && value.get("alignment").is_some() {
            let paragraph: RawParagraph =
                serde_json::from_value(value.clone()).map_err(shape_err)?;
            return Ok(Self::OffsetAlignment(paragraph));
        }

        if let Some(items) = value.as_array() {
            if items.first().is_some_and(|w| w.get("word").is_some()) {
                let words: Vec<RawWord> =
                    serde_json::from_value(value.clone()).map_err(shape_err)?;
                return Ok(Self::FlatWords(words));
            }
        }

        Err(Error::Format(describe(value)))
    }
}

fn shape_err(err: serde_json::Error) -> Error {
    Error::Format(err.to_string())
}

/// A short, log-friendly description of an unrecognized payload.
fn describe(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().take(8).map(String::as_str).collect();
            format!("object with keys [{}]", keys.join(", "))
        }
        Value::Array(items) => format!("array of {} unrecognized items", items.len()),
        other => format!("JSON {}", json_type_name(other)),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
