//! `wordline` — the transcript–audio alignment and phonetic query core of a
//! pronunciation-training product.
//!
//! This crate provides:
//! - Normalization of heterogeneous upstream transcript payloads into one
//!   canonical, word-indexed timeline
//! - Positional merging of externally-sourced per-word annotations
//! - Loop-free time synchronization between an audio element and a visual timeline
//! - Lexical-set / ARPAbet queries over a pronouncing dictionary, stress-aware and
//!   frequency-ranked
//!
//! The one invariant everything hangs on: a word's identity (its global index)
//! survives normalization, merging, and time-remapping unchanged.

// High-level API (most consumers should start here).
pub mod loader;

// Canonical data model.
pub mod transcript;

// Ingestion pipeline: shape detection, normalization, indexing.
pub mod input;
pub mod normalize;
pub mod indexer;

// Annotation merging.
pub mod merge;

// Audio/timeline time synchronization.
pub mod playback;

// Phonetic queries.
pub mod phoneme;
pub mod query;

// Crate-wide error type.
pub mod error;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

pub use error::{Error, Result};
