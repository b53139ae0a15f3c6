//! Phonetic Query Engine: lexical-set / phoneme queries over a pronouncing dictionary.
//!
//! A query names a lexical set or phoneme ("FLEECE", "P", "schwa"), optionally a
//! stress filter, and a result limit. We resolve the name against the phoneme
//! table, construct the match pattern, and run a frequency-ranked search through
//! the [`Lexicon`] trait — the storage behind it (SQL `LIKE`, full scan, inverted
//! index) is not our concern.
//!
//! Pattern semantics:
//! - vowels match the cross product of their ARPAbet codes with the requested
//!   stress suffixes (`IY` × `{1}` → `IY1`); an empty stress set is a validation
//!   error, never an implicit "any stress"
//! - consonants have no stress concept and match their codes as whole tokens — a
//!   bare `P` substring would match half the dictionary, so consonant terms are
//!   matched against the space-padded transcription

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::phoneme::{self, PhonemeKind};

/// Default result-count limit.
pub const DEFAULT_LIMIT: usize = 20;

/// Default stress filter: primary stress only.
pub const DEFAULT_STRESS: &str = "1";

/// Orthographic fragments of contractions ("don't" → "t") that pollute frequency
/// rankings; excluded from every query.
pub const CONTRACTION_FRAGMENTS: &[&str] = &["t", "re", "d", "s", "m", "ll", "ve"];

/// Options controlling a single query.
///
/// This is library-level configuration, not query-string flags; frontends map user
/// input into this type.
#[derive(Debug, Clone, Default)]
pub struct QueryOpts {
    /// Stress filter, e.g. `"1"`, `"02"`. `None` means the default (`"1"`).
    /// Ignored for consonants. An explicitly empty filter is rejected.
    pub stress: Option<String>,

    /// Result-count limit. Zero means the default (20).
    pub limit: usize,
}

impl QueryOpts {
    fn effective_limit(&self) -> usize {
        if self.limit == 0 { DEFAULT_LIMIT } else { self.limit }
    }
}

/// A constructed match pattern; derived per query, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneticPattern {
    /// ARPAbet codes the query targets, without stress digits.
    pub target_symbols: Vec<&'static str>,

    /// Requested stress suffixes. Empty for consonants.
    pub stress_suffixes: Vec<char>,

    pub is_vowel: bool,

    /// Space-padded substring terms; an entry matches if its padded transcription
    /// contains any of them.
    pub terms: Vec<String>,

    /// Space-padded terms that disqualify an entry even when a term matches.
    pub exclude_terms: Vec<String>,
}

/// One pronouncing-dictionary entry.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DictEntry {
    pub word: String,

    /// Space-separated ARPAbet transcription, e.g. `"HH AH0 L OW1"`.
    pub transcription: String,

    /// Corpus frequency. Entries without one never appear in query results.
    pub frequency: Option<f64>,
}

/// A search request as handed to the storage backend.
#[derive(Debug, Clone)]
pub struct LexiconQuery<'a> {
    /// Match if the padded transcription contains any of these, case-insensitively.
    pub any_terms: &'a [String],

    /// Reject matches whose padded transcription contains any of these.
    pub exclude_terms: &'a [String],

    /// Reject these orthographic words outright.
    pub exclude_words: &'a [&'a str],

    pub limit: usize,
}

/// The pronouncing dictionary store.
///
/// One operation: find entries whose space-padded transcription contains any query
/// term (case-insensitive substring), restricted to entries with a known corpus
/// frequency, ordered by frequency descending with ties broken by the dictionary's
/// natural order, truncated to the limit. Any backend that can do substring search
/// can implement this.
pub trait Lexicon {
    fn search(&self, query: &LexiconQuery<'_>) -> Result<Vec<DictEntry>>;
}

/// Resolve a name and stress filter into a match pattern.
pub fn build_pattern(name: &str, stress: Option<&str>) -> Result<PhoneticPattern> {
    let def =
        phoneme::resolve(name).ok_or_else(|| Error::UnknownPhoneme(name.to_string()))?;

    match def.kind {
        PhonemeKind::Vowel => {
            let suffixes = stress_suffixes(stress)?;
            let terms = def
                .arpabets
                .iter()
                .flat_map(|code| suffixes.iter().map(move |s| format!(" {code}{s} ")))
                .collect();
            Ok(PhoneticPattern {
                target_symbols: def.arpabets.to_vec(),
                stress_suffixes: suffixes,
                is_vowel: true,
                terms,
                exclude_terms: Vec::new(),
            })
        }
        PhonemeKind::Consonant => {
            let terms = def.arpabets.iter().map(|code| format!(" {code} ")).collect();
            // H alone, not the WH cluster: "white" (HH W AY1 T) is a W-word to
            // learners even though its transcription contains HH.
            let exclude_terms = if def.name == "H" {
                vec![" HH W ".to_string()]
            } else {
                Vec::new()
            };
            Ok(PhoneticPattern {
                target_symbols: def.arpabets.to_vec(),
                stress_suffixes: Vec::new(),
                is_vowel: false,
                terms,
                exclude_terms,
            })
        }
    }
}

/// Run a phonetic query against a lexicon.
///
/// Identical inputs produce identically ordered output: the backend orders by
/// frequency descending and breaks ties by its natural word order.
pub fn query_phoneme<L: Lexicon + ?Sized>(
    lexicon: &L,
    name: &str,
    opts: &QueryOpts,
) -> Result<Vec<DictEntry>> {
    let pattern = build_pattern(name, opts.stress.as_deref())?;
    lexicon.search(&LexiconQuery {
        any_terms: &pattern.terms,
        exclude_terms: &pattern.exclude_terms,
        exclude_words: CONTRACTION_FRAGMENTS,
        limit: opts.effective_limit(),
    })
}

/// Parse a stress filter into the suffix set.
///
/// The raw filter is split into characters and intersected with `{0,1,2}`; an
/// empty intersection fails rather than silently matching all stresses.
fn stress_suffixes(raw: Option<&str>) -> Result<Vec<char>> {
    let raw = raw.unwrap_or(DEFAULT_STRESS);
    let suffixes: Vec<char> = ['0', '1', '2']
        .into_iter()
        .filter(|s| raw.contains(*s))
        .collect();
    if suffixes.is_empty() {
        return Err(Error::InvalidStress(raw.to_string()));
    }
    Ok(suffixes)
}

/// An in-memory, full-scan [`Lexicon`].
///
/// Fine for dictionary files and tests; production deployments can implement the
/// trait over whatever store already holds the dictionary.
#[derive(Debug, Default, Clone)]
pub struct MemoryLexicon {
    entries: Vec<DictEntry>,
}

impl MemoryLexicon {
    pub fn new(entries: Vec<DictEntry>) -> Self {
        Self { entries }
    }

    pub fn insert(
        &mut self,
        word: impl Into<String>,
        transcription: impl Into<String>,
        frequency: Option<f64>,
    ) {
        self.entries.push(DictEntry {
            word: word.into(),
            transcription: transcription.into(),
            frequency,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Lexicon for MemoryLexicon {
    fn search(&self, query: &LexiconQuery<'_>) -> Result<Vec<DictEntry>> {
        let any_terms: Vec<String> = query.any_terms.iter().map(|t| t.to_uppercase()).collect();
        let exclude_terms: Vec<String> =
            query.exclude_terms.iter().map(|t| t.to_uppercase()).collect();

        let mut hits: Vec<&DictEntry> = self
            .entries
            .iter()
            .filter(|e| e.frequency.is_some())
            .filter(|e| {
                !query
                    .exclude_words
                    .iter()
                    .any(|w| w.eq_ignore_ascii_case(&e.word))
            })
            .filter(|e| {
                let padded = format!(" {} ", e.transcription.to_uppercase());
                any_terms.iter().any(|t| padded.contains(t.as_str()))
                    && !exclude_terms.iter().any(|t| padded.contains(t.as_str()))
            })
            .collect();

        // Stable sort: equal frequencies keep the dictionary's natural order, which
        // makes result ordering deterministic.
        hits.sort_by(|a, b| {
            b.frequency
                .unwrap_or(f64::MIN)
                .total_cmp(&a.frequency.unwrap_or(f64::MIN))
        });
        hits.truncate(query.limit);

        Ok(hits.into_iter().cloned().collect())
    }
}
