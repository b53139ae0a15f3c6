//! The phoneme table: lexical sets and consonant phonemes.
//!
//! This is the single source of truth mapping lexical-set / phoneme names to their
//! ARPAbet codes and IPA symbols. Lexical sets (FLEECE, KIT, ...) name a vowel
//! sound independent of spelling; consonants are named by their usual ARPAbet-ish
//! shorthand. A set may span more than one ARPAbet code (LOT covers both AA and
//! AO), and two sets may share a code at different stress positions (FLEECE and
//! HAPPY are both IY; STRUT and commA are both AH).

use serde::Serialize;

/// Vowel vs consonant. Only vowels carry a stress digit in ARPAbet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhonemeKind {
    Vowel,
    Consonant,
}

/// One entry in the phoneme table.
#[derive(Debug, Clone, Copy)]
pub struct PhonemeDef {
    pub name: &'static str,

    /// Alternative names accepted on lookup (e.g. "schwa" for commA).
    pub alt_names: &'static [&'static str],

    /// ARPAbet codes, without stress digits.
    pub arpabets: &'static [&'static str],

    pub kind: PhonemeKind,

    pub ipa: &'static str,
}

use PhonemeKind::{Consonant, Vowel};

macro_rules! def {
    ($name:literal, [$($arp:literal),+], $kind:expr, $ipa:literal) => {
        def!($name, [], [$($arp),+], $kind, $ipa)
    };
    ($name:literal, [$($alt:literal),*], [$($arp:literal),+], $kind:expr, $ipa:literal) => {
        PhonemeDef {
            name: $name,
            alt_names: &[$($alt),*],
            arpabets: &[$($arp),+],
            kind: $kind,
            ipa: $ipa,
        }
    };
}

/// Every lexical set and consonant phoneme the query engine understands.
pub const PHONEMES: &[PhonemeDef] = &[
    // Vowels (lexical sets)
    def!("FLEECE", ["IY"], Vowel, "i"),
    def!("KIT", ["IH"], Vowel, "ɪ"),
    def!("TRAP", ["AE"], Vowel, "æ"),
    def!("DRESS", ["EH"], Vowel, "ɛ"),
    def!("STRUT", ["AH"], Vowel, "ʌ"),
    def!("LOT", ["AA", "AO"], Vowel, "ɑ"),
    def!("FACE", ["EY"], Vowel, "eɪ"),
    def!("GOAT", ["OW"], Vowel, "oʊ"),
    def!("FOOT", ["UH"], Vowel, "ʊ"),
    def!("GOOSE", ["UW"], Vowel, "u"),
    def!("PRICE", ["AY"], Vowel, "aɪ"),
    def!("CHOICE", ["OY"], Vowel, "ɔɪ"),
    def!("MOUTH", ["AW"], Vowel, "aʊ"),
    def!("NURSE", ["ER"], Vowel, "ər"),
    // Same code as FLEECE, in unstressed position.
    def!("HAPPY", ["IY"], Vowel, "i"),
    // Unstressed AH.
    def!("commA", ["schwa"], ["AH"], Vowel, "ə"),
    // Consonants
    def!("P", ["P"], Consonant, "p"),
    def!("B", ["B"], Consonant, "b"),
    def!("T", ["T"], Consonant, "t"),
    def!("D", ["D"], Consonant, "d"),
    def!("K", ["K"], Consonant, "k"),
    def!("G", ["G"], Consonant, "ɡ"),
    def!("F", ["F"], Consonant, "f"),
    def!("V", ["V"], Consonant, "v"),
    def!("TH", ["TH"], Consonant, "θ"),
    def!("DH", ["DH"], Consonant, "ð"),
    def!("S", ["S"], Consonant, "s"),
    def!("Z", ["Z"], Consonant, "z"),
    def!("SH", ["SH"], Consonant, "ʃ"),
    def!("ZH", ["ZH"], Consonant, "ʒ"),
    def!("H", ["HH"], Consonant, "h"),
    def!("CH", ["CH"], Consonant, "tʃ"),
    def!("J", ["JH"], Consonant, "dʒ"),
    def!("M", ["M"], Consonant, "m"),
    def!("N", ["N"], Consonant, "n"),
    def!("NG", ["NG"], Consonant, "ŋ"),
    def!("L", ["L"], Consonant, "l"),
    def!("R", ["R"], Consonant, "r"),
    def!("Y", ["Y"], Consonant, "j"),
    def!("W", ["W"], Consonant, "w"),
];

/// Resolve a lexical-set or phoneme name, case-insensitively, honoring alt names.
pub fn resolve(name: &str) -> Option<&'static PhonemeDef> {
    PHONEMES.iter().find(|def| {
        def.name.eq_ignore_ascii_case(name)
            || def.alt_names.iter().any(|alt| alt.eq_ignore_ascii_case(name))
    })
}
