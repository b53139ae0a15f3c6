use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use std::fs;
use std::io::{self, BufWriter, Write};

use wordline::indexer::index_words;
use wordline::merge::{AnnotationRecord, Merger};
use wordline::normalize::normalize_value;
use wordline::query::{DictEntry, MemoryLexicon, QueryOpts, query_phoneme};

fn main() -> Result<()> {
    wordline::logging::init();
    let params = Params::parse();

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());

    match params.command {
        Command::Normalize {
            transcript_path,
            annotations_path,
        } => normalize_cmd(&mut writer, &transcript_path, annotations_path.as_deref()),
        Command::Lex {
            name,
            dictionary_path,
            stress,
            limit,
        } => lex_cmd(&mut writer, &name, &dictionary_path, stress, limit),
    }
}

/// Turn a raw transcript file (any recognized shape) into canonical indexed words,
/// optionally merging an annotation-record file, and print them as JSON.
fn normalize_cmd(
    w: &mut impl Write,
    transcript_path: &str,
    annotations_path: Option<&str>,
) -> Result<()> {
    let payload: serde_json::Value = read_json(transcript_path)?;
    let paragraphs = normalize_value(&payload)
        .with_context(|| format!("failed to normalize '{transcript_path}'"))?;
    let mut transcript = index_words(paragraphs);

    if let Some(path) = annotations_path {
        let records: Vec<AnnotationRecord> = read_json(path)?;
        let report = Merger::new().merge(&mut transcript, &records);
        eprintln!(
            "merged {} records ({} malformed, {} out of range)",
            report.matched, report.skipped_malformed, report.out_of_range
        );
    }

    serde_json::to_writer_pretty(&mut *w, &transcript.words)?;
    writeln!(w)?;
    Ok(())
}

/// Run a lexical-set / phoneme query against a dictionary file.
fn lex_cmd(
    w: &mut impl Write,
    name: &str,
    dictionary_path: &str,
    stress: Option<String>,
    limit: usize,
) -> Result<()> {
    let entries: Vec<DictEntry> = read_json(dictionary_path)?;
    let lexicon = MemoryLexicon::new(entries);

    let results = query_phoneme(&lexicon, name, &QueryOpts { stress, limit })?;
    for entry in &results {
        writeln!(w, "{}\t{}", entry.word, entry.transcription)?;
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read '{path}'"))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse '{path}' as JSON"))
}

#[derive(Parser, Debug)]
#[command(name = "wordline")]
#[command(about = "Transcript alignment and phonetic query tools")]
struct Params {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize a raw transcript file into canonical indexed words.
    Normalize {
        /// Path to the transcript JSON (any recognized upstream shape).
        #[arg(short = 't', long = "transcript")]
        transcript_path: String,

        /// Optional annotation-record JSON to merge in.
        #[arg(short = 'a', long = "annotations")]
        annotations_path: Option<String>,
    },

    /// Query a dictionary file for words containing a lexical set or phoneme.
    Lex {
        /// Lexical-set or phoneme name (e.g. FLEECE, KIT, P, schwa).
        name: String,

        /// Path to a dictionary JSON file (array of {word, transcription, frequency}).
        #[arg(short = 'd', long = "dictionary")]
        dictionary_path: String,

        /// Stress filter digits, e.g. "1" or "02". Vowels only.
        #[arg(short = 's', long = "stress")]
        stress: Option<String>,

        /// Maximum number of results (0 = default).
        #[arg(short = 'l', long = "limit", default_value_t = 0)]
        limit: usize,
    },
}
