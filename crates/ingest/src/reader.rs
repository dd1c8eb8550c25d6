//! Line-oriented input files.
//!
//! The framed layout is a bracketed array split one record per line:
//!
//! ```text
//! [{'type': 'CUSTOMER', ...},
//! {'type': 'SITE_VISIT', ...},
//! {'type': 'ORDER', ...}]
//! ```
//!
//! The first line loses its leading and trailing character, every other line
//! loses its trailing character.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use ltv_core::EventStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{ingest, ingest_json, IngestError, Ingested};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Dictionary literals in bracket-and-comma framing.
    #[default]
    Framed,
    /// One JSON object per line.
    Ndjson,
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Framed => f.write_str("framed"),
            InputFormat::Ndjson => f.write_str("ndjson"),
        }
    }
}

impl FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "framed" => Ok(InputFormat::Framed),
            "ndjson" | "jsonl" => Ok(InputFormat::Ndjson),
            other => Err(format!("unknown input format `{other}` (expected framed or ndjson)")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReadSummary {
    pub records: usize,
    pub appended: usize,
    pub skipped: usize,
}

/// Remove the framing around one record line.
pub fn unframe(line: &str, first: bool) -> &str {
    let trimmed = line.trim();
    let mut body = trimmed;
    if first {
        let mut chars = body.chars();
        chars.next();
        body = chars.as_str();
    }
    let mut chars = body.chars();
    chars.next_back();
    chars.as_str()
}

/// Read every record of `path` into `store`.
pub fn read_events(
    path: &Path,
    format: InputFormat,
    store: &mut EventStore,
) -> Result<ReadSummary, IngestError> {
    info!(path = %path.display(), %format, "reading events");
    let text = fs::read_to_string(path).map_err(|reason| IngestError::Io {
        path: path.to_path_buf(),
        reason,
    })?;
    ingest_text(&text, format, store)
}

/// Ingest already-loaded input text. Blank lines are ignored.
pub fn ingest_text(
    text: &str,
    format: InputFormat,
    store: &mut EventStore,
) -> Result<ReadSummary, IngestError> {
    let mut summary = ReadSummary::default();
    let mut first = true;

    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let payload = match format {
            InputFormat::Framed => unframe(line, first),
            InputFormat::Ndjson => line.trim(),
        };
        first = false;
        summary.records += 1;
        debug!(line = idx + 1, %payload, "payload");

        let outcome = match format {
            InputFormat::Framed => ingest(payload, store),
            InputFormat::Ndjson => ingest_json(payload, store),
        }
        .map_err(|reason| IngestError::Record {
            line: idx + 1,
            raw: line.to_string(),
            reason,
        })?;

        match outcome {
            Ingested::Appended { .. } => summary.appended += 1,
            Ingested::Skipped { .. } => summary.skipped += 1,
        }
    }

    Ok(summary)
}
