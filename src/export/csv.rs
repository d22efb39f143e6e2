//! CSV import/export module for flashcard decks.
//!
//! An exported file starts with `#` comment lines describing the deck, then a
//! blank line, the header row and one quoted row per card:
//!
//! ```text
//! # Deck: Java Basics
//! # Description: Basic Java concepts
//! # Exported: 2024-05-01 12:00:00
//! # Total Cards: 1
//!
//! Question,Answer,Created_At,Updated_At
//! "What is Java?","Java is a programming language","2023-01-01 10:00:00","2023-01-01 10:00:00"
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use ::csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, Trim, WriterBuilder};
use chrono::NaiveDateTime;
use log::{info, warn};

use super::{ensure_exists, write_off_thread};
use crate::error::{AppError, Result};
use crate::models::{Card, Deck, now};

pub const QUESTION: &str = "Question";
pub const ANSWER: &str = "Answer";
pub const CREATED_AT: &str = "Created_At";
pub const UPDATED_AT: &str = "Updated_At";
pub const CSV_HEADERS: [&str; 4] = [QUESTION, ANSWER, CREATED_AT, UPDATED_AT];

/// Timestamp format used in the header comment and in both timestamp columns.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Exports a deck to a CSV file at the specified path.
pub fn export_csv_to_path(deck: &Deck, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    write_off_thread(path, "CSV", |writer| {
        write_deck(deck, writer).map_err(|e| AppError::io("Failed to write CSV file", path, e))
    })?;

    info!(
        "Deck '{}' exported to '{}' ({} cards)",
        deck.name(),
        path.display(),
        deck.card_count()
    );
    Ok(())
}

fn write_deck<W: Write>(deck: &Deck, out: &mut W) -> io::Result<()> {
    write_comment(out, &format!("Deck: {}", deck.name()))?;
    if let Some(description) = deck.description().filter(|d| !d.trim().is_empty()) {
        write_comment(out, &format!("Description: {}", description))?;
    }
    write_comment(out, &format!("Exported: {}", now().format(DATE_FORMAT)))?;
    write_comment(out, &format!("Total Cards: {}", deck.card_count()))?;
    writeln!(out)?;
    writeln!(out, "{}", CSV_HEADERS.join(","))?;

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(out);

    for card in deck.cards() {
        let created_at = card.created_at.format(DATE_FORMAT).to_string();
        let updated_at = card.updated_at.format(DATE_FORMAT).to_string();
        writer.write_record([&card.question, &card.answer, &created_at, &updated_at])?;
    }

    writer.flush()
}

/// One `# ` line per line of text, so multi-line values stay commented.
fn write_comment<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    for line in text.lines() {
        writeln!(out, "# {}", line)?;
    }
    Ok(())
}

/// Imports cards from a CSV file into a new, unsaved deck.
///
/// Comment and blank lines before the header row are ignored; after it a
/// leading `#` is ordinary data. Rows with neither a question nor an answer
/// are skipped silently. Rows missing only one of them, and rows that cannot
/// be decoded, are skipped with a warning. Missing or malformed timestamps
/// become the current time.
pub fn import_csv(
    path: impl AsRef<Path>,
    deck_name: &str,
    deck_description: Option<&str>,
) -> Result<Deck> {
    let path = path.as_ref();
    ensure_exists(path)?;

    let bytes = fs::read(path).map_err(|e| AppError::io("Cannot read CSV file", path, e))?;
    let body = &bytes[preamble_len(&bytes)..];

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(body);

    let headers = reader
        .headers()
        .map_err(|e| AppError::io("Cannot read CSV header", path, e.into()))?;
    let columns = Columns::locate(headers, path)?;

    let mut cards = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    "Skipping unreadable row {} in '{}': {}",
                    index + 1,
                    path.display(),
                    e
                );
                continue;
            }
        };

        if let Some(card) = columns.parse_card(&record, index + 1, path) {
            cards.push(card);
        }
    }

    let mut deck = Deck::new(deck_name, deck_description.map(str::to_string));
    deck.set_cards(cards);

    info!(
        "Deck '{}' imported from '{}' with {} cards",
        deck.name(),
        path.display(),
        deck.card_count()
    );
    Ok(deck)
}

/// Length of the leading comment and blank lines that precede the header row.
fn preamble_len(bytes: &[u8]) -> usize {
    let mut len = 0;
    for line in bytes.split_inclusive(|&b| b == b'\n') {
        let text = line.trim_ascii();
        if !text.is_empty() && !text.starts_with(b"#") {
            break;
        }
        len += line.len();
    }
    len
}

/// Column positions resolved from the header row.
struct Columns {
    question: usize,
    answer: usize,
    created_at: Option<usize>,
    updated_at: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord, path: &Path) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
        let require = |name: &str| {
            find(name).ok_or_else(|| {
                AppError::io(
                    format!("CSV header has no {} column", name),
                    path,
                    io::Error::from(io::ErrorKind::InvalidData),
                )
            })
        };

        Ok(Self {
            question: require(QUESTION)?,
            answer: require(ANSWER)?,
            created_at: find(CREATED_AT),
            updated_at: find(UPDATED_AT),
        })
    }

    fn parse_card(&self, record: &StringRecord, row: usize, path: &Path) -> Option<Card> {
        let question = record.get(self.question).unwrap_or("").trim();
        let answer = record.get(self.answer).unwrap_or("").trim();

        match (question.is_empty(), answer.is_empty()) {
            (true, true) => return None,
            (true, false) | (false, true) => {
                warn!(
                    "Skipping row {} in '{}': question and answer are both required",
                    row,
                    path.display()
                );
                return None;
            }
            (false, false) => {}
        }

        Some(Card {
            id: None,
            question: question.to_string(),
            answer: answer.to_string(),
            deck_id: None,
            created_at: parse_timestamp(record, self.created_at, CREATED_AT),
            updated_at: parse_timestamp(record, self.updated_at, UPDATED_AT),
        })
    }
}

fn parse_timestamp(record: &StringRecord, column: Option<usize>, name: &str) -> NaiveDateTime {
    let raw = match column.and_then(|i| record.get(i)).map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return now(),
    };

    NaiveDateTime::parse_from_str(raw, DATE_FORMAT).unwrap_or_else(|e| {
        warn!("Failed to parse {} '{}': {}", name, raw, e);
        now()
    })
}
