//! Reads the comma-delimited clue sheet.
//!
//! Each record is `category,value,question,answer`. Quoted spans may contain
//! commas. A `# FinalJeopardy` marker line switches to the final section,
//! where only the first record is considered.

use std::{collections::HashMap, path::Path};

use crate::{
    error::GameError,
    game::{Category, Clue, ClueId, FinalClue},
};

const FINAL_MARKER_TOKEN: &str = "finaljeopardy";
const HEADER_TOKEN: &str = "category";

/// A line that was ignored while parsing. Never surfaced to the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedRecord {
    pub line: usize,
    pub reason: SkipReason,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    Header,
    Comment,
    TooFewFields(usize),
    MissingCategory,
    MissingValue,
    BadValue(String),
    IncompleteFinal,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedSource {
    pub categories: Vec<Category>,
    pub clues: Vec<Clue>,
    pub final_clue: Option<FinalClue>,
    pub skipped: Vec<SkippedRecord>,
}

/// Splits one record on commas outside double quotes. Quotes only toggle the span.
pub fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

fn is_final_marker(line: &str) -> bool {
    line.starts_with('#') && line.to_lowercase().contains(FINAL_MARKER_TOKEN)
}

#[tracing::instrument(skip(text), fields(bytes = text.len()))]
pub fn parse_source(text: &str) -> Result<ParsedSource, GameError> {
    let mut parsed = ParsedSource::default();
    let mut index_of: HashMap<String, usize> = HashMap::new();
    let mut in_final = false;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if is_final_marker(line) {
            in_final = true;
            continue;
        }

        if in_final {
            let fields = split_record(line);
            if fields.len() >= 4 && !fields[2].is_empty() && !fields[3].is_empty() {
                parsed.final_clue = Some(FinalClue {
                    category: fields[0].clone(),
                    question: fields[2].clone(),
                    answer: fields[3].clone(),
                });
            } else {
                skip(&mut parsed, line_no, SkipReason::IncompleteFinal);
            }
            break;
        }

        if line.to_lowercase().contains(HEADER_TOKEN) {
            skip(&mut parsed, line_no, SkipReason::Header);
            continue;
        }
        if line.starts_with('#') {
            skip(&mut parsed, line_no, SkipReason::Comment);
            continue;
        }

        let mut fields = split_record(line);
        if fields.len() < 4 {
            skip(&mut parsed, line_no, SkipReason::TooFewFields(fields.len()));
            continue;
        }
        if fields[0].is_empty() {
            skip(&mut parsed, line_no, SkipReason::MissingCategory);
            continue;
        }
        if fields[1].is_empty() {
            skip(&mut parsed, line_no, SkipReason::MissingValue);
            continue;
        }
        let value = match fields[1].parse::<i64>() {
            Ok(v) => v,
            Err(_) => {
                let bad = fields[1].clone();
                skip(&mut parsed, line_no, SkipReason::BadValue(bad));
                continue;
            }
        };

        let answer = std::mem::take(&mut fields[3]);
        let question = std::mem::take(&mut fields[2]);
        let title = std::mem::take(&mut fields[0]);

        let id: ClueId = parsed.clues.len();
        let cat_idx = *index_of.entry(title.clone()).or_insert_with(|| {
            parsed.categories.push(Category {
                title: title.clone(),
                clues: Vec::new(),
            });
            parsed.categories.len() - 1
        });
        parsed.categories[cat_idx].clues.push(id);
        parsed.clues.push(Clue::new(title, value, question, answer));
    }

    // stable: equal values keep source order
    for category in &mut parsed.categories {
        let clues = &parsed.clues;
        category.clues.sort_by_key(|&id| clues[id].value);
    }

    if parsed.clues.is_empty() && parsed.final_clue.is_none() {
        return Err(GameError::malformed(None, "source contains no clues"));
    }

    tracing::debug!(
        categories = parsed.categories.len(),
        clues = parsed.clues.len(),
        has_final = parsed.final_clue.is_some(),
        skipped = parsed.skipped.len(),
        "Parsed clue source"
    );

    Ok(parsed)
}

fn skip(parsed: &mut ParsedSource, line: usize, reason: SkipReason) {
    tracing::debug!(line, ?reason, "Skipping record");
    parsed.skipped.push(SkippedRecord { line, reason });
}

/// Reads a clue sheet from disk. Unreadable files are a malformed source.
pub fn read_source_file(path: impl AsRef<Path>) -> Result<String, GameError> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Could not read clue source");
        GameError::malformed(None, format!("could not read {}: {e}", path.display()))
    })
}
