//! Recovers structure from free-form oracle responses.
//!
//! Line mode is best-effort: every line that is not `Category: value` with a
//! known category is dropped and reported, never fatal. Literal mode (see
//! [`parse_literal_response`]) is all-or-nothing.

use thiserror::Error;
use tracing::debug;

use crate::assessment::criteria::{Category, CountMap, EvidenceMap};
use crate::assessment::literal::{parse_mapping_literal, LiteralError};

/// Why a single response line was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedLine {
    #[error("line has no `Category: value` separator: {line:?}")]
    NoSeparator { line: String },

    #[error("unknown category {label:?}")]
    UnknownCategory { label: String },

    #[error("count for {category} is not a non-negative integer: {value:?}")]
    InvalidCount { category: Category, value: String },
}

/// Result of a line-mode parse: whatever could be recovered, plus the
/// lines that were dropped and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineParse<T> {
    pub value: T,
    pub discarded: Vec<MalformedLine>,
}

/// Extraction mode: each valid line appends its value to its category.
pub fn parse_evidence_lines(response: &str) -> LineParse<EvidenceMap> {
    let mut evidence = EvidenceMap::new();
    let mut discarded = Vec::new();

    for line in non_blank_lines(response) {
        match split_category_line(line) {
            Ok((category, value)) => evidence.push(category, value),
            Err(reason) => discarded.push(reason),
        }
    }

    log_discarded("extraction", &discarded);
    LineParse {
        value: evidence,
        discarded,
    }
}

/// Counting mode: each valid line sets its category's count. Categories never
/// mentioned stay at zero; a repeated category keeps the last count.
pub fn parse_count_lines(response: &str) -> LineParse<CountMap> {
    let mut counts = CountMap::zeroed();
    let mut discarded = Vec::new();

    for line in non_blank_lines(response) {
        let parsed = split_category_line(line).and_then(|(category, value)| {
            value
                .parse::<u32>()
                .map(|n| (category, n))
                .map_err(|_| MalformedLine::InvalidCount {
                    category,
                    value: value.to_string(),
                })
        });
        match parsed {
            Ok((category, n)) => counts.set(category, n),
            Err(reason) => discarded.push(reason),
        }
    }

    log_discarded("counting", &discarded);
    LineParse {
        value: counts,
        discarded,
    }
}

/// Literal mode: the whole response, minus an optional code fence, must be
/// a mapping of string keys to string sequences.
pub fn parse_literal_response(response: &str) -> Result<Vec<(String, Vec<String>)>, LiteralError> {
    parse_mapping_literal(strip_code_fences(response))
}

/// Splits `Category: value` once on the first `": "` and resolves the label.
fn split_category_line(line: &str) -> Result<(Category, &str), MalformedLine> {
    let (label, value) = line
        .split_once(": ")
        .ok_or_else(|| MalformedLine::NoSeparator {
            line: line.to_string(),
        })?;
    let label = clean_label(label);
    let category = Category::from_name(label).ok_or_else(|| MalformedLine::UnknownCategory {
        label: label.to_string(),
    })?;
    Ok((category, value.trim()))
}

/// Strips list markers the oracle likes to add around labels: whitespace,
/// digits, hyphens, and `.`, `)`, `*`, `•` from both ends.
pub fn clean_label(label: &str) -> &str {
    label.trim_matches(|c: char| {
        c.is_whitespace() || c.is_ascii_digit() || matches!(c, '-' | '.' | ')' | '*' | '•')
    })
}

fn non_blank_lines(response: &str) -> impl Iterator<Item = &str> {
    response.lines().map(str::trim).filter(|l| !l.is_empty())
}

fn log_discarded(mode: &str, discarded: &[MalformedLine]) {
    for reason in discarded {
        debug!(mode = %mode, "Discarded oracle line: {reason}");
    }
}

/// Strips a surrounding ```lang ... ``` fence from oracle output.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the language tag, if any, whether or not a newline follows it.
    let inner =
        inner.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+'));
    inner.trim_end().strip_suffix("```").unwrap_or(inner).trim()
}
