//! Parser for the model's semi-structured fee reply.
//!
//! Expected shape:
//!
//! ```text
//! MINIMUM: 4000.00
//! MEDIAN: 6000.00
//! MAXIMUM: 9000.00
//! ---
//! JUSTIFICATION: ...
//! ```
//!
//! Parsing never fails. Anything that cannot be read is left out of
//! [`ParsedResponse::values`] and described in [`ParsedResponse::issues`].

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::currency::parse_amount;

pub const DELIMITER: &str = "---";

/// Used when the reply carries no justification segment.
pub const FALLBACK_JUSTIFICATION: &str =
    "No justification could be extracted from the model response.";

const JUSTIFICATION_LABELS: &[&str] = &["JUSTIFICATION:", "JUSTIFICATIVA:"];

/// One of the three suggested amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeLevel {
    Minimum,
    Median,
    Maximum,
}

impl FeeLevel {
    pub const ALL: [FeeLevel; 3] = [FeeLevel::Minimum, FeeLevel::Median, FeeLevel::Maximum];

    pub fn key(self) -> &'static str {
        match self {
            FeeLevel::Minimum => "MINIMUM",
            FeeLevel::Median => "MEDIAN",
            FeeLevel::Maximum => "MAXIMUM",
        }
    }

    /// Match a reply key. Case-insensitive; the Portuguese labels
    /// (`MÍNIMO`, `MÉDIO`, `MÁXIMO`, with or without accents) are accepted.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key
            .trim()
            .trim_start_matches(['-', '•'])
            .trim()
            .trim_matches('*')
            .trim()
            .to_uppercase();
        match key.as_str() {
            "MINIMUM" | "MINIMO" | "MÍNIMO" => Some(FeeLevel::Minimum),
            "MEDIAN" | "MEDIO" | "MÉDIO" => Some(FeeLevel::Median),
            "MAXIMUM" | "MAXIMO" | "MÁXIMO" => Some(FeeLevel::Maximum),
            _ => None,
        }
    }
}

impl fmt::Display for FeeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Something in the reply that could not be used as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseIssue {
    /// A recognised key whose amount could not be converted. 1-based line.
    InvalidAmount {
        line: usize,
        level: FeeLevel,
        text: String,
        reason: String,
    },
    /// A key seen more than once; the later line replaced the earlier value.
    DuplicateKey { line: usize, level: FeeLevel },
    MissingJustification,
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseIssue::InvalidAmount {
                line,
                level,
                text,
                reason,
            } => write!(f, "line {line}: {level} value {text:?} skipped ({reason})"),
            ParseIssue::DuplicateKey { line, level } => {
                write!(f, "line {line}: {level} repeated, later value kept")
            }
            ParseIssue::MissingJustification => f.write_str("no justification segment"),
        }
    }
}

/// Fields recovered from one model reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedResponse {
    pub values: BTreeMap<FeeLevel, Decimal>,
    pub justification: String,
    /// False when [`FALLBACK_JUSTIFICATION`] was substituted.
    pub justification_found: bool,
    pub issues: Vec<ParseIssue>,
}

impl ParsedResponse {
    pub fn get(&self, level: FeeLevel) -> Option<Decimal> {
        self.values.get(&level).copied()
    }

    /// Levels absent from the reply, in order.
    pub fn missing(&self) -> Vec<FeeLevel> {
        FeeLevel::ALL
            .into_iter()
            .filter(|l| !self.values.contains_key(l))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.values.len() == FeeLevel::ALL.len() && self.justification_found
    }
}

/// Extract the three amounts and the justification from a model reply.
///
/// 1. Split on the first `---` into a values segment and a justification
///    segment.
/// 2. Split each values line containing a colon on its first colon.
/// 3. Recognised keys get their amount normalised and converted; lines that
///    fail conversion are skipped and recorded. Other keys are ignored.
/// 4. A repeated key overwrites the earlier value.
/// 5. The justification is the second segment minus its label, or
///    [`FALLBACK_JUSTIFICATION`].
pub fn parse_response(raw: &str) -> ParsedResponse {
    let raw = raw.trim();
    let (values_segment, justification_segment) = match raw.split_once(DELIMITER) {
        Some((values, justification)) => (values, Some(justification)),
        None => (raw, None),
    };

    let mut values = BTreeMap::new();
    let mut issues = Vec::new();

    for (idx, line) in values_segment.lines().enumerate() {
        let Some((key, value_text)) = line.split_once(':') else {
            continue;
        };
        let Some(level) = FeeLevel::from_key(key) else {
            continue;
        };

        match parse_amount(value_text) {
            Ok(amount) => {
                if values.insert(level, amount).is_some() {
                    issues.push(ParseIssue::DuplicateKey {
                        line: idx + 1,
                        level,
                    });
                }
            }
            Err(err) => issues.push(ParseIssue::InvalidAmount {
                line: idx + 1,
                level,
                text: value_text.trim().to_string(),
                reason: err.to_string(),
            }),
        }
    }

    let justification = justification_segment
        .map(strip_justification_label)
        .filter(|j| !j.is_empty());
    let justification_found = justification.is_some();
    if !justification_found {
        issues.push(ParseIssue::MissingJustification);
    }

    ParsedResponse {
        values,
        justification: justification
            .map(str::to_string)
            .unwrap_or_else(|| FALLBACK_JUSTIFICATION.to_string()),
        justification_found,
        issues,
    }
}

fn strip_justification_label(segment: &str) -> &str {
    // Leftovers of a longer `----` rule or a closing code fence.
    let text = segment
        .trim()
        .trim_start_matches('-')
        .trim_matches('`')
        .trim()
        .trim_start_matches('*')
        .trim_start();
    for label in JUSTIFICATION_LABELS {
        if let Some(prefix) = text.get(..label.len())
            && prefix.eq_ignore_ascii_case(label)
        {
            return text[label.len()..].trim_start_matches('*').trim();
        }
    }
    text.trim()
}
