//! Telegram body decoding.
//!
//! Parses the body lines of a validated raw telegram into a [`Telegram`]:
//! an ordered mapping from OBIS-style identifier (`a-b:c.d.e`) to one or
//! more value strings. Field lines look like
//! `1-0:1.8.1(000633.354*kWh)`; group content of the form `value*unit`
//! splits into the value and its unit, and groups are extracted by matching
//! balanced parentheses so list-valued content with embedded parentheses
//! stays intact.

use crate::error::P1Error;
use crate::logging::log_warn;
use crate::p1::framer::RawTelegram;
use nom::bytes::complete::take_till;
use nom::combinator::eof;
use nom::multi::many0;
use nom::IResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// OBIS `c.d.e` code suffixes whose lines carry multiple independent
/// groups: M-Bus channel captures (timestamp plus reading) and the
/// power-failure event log.
const DEFAULT_MULTI_VALUED: &[&str] = &["24.2.1", "24.2.3", "99.97.0"];

/// What to do with a body line that cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedLinePolicy {
    /// Log the line and drop it, keeping the rest of the telegram.
    #[default]
    Skip,
    /// Fail the whole telegram with a format error.
    Abort,
}

/// Decoder policy choices. Both are explicit so callers never rely on a
/// hidden default.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    pub malformed: MalformedLinePolicy,
    /// OBIS `c.d.e` code suffixes treated as multi-valued; all other
    /// identifiers keep only their first group.
    pub multi_valued: Vec<String>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig {
            malformed: MalformedLinePolicy::default(),
            multi_valued: DEFAULT_MULTI_VALUED.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl DecoderConfig {
    fn is_multi_valued(&self, id: &str) -> bool {
        // The channel number (`0-1:` vs `0-2:`) stays part of the key;
        // only the code after the colon selects the policy.
        id.split_once(':')
            .map(|(_, code)| self.multi_valued.iter().any(|c| c == code))
            .unwrap_or(false)
    }
}

/// One parenthesized group, split into value and optional unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
    pub value: String,
    pub unit: Option<String>,
}

impl FieldValue {
    fn from_group(content: &str) -> Self {
        match content.split_once('*') {
            Some((value, unit)) => FieldValue {
                value: value.to_string(),
                unit: Some(unit.to_string()),
            },
            None => FieldValue {
                value: content.to_string(),
                unit: None,
            },
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.unit {
            Some(unit) => write!(f, "{} {}", self.value, unit),
            None => write!(f, "{}", self.value),
        }
    }
}

/// One decoded field line: identifier plus its values in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramEntry {
    pub id: String,
    pub values: Vec<FieldValue>,
}

/// A decoded telegram: the meter identification plus an ordered mapping
/// from identifier to values. Constructed fresh per telegram and immutable
/// once returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Telegram {
    pub identification: String,
    entries: Vec<TelegramEntry>,
}

impl Telegram {
    /// Returns the first value recorded for `id`.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.values(id)
            .and_then(|values| values.first())
            .map(|v| v.value.as_str())
    }

    /// Returns all values recorded for `id`, indexable by wire position.
    pub fn values(&self, id: &str) -> Option<&[FieldValue]> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.values.as_slice())
    }

    /// Iterates over the entries in telegram order.
    pub fn iter(&self) -> impl Iterator<Item = &TelegramEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Telegram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "/{}", self.identification)?;
        for entry in &self.entries {
            let values: Vec<String> = entry.values.iter().map(|v| v.to_string()).collect();
            writeln!(f, "{} = {}", entry.id, values.join(", "))?;
        }
        Ok(())
    }
}

/// Decodes the body of a validated raw telegram.
///
/// The identification (`/`) line and blank lines are skipped; every other
/// line maps to exactly one entry, or is handled per the configured
/// malformed-line policy. Decoding is pure: the same raw bytes always
/// yield the same mapping.
pub fn decode(raw: &RawTelegram, config: &DecoderConfig) -> Result<Telegram, P1Error> {
    let text = std::str::from_utf8(raw.as_bytes())
        .map_err(|_| P1Error::TelegramFormat("Telegram body is not valid UTF-8".into()))?;

    let mut telegram = Telegram::default();
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        if let Some(ident) = line.strip_prefix('/') {
            telegram.identification = ident.to_string();
            continue;
        }

        match field_line(line) {
            Ok((_, (id, groups))) => {
                telegram.entries.push(build_entry(id, &groups, config));
            }
            Err(_) => match config.malformed {
                MalformedLinePolicy::Skip => {
                    log_warn(&format!("Skipping malformed telegram line: {line}"));
                }
                MalformedLinePolicy::Abort => {
                    return Err(P1Error::TelegramFormat(format!(
                        "Unparseable telegram line: {line}"
                    )));
                }
            },
        }
    }
    Ok(telegram)
}

fn build_entry(id: &str, groups: &[&str], config: &DecoderConfig) -> TelegramEntry {
    // A bare identifier (no parenthesized group) carries the empty value.
    let values = if groups.is_empty() {
        vec![FieldValue {
            value: String::new(),
            unit: None,
        }]
    } else if config.is_multi_valued(id) {
        groups.iter().map(|&g| FieldValue::from_group(g)).collect()
    } else {
        // Protocol convention: most identifiers carry exactly one value.
        vec![FieldValue::from_group(groups[0])]
    };

    TelegramEntry {
        id: id.to_string(),
        values,
    }
}

/// Parses `<identifier>(<group>)...` with zero or more groups.
fn field_line(input: &str) -> IResult<&str, (&str, Vec<&str>)> {
    let (input, id) = take_till(|c| c == '(')(input)?;
    let (input, groups) = many0(group)(input)?;
    let (input, _) = eof(input)?;
    Ok((input, (id, groups)))
}

/// Matches one balanced parenthesized group and returns its content.
fn group(input: &str) -> IResult<&str, &str> {
    if !input.starts_with('(') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }
    let mut depth = 0usize;
    for (idx, ch) in input.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[idx + 1..], &input[1..idx]));
                }
            }
            _ => {}
        }
    }
    // Unterminated parenthesis
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::TakeUntil,
    )))
}
