//! Record leader parsing and normalisation.
//!
//! The leader is a 24-byte fixed-length header at the start of every record.
//! It carries the record length, the base address of the field bodies and a
//! set of single-character category codes.
//!
//! # Structure
//!
//! - Positions 0-4: Record length (5 digits, consumed by the splitter)
//! - Position 5: Record status
//! - Position 6: Type of record
//! - Position 7: Bibliographic level
//! - Position 8: Type of control
//! - Position 9: Character coding scheme
//! - Positions 10-11: Indicator count and subfield code length (pinned to `22`)
//! - Positions 12-16: Base address of data (5 digits)
//! - Positions 17-19: Encoding level, cataloguing form, multipart level
//! - Positions 20-23: Entry map (pinned to `4500`)
//!
//! Decoding pins positions 10-11 and 20-23 to their structural constants, so
//! two records with the same content always carry the same leader there.

use crate::error::{MarcError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of the leader in bytes.
pub const LEADER_LENGTH: usize = 24;

const INDICATOR_COUNTS: &str = "22";
const ENTRY_MAP: &str = "4500";

const RECORD_STATUS: &[(char, &str)] = &[
    ('a', "Increase in encoding level"),
    ('c', "Corrected or revised"),
    ('d', "Deleted"),
    ('n', "New"),
    ('p', "Increase in encoding level from prepublication"),
];

const RECORD_TYPE: &[(char, &str)] = &[
    ('a', "Language material"),
    ('c', "Notated music"),
    ('d', "Manuscript notated music"),
    ('e', "Cartographic material"),
    ('f', "Manuscript cartographic material"),
    ('g', "Projected medium"),
    ('i', "Nonmusical sound recording"),
    ('j', "Musical sound recording"),
    ('k', "Two-dimensional nonprojectable graphic"),
    ('m', "Computer file"),
    ('o', "Kit"),
    ('p', "Mixed materials"),
    (
        'r',
        "Three-dimensional artifact or naturally occurring object",
    ),
    ('t', "Manuscript language material"),
];

const BIBLIOGRAPHIC_LEVEL: &[(char, &str)] = &[
    ('a', "Monographic component part"),
    ('b', "Serial component part"),
    ('c', "Collection"),
    ('d', "Subunit"),
    ('i', "Integrating resource"),
    ('m', "Monograph/Item"),
    ('s', "Serial"),
];

const CONTROL_TYPE: &[(char, &str)] = &[(' ', "No specified type"), ('a', "Archival")];

const CHARACTER_CODING: &[(char, &str)] = &[(' ', "MARC-8"), ('a', "UCS/Unicode")];

const ENCODING_LEVEL: &[(char, &str)] = &[
    (' ', "Full level"),
    ('1', "Full level, material not examined"),
    ('2', "Less-than-full level, material not examined"),
    ('3', "Abbreviated level"),
    ('4', "Core level"),
    ('5', "Partial (preliminary) level"),
    ('6', "Legacy local level"),
    ('7', "Minimal level"),
    ('8', "Prepublication level"),
    ('u', "Unknown"),
    ('z', "Not applicable"),
];

const CATALOGING_FORM: &[(char, &str)] = &[
    (' ', "Non-ISBD"),
    ('a', "AACR 2"),
    ('c', "ISBD punctuation omitted"),
    ('i', "ISBD punctuation included"),
    ('n', "Non-ISBD punctuation omitted"),
    ('u', "Unknown"),
];

const MULTIPART_LEVEL: &[(char, &str)] = &[
    (' ', "Not specified or not applicable"),
    ('a', "Set"),
    ('b', "Part with independent title"),
    ('c', "Part with dependent title"),
];

/// Record leader: exactly 24 ASCII characters.
///
/// The text is stored verbatim apart from the pinned structural positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Leader {
    text: String,
}

impl Leader {
    /// Parse a leader from the start of a raw record block.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::Leader`] if fewer than 24 bytes are available or
    /// the leader region is not ASCII text.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < LEADER_LENGTH {
            return Err(MarcError::Leader(format!(
                "leader must be {LEADER_LENGTH} bytes, got {}",
                bytes.len()
            )));
        }

        let region = &bytes[..LEADER_LENGTH];
        if !region.is_ascii() {
            return Err(MarcError::Leader(
                "leader contains non-ASCII bytes".to_string(),
            ));
        }

        // All bytes are ASCII, so each byte is exactly one char.
        let text: String = region.iter().map(|&b| char::from(b)).collect();
        Ok(Self::normalized(&text))
    }

    /// Pin the structural positions of a 24-character ASCII leader.
    fn normalized(text: &str) -> Self {
        let mut normalized = String::with_capacity(LEADER_LENGTH);
        normalized.push_str(&text[0..10]);
        normalized.push_str(INDICATOR_COUNTS);
        normalized.push_str(&text[12..20]);
        normalized.push_str(ENTRY_MAP);
        Leader { text: normalized }
    }

    /// The leader as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The leader as raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Character at a leader position, if the position exists.
    #[must_use]
    pub fn position(&self, index: usize) -> Option<char> {
        self.text.as_bytes().get(index).map(|&b| char::from(b))
    }

    /// Record length declared in positions 0-4.
    ///
    /// The splitter already framed the block with this value, so the decoder
    /// does not validate it again.
    #[must_use]
    pub fn record_length(&self) -> Option<usize> {
        parse_number(&self.as_bytes()[0..5])
    }

    /// Base address of data declared in positions 12-16.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::BaseAddress`] if the positions are not a number or
    /// the number is zero.
    pub fn base_address(&self) -> Result<usize> {
        let raw = &self.text[12..17];
        match parse_number(raw.as_bytes()) {
            Some(0) => Err(MarcError::BaseAddress(
                "base address is zero".to_string(),
            )),
            Some(value) => Ok(value),
            None => Err(MarcError::BaseAddress(format!(
                "base address '{raw}' is not a number"
            ))),
        }
    }

    /// Record status (position 5).
    #[must_use]
    pub fn record_status(&self) -> char {
        self.char_at(5)
    }

    /// Type of record (position 6).
    #[must_use]
    pub fn record_type(&self) -> char {
        self.char_at(6)
    }

    /// Bibliographic level (position 7).
    #[must_use]
    pub fn bibliographic_level(&self) -> char {
        self.char_at(7)
    }

    /// Type of control (position 8).
    #[must_use]
    pub fn control_type(&self) -> char {
        self.char_at(8)
    }

    /// Character coding scheme (position 9).
    #[must_use]
    pub fn character_coding(&self) -> char {
        self.char_at(9)
    }

    /// Encoding level (position 17).
    #[must_use]
    pub fn encoding_level(&self) -> char {
        self.char_at(17)
    }

    /// Descriptive cataloguing form (position 18).
    #[must_use]
    pub fn cataloging_form(&self) -> char {
        self.char_at(18)
    }

    /// Multipart resource record level (position 19).
    #[must_use]
    pub fn multipart_level(&self) -> char {
        self.char_at(19)
    }

    fn char_at(&self, index: usize) -> char {
        char::from(self.text.as_bytes()[index])
    }

    /// Valid codes for a categorical leader position (MARC 21).
    ///
    /// Returns `(code, description)` pairs, or `None` for positions that are
    /// numeric or structural.
    ///
    /// # Example
    ///
    /// ```
    /// use lexmarc::Leader;
    /// let values = Leader::valid_values_at_position(5).unwrap();
    /// assert!(values.iter().any(|(code, _)| *code == 'n'));
    /// ```
    #[must_use]
    pub fn valid_values_at_position(position: usize) -> Option<&'static [(char, &'static str)]> {
        match position {
            5 => Some(RECORD_STATUS),
            6 => Some(RECORD_TYPE),
            7 => Some(BIBLIOGRAPHIC_LEVEL),
            8 => Some(CONTROL_TYPE),
            9 => Some(CHARACTER_CODING),
            17 => Some(ENCODING_LEVEL),
            18 => Some(CATALOGING_FORM),
            19 => Some(MULTIPART_LEVEL),
            _ => None,
        }
    }

    /// Description of a code at a leader position, if the code is defined.
    #[must_use]
    pub fn describe_value(position: usize, value: char) -> Option<&'static str> {
        Self::valid_values_at_position(position).and_then(|values| {
            values
                .iter()
                .find(|(code, _)| *code == value)
                .map(|(_, desc)| *desc)
        })
    }

    /// Check a code against the table for its position.
    ///
    /// Positions without a table accept any value.
    #[must_use]
    pub fn is_valid_value(position: usize, value: char) -> bool {
        match Self::valid_values_at_position(position) {
            Some(values) => values.iter().any(|(code, _)| *code == value),
            None => true,
        }
    }

    /// Every categorical position whose code is not in its table.
    ///
    /// Returned as `(position, code)` in position order; empty for a clean
    /// leader.
    #[must_use]
    pub fn invalid_positions(&self) -> Vec<(usize, char)> {
        self.text
            .char_indices()
            .filter(|&(position, code)| !Self::is_valid_value(position, code))
            .collect()
    }
}

impl Default for Leader {
    /// A blank leader with the structural positions pinned.
    fn default() -> Self {
        Self::normalized(&" ".repeat(LEADER_LENGTH))
    }
}

impl fmt::Display for Leader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl std::str::FromStr for Leader {
    type Err = MarcError;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != LEADER_LENGTH {
            return Err(MarcError::Leader(format!(
                "leader must be {LEADER_LENGTH} characters, got {}",
                s.chars().count()
            )));
        }
        Self::from_bytes(s.as_bytes())
    }
}

impl TryFrom<String> for Leader {
    type Error = MarcError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Leader> for String {
    fn from(leader: Leader) -> Self {
        leader.text
    }
}

/// Parse an ASCII decimal number, allowing surrounding spaces.
pub(crate) fn parse_number(bytes: &[u8]) -> Option<usize> {
    let trimmed = trim_spaces(bytes);
    if trimmed.is_empty() || !trimmed.iter().all(u8::is_ascii_digit) {
        return None;
    }
    trimmed.iter().try_fold(0usize, |acc, &byte| {
        acc.checked_mul(10)?.checked_add(usize::from(byte - b'0'))
    })
}

fn trim_spaces(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != b' ').unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|&b| b != b' ').map_or(start, |i| i + 1);
    &bytes[start..end]
}
