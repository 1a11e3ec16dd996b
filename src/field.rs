//! Decoded fields and subfields.
//!
//! A field is decided once, at decode time, to be either a [`ControlField`]
//! (raw text) or a [`DataField`] (two indicators plus ordered subfields).
//! The choice is stored in the [`Field`] variant and never re-inferred.
//!
//! # Examples
//!
//! ```
//! use lexmarc::{DataField, Field};
//!
//! let field = Field::from(
//!     DataField::builder("245", '1', '0')
//!         .subfield('a', "Middlemarch :")
//!         .subfield('b', "a study of provincial life")
//!         .build(),
//! );
//!
//! assert_eq!(field.get_subfields(&['a']), vec!["Middlemarch :"]);
//! assert_eq!(field.to_string(), "=245  10$aMiddlemarch :$ba study of provincial life");
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Tags decoded as control fields in addition to the numeric `001`-`009` range.
///
/// These are the Aleph system fields found in catalogue exports.
pub const NAMED_CONTROL_TAGS: &[&str] = &["DB ", "SYS"];

/// Whether a tag denotes a control field.
///
/// True for all-digit tags below `010` and for [`NAMED_CONTROL_TAGS`].
///
/// ```
/// use lexmarc::field::is_control_tag;
///
/// assert!(is_control_tag("001"));
/// assert!(is_control_tag("SYS"));
/// assert!(!is_control_tag("010"));
/// assert!(!is_control_tag("00A"));
/// ```
#[must_use]
pub fn is_control_tag(tag: &str) -> bool {
    let numeric_control = tag.bytes().all(|b| b.is_ascii_digit()) && tag < "010";
    numeric_control || NAMED_CONTROL_TAGS.contains(&tag)
}

/// Right-align a tag in three columns, padding with spaces.
fn normalize_tag(tag: &str) -> String {
    format!("{tag:>3}")
}

/// A subfield within a data field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subfield {
    /// Subfield code (single character)
    pub code: char,
    /// Subfield value
    pub value: String,
}

/// A control field: a tag and raw text, no indicators or subfields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlField {
    /// Field tag (3 characters)
    pub tag: String,
    /// Field text
    pub data: String,
}

impl ControlField {
    /// Create a control field.
    #[must_use]
    pub fn new(tag: &str, data: impl Into<String>) -> Self {
        ControlField {
            tag: normalize_tag(tag),
            data: data.into(),
        }
    }
}

/// A data field: two indicators and ordered subfields.
///
/// Subfield order is significant; repeated codes are kept as separate
/// occurrences in the order they were read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataField {
    /// Field tag (3 characters)
    pub tag: String,
    /// First indicator
    pub indicator1: char,
    /// Second indicator
    pub indicator2: char,
    /// Subfields (inline for typical fields with 4 or fewer subfields)
    pub subfields: SmallVec<[Subfield; 4]>,
}

impl DataField {
    /// Create a data field with no subfields.
    #[must_use]
    pub fn new(tag: &str, indicator1: char, indicator2: char) -> Self {
        DataField {
            tag: normalize_tag(tag),
            indicator1,
            indicator2,
            subfields: SmallVec::new(),
        }
    }

    /// Create a builder for constructing data fields fluently.
    #[must_use]
    pub fn builder(tag: &str, indicator1: char, indicator2: char) -> DataFieldBuilder {
        DataFieldBuilder {
            field: DataField::new(tag, indicator1, indicator2),
        }
    }

    /// Append a subfield.
    pub fn add_subfield(&mut self, code: char, value: impl Into<String>) {
        self.subfields.push(Subfield {
            code,
            value: value.into(),
        });
    }

    /// Values of subfields whose code is in `codes`, in field order.
    ///
    /// An empty `codes` slice selects every subfield.
    #[must_use]
    pub fn get_subfields(&self, codes: &[char]) -> Vec<&str> {
        self.subfields
            .iter()
            .filter(|sf| codes.is_empty() || codes.contains(&sf.code))
            .map(|sf| sf.value.as_str())
            .collect()
    }

    /// First value for a subfield code.
    #[must_use]
    pub fn get_subfield(&self, code: char) -> Option<&str> {
        self.subfields
            .iter()
            .find(|sf| sf.code == code)
            .map(|sf| sf.value.as_str())
    }
}

/// Builder for [`DataField`].
#[derive(Debug)]
pub struct DataFieldBuilder {
    field: DataField,
}

impl DataFieldBuilder {
    /// Add a subfield to the field being built
    #[must_use]
    pub fn subfield(mut self, code: char, value: impl Into<String>) -> Self {
        self.field.add_subfield(code, value);
        self
    }

    /// Build the field
    #[must_use]
    pub fn build(self) -> DataField {
        self.field
    }
}

/// A decoded field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Field {
    /// Control field (`001`-`009` and the named control tags)
    Control(ControlField),
    /// Data field with indicators and subfields
    Data(DataField),
}

impl Field {
    /// Shorthand for a [`ControlField`].
    #[must_use]
    pub fn control(tag: &str, data: impl Into<String>) -> Self {
        Field::Control(ControlField::new(tag, data))
    }

    /// The field tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Field::Control(field) => &field.tag,
            Field::Data(field) => &field.tag,
        }
    }

    /// Whether this is a control field.
    #[must_use]
    pub fn is_control_field(&self) -> bool {
        matches!(self, Field::Control(_))
    }

    /// Control field text, or `None` for a data field.
    #[must_use]
    pub fn data(&self) -> Option<&str> {
        match self {
            Field::Control(field) => Some(&field.data),
            Field::Data(_) => None,
        }
    }

    /// Both indicators, or `None` for a control field.
    #[must_use]
    pub fn indicators(&self) -> Option<(char, char)> {
        match self {
            Field::Control(_) => None,
            Field::Data(field) => Some((field.indicator1, field.indicator2)),
        }
    }

    /// All subfields in order; empty for a control field.
    #[must_use]
    pub fn subfields(&self) -> &[Subfield] {
        match self {
            Field::Control(_) => &[],
            Field::Data(field) => &field.subfields,
        }
    }

    /// Values of subfields whose code is in `codes`, in field order.
    ///
    /// An empty `codes` slice selects every subfield. A control field has no
    /// subfields and always yields an empty list.
    #[must_use]
    pub fn get_subfields(&self, codes: &[char]) -> Vec<&str> {
        match self {
            Field::Control(_) => Vec::new(),
            Field::Data(field) => field.get_subfields(codes),
        }
    }

    /// First value for a subfield code.
    #[must_use]
    pub fn get_subfield(&self, code: char) -> Option<&str> {
        match self {
            Field::Control(_) => None,
            Field::Data(field) => field.get_subfield(code),
        }
    }

    /// Whether at least one subfield has this code.
    #[must_use]
    pub fn has_subfield(&self, code: char) -> bool {
        self.get_subfield(code).is_some()
    }

    /// The control field, if this is one.
    #[must_use]
    pub fn as_control(&self) -> Option<&ControlField> {
        match self {
            Field::Control(field) => Some(field),
            Field::Data(_) => None,
        }
    }

    /// The data field, if this is one.
    #[must_use]
    pub fn as_data(&self) -> Option<&DataField> {
        match self {
            Field::Control(_) => None,
            Field::Data(field) => Some(field),
        }
    }
}

impl From<ControlField> for Field {
    fn from(field: ControlField) -> Self {
        Field::Control(field)
    }
}

impl From<DataField> for Field {
    fn from(field: DataField) -> Self {
        Field::Data(field)
    }
}

/// Blank indicators are written as a backslash.
fn indicator_text(indicator: char) -> char {
    if indicator == ' ' {
        '\\'
    } else {
        indicator
    }
}

impl fmt::Display for ControlField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "={}  {}", self.tag, self.data.replace(' ', "\\"))
    }
}

impl fmt::Display for DataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "={}  {}{}",
            self.tag,
            indicator_text(self.indicator1),
            indicator_text(self.indicator2)
        )?;
        for subfield in &self.subfields {
            write!(f, "${}{}", subfield.code, subfield.value)?;
        }
        Ok(())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Control(field) => field.fmt(f),
            Field::Data(field) => field.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject() -> Field {
        DataField::builder("650", ' ', '0')
            .subfield('a', "Railroads")
            .subfield('x', "History")
            .subfield('z', "England")
            .subfield('x', "Sources")
            .build()
            .into()
    }

    #[test]
    fn test_control_tag_classification() {
        assert!(is_control_tag("001"));
        assert!(is_control_tag("009"));
        assert!(is_control_tag("DB "));
        assert!(is_control_tag("SYS"));
        assert!(!is_control_tag("010"));
        assert!(!is_control_tag("245"));
        assert!(!is_control_tag("LKR"));
        assert!(!is_control_tag("00X"));
    }

    #[test]
    fn test_tag_padding() {
        let field = ControlField::new("1", "x");
        assert_eq!(field.tag, "  1");
        let field = DataField::new("245", '1', '0');
        assert_eq!(field.tag, "245");
    }

    #[test]
    fn test_get_subfields_all_preserves_order_and_duplicates() {
        let field = subject();
        assert_eq!(
            field.get_subfields(&[]),
            vec!["Railroads", "History", "England", "Sources"]
        );
    }

    #[test]
    fn test_get_subfields_filtered() {
        let field = subject();
        assert_eq!(field.get_subfields(&['x']), vec!["History", "Sources"]);
        assert_eq!(field.get_subfields(&['z', 'a']), vec!["Railroads", "England"]);
        assert!(field.get_subfields(&['q']).is_empty());
    }

    #[test]
    fn test_get_subfield_first() {
        let field = subject();
        assert_eq!(field.get_subfield('x'), Some("History"));
        assert_eq!(field.get_subfield('q'), None);
        assert!(field.has_subfield('z'));
        assert!(!field.has_subfield('v'));
    }

    #[test]
    fn test_control_field_accessors() {
        let field = Field::control("001", "012345678");
        assert!(field.is_control_field());
        assert_eq!(field.data(), Some("012345678"));
        assert_eq!(field.indicators(), None);
        assert!(field.subfields().is_empty());
        assert!(field.get_subfields(&[]).is_empty());
        assert_eq!(field.get_subfield('a'), None);
    }

    #[test]
    fn test_data_field_accessors() {
        let field = subject();
        assert!(!field.is_control_field());
        assert_eq!(field.tag(), "650");
        assert_eq!(field.data(), None);
        assert_eq!(field.indicators(), Some((' ', '0')));
        assert_eq!(field.subfields().len(), 4);
        assert!(field.as_data().is_some());
        assert!(field.as_control().is_none());
    }

    #[test]
    fn test_display_control_field() {
        let field = Field::control("008", "850101s1985    enk");
        assert_eq!(field.to_string(), "=008  850101s1985\\\\\\\\enk");
    }

    #[test]
    fn test_display_data_field() {
        assert_eq!(
            subject().to_string(),
            "=650  \\0$aRailroads$xHistory$zEngland$xSources"
        );
    }

    #[test]
    fn test_display_backslash_indicator() {
        let field = DataField::new("245", '\\', '4');
        assert_eq!(field.to_string(), "=245  \\4");
    }

    #[test]
    fn test_serde_tagged_variants() {
        let json = serde_json::to_value(Field::control("001", "42")).unwrap();
        assert_eq!(json["kind"], "control");
        assert_eq!(json["data"], "42");

        let json = serde_json::to_value(subject()).unwrap();
        assert_eq!(json["kind"], "data");
        assert_eq!(json["subfields"][1]["code"], "x");
    }
}
