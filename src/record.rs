//! The decoded record and its query API.
//!
//! A [`Record`] owns its [`Leader`] and an ordered list of [`Field`]s in
//! directory order. Once built it is read-only: every accessor hands out
//! shared references, and there is no way to add, remove or edit fields on an
//! existing record.
//!
//! # Examples
//!
//! ```
//! use lexmarc::{DataField, Field, Leader, Record};
//!
//! let record = Record::builder(Leader::default())
//!     .field(Field::control("001", "012345678"))
//!     .field(DataField::builder("245", '1', '0').subfield('a', "Title").build())
//!     .field(DataField::builder("650", ' ', '0').subfield('a', "Railroads").build())
//!     .build();
//!
//! assert!(record.has_tag("245"));
//! assert_eq!(record.get_fields(&["650", "001"]).len(), 2);
//! assert_eq!(record.first("100"), None);
//! ```

use crate::field::Field;
use crate::leader::Leader;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A decoded bibliographic record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    leader: Leader,
    fields: Vec<Field>,
}

impl Record {
    /// Create a record with no fields.
    #[must_use]
    pub fn new(leader: Leader) -> Self {
        Record {
            leader,
            fields: Vec::new(),
        }
    }

    /// Create a builder for fluently constructing records.
    #[must_use]
    pub fn builder(leader: Leader) -> RecordBuilder {
        RecordBuilder {
            record: Record::new(leader),
        }
    }

    pub(crate) fn from_parts(leader: Leader, fields: Vec<Field>) -> Self {
        Record { leader, fields }
    }

    /// The record leader.
    #[must_use]
    pub fn leader(&self) -> &Leader {
        &self.leader
    }

    /// Iterate over all fields in directory order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields whose tag is in `tags`, in directory order.
    ///
    /// An empty `tags` slice selects every field.
    #[must_use]
    pub fn get_fields(&self, tags: &[&str]) -> Vec<&Field> {
        self.fields
            .iter()
            .filter(|field| tags.is_empty() || tags.contains(&field.tag()))
            .collect()
    }

    /// Iterate over fields with a given tag.
    pub fn fields_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Field> + 'a {
        self.fields.iter().filter(move |field| field.tag() == tag)
    }

    /// Whether at least one field has this tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.fields_by_tag(tag).next().is_some()
    }

    /// First field with this tag.
    #[must_use]
    pub fn first(&self, tag: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.tag() == tag)
    }

    /// Text of the first control field with this tag.
    #[must_use]
    pub fn control_value(&self, tag: &str) -> Option<&str> {
        self.fields
            .iter()
            .filter(|field| field.tag() == tag)
            .find_map(Field::data)
    }

    /// Subfield values across every field whose tag is in `tags`.
    ///
    /// Values come out in directory order, then subfield order. Empty `tags`
    /// or `codes` select everything, as in [`Record::get_fields`] and
    /// [`Field::get_subfields`].
    #[must_use]
    pub fn subfield_values(&self, tags: &[&str], codes: &[char]) -> Vec<&str> {
        self.get_fields(tags)
            .into_iter()
            .flat_map(|field| field.get_subfields(codes))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl fmt::Display for Record {
    /// Text transcription: `=LDR  ` line, then one line per field.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=LDR  {}", self.leader)?;
        for field in &self.fields {
            writeln!(f, "{field}")?;
        }
        Ok(())
    }
}

/// Builder for fluently constructing records
#[derive(Debug)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    /// Append a field to the record being built
    #[must_use]
    pub fn field(mut self, field: impl Into<Field>) -> Self {
        self.record.fields.push(field.into());
        self
    }

    /// Build the record
    #[must_use]
    pub fn build(self) -> Record {
        self.record
    }
}
