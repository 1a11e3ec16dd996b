//! Common test helpers shared across the integration suites.

#![allow(dead_code)]

use lexmarc::{DataField, Field, Leader, Record};

pub const SUBFIELD_DELIMITER: u8 = 0x1F;
pub const FIELD_TERMINATOR: u8 = 0x1E;
pub const RECORD_TERMINATOR: u8 = 0x1D;

/// Leader used by most fixtures, before length and base address are filled in.
pub const TEST_LEADER: &str = "00000nam a2200000 a 4500";

/// Creates a leader for test records.
pub fn create_test_leader() -> Leader {
    TEST_LEADER.parse().expect("fixture leader is valid")
}

/// Hand-assembles a raw block from `(tag, body)` pairs.
///
/// Bodies are given without their field terminator. The directory, base
/// address and record length are computed the way a conforming encoder
/// would lay them out.
pub fn build_block(fields: &[(&str, &[u8])]) -> Vec<u8> {
    BlockBuilder::new().fields(fields).build()
}

/// Byte-level fixture builder, for blocks that need a specific defect.
#[derive(Debug, Default)]
pub struct BlockBuilder {
    leader_tail: Option<String>,
    directory: Vec<u8>,
    body: Vec<u8>,
    base_address: Option<String>,
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append fields with correctly computed directory entries.
    pub fn fields(mut self, fields: &[(&str, &[u8])]) -> Self {
        for (tag, content) in fields {
            let length = content.len() + 1;
            let offset = self.body.len();
            self.directory.extend_from_slice(tag.as_bytes());
            self.directory
                .extend_from_slice(format!("{length:04}{offset:05}").as_bytes());
            self.body.extend_from_slice(content);
            self.body.push(FIELD_TERMINATOR);
        }
        self
    }

    /// Append raw directory bytes verbatim.
    pub fn raw_directory(mut self, bytes: &[u8]) -> Self {
        self.directory.extend_from_slice(bytes);
        self
    }

    /// Append raw body bytes verbatim.
    pub fn raw_body(mut self, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(bytes);
        self
    }

    /// Override leader positions 12-16.
    pub fn base_address(mut self, digits: &str) -> Self {
        self.base_address = Some(digits.to_string());
        self
    }

    /// Override leader positions 17-23.
    pub fn leader_tail(mut self, tail: &str) -> Self {
        self.leader_tail = Some(tail.to_string());
        self
    }

    pub fn build(self) -> Vec<u8> {
        let base_address = 24 + self.directory.len() + 1;
        let record_length = base_address + self.body.len() + 1;
        let base_text = self
            .base_address
            .unwrap_or_else(|| format!("{base_address:05}"));
        let tail = self.leader_tail.unwrap_or_else(|| " a 4500".to_string());

        let mut block = format!("{record_length:05}nam a22{base_text}{tail}").into_bytes();
        block.extend_from_slice(&self.directory);
        block.push(FIELD_TERMINATOR);
        block.extend_from_slice(&self.body);
        block.push(RECORD_TERMINATOR);
        block
    }
}

/// A realistic catalogue record with repeated tags and subfield codes.
pub fn create_realistic_record() -> Record {
    Record::builder(create_test_leader())
        .field(Field::control("001", "000123456"))
        .field(Field::control("008", "850101s1985    enk           000 0 eng d"))
        .field(
            DataField::builder("100", '1', ' ')
                .subfield('a', "Eliot, George,")
                .subfield('d', "1819-1880.")
                .build(),
        )
        .field(
            DataField::builder("245", '1', '0')
                .subfield('a', "Middlemarch :")
                .subfield('b', "a study of provincial life /")
                .subfield('c', "George Eliot.")
                .build(),
        )
        .field(
            DataField::builder("650", ' ', '0')
                .subfield('a', "Railroads")
                .subfield('z', "England")
                .subfield('x', "History")
                .build(),
        )
        .field(
            DataField::builder("650", ' ', '0')
                .subfield('a', "Provincial life")
                .subfield('v', "Fiction.")
                .build(),
        )
        .field(Field::control("SYS", "000000042"))
        .build()
}
