//! Long-form PSI/SI sections and complete binary tables.

use crc::{Crc, CRC_32_MPEG_2};

const CRC_MPEG: Crc<u32> = Crc::<u32>::new(&CRC_32_MPEG_2);

/// Extended header (table_id_extension .. last_section_number).
const EXTENDED_HEADER_SIZE: usize = 5;
const CRC_SIZE: usize = 4;

/// Largest PSI section (PAT, PMT, CAT) in bytes.
pub const MAX_PSI_SECTION_SIZE: usize = 1024;
/// Largest DVB SI section (NIT, SDT, BAT) in bytes.
pub const MAX_PRIVATE_SECTION_SIZE: usize = 4096;

pub mod table_id {
    pub const PAT: u8 = 0x00;
    pub const CAT: u8 = 0x01;
    pub const PMT: u8 = 0x02;
    pub const NIT_ACTUAL: u8 = 0x40;
    pub const NIT_OTHER: u8 = 0x41;
    pub const SDT_ACTUAL: u8 = 0x42;
    pub const SDT_OTHER: u8 = 0x46;
    pub const BAT: u8 = 0x4A;
}

pub fn table_name(table_id: u8) -> &'static str {
    match table_id {
        table_id::PAT => "PAT",
        table_id::CAT => "CAT",
        table_id::PMT => "PMT",
        table_id::NIT_ACTUAL => "NIT Actual",
        table_id::NIT_OTHER => "NIT Other",
        table_id::SDT_ACTUAL => "SDT Actual",
        table_id::SDT_OTHER => "SDT Other",
        table_id::BAT => "BAT",
        _ => "unknown table",
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("incorrect table_id: expected {expected:#04x}, got {actual:#04x}")]
    IncorrectTableId { expected: u8, actual: u8 },
    #[error("section_syntax_indicator is not set")]
    IncorrectSectionSyntaxIndicator,
    #[error("truncated {0}")]
    Truncated(&'static str),
    #[error("CRC-32 mismatch")]
    CrcMismatch,
    #[error("table has no section")]
    Empty,
}

pub fn crc32(data: &[u8]) -> u32 {
    CRC_MPEG.checksum(data)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    pub table_id: u8,
    pub table_id_extension: u16,
    pub version_number: u8,
    pub current_next_indicator: bool,
    pub section_number: u8,
    pub last_section_number: u8,
    /// Bytes between the extended header and the CRC.
    pub body: &'a [u8],
}

impl<'a> Section<'a> {
    /// Parses a long-form section starting at table_id and checks its CRC.
    /// Trailing bytes after the section are ignored.
    pub fn parse(data: &'a [u8]) -> Result<Self, ParseError> {
        // ISO/IEC 13818-1 2.4.4.10 Table 2-33 (private_section)
        if data.len() < 3 {
            return Err(ParseError::Truncated("section header"));
        }
        let table_id = data[0];
        let section_syntax_indicator = (data[1] & 0b10000000) != 0;
        if !section_syntax_indicator {
            return Err(ParseError::IncorrectSectionSyntaxIndicator);
        }
        let section_length = ((data[1] & 0b00001111) as usize) << 8 | data[2] as usize;
        if section_length < EXTENDED_HEADER_SIZE + CRC_SIZE {
            return Err(ParseError::Truncated("section_length"));
        }
        let end = 3 + section_length;
        if data.len() < end {
            return Err(ParseError::Truncated("section"));
        }

        let stored = u32::from_be_bytes([data[end - 4], data[end - 3], data[end - 2], data[end - 1]]);
        if crc32(&data[..end - CRC_SIZE]) != stored {
            return Err(ParseError::CrcMismatch);
        }

        Ok(Section {
            table_id,
            table_id_extension: (data[3] as u16) << 8 | data[4] as u16,
            version_number: (data[5] & 0b00111110) >> 1,
            current_next_indicator: (data[5] & 0b00000001) != 0,
            section_number: data[6],
            last_section_number: data[7],
            body: &data[8..end - CRC_SIZE],
        })
    }

    /// Total size of a section given its first three bytes.
    pub fn total_size(header: &[u8]) -> usize {
        3 + (((header[1] & 0b00001111) as usize) << 8 | header[2] as usize)
    }
}

/// A complete table: every section of one version, in section_number order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryTable {
    pub table_id: u8,
    pub table_id_extension: u16,
    pub version: u8,
    pub source_pid: u16,
    pub sections: Vec<Vec<u8>>,
}

impl BinaryTable {
    pub fn new(source_pid: u16, sections: Vec<Vec<u8>>) -> Result<Self, ParseError> {
        let first = sections.first().ok_or(ParseError::Empty)?;
        let header = Section::parse(first)?;
        Ok(BinaryTable {
            table_id: header.table_id,
            table_id_extension: header.table_id_extension,
            version: header.version_number,
            source_pid,
            sections,
        })
    }

    /// Parses every section, checking that it belongs to `expected` table_id.
    pub fn parsed_sections(&self, expected: u8) -> Result<Vec<Section<'_>>, ParseError> {
        if self.sections.is_empty() {
            return Err(ParseError::Empty);
        }
        self.sections
            .iter()
            .map(|data| {
                let section = Section::parse(data)?;
                if section.table_id != expected {
                    return Err(ParseError::IncorrectTableId {
                        expected,
                        actual: section.table_id,
                    });
                }
                Ok(section)
            })
            .collect()
    }
}

/// Greedily packs `items` after a copy of `fixed` into section bodies no
/// larger than `max_body`. Always returns at least one body.
pub fn pack_items(fixed: &[u8], items: &[Vec<u8>], max_body: usize) -> Vec<Vec<u8>> {
    let mut bodies = Vec::new();
    let mut body = fixed.to_vec();
    for item in items {
        if body.len() + item.len() > max_body && body.len() > fixed.len() {
            bodies.push(std::mem::replace(&mut body, fixed.to_vec()));
        }
        body.extend_from_slice(item);
    }
    bodies.push(body);
    bodies
}

/// Largest body fitting in a section of `max_section_size` bytes.
pub fn max_body_size(max_section_size: usize) -> usize {
    max_section_size - 3 - EXTENDED_HEADER_SIZE - CRC_SIZE
}

/// Wraps section bodies with headers, numbering and CRC.
pub fn build_table(
    table_id: u8,
    table_id_extension: u16,
    version: u8,
    source_pid: u16,
    bodies: Vec<Vec<u8>>,
) -> BinaryTable {
    let bodies = if bodies.is_empty() { vec![Vec::new()] } else { bodies };
    let last_section_number = (bodies.len() - 1) as u8;
    let sections = bodies
        .into_iter()
        .enumerate()
        .map(|(section_number, body)| {
            let section_length = EXTENDED_HEADER_SIZE + body.len() + CRC_SIZE;
            let mut section = Vec::with_capacity(3 + section_length);
            section.push(table_id);
            // section_syntax_indicator, private_indicator for DVB SI, reserved
            let private_bit = if table_id >= table_id::NIT_ACTUAL { 0b01000000 } else { 0 };
            section.push(0b10110000 | private_bit | ((section_length >> 8) as u8 & 0b00001111));
            section.push((section_length & 0xff) as u8);
            section.extend_from_slice(&table_id_extension.to_be_bytes());
            section.push(0b11000000 | (version & 0b00011111) << 1 | 0b00000001);
            section.push(section_number as u8);
            section.push(last_section_number);
            section.extend_from_slice(&body);
            let crc = crc32(&section);
            section.extend_from_slice(&crc.to_be_bytes());
            section
        })
        .collect();

    BinaryTable {
        table_id,
        table_id_extension,
        version: version & 0b00011111,
        source_pid,
        sections,
    }
}
