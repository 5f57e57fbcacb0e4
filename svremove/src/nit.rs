//! NIT and BAT share one layout (ETSI EN 300 468 5.2.1 and 5.2.2): a
//! top-level descriptor loop followed by a loop of transport streams.

use crate::descriptor::DescriptorList;
use crate::psi::{self, table_id, BinaryTable, ParseError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportStream {
    pub transport_stream_id: u16,
    pub original_network_id: u16,
    pub descriptors: DescriptorList,
}

impl TransportStream {
    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(6 + self.descriptors.binary_size());
        bytes.extend_from_slice(&self.transport_stream_id.to_be_bytes());
        bytes.extend_from_slice(&self.original_network_id.to_be_bytes());
        self.descriptors.write_with_length(&mut bytes);
        bytes
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportListTable {
    pub table_id: u8,
    /// network_id for a NIT, bouquet_id for a BAT.
    pub table_id_extension: u16,
    pub version_number: u8,
    pub descriptors: DescriptorList,
    pub transports: Vec<TransportStream>,
}

fn loop_length(data: &[u8]) -> usize {
    ((data[0] & 0x0f) as usize) << 8 | data[1] as usize
}

impl TransportListTable {
    pub fn from_table(table: &BinaryTable) -> Result<Self, ParseError> {
        match table.table_id {
            table_id::NIT_ACTUAL | table_id::NIT_OTHER | table_id::BAT => {}
            actual => {
                return Err(ParseError::IncorrectTableId {
                    expected: table_id::NIT_ACTUAL,
                    actual,
                })
            }
        }
        let sections = table.parsed_sections(table.table_id)?;

        let mut descriptors = DescriptorList::default();
        let mut transports = Vec::new();
        for section in &sections {
            let data = section.body;
            if data.len() < 2 {
                return Err(ParseError::Truncated("descriptors_length"));
            }
            let descriptors_length = loop_length(data);
            let loop_offset = 2 + descriptors_length;
            if data.len() < loop_offset + 2 {
                return Err(ParseError::Truncated("transport_stream_loop_length"));
            }
            descriptors
                .descriptors
                .extend(DescriptorList::parse(&data[2..loop_offset])?.descriptors);

            let loop_end = loop_offset + 2 + loop_length(&data[loop_offset..]);
            if data.len() < loop_end {
                return Err(ParseError::Truncated("transport stream loop"));
            }
            let mut offset = loop_offset + 2;
            while offset < loop_end {
                if offset + 6 > loop_end {
                    return Err(ParseError::Truncated("transport stream entry"));
                }
                let length = loop_length(&data[offset + 4..]);
                let start = offset + 6;
                if start + length > loop_end {
                    return Err(ParseError::Truncated("transport descriptors"));
                }
                transports.push(TransportStream {
                    transport_stream_id: (data[offset] as u16) << 8 | data[offset + 1] as u16,
                    original_network_id: (data[offset + 2] as u16) << 8 | data[offset + 3] as u16,
                    descriptors: DescriptorList::parse(&data[start..start + length])?,
                });
                offset = start + length;
            }
        }

        Ok(TransportListTable {
            table_id: table.table_id,
            table_id_extension: sections[0].table_id_extension,
            version_number: sections[0].version_number,
            descriptors,
            transports,
        })
    }

    pub fn to_table(&self, source_pid: u16) -> BinaryTable {
        let bodies = self.section_bodies(psi::max_body_size(psi::MAX_PRIVATE_SECTION_SIZE));
        psi::build_table(
            self.table_id,
            self.table_id_extension,
            self.version_number,
            source_pid,
            bodies,
        )
    }

    // Top-level descriptors come first, transport streams fill what is left.
    fn section_bodies(&self, max_body: usize) -> Vec<Vec<u8>> {
        let mut descriptors = self.descriptors.descriptors.iter().peekable();
        let mut transports = self.transports.iter().map(TransportStream::to_bytes).peekable();
        let mut bodies = Vec::new();
        loop {
            // Both loop length fields.
            let mut size = 4;
            let mut top = DescriptorList::default();
            while let Some(d) = descriptors.peek() {
                let d_size = 2 + d.payload.len();
                if size + d_size > max_body && !top.is_empty() {
                    break;
                }
                size += d_size;
                top.descriptors.push((*d).clone());
                descriptors.next();
            }

            let mut ts_loop = Vec::new();
            if descriptors.peek().is_none() {
                while let Some(ts) = transports.peek() {
                    if size + ts.len() > max_body && !(top.is_empty() && ts_loop.is_empty()) {
                        break;
                    }
                    size += ts.len();
                    ts_loop.extend_from_slice(ts);
                    transports.next();
                }
            }

            let mut body = Vec::with_capacity(size);
            top.write_with_length(&mut body);
            body.extend_from_slice(&(0xf000 | (ts_loop.len() as u16 & 0x0fff)).to_be_bytes());
            body.extend_from_slice(&ts_loop);
            bodies.push(body);

            if descriptors.peek().is_none() && transports.peek().is_none() {
                return bodies;
            }
        }
    }
}
