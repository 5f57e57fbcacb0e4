//! Descriptor loops and the handful of descriptors the remover needs.

use crate::psi::ParseError;

pub mod tag {
    pub const CA: u8 = 0x09;
    pub const NETWORK_NAME: u8 = 0x40;
    pub const SERVICE_LIST: u8 = 0x41;
    pub const SERVICE: u8 = 0x48;
    pub const PRIVATE_DATA_SPECIFIER: u8 = 0x5F;
    /// Only meaningful under the EICTA private data specifier.
    pub const LOGICAL_CHANNEL_NUMBER: u8 = 0x83;
}

/// EICTA / DIGITALEUROPE private data specifier (ETSI TS 101 162).
pub const PDS_EICTA: u32 = 0x0000_0028;

/// Width of a service_list_descriptor record: service_id, service_type.
pub const SERVICE_LIST_RECORD_SIZE: usize = 3;
/// Width of a logical_channel_number record: service_id, flags and number.
pub const LCN_RECORD_SIZE: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub tag: u8,
    pub payload: Vec<u8>,
}

impl Descriptor {
    pub fn new(tag: u8, payload: Vec<u8>) -> Self {
        Descriptor { tag, payload }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorList {
    pub descriptors: Vec<Descriptor>,
}

impl DescriptorList {
    pub fn parse(mut data: &[u8]) -> Result<Self, ParseError> {
        let mut descriptors = Vec::new();
        while !data.is_empty() {
            if data.len() < 2 {
                return Err(ParseError::Truncated("descriptor header"));
            }
            let length = data[1] as usize;
            if data.len() < 2 + length {
                return Err(ParseError::Truncated("descriptor"));
            }
            descriptors.push(Descriptor::new(data[0], data[2..2 + length].to_vec()));
            data = &data[2 + length..];
        }
        Ok(DescriptorList { descriptors })
    }

    /// Size of the serialized loop, without any loop length field.
    pub fn binary_size(&self) -> usize {
        self.descriptors.iter().map(|d| 2 + d.payload.len()).sum()
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        for d in &self.descriptors {
            out.push(d.tag);
            out.push(d.payload.len() as u8);
            out.extend_from_slice(&d.payload);
        }
    }

    /// Appends a 12-bit loop length (with four reserved bits set) and the loop.
    pub fn write_with_length(&self, out: &mut Vec<u8>) {
        let length = self.binary_size() as u16;
        out.extend_from_slice(&(0xf000 | (length & 0x0fff)).to_be_bytes());
        self.write_to(out);
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Indices of descriptors with `tag`. Tags from 0x80 are private and only
    /// match when the private data specifier in force at that position is `pds`.
    pub fn search(&self, tag: u8, pds: u32) -> Vec<usize> {
        let mut current_pds = 0;
        let mut found = Vec::new();
        for (index, d) in self.descriptors.iter().enumerate() {
            if d.tag == tag::PRIVATE_DATA_SPECIFIER && d.payload.len() >= 4 {
                current_pds = u32::from_be_bytes([d.payload[0], d.payload[1], d.payload[2], d.payload[3]]);
            }
            if d.tag == tag && (tag < 0x80 || current_pds == pds) {
                found.push(index);
            }
        }
        found
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Descriptor> {
        self.descriptors.iter()
    }
}

impl std::ops::Index<usize> for DescriptorList {
    type Output = Descriptor;

    fn index(&self, index: usize) -> &Descriptor {
        &self.descriptors[index]
    }
}

impl std::ops::IndexMut<usize> for DescriptorList {
    fn index_mut(&mut self, index: usize) -> &mut Descriptor {
        &mut self.descriptors[index]
    }
}

/// CA_descriptor (ISO/IEC 13818-1 2.6.16). Only the single-PID form is decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaDescriptor {
    pub ca_system_id: u16,
    pub ca_pid: u16,
    pub private_data: Vec<u8>,
}

impl CaDescriptor {
    pub fn from_descriptor(descriptor: &Descriptor) -> Option<Self> {
        let payload = &descriptor.payload;
        if descriptor.tag != tag::CA || payload.len() < 4 {
            return None;
        }
        Some(CaDescriptor {
            ca_system_id: (payload[0] as u16) << 8 | payload[1] as u16,
            ca_pid: ((payload[2] & 0b00011111) as u16) << 8 | payload[3] as u16,
            private_data: payload[4..].to_vec(),
        })
    }
}

/// ECM PIDs of every decodable CA_descriptor in the loop, in order.
pub fn ca_pids(list: &DescriptorList) -> Vec<u16> {
    list.search(tag::CA, 0)
        .into_iter()
        .filter_map(|index| CaDescriptor::from_descriptor(&list[index]))
        .map(|ca| ca.ca_pid)
        .collect()
}

/// service_descriptor (ETSI EN 300 468 6.2.33).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub service_type: u8,
    pub provider_name: String,
    pub service_name: String,
}

impl ServiceDescriptor {
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        if data.len() < 2 {
            return Err(ParseError::Truncated("service descriptor"));
        }
        let service_type = data[0];
        let provider_name_length = data[1] as usize;
        let name_offset = 2 + provider_name_length;
        if data.len() < name_offset + 1 {
            return Err(ParseError::Truncated("service provider name"));
        }
        let service_name_length = data[name_offset] as usize;
        if data.len() < name_offset + 1 + service_name_length {
            return Err(ParseError::Truncated("service name"));
        }
        Ok(ServiceDescriptor {
            service_type,
            provider_name: decode_dvb_string(&data[2..name_offset]),
            service_name: decode_dvb_string(&data[name_offset + 1..name_offset + 1 + service_name_length]),
        })
    }
}

/// Decodes a DVB text field (ETSI EN 300 468 Annex A). Text after the 0x15
/// selector is UTF-8; every other table is read as ISO/IEC 8859-1.
pub fn decode_dvb_string(data: &[u8]) -> String {
    let skip = match data.first().copied() {
        Some(0x15) => return String::from_utf8_lossy(&data[1..]).into_owned(),
        Some(0x10) => 3,
        Some(0x1f) => 2,
        Some(b) if b < 0x20 => 1,
        _ => 0,
    };
    data.iter()
        .skip(skip)
        .filter(|&&b| !(0x80..0xa0).contains(&b))
        .map(|&b| b as char)
        .collect()
}

/// Keeps, in order, the `width`-byte records of `payload` accepted by `keep`.
/// Trailing bytes that do not form a full record are discarded.
pub fn retain_records<F>(payload: &[u8], width: usize, mut keep: F) -> Vec<u8>
where
    F: FnMut(&[u8]) -> bool,
{
    let mut retained = Vec::with_capacity(payload.len());
    for record in payload.chunks_exact(width) {
        if keep(record) {
            retained.extend_from_slice(record);
        }
    }
    retained
}

/// Leading 16-bit service_id shared by service list and LCN records.
pub fn record_service_id(record: &[u8]) -> u16 {
    (record[0] as u16) << 8 | record[1] as u16
}
