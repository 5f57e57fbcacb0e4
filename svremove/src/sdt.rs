//! Service Description Table (ETSI EN 300 468 5.2.3).

use crate::descriptor::{tag, DescriptorList, ServiceDescriptor};
use crate::packet::pid;
use crate::psi::{self, table_id, BinaryTable, ParseError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SdtService {
    pub service_id: u16,
    pub eit_schedule_flag: bool,
    pub eit_present_following_flag: bool,
    pub running_status: u8,
    pub free_ca_mode: bool,
    pub descriptors: DescriptorList,
}

impl SdtService {
    /// Name from the first decodable service_descriptor.
    pub fn service_name(&self) -> Option<String> {
        self.descriptors
            .search(tag::SERVICE, 0)
            .into_iter()
            .find_map(|index| ServiceDescriptor::parse(&self.descriptors[index].payload).ok())
            .map(|d| d.service_name)
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.service_id.to_be_bytes());
        out.push(
            0b11111100
                | (self.eit_schedule_flag as u8) << 1
                | self.eit_present_following_flag as u8,
        );
        let length = self.descriptors.binary_size() as u16 & 0x0fff;
        let status = (self.running_status as u16 & 0b111) << 13 | (self.free_ca_mode as u16) << 12;
        out.extend_from_slice(&(status | length).to_be_bytes());
        self.descriptors.write_to(out);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptionTable {
    /// SDT Actual (0x42) when true, SDT Other (0x46) otherwise.
    pub actual: bool,
    pub transport_stream_id: u16,
    pub original_network_id: u16,
    pub version_number: u8,
    pub services: Vec<SdtService>,
}

impl ServiceDescriptionTable {
    pub fn from_table(table: &BinaryTable) -> Result<Self, ParseError> {
        let expected = match table.table_id {
            table_id::SDT_OTHER => table_id::SDT_OTHER,
            _ => table_id::SDT_ACTUAL,
        };
        let sections = table.parsed_sections(expected)?;

        let mut original_network_id = 0;
        let mut services = Vec::new();
        for section in &sections {
            let data = section.body;
            if data.len() < 3 {
                return Err(ParseError::Truncated("service description header"));
            }
            original_network_id = (data[0] as u16) << 8 | data[1] as u16;

            let mut offset = 3;
            while offset < data.len() {
                if offset + 5 > data.len() {
                    return Err(ParseError::Truncated("service entry"));
                }
                let descriptors_length = ((data[offset + 3] & 0x0f) as usize) << 8 | data[offset + 4] as usize;
                let start = offset + 5;
                if start + descriptors_length > data.len() {
                    return Err(ParseError::Truncated("service descriptors"));
                }
                services.push(SdtService {
                    service_id: (data[offset] as u16) << 8 | data[offset + 1] as u16,
                    eit_schedule_flag: data[offset + 2] & 0b10 != 0,
                    eit_present_following_flag: data[offset + 2] & 0b01 != 0,
                    running_status: data[offset + 3] >> 5,
                    free_ca_mode: data[offset + 3] & 0x10 != 0,
                    descriptors: DescriptorList::parse(&data[start..start + descriptors_length])?,
                });
                offset = start + descriptors_length;
            }
        }

        Ok(ServiceDescriptionTable {
            actual: expected == table_id::SDT_ACTUAL,
            transport_stream_id: sections[0].table_id_extension,
            original_network_id,
            version_number: sections[0].version_number,
            services,
        })
    }

    pub fn table_id(&self) -> u8 {
        if self.actual {
            table_id::SDT_ACTUAL
        } else {
            table_id::SDT_OTHER
        }
    }

    pub fn find_service(&self, service_id: u16) -> Option<&SdtService> {
        self.services.iter().find(|s| s.service_id == service_id)
    }

    /// First service whose name is accepted by `matches`.
    pub fn find_service_by_name<F>(&self, mut matches: F) -> Option<&SdtService>
    where
        F: FnMut(&str) -> bool,
    {
        self.services
            .iter()
            .find(|s| s.service_name().map_or(false, |name| matches(&name)))
    }

    /// Removes every entry for `service_id`. Returns whether one existed.
    pub fn remove_service(&mut self, service_id: u16) -> bool {
        let before = self.services.len();
        self.services.retain(|s| s.service_id != service_id);
        self.services.len() != before
    }

    pub fn to_table(&self) -> BinaryTable {
        let mut fixed = self.original_network_id.to_be_bytes().to_vec();
        fixed.push(0xff);
        let items: Vec<Vec<u8>> = self
            .services
            .iter()
            .map(|s| {
                let mut bytes = Vec::new();
                s.write_to(&mut bytes);
                bytes
            })
            .collect();
        let bodies = psi::pack_items(&fixed, &items, psi::max_body_size(psi::MAX_PRIVATE_SECTION_SIZE));
        psi::build_table(
            self.table_id(),
            self.transport_stream_id,
            self.version_number,
            pid::SDT,
            bodies,
        )
    }
}
