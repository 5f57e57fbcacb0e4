use crate::descriptor::DescriptorList;
use crate::psi::{table_id, BinaryTable, ParseError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramMapTable {
    pub service_id: u16,
    pub version_number: u8,
    pub pcr_pid: u16,
    pub descriptors: DescriptorList,
    pub streams: Vec<EsInfo>,
}

impl ProgramMapTable {
    pub fn from_table(table: &BinaryTable) -> Result<Self, ParseError> {
        let sections = table.parsed_sections(table_id::PMT)?;

        let mut pcr_pid = None;
        let mut descriptors = DescriptorList::default();
        let mut streams = Vec::new();
        for section in &sections {
            // ISO/IEC 13818-1 2.4.4.8 Table 2-33
            // ISO/IEC 13818-1 2.4.4.9
            let payload = section.body;
            if payload.len() < 4 {
                return Err(ParseError::Truncated("program map header"));
            }
            pcr_pid.get_or_insert(((payload[0] & 0b00011111) as u16) << 8 | payload[1] as u16);
            let program_info_length = ((payload[2] & 0b00001111) as usize) << 8 | payload[3] as usize;
            if payload.len() < 4 + program_info_length {
                return Err(ParseError::Truncated("program_info"));
            }
            descriptors
                .descriptors
                .extend(DescriptorList::parse(&payload[4..4 + program_info_length])?.descriptors);

            let mut index = 4 + program_info_length;
            while index < payload.len() {
                let info = EsInfo::parse(&payload[index..])?;
                index += info.size();
                streams.push(info);
            }
        }

        Ok(ProgramMapTable {
            service_id: sections[0].table_id_extension,
            version_number: sections[0].version_number,
            pcr_pid: pcr_pid.unwrap_or_default(),
            descriptors,
            streams,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EsInfo {
    pub stream_type: u8,
    pub elementary_pid: u16,
    pub descriptors: DescriptorList,
}

impl EsInfo {
    pub fn parse(payload: &[u8]) -> Result<Self, ParseError> {
        if payload.len() < 5 {
            return Err(ParseError::Truncated("elementary stream entry"));
        }
        let stream_type = payload[0];
        let elementary_pid = ((payload[1] & 0b00011111) as u16) << 8 | payload[2] as u16;
        let es_info_length = ((payload[3] & 0b00001111) as usize) << 8 | payload[4] as usize;
        if payload.len() < 5 + es_info_length {
            return Err(ParseError::Truncated("ES_info"));
        }
        Ok(EsInfo {
            stream_type,
            elementary_pid,
            descriptors: DescriptorList::parse(&payload[5..5 + es_info_length])?,
        })
    }

    pub fn size(&self) -> usize {
        5 + self.descriptors.binary_size()
    }
}
