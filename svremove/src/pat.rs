use std::collections::BTreeMap;

use crate::packet::pid;
use crate::psi::{self, table_id, BinaryTable, ParseError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramAssociationTable {
    pub transport_stream_id: u16,
    pub version_number: u8,
    /// Network_PID announced by program_number 0, if any.
    pub nit_pid: Option<u16>,
    /// program_number (service id) -> program_map_PID
    pub pmts: BTreeMap<u16, u16>,
}

impl ProgramAssociationTable {
    pub fn from_table(table: &BinaryTable) -> Result<Self, ParseError> {
        let sections = table.parsed_sections(table_id::PAT)?;

        let mut nit_pid = None;
        let mut pmts = BTreeMap::new();
        for section in &sections {
            // ISO/IEC 13818-1 2.4.4.3 Table 2-30
            // ISO/IEC 13818-1 2.4.4.4
            if section.body.len() % 4 != 0 {
                return Err(ParseError::Truncated("program association loop"));
            }
            for entry in section.body.chunks_exact(4) {
                let program_number = (entry[0] as u16) << 8 | entry[1] as u16;
                let pid = ((entry[2] & 0b00011111) as u16) << 8 | entry[3] as u16;
                if program_number == 0 {
                    nit_pid = Some(pid);
                } else {
                    pmts.insert(program_number, pid);
                }
            }
        }

        Ok(ProgramAssociationTable {
            transport_stream_id: sections[0].table_id_extension,
            version_number: sections[0].version_number,
            nit_pid,
            pmts,
        })
    }

    /// The PID carrying the NIT, 0x0010 when the PAT does not say.
    pub fn network_pid(&self) -> u16 {
        self.nit_pid.unwrap_or(pid::NIT)
    }

    pub fn to_table(&self) -> BinaryTable {
        let entry = |program_number: u16, pid: u16| {
            let mut bytes = program_number.to_be_bytes().to_vec();
            bytes.extend_from_slice(&(0xe000 | pid).to_be_bytes());
            bytes
        };
        let mut items = Vec::with_capacity(self.pmts.len() + 1);
        if let Some(nit_pid) = self.nit_pid {
            items.push(entry(0, nit_pid));
        }
        items.extend(self.pmts.iter().map(|(&service_id, &pmt_pid)| entry(service_id, pmt_pid)));

        let bodies = psi::pack_items(&[], &items, psi::max_body_size(psi::MAX_PSI_SECTION_SIZE));
        psi::build_table(
            table_id::PAT,
            self.transport_stream_id,
            self.version_number,
            pid::PAT,
            bodies,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pat() {
        let table = psi::build_table(
            table_id::PAT,
            0x1234,
            1,
            pid::PAT,
            vec![vec![
                0x00, 0x00, 0xE0, 0x10, // NIT
                0x01, 0x01, 0xE1, 0x00, // service 0x0101 -> 0x0100
                0x01, 0x02, 0xE2, 0x00, // service 0x0102 -> 0x0200
            ]],
        );

        let pat = ProgramAssociationTable::from_table(&table).unwrap();
        assert_eq!(pat.transport_stream_id, 0x1234);
        assert_eq!(pat.version_number, 1);
        assert_eq!(pat.nit_pid, Some(0x0010));
        assert_eq!(pat.pmts.len(), 2);
        assert_eq!(pat.pmts[&0x0101], 0x0100);
        assert_eq!(pat.pmts[&0x0102], 0x0200);

        assert_eq!(pat.to_table(), table);
    }

    #[test]
    fn test_network_pid_defaults_to_nit() {
        let table = psi::build_table(table_id::PAT, 1, 0, pid::PAT, vec![vec![0x00, 0x01, 0xE1, 0x00]]);
        let pat = ProgramAssociationTable::from_table(&table).unwrap();
        assert_eq!(pat.nit_pid, None);
        assert_eq!(pat.network_pid(), pid::NIT);
    }

    #[test]
    fn test_multi_section_pat() {
        let table = psi::build_table(
            table_id::PAT,
            1,
            0,
            pid::PAT,
            vec![vec![0x00, 0x01, 0xE1, 0x00], vec![0x00, 0x02, 0xE2, 0x00]],
        );
        let pat = ProgramAssociationTable::from_table(&table).unwrap();
        assert_eq!(pat.pmts.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_reject_misaligned_loop() {
        let table = psi::build_table(table_id::PAT, 1, 0, pid::PAT, vec![vec![0x00, 0x01, 0xE1]]);
        assert!(ProgramAssociationTable::from_table(&table).is_err());
    }
}
