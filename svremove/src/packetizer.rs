//! Endless repetition of a set of tables on one PID.

use crate::packet::{null_packet, PacketBuf, SYNC_BYTE, TS_PACKET_SIZE};
use crate::psi::BinaryTable;

#[derive(Debug, Clone)]
struct StoredSection {
    table_id: u8,
    table_id_extension: u16,
    data: Vec<u8>,
}

/// Every section starts in a new packet and its last packet is padded with
/// stuffing, so each packet carries at most one section.
#[derive(Debug, Clone)]
pub struct CyclingPacketizer {
    pid: u16,
    sections: Vec<StoredSection>,
    next_index: usize,
    pending: Vec<u8>,
    continuity_counter: u8,
}

impl CyclingPacketizer {
    pub fn new(pid: u16) -> Self {
        CyclingPacketizer {
            pid,
            sections: Vec::new(),
            next_index: 0,
            pending: Vec::new(),
            continuity_counter: 0,
        }
    }

    pub fn pid(&self) -> u16 {
        self.pid
    }

    pub fn set_pid(&mut self, pid: u16) {
        self.pid = pid;
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Withdraws the sections of `table_id`, restricted to one
    /// table_id_extension when given. A section already being sent is
    /// completed first.
    pub fn remove_sections(&mut self, table_id: u8, table_id_extension: Option<u16>) {
        self.sections.retain(|s| {
            s.table_id != table_id || table_id_extension.map_or(false, |ext| ext != s.table_id_extension)
        });
        if self.next_index >= self.sections.len() {
            self.next_index = 0;
        }
    }

    pub fn add_table(&mut self, table: &BinaryTable) {
        self.sections.extend(table.sections.iter().map(|data| StoredSection {
            table_id: table.table_id,
            table_id_extension: table.table_id_extension,
            data: data.clone(),
        }));
    }

    /// Swaps in a new version of the table with the same identity.
    pub fn replace_table(&mut self, table: &BinaryTable) {
        self.remove_sections(table.table_id, Some(table.table_id_extension));
        self.add_table(table);
    }

    /// The next packet of the cycle, or a null packet when nothing is installed.
    pub fn next_packet(&mut self) -> PacketBuf {
        let start = self.pending.is_empty();
        if start {
            if self.sections.is_empty() {
                return null_packet();
            }
            self.pending = self.sections[self.next_index].data.clone();
            self.next_index = (self.next_index + 1) % self.sections.len();
        }

        let mut buf = [0xff; TS_PACKET_SIZE];
        buf[0] = SYNC_BYTE;
        buf[1] = (if start { 0b01000000 } else { 0 }) | (self.pid >> 8) as u8 & 0b00011111;
        buf[2] = (self.pid & 0xff) as u8;
        buf[3] = 0b00010000 | self.continuity_counter;
        self.continuity_counter = (self.continuity_counter + 1) & 0x0f;

        let mut offset = 4;
        if start {
            // pointer_field
            buf[offset] = 0;
            offset += 1;
        }
        let n = self.pending.len().min(TS_PACKET_SIZE - offset);
        buf[offset..offset + n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demux::{SectionDemux, TableHandler};
    use crate::packet::{pid, TsPacket};
    use crate::psi::{build_table, table_id};

    #[derive(Default)]
    struct Collector(Vec<BinaryTable>);

    impl TableHandler for Collector {
        fn handle_table(&mut self, _demux: &mut SectionDemux, table: &BinaryTable) {
            self.0.push(table.clone());
        }
    }

    #[test]
    fn test_empty_packetizer_emits_null_packets() {
        let mut pzer = CyclingPacketizer::new(pid::PAT);
        assert_eq!(TsPacket::new(&pzer.next_packet()).pid, pid::NULL);
    }

    #[test]
    fn test_cycles_sections_readable_by_demux() {
        let sdt = build_table(table_id::SDT_ACTUAL, 1, 0, pid::SDT, vec![vec![0x11; 300]]);
        let bat = build_table(table_id::BAT, 2, 0, pid::SDT, vec![vec![0xf0, 0x00, 0xf0, 0x00]]);
        let mut pzer = CyclingPacketizer::new(pid::SDT);
        pzer.add_table(&sdt);
        pzer.add_table(&bat);

        let mut demux = SectionDemux::new();
        let mut collector = Collector::default();
        demux.watch(pid::SDT);
        let mut counters = Vec::new();
        // SDT takes two packets, BAT one: two full cycles.
        for _ in 0..6 {
            let buf = pzer.next_packet();
            let packet = TsPacket::new(&buf);
            assert_eq!(packet.pid, pid::SDT);
            counters.push(packet.continuity_counter);
            demux.feed_packet(&packet, &mut collector);
        }
        assert_eq!(counters, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(collector.0, vec![sdt, bat]);
    }

    #[test]
    fn test_replace_table_withdraws_previous_version() {
        let mut pzer = CyclingPacketizer::new(pid::SDT);
        pzer.add_table(&build_table(table_id::SDT_ACTUAL, 1, 0, pid::SDT, vec![vec![1]]));
        pzer.add_table(&build_table(table_id::SDT_OTHER, 2, 0, pid::SDT, vec![vec![2]]));
        pzer.replace_table(&build_table(table_id::SDT_ACTUAL, 1, 1, pid::SDT, vec![vec![3]]));
        assert_eq!(pzer.section_count(), 2);

        pzer.remove_sections(table_id::SDT_OTHER, None);
        assert_eq!(pzer.section_count(), 1);
        pzer.remove_sections(table_id::SDT_ACTUAL, Some(9));
        assert_eq!(pzer.section_count(), 1);
    }

    #[test]
    fn test_set_pid() {
        let mut pzer = CyclingPacketizer::new(pid::NIT);
        pzer.set_pid(0x0020);
        pzer.add_table(&build_table(table_id::NIT_ACTUAL, 1, 0, 0x0020, vec![vec![0xf0, 0, 0xf0, 0]]));
        assert_eq!(TsPacket::new(&pzer.next_packet()).pid, 0x0020);
    }
}
