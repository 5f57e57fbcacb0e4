//! Reassembles sections from watched PIDs and delivers complete tables.

use std::collections::{HashMap, HashSet};

use crate::packet::TsPacket;
use crate::psi::{table_name, BinaryTable, Section};

/// Receives every complete table, synchronously from within
/// [`SectionDemux::feed_packet`]. The demux is handed back so that the
/// handler can watch or reset PIDs while handling the table.
pub trait TableHandler {
    fn handle_table(&mut self, demux: &mut SectionDemux, table: &BinaryTable);
}

#[derive(Debug, Default)]
struct TableContext {
    version: u8,
    sections: Vec<Option<Vec<u8>>>,
    delivered: bool,
}

#[derive(Debug, Default)]
struct PidContext {
    buffer: Vec<u8>,
    continuity_counter: Option<u8>,
    synced: bool,
    // (table_id, table_id_extension)
    tables: HashMap<(u8, u16), TableContext>,
}

#[derive(Debug, Default)]
pub struct SectionDemux {
    watched: HashSet<u16>,
    contexts: HashMap<u16, PidContext>,
}

impl SectionDemux {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn watch(&mut self, pid: u16) {
        self.watched.insert(pid);
    }

    pub fn unwatch(&mut self, pid: u16) {
        self.watched.remove(&pid);
        self.contexts.remove(&pid);
    }

    pub fn is_watched(&self, pid: u16) -> bool {
        self.watched.contains(&pid)
    }

    /// Forgets the tables already delivered on `pid`, so that the next
    /// complete occurrence of any of them is delivered again. A section being
    /// reassembled on `pid` is kept.
    pub fn reset_pid(&mut self, pid: u16) {
        if let Some(ctx) = self.contexts.get_mut(&pid) {
            ctx.tables.clear();
        }
    }

    pub fn feed_packet<H>(&mut self, packet: &TsPacket<'_>, handler: &mut H)
    where
        H: TableHandler + ?Sized,
    {
        if !self.watched.contains(&packet.pid) || packet.transport_error_indicator {
            return;
        }
        let data = match packet.data_bytes {
            Some(data) if packet.has_payload() && !data.is_empty() => data,
            _ => return,
        };

        let pid = packet.pid;
        let ctx = self.contexts.entry(pid).or_default();

        // ISO/IEC 13818-1 2.4.3.3 continuity_counter
        if let Some(last) = ctx.continuity_counter {
            if packet.continuity_counter == last {
                return;
            }
            if packet.continuity_counter != (last + 1) & 0x0f {
                debug!("discontinuity on PID 0x{:04X}, dropping partial section", pid);
                ctx.buffer.clear();
                ctx.synced = false;
            }
        }
        ctx.continuity_counter = Some(packet.continuity_counter);

        let mut completed = Vec::new();
        if packet.payload_unit_start_indicator {
            let pointer_field = data[0] as usize;
            if 1 + pointer_field > data.len() {
                ctx.buffer.clear();
                ctx.synced = false;
                return;
            }
            if ctx.synced {
                ctx.buffer.extend_from_slice(&data[1..1 + pointer_field]);
                extract_sections(pid, ctx, &mut completed);
            }
            ctx.buffer.clear();
            ctx.buffer.extend_from_slice(&data[1 + pointer_field..]);
            ctx.synced = true;
        } else if ctx.synced {
            ctx.buffer.extend_from_slice(data);
        } else {
            return;
        }
        extract_sections(pid, ctx, &mut completed);

        for table in completed {
            debug!(
                "got {} v{}, PID {} (0x{:04X}), TIDext {} (0x{:04X})",
                table_name(table.table_id),
                table.version,
                table.source_pid,
                table.source_pid,
                table.table_id_extension,
                table.table_id_extension
            );
            handler.handle_table(self, &table);
        }
    }
}

fn extract_sections(pid: u16, ctx: &mut PidContext, completed: &mut Vec<BinaryTable>) {
    loop {
        if ctx.buffer.first() == Some(&0xff) {
            // Stuffing up to the end of the packet.
            ctx.buffer.clear();
        }
        if ctx.buffer.len() < 3 {
            return;
        }
        let size = Section::total_size(&ctx.buffer);
        if ctx.buffer.len() < size {
            return;
        }
        let section: Vec<u8> = ctx.buffer.drain(..size).collect();
        if let Some(table) = add_section(pid, &mut ctx.tables, section) {
            completed.push(table);
        }
    }
}

fn add_section(
    pid: u16,
    tables: &mut HashMap<(u8, u16), TableContext>,
    data: Vec<u8>,
) -> Option<BinaryTable> {
    let (key, version, section_number, last_section_number) = match Section::parse(&data) {
        Ok(ref section) if !section.current_next_indicator => return None,
        Ok(section) => (
            (section.table_id, section.table_id_extension),
            section.version_number,
            section.section_number as usize,
            section.last_section_number as usize,
        ),
        Err(e) => {
            debug!("ignoring section on PID 0x{:04X}: {}", pid, e);
            return None;
        }
    };
    if section_number > last_section_number {
        return None;
    }

    let table = tables.entry(key).or_default();
    if table.sections.is_empty()
        || table.version != version
        || table.sections.len() != last_section_number + 1
    {
        *table = TableContext {
            version,
            sections: vec![None; last_section_number + 1],
            delivered: false,
        };
    }
    if table.delivered {
        return None;
    }
    table.sections[section_number] = Some(data);
    if table.sections.iter().any(Option::is_none) {
        return None;
    }

    table.delivered = true;
    // Emptied slots keep the version known, so it is not delivered again.
    let sections = table.sections.iter_mut().filter_map(Option::take).collect();
    BinaryTable::new(pid, sections).ok()
}
