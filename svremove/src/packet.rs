pub const TS_PACKET_SIZE: usize = 188;
pub const SYNC_BYTE: u8 = 0x47;

/// Well-known PIDs (ISO/IEC 13818-1 Table 2-3, ETSI EN 300 468 Table 1).
pub mod pid {
    pub const PAT: u16 = 0x0000;
    pub const CAT: u16 = 0x0001;
    pub const TSDT: u16 = 0x0002;
    pub const NIT: u16 = 0x0010;
    pub const SDT: u16 = 0x0011;
    pub const BAT: u16 = 0x0011;
    pub const EIT: u16 = 0x0012;
    pub const RST: u16 = 0x0013;
    pub const TDT: u16 = 0x0014;
    pub const NETSYNC: u16 = 0x0015;
    pub const RNT: u16 = 0x0016;
    pub const INBSIGN: u16 = 0x001C;
    pub const MEASURE: u16 = 0x001D;
    pub const DIT: u16 = 0x001E;
    pub const SIT: u16 = 0x001F;
    pub const NULL: u16 = 0x1FFF;

    /// Number of distinct PIDs.
    pub const COUNT: usize = 0x2000;
}

pub type PacketBuf = [u8; TS_PACKET_SIZE];

pub struct TsPackets<R> {
    reader: R,
}

impl<R: std::io::Read> Iterator for TsPackets<R> {
    type Item = Result<PacketBuf, std::io::Error>;

    fn next(&mut self) -> Option<Result<PacketBuf, std::io::Error>> {
        let mut buf = [0; TS_PACKET_SIZE];
        match self.reader.read_exact(&mut buf) {
            Ok(()) => Some(Ok(buf)),
            Err(e) => match e.kind() {
                std::io::ErrorKind::UnexpectedEof => None,
                _ => Some(Err(e)),
            },
        }
    }
}

pub fn ts_packets<R>(reader: R) -> TsPackets<R> {
    TsPackets { reader }
}

#[derive(Debug)]
pub struct TsPacket<'a> {
    pub sync_byte: u8,
    pub transport_error_indicator: bool,
    pub payload_unit_start_indicator: bool,
    pub transport_priority: bool,
    pub pid: u16,
    pub transport_scrambling_control: u8,
    pub adaptation_field_control: u8,
    pub continuity_counter: u8,
    pub data_bytes: Option<&'a [u8]>,
}

impl<'a> TsPacket<'a> {
    pub fn new(packet: &'a PacketBuf) -> Self {
        // ISO/IEC 13818-1 2.4.3.2 Table 2-2
        // ISO/IEC 13818-1 2.4.3.3
        let sync_byte = packet[0];
        let transport_error_indicator = (packet[1] & 0b10000000) != 0;
        let payload_unit_start_indicator = (packet[1] & 0b01000000) != 0;
        let transport_priority = (packet[1] & 0b00100000) != 0;
        let pid = ((packet[1] & 0b00011111) as u16) << 8 | (packet[2] as u16);
        let transport_scrambling_control = (packet[3] & 0b11000000) >> 6;
        let adaptation_field_control = (packet[3] & 0b00110000) >> 4;
        let continuity_counter = packet[3] & 0b00001111;

        let mut index = 4;
        if adaptation_field_control == 0b10 || adaptation_field_control == 0b11 {
            // ISO/IEC 13818-1 2.4.3.4 Table 2-6
            index += 1 + packet[4] as usize;
        }

        let data_bytes = if (adaptation_field_control == 0b01 || adaptation_field_control == 0b11)
            && index < TS_PACKET_SIZE
        {
            Some(&packet[index..])
        } else {
            None
        };

        TsPacket {
            sync_byte,
            transport_error_indicator,
            payload_unit_start_indicator,
            transport_priority,
            pid,
            transport_scrambling_control,
            adaptation_field_control,
            continuity_counter,
            data_bytes,
        }
    }

    pub fn check_sync_byte(&self) -> bool {
        self.sync_byte == SYNC_BYTE
    }

    pub fn has_payload(&self) -> bool {
        self.adaptation_field_control & 0b01 != 0
    }
}

/// Reads the PID without decoding the rest of the header.
pub fn packet_pid(packet: &PacketBuf) -> u16 {
    ((packet[1] & 0b00011111) as u16) << 8 | (packet[2] as u16)
}

/// A stuffing packet: PID 0x1FFF, payload only, filled with 0xFF.
pub fn null_packet() -> PacketBuf {
    let mut buf = [0xff; TS_PACKET_SIZE];
    buf[0] = SYNC_BYTE;
    buf[1] = (pid::NULL >> 8) as u8;
    buf[2] = (pid::NULL & 0xff) as u8;
    buf[3] = 0b00010000;
    buf
}
