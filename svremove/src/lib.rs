#[macro_use]
extern crate log;

pub mod config;
pub mod demux;
pub mod descriptor;
pub mod error;
pub mod nit;
pub mod packet;
pub mod packetizer;
pub mod pat;
pub mod pidset;
pub mod pmt;
pub mod psi;
pub mod remover;
pub mod sdt;
pub mod service;

pub use config::Options;
pub use error::Error;
pub use packet::TsPacket;
pub use pat::ProgramAssociationTable;
pub use pmt::ProgramMapTable;
pub use remover::{ServiceRemover, SessionState, Verdict};
pub use service::ServiceRef;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub read: u64,
    pub passed: u64,
    pub substituted: u64,
    pub dropped: u64,
    pub nulled: u64,
}

/// Copies `reader` to `writer` without the service designated by `options`.
pub fn remove_service<R, W>(reader: R, mut writer: W, options: &Options) -> Result<Stats, Error>
where
    R: std::io::Read,
    W: std::io::Write,
{
    let mut remover = ServiceRemover::new(options)?;
    let mut stats = Stats::default();

    for buf in packet::ts_packets(reader) {
        let mut buf = buf?;
        if !TsPacket::new(&buf).check_sync_byte() {
            return Err(Error::SyncByte(stats.read));
        }
        stats.read += 1;

        match remover.process_packet(&mut buf) {
            Verdict::Pass => {
                writer.write_all(&buf)?;
                stats.passed += 1;
            }
            Verdict::Substituted => {
                writer.write_all(&buf)?;
                stats.substituted += 1;
            }
            Verdict::Drop => stats.dropped += 1,
            Verdict::Null => {
                writer.write_all(&packet::null_packet())?;
                stats.nulled += 1;
            }
            Verdict::End => {
                writer.flush()?;
                return Err(Error::Aborted(remover.service().to_string()));
            }
        }
    }
    writer.flush()?;

    info!(
        "service {}: {} packets read, {} passed, {} rewritten, {} dropped, {} replaced by stuffing",
        remover.service(),
        stats.read,
        stats.passed,
        stats.substituted,
        stats.dropped,
        stats.nulled
    );
    if remover.state() != SessionState::Ready && remover.state() != SessionState::Transparent {
        warn!("end of stream before service {} was located", remover.service());
    }
    Ok(stats)
}
