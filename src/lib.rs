//! Convert FortiGate text sniffer dumps into legacy pcap files.
//!
//! The FortiGate `diagnose sniffer packet <interface> '<filter>' <3|6>
//! <count> a` command prints packets as header lines followed by hex
//! dump lines. This crate classifies those lines, assembles them back
//! into packets and writes one pcap file per interface tag, readable by
//! wireshark and friends.
//!
//! ```no_run
//! use chrono::Utc;
//! use fgsniffer::convert;
//! use fgsniffer::demux::Demuxer;
//! use fgsniffer::parse::Assembler;
//! use std::io::BufReader;
//!
//! fn main() -> fgsniffer::Result<()> {
//!     let file = std::fs::File::open("dump.txt")?;
//!     let mut assembler = Assembler::new(Utc::now());
//!     let mut demuxer = Demuxer::new("fgsniffer");
//!     convert(BufReader::new(file), &mut assembler, &mut demuxer)?;
//!     for (name, count) in demuxer.summary() {
//!         println!("created output file {name} ({count} packets)");
//!     }
//!     Ok(())
//! }
//! ```

use log::error;
use log::warn;
use std::io::BufRead;
use std::result;

pub mod demux;
pub mod error;
pub mod parse;
pub mod pcap;

use demux::Demuxer;
use parse::Assembler;
use parse::Packet;

pub type Result<T, E = error::FgsnifferError> = result::Result<T, E>;

/// Drive the pipeline: read lines in order, assemble packets, hand each
/// finished packet to the demuxer.
///
/// Malformed lines and container write failures are logged and skipped;
/// the run goes on. A stream read error is fatal and returns
/// immediately, without flushing the in-progress packet.
pub fn convert<R: BufRead>(
    reader: R,
    assembler: &mut Assembler,
    demuxer: &mut Demuxer,
) -> Result<()> {
    for line in reader.lines() {
        let line = line?;
        match assembler.process_line(&line) {
            Ok(Some(packet)) => write_packet(demuxer, &packet),
            Ok(None) => (),
            Err(e) => warn!("skipping line: {e}"),
        }
    }
    if let Some(packet) = assembler.flush() {
        write_packet(demuxer, &packet);
    }
    Ok(())
}

fn write_packet(demuxer: &mut Demuxer, packet: &Packet) {
    if let Err(e) = demuxer.write_packet(packet) {
        error!("write packet failed: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcap::FileHeader;
    use crate::pcap::PacketRecord;
    use chrono::TimeZone;
    use chrono::Utc;
    use std::fs;
    use std::fs::File;
    use std::io::Cursor;

    const DUMP: &str = "\
interfaces=[any]
filters=[icmp]
2024-01-01 10:00:00.123456 port1 in 10.0.0.1 -> 10.0.0.2: icmp
0x0000   4500 0028 0000 4000 4001 0000 0a00 0001   E..(..@.@.......
2024-01-01 10:00:01.000002 port1 out 10.0.0.2 -> 10.0.0.1: icmp
0x0000   4500 0028 0000 4000 4001 0000 0a00 0002   E..(..@.@.......
0x0010   0a00 0001 0000 0000 0000 0000 0000 0000   ................
2024-01-01 10:00:02.000003 port2 in 10.0.0.3 -> 10.0.0.4: icmp
0x0000   4500 0028 0000 4000 4001 0000 0a00 0003   E..(..@.@.......
2024-01-01 10:00:03.000004 port2 in 10.0.0.3 -> 10.0.0.4: icmp
";

    #[test]
    fn end_to_end_demux() {
        let dir = std::env::temp_dir().join(format!("fgsniffer-e2e-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let base = dir.join("fgsniffer").to_string_lossy().into_owned();

        let started = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut assembler = Assembler::new(started);
        let mut demuxer = Demuxer::new(&base);
        convert(Cursor::new(DUMP), &mut assembler, &mut demuxer).unwrap();

        // trailing zero-size packet dropped, three records over two files
        let summary = demuxer.summary();
        assert_eq!(
            summary,
            vec![
                (format!("{base}-port1.pcap"), 2),
                (format!("{base}-port2.pcap"), 1),
            ]
        );

        let mut file = File::open(format!("{base}-port1.pcap")).unwrap();
        FileHeader::read(&mut file).unwrap();
        let first = PacketRecord::read(&mut file).unwrap();
        let second = PacketRecord::read(&mut file).unwrap();
        assert_eq!(first.ts_sec, 1704103200);
        assert_eq!(first.ts_usec, 123456);
        assert_eq!(first.captured_packet_length, 16);
        assert_eq!(second.ts_sec, 1704103201);
        assert_eq!(second.captured_packet_length, 32);
        assert!(PacketRecord::read(&mut file).is_err());

        fs::remove_dir_all(dir).unwrap();
    }
}
