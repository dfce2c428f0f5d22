use std::collections::HashMap;
use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;

use crate::error::FgsnifferError;
use crate::parse::Packet;
use crate::pcap::GLOBAL_HEADER;
use crate::pcap::PacketRecord;

/// Output base name of the original tool, kept as the default.
pub const DEFAULT_BASE_NAME: &str = "fgsniffer";

// Characters that must not leak from an interface tag into a file name.
const UNSAFE_CHARS: [char; 7] = ['[', ']', '{', '}', '/', '\\', '*'];

/// Routes finished packets into one pcap file per interface tag.
///
/// Packets without a tag go to `<base>.pcap`, tagged ones to
/// `<base>-<sanitized tag>.pcap`. Each file gets the fixed global header
/// once at creation and one appended record per packet; files are opened
/// in append mode per record, so no handle outlives a write.
#[derive(Debug)]
pub struct Demuxer {
    base: String,
    // file name -> records written
    containers: HashMap<String, u64>,
}

impl Demuxer {
    pub fn new(base: impl Into<String>) -> Demuxer {
        Demuxer {
            base: base.into(),
            containers: HashMap::new(),
        }
    }

    /// Append one packet to its container, creating the container on
    /// first sighting. A container counts as created only once the
    /// global header hit the disk, so a failed creation is re-attempted
    /// with the next packet for that tag.
    pub fn write_packet(&mut self, packet: &Packet) -> Result<(), FgsnifferError> {
        let name = self.container_name(packet.iface.as_deref());
        if !self.containers.contains_key(&name) {
            let mut file = File::create(&name)?;
            file.write_all(&GLOBAL_HEADER)?;
            self.containers.insert(name.clone(), 0);
        }
        let record = PacketRecord::new(packet.ts_sec as u32, packet.ts_subsec, &packet.payload);
        let mut file = OpenOptions::new().append(true).open(&name)?;
        record.write(&mut file)?;
        if let Some(count) = self.containers.get_mut(&name) {
            *count += 1;
        }
        Ok(())
    }

    /// (file name, record count) per created container, sorted by name.
    pub fn summary(&self) -> Vec<(String, u64)> {
        let mut entries: Vec<(String, u64)> = self
            .containers
            .iter()
            .map(|(name, count)| (name.clone(), *count))
            .collect();
        entries.sort();
        entries
    }

    fn container_name(&self, iface: Option<&str>) -> String {
        let mut name = self.base.clone();
        if let Some(tag) = iface {
            name.push('-');
            name.push_str(&sanitize(tag));
        }
        name.push_str(".pcap");
        name
    }
}

// Substitute filesystem-unsafe tag characters with underscores.
fn sanitize(tag: &str) -> String {
    tag.chars()
        .map(|c| if UNSAFE_CHARS.contains(&c) { '_' } else { c })
        .collect()
}
