use byteorder::LittleEndian;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;
use std::io::Read;
use std::io::Write;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use strum_macros::EnumString;

use crate::error::FgsnifferError;

/// Snapshot length carried in the fixed file header, matching what the
/// FortiGate sniffer captures per frame.
pub const SNAPLEN: u32 = 1518;

// Legacy pcap file header, little-endian on disk:
// magic 0xa1b2c3d4, version 2.4, thiszone 0, sigfigs 0,
// snaplen 1518, linktype 1 (Ethernet).
// Every field is fixed for this tool, so the header is a literal.
pub const GLOBAL_HEADER: [u8; 24] = [
    0xd4, 0xc3, 0xb2, 0xa1, // magic
    0x02, 0x00, 0x04, 0x00, // version 2.4
    0x00, 0x00, 0x00, 0x00, // thiszone
    0x00, 0x00, 0x00, 0x00, // sigfigs
    0xee, 0x05, 0x00, 0x00, // snaplen
    0x01, 0x00, 0x00, 0x00, // linktype
];

/// Link-layer types a sniffer dump could plausibly declare.
/// Values from the IANA linktype registry.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumIter)]
pub enum LinkType {
    NULL = 0,
    ETHERNET = 1,
    PPP = 9,
    RAW = 101,
    IEEE80211 = 105,
    LOOP = 108,
    LINUXSLL = 113,
}

impl LinkType {
    pub fn to_u32(self) -> u32 {
        self as u32
    }
    pub fn from_u32(value: u32) -> Option<Self> {
        LinkType::iter().find(|&e| e as u32 == value)
    }
}

/// Decoded form of the 24-byte file header. The write path emits
/// [`GLOBAL_HEADER`] directly; this type exists to read headers back
/// for verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub magic_number: u32,
    pub major_version: u16,
    pub minor_version: u16,
    pub thiszone: u32,
    pub sigfigs: u32,
    pub snaplen: u32,
    pub linktype: LinkType,
}

impl FileHeader {
    pub fn read<R: Read>(r: &mut R) -> Result<FileHeader, FgsnifferError> {
        let magic_number = r.read_u32::<LittleEndian>()?;
        let major_version = r.read_u16::<LittleEndian>()?;
        let minor_version = r.read_u16::<LittleEndian>()?;
        let thiszone = r.read_u32::<LittleEndian>()?;
        let sigfigs = r.read_u32::<LittleEndian>()?;
        let snaplen = r.read_u32::<LittleEndian>()?;
        let linktype_value = r.read_u32::<LittleEndian>()?;
        let linktype = match LinkType::from_u32(linktype_value) {
            Some(l) => l,
            None => {
                return Err(FgsnifferError::UnknownLinkType {
                    linktype: linktype_value,
                });
            }
        };
        Ok(FileHeader {
            magic_number,
            major_version,
            minor_version,
            thiszone,
            sigfigs,
            snaplen,
            linktype,
        })
    }
}

/// One packet record: 16-byte header, four 32-bit little-endian fields,
/// followed by the raw frame bytes.
///
/// `ts_usec` holds the sub-second digits exactly as the appliance printed
/// them. `captured_packet_length` and `original_packet_length` are always
/// equal here since the text dump is all the tool ever sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketRecord {
    pub ts_sec: u32,
    pub ts_usec: u32,
    pub captured_packet_length: u32,
    pub original_packet_length: u32,
    pub packet_data: Vec<u8>,
}

impl PacketRecord {
    pub fn new(ts_sec: u32, ts_usec: u32, packet_data: &[u8]) -> PacketRecord {
        let len = packet_data.len() as u32;
        PacketRecord {
            ts_sec,
            ts_usec,
            captured_packet_length: len,
            original_packet_length: len,
            packet_data: packet_data.to_vec(),
        }
    }
    pub fn write<W: Write>(&self, w: &mut W) -> Result<(), FgsnifferError> {
        w.write_u32::<LittleEndian>(self.ts_sec)?;
        w.write_u32::<LittleEndian>(self.ts_usec)?;
        w.write_u32::<LittleEndian>(self.captured_packet_length)?;
        w.write_u32::<LittleEndian>(self.original_packet_length)?;
        w.write_all(&self.packet_data)?;
        Ok(())
    }
    pub fn read<R: Read>(r: &mut R) -> Result<PacketRecord, FgsnifferError> {
        let ts_sec = r.read_u32::<LittleEndian>()?;
        let ts_usec = r.read_u32::<LittleEndian>()?;
        let captured_packet_length = r.read_u32::<LittleEndian>()?;
        let original_packet_length = r.read_u32::<LittleEndian>()?;
        let mut data = vec![0u8; captured_packet_length as usize];
        r.read_exact(&mut data)?;
        Ok(PacketRecord {
            ts_sec,
            ts_usec,
            captured_packet_length,
            original_packet_length,
            packet_data: data,
        })
    }
}
