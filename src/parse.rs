use chrono::DateTime;
use chrono::NaiveDateTime;
use chrono::Utc;
use regex::Regex;
use std::mem;
use std::sync::LazyLock;

use crate::error::FgsnifferError;

/// Maximum payload bytes one hex line can carry.
pub const BYTES_PER_LINE: usize = 16;

/// Width of the hex byte area on a payload line: eight 4-digit groups
/// separated by single spaces (16 bytes). Everything past this window is
/// the ASCII gutter the appliance appends and must be ignored.
pub const PAYLOAD_WINDOW: usize = 39;

// Header lines either carry a full calendar timestamp or a plain
// seconds offset from sniffer start. The absolute pattern is tried
// first: a calendar prefix would also satisfy the relative pattern's
// leading digit run, so the order is significant.
static ABSOLUTE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2})\.([0-9]+) (.*)$")
        .expect("absolute header regex")
});

static RELATIVE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)\.([0-9]+) (.*)$").expect("relative header regex"));

// Only present in verbose-6 dumps, checked against the remainder of a
// line that already matched a header pattern.
static IFACE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+) (in|out|--) ").expect("interface tag regex"));

static HEX_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x([0-9a-f]+)[ \t]+(.*)$").expect("hex line regex"));

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One sniffed packet assembled from a header line and its hex lines.
///
/// `ts_subsec` keeps the header's sub-second digits verbatim; the
/// appliance emits microseconds but nothing here assumes that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Packet {
    pub ts_sec: i64,
    pub ts_subsec: u32,
    pub iface: Option<String>,
    pub payload: Vec<u8>,
}

impl Packet {
    fn new(ts_sec: i64, ts_subsec: u32, iface: Option<String>) -> Packet {
        Packet {
            ts_sec,
            ts_subsec,
            iface,
            payload: Vec::new(),
        }
    }
    pub fn size(&self) -> usize {
        self.payload.len()
    }
}

/// Streaming line classifier and packet assembler.
///
/// Feed every input line to [`process_line`](Assembler::process_line) in
/// stream order; a finished packet comes back each time a new header
/// closes the previous one. Call [`flush`](Assembler::flush) once at
/// end of stream for the trailing packet.
#[derive(Debug)]
pub struct Assembler {
    // reference instant for relative-timestamp headers
    started: DateTime<Utc>,
    current: Packet,
}

impl Assembler {
    pub fn new(started: DateTime<Utc>) -> Assembler {
        Assembler {
            started,
            current: Packet::default(),
        }
    }

    /// Classify one line. `Ok(Some(..))` hands back the previous packet
    /// when this line starts a new one. `Err` means the line itself was
    /// malformed; it is skipped and the in-progress packet is untouched.
    /// Lines matching no pattern are ignored.
    pub fn process_line(&mut self, line: &str) -> Result<Option<Packet>, FgsnifferError> {
        if let Some(caps) = ABSOLUTE_HEADER.captures(line) {
            let ts = NaiveDateTime::parse_from_str(&caps[1], TIMESTAMP_FORMAT)?;
            let ts_sec = ts.and_utc().timestamp();
            let ts_subsec = caps[2].parse().unwrap_or(0);
            return Ok(self.begin(ts_sec, ts_subsec, iface_of(&caps[3])));
        }
        if let Some(caps) = RELATIVE_HEADER.captures(line) {
            let offset: i64 = caps[1].parse().unwrap_or(0);
            let ts_sec = self.started.timestamp() + offset;
            let ts_subsec = caps[2].parse().unwrap_or(0);
            return Ok(self.begin(ts_sec, ts_subsec, iface_of(&caps[3])));
        }
        if let Some(caps) = HEX_LINE.captures(line) {
            self.append_payload(&caps[2])?;
        }
        Ok(None)
    }

    /// Emit the trailing packet at end of stream, if it carries any data.
    pub fn flush(&mut self) -> Option<Packet> {
        let finished = mem::take(&mut self.current);
        if finished.size() > 0 {
            Some(finished)
        } else {
            None
        }
    }

    // Start a new packet, handing back the finished previous one.
    // Zero-size packets (a header with no hex lines after it, including
    // the initial empty state) are dropped.
    fn begin(&mut self, ts_sec: i64, ts_subsec: u32, iface: Option<String>) -> Option<Packet> {
        let finished = mem::replace(&mut self.current, Packet::new(ts_sec, ts_subsec, iface));
        if finished.size() > 0 {
            Some(finished)
        } else {
            None
        }
    }

    fn append_payload(&mut self, text: &str) -> Result<(), FgsnifferError> {
        let window = text
            .get(..PAYLOAD_WINDOW)
            .ok_or(FgsnifferError::PayloadLineTooShort {
                len: text.len(),
                min: PAYLOAD_WINDOW,
            })?;
        let digits = window.replace(' ', "");
        let bytes = hex::decode(&digits)?;
        self.current.payload.extend_from_slice(&bytes);
        Ok(())
    }
}

// The tag only counts when followed by a direction token.
fn iface_of(rest: &str) -> Option<String> {
    IFACE_TAG
        .captures(rest)
        .map(|caps| caps[1].to_string())
}
