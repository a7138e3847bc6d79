use crate::prelude::{LinkError, LinkResult};
use crate::protocol::constants::*;
use crate::protocol::record::{TargetRecord, TargetReport};
use serde::ser::{Serialize, Serializer};
use std::io::{self, Write};

/// Fixed-capacity outgoing frame; both telemetry and command frames fit.
#[derive(Clone, Copy)]
pub struct EncodedFrame {
    data: [u8; MAX_FRAME_LEN],
    len: usize,
}

impl EncodedFrame {
    pub(crate) const fn new() -> Self {
        Self {
            data: [0u8; MAX_FRAME_LEN],
            len: 0,
        }
    }

    pub(crate) fn push(&mut self, byte: u8) {
        self.data[self.len] = byte;
        self.len += 1;
    }

    pub(crate) fn extend(&mut self, bytes: &[u8]) {
        self.data[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Writes the frame to any byte sink (serial port, capture file, ...).
    pub fn send_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.as_bytes())
    }
}

impl std::fmt::Debug for EncodedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EncodedFrame({:02X?})", self.as_bytes())
    }
}

/// A decoded telemetry frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryFrame {
    pub alarm: bool,
    records: [TargetRecord; MAX_TARGETS],
    count: usize,
}

impl TelemetryFrame {
    pub fn new(alarm: bool, targets: &[TargetRecord]) -> LinkResult<Self> {
        if targets.len() > MAX_TARGETS {
            return Err(LinkError::TooManyTargets(targets.len()));
        }
        let mut records = [TargetRecord::default(); MAX_TARGETS];
        records[..targets.len()].copy_from_slice(targets);
        Ok(Self {
            alarm,
            records,
            count: targets.len(),
        })
    }

    pub fn targets(&self) -> &[TargetRecord] {
        &self.records[..self.count]
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl Serialize for TelemetryFrame {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(serde::Serialize)]
        struct Wire<'a> {
            alarm: bool,
            count: usize,
            targets: &'a [TargetRecord],
        }
        Wire {
            alarm: self.alarm,
            count: self.count,
            targets: self.targets(),
        }
        .serialize(serializer)
    }
}

/// Telemetry frame layout:
/// `F4 F3 F2 F1 | LEN_lo LEN_hi | count | alarm | 5-byte blocks | F8 F7 F6 F5`
/// with `LEN = count * 5 + 2`.
pub struct FrameCodec;

impl FrameCodec {
    /// Narrows and encodes the reports. Returns `None` when there is nothing to report.
    pub fn encode(targets: &[TargetReport], alarm: bool) -> Option<EncodedFrame> {
        let count = targets.len().min(MAX_TARGETS);
        let mut records = [TargetRecord::default(); MAX_TARGETS];
        for (slot, report) in records.iter_mut().zip(&targets[..count]) {
            *slot = TargetRecord::narrow(report);
        }
        Self::encode_records(&records[..count], alarm)
    }

    pub fn encode_records(records: &[TargetRecord], alarm: bool) -> Option<EncodedFrame> {
        if records.is_empty() {
            return None;
        }
        let count = records.len().min(MAX_TARGETS);
        let payload_len = (count * TARGET_BLOCK_LEN + 2) as u16;

        let mut frame = EncodedFrame::new();
        frame.extend(&TELEMETRY_HEADER);
        frame.extend(&payload_len.to_le_bytes());
        frame.push(count as u8);
        frame.push(alarm as u8);
        for record in &records[..count] {
            frame.extend(&record.to_block());
        }
        frame.extend(&TELEMETRY_FOOTER);
        Some(frame)
    }

    /// Parses a complete candidate, header through footer.
    pub fn parse_telemetry(candidate: &[u8]) -> LinkResult<TelemetryFrame> {
        const FIXED: usize = 4 + 2 + 2 + 4;
        if candidate.len() < FIXED {
            return Err(LinkError::Truncated(format!(
                "{} bytes, telemetry needs at least {}",
                candidate.len(),
                FIXED
            )));
        }
        if candidate[..4] != TELEMETRY_HEADER {
            return Err(LinkError::HeaderMismatch { kind: "telemetry" });
        }

        let declared = u16::from_le_bytes([candidate[4], candidate[5]]);
        let count = candidate[6] as usize;
        let alarm = candidate[7] != 0;
        if count > MAX_TARGETS {
            return Err(LinkError::TooManyTargets(count));
        }
        let expected = (count * TARGET_BLOCK_LEN + 2) as u16;
        if declared != expected {
            return Err(LinkError::PayloadLength { declared, expected });
        }
        let total = 4 + 2 + expected as usize + 4;
        if candidate.len() != total {
            return Err(LinkError::Truncated(format!(
                "{} bytes for {} targets, expected {}",
                candidate.len(),
                count,
                total
            )));
        }

        let mut records = [TargetRecord::default(); MAX_TARGETS];
        for (slot, block) in records
            .iter_mut()
            .zip(candidate[8..8 + count * TARGET_BLOCK_LEN].chunks_exact(TARGET_BLOCK_LEN))
        {
            *slot = TargetRecord::from_block(block);
        }
        TelemetryFrame::new(alarm, &records[..count])
    }
}
