use crate::prelude::{LinkError, LinkResult};
use crate::protocol::buffer::ReceiveBuffer;
use crate::protocol::command::Command;
use crate::protocol::constants::*;
use crate::protocol::frame::{FrameCodec, TelemetryFrame};
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::LinkMetrics;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A complete frame recognised on the byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedFrame {
    Telemetry(TelemetryFrame),
    Command(Command),
}

/// What to do with a candidate whose header does not match its footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResyncPolicy {
    /// Drop the whole candidate and restart from empty, as the sensor does.
    #[default]
    Reset,
    /// Look for the matching header inside the candidate and decode from there.
    ScanForHeader,
}

#[derive(Debug, Clone, Copy)]
enum Framing {
    Telemetry,
    Command,
}

impl Framing {
    const ALL: [Framing; 2] = [Framing::Telemetry, Framing::Command];

    fn header(self) -> &'static [u8; 4] {
        match self {
            Framing::Telemetry => &TELEMETRY_HEADER,
            Framing::Command => &COMMAND_HEADER,
        }
    }

    fn footer(self) -> &'static [u8; 4] {
        match self {
            Framing::Telemetry => &TELEMETRY_FOOTER,
            Framing::Command => &COMMAND_FOOTER,
        }
    }

    fn parse(self, candidate: &[u8]) -> LinkResult<DecodedFrame> {
        match self {
            Framing::Telemetry => {
                FrameCodec::parse_telemetry(candidate).map(DecodedFrame::Telemetry)
            }
            Framing::Command => Command::parse(candidate).map(DecodedFrame::Command),
        }
    }
}

/// Byte-at-a-time frame decoder.
///
/// Telemetry and command frames share the channel and are told apart by
/// their header/footer pair. After every footer the buffer restarts empty,
/// whether or not the candidate decoded.
pub struct FrameDecoder {
    buffer: ReceiveBuffer,
    policy: ResyncPolicy,
    metrics: Arc<LinkMetrics>,
    logger: LogManager,
}

impl FrameDecoder {
    pub fn new(policy: ResyncPolicy) -> Self {
        Self::with_metrics(policy, Arc::new(LinkMetrics::new()))
    }

    pub fn with_metrics(policy: ResyncPolicy, metrics: Arc<LinkMetrics>) -> Self {
        Self {
            buffer: ReceiveBuffer::new(),
            policy,
            metrics,
            logger: LogManager::new("LINK"),
        }
    }

    pub fn metrics(&self) -> Arc<LinkMetrics> {
        self.metrics.clone()
    }

    /// Bytes currently held for the frame being assembled.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Feeds one byte; returns a frame when this byte completed one.
    pub fn push(&mut self, byte: u8) -> Option<DecodedFrame> {
        let was_full = self.buffer.overflowed();
        if !self.buffer.push(byte) {
            if !was_full {
                self.metrics.record_overflow();
                self.logger.warn(
                    &LinkError::FrameTooLong {
                        capacity: self.buffer.capacity(),
                    }
                    .to_string(),
                );
            }
            if Framing::ALL
                .iter()
                .any(|framing| self.buffer.recent_matches(framing.footer()))
            {
                self.logger
                    .warn("footer after oversized frame, dropping it and restarting");
                self.metrics.record_discarded();
                self.buffer.reset();
            }
            return None;
        }

        let framing = Framing::ALL
            .into_iter()
            .find(|framing| self.buffer.ends_with(framing.footer()))?;
        let result = self.assemble(framing);
        self.buffer.reset();

        match result {
            Ok(frame) => {
                self.metrics.record_decoded();
                self.logger.trace_frame(&format!("decoded {:?}", frame));
                Some(frame)
            }
            Err(err) => {
                self.metrics.record_discarded();
                self.logger.warn(&format!("discarding candidate: {}", err));
                None
            }
        }
    }

    /// Feeds a slice, returning the last frame it completed.
    pub fn push_slice(&mut self, bytes: &[u8]) -> Option<DecodedFrame> {
        bytes.iter().fold(None, |last, &byte| self.push(byte).or(last))
    }

    fn assemble(&self, framing: Framing) -> LinkResult<DecodedFrame> {
        let candidate = self.buffer.as_slice();
        let header = framing.header();
        let first = if candidate.starts_with(header) {
            framing.parse(candidate)
        } else {
            Err(LinkError::HeaderMismatch {
                kind: match framing {
                    Framing::Telemetry => "telemetry",
                    Framing::Command => "command",
                },
            })
        };

        match (first, self.policy) {
            (Ok(frame), _) => Ok(frame),
            (Err(err), ResyncPolicy::Reset) => Err(err),
            (Err(err), ResyncPolicy::ScanForHeader) => {
                let body = &candidate[..candidate.len() - 4];
                match body.windows(4).rposition(|window| window == header) {
                    Some(offset) if offset > 0 => {
                        self.logger
                            .trace_frame(&format!("resynchronised at offset {}", offset));
                        framing.parse(&candidate[offset..])
                    }
                    _ => Err(err),
                }
            }
        }
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(ResyncPolicy::default())
    }
}
