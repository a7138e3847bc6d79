use crate::protocol::decoder::{DecodedFrame, FrameDecoder, ResyncPolicy};
use crate::protocol::frame::TelemetryFrame;
use crate::protocol::snapshot::LinkSnapshot;
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::LinkMetrics;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_CLEAR_TIMEOUT: Duration = Duration::from_millis(500);

/// Receiving end of the link: decodes telemetry and keeps the latest frame
/// for rendering, network and safety consumers to poll.
pub struct RadarController {
    decoder: FrameDecoder,
    latest: Option<TelemetryFrame>,
    last_seen: f64,
    clear_timeout: f64,
    logger: LogManager,
}

impl RadarController {
    pub fn new(policy: ResyncPolicy) -> Self {
        Self::with_clear_timeout(policy, DEFAULT_CLEAR_TIMEOUT)
    }

    pub fn with_clear_timeout(policy: ResyncPolicy, clear_timeout: Duration) -> Self {
        Self {
            decoder: FrameDecoder::new(policy),
            latest: None,
            last_seen: 0.0,
            clear_timeout: clear_timeout.as_secs_f64(),
            logger: LogManager::new("CONTROLLER"),
        }
    }

    pub fn metrics(&self) -> Arc<LinkMetrics> {
        self.decoder.metrics()
    }

    /// Feeds one received byte at time `now` (seconds).
    pub fn on_byte(&mut self, byte: u8, now: f64) -> Option<TelemetryFrame> {
        match self.decoder.push(byte)? {
            DecodedFrame::Telemetry(frame) => {
                self.latest = Some(frame);
                self.last_seen = now;
                Some(frame)
            }
            DecodedFrame::Command(command) => {
                self.logger
                    .trace_frame(&format!("ignoring echoed command {:?}", command));
                None
            }
        }
    }

    /// Drops the held frame once nothing arrived for the clear timeout.
    /// Returns `true` when this call cleared it.
    pub fn expire(&mut self, now: f64) -> bool {
        if self.latest.is_some() && now - self.last_seen > self.clear_timeout {
            self.latest = None;
            self.logger.record("road clear");
            return true;
        }
        false
    }

    pub fn latest(&self) -> Option<&TelemetryFrame> {
        self.latest.as_ref()
    }

    pub fn snapshot(&self) -> LinkSnapshot {
        self.latest
            .map(|frame| LinkSnapshot::from_records(frame.targets()))
            .unwrap_or_default()
    }

    pub fn closest_distance(&self) -> Option<u8> {
        self.latest
            .and_then(|frame| frame.targets().iter().map(|target| target.distance).min())
    }
}

impl Default for RadarController {
    fn default() -> Self {
        Self::new(ResyncPolicy::default())
    }
}
