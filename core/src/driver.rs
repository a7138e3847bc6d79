//! Sensor-side link context: one owner for the configuration, the target
//! slots and the receive buffer, driven by a tick handler and a byte handler.
//!
//! Callers that run both handlers from different tasks wrap the link in a
//! mutex; each call completes before the other handler can observe state.

use crate::protocol::command::{Command, CommandOutcome, CommandProtocol};
use crate::protocol::config::LinkConfig;
use crate::protocol::constants::MAX_TARGETS;
use crate::protocol::decoder::{DecodedFrame, FrameDecoder, ResyncPolicy};
use crate::protocol::frame::{EncodedFrame, FrameCodec, TelemetryFrame};
use crate::protocol::record::TargetRecord;
use crate::protocol::snapshot::LinkSnapshot;
use crate::simulation::config::SimulationConfig;
use crate::simulation::simulator::TargetSimulation;
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::LinkMetrics;
use std::sync::Arc;
use std::time::Duration;

/// Fixed-step virtual clock. Time only moves when `advance` is called.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    interval_ms: u64,
    ticks: u64,
}

impl SimulationClock {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            ticks: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Seconds since start.
    pub fn now(&self) -> f64 {
        (self.ticks * self.interval_ms) as f64 / 1000.0
    }

    /// Steps one interval forward and returns the new time.
    pub fn advance(&mut self) -> f64 {
        self.ticks += 1;
        self.now()
    }
}

/// Something the byte handler recognised.
#[derive(Debug)]
pub enum LinkEvent {
    Command {
        command: Command,
        outcome: CommandOutcome,
    },
    /// Telemetry is not expected on the sensor's receive line; reported, not acted on.
    Telemetry(TelemetryFrame),
}

pub struct RadarLink {
    protocol: CommandProtocol,
    simulation: TargetSimulation,
    decoder: FrameDecoder,
    clock: SimulationClock,
    metrics: Arc<LinkMetrics>,
    last_reported: [TargetRecord; MAX_TARGETS],
    last_count: usize,
    logger: LogManager,
}

impl RadarLink {
    pub fn new(config: LinkConfig, simulation: SimulationConfig, policy: ResyncPolicy) -> Self {
        let clock = SimulationClock::new(simulation.tick_interval_ms);
        Self::with_simulation(config, TargetSimulation::new(simulation), clock, policy)
    }

    pub fn with_simulation(
        config: LinkConfig,
        simulation: TargetSimulation,
        clock: SimulationClock,
        policy: ResyncPolicy,
    ) -> Self {
        let metrics = Arc::new(LinkMetrics::new());
        let logger = LogManager::new("RADAR CHIP");
        logger.record(&format!(
            "multi-target emulator online ({} profile)",
            simulation.profile_name()
        ));
        Self {
            protocol: CommandProtocol::new(config),
            simulation,
            decoder: FrameDecoder::with_metrics(policy, metrics.clone()),
            clock,
            metrics,
            last_reported: [TargetRecord::default(); MAX_TARGETS],
            last_count: 0,
            logger,
        }
    }

    pub fn config(&self) -> &LinkConfig {
        self.protocol.config()
    }

    pub fn simulation(&self) -> &TargetSimulation {
        &self.simulation
    }

    pub fn simulation_mut(&mut self) -> &mut TargetSimulation {
        &mut self.simulation
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn metrics(&self) -> Arc<LinkMetrics> {
        self.metrics.clone()
    }

    /// Byte handler: one call per received byte.
    pub fn on_byte(&mut self, byte: u8) -> Option<LinkEvent> {
        match self.decoder.push(byte)? {
            DecodedFrame::Command(command) => {
                let outcome = self.protocol.apply(&command);
                self.metrics.record_command(outcome.is_applied());
                Some(LinkEvent::Command { command, outcome })
            }
            DecodedFrame::Telemetry(frame) => {
                self.logger
                    .warn("telemetry frame on the command line, ignoring");
                Some(LinkEvent::Telemetry(frame))
            }
        }
    }

    /// Tick handler: advances the clock one interval, then simulates and encodes.
    pub fn on_tick(&mut self) -> Option<EncodedFrame> {
        let now = self.clock.advance();
        self.tick_at(now)
    }

    /// Simulates and encodes at an explicit time. Emits nothing in
    /// configuration mode or when no target is active; the snapshot is
    /// empty in both cases.
    pub fn tick_at(&mut self, now: f64) -> Option<EncodedFrame> {
        let Some(output) = self.simulation.tick(now, self.protocol.config()) else {
            // Streaming is suspended in configuration mode.
            self.last_count = 0;
            return None;
        };

        self.last_count = output.reports().len();
        for (slot, report) in self.last_reported.iter_mut().zip(output.reports()) {
            *slot = TargetRecord::narrow(report);
        }

        let frame =
            FrameCodec::encode_records(&self.last_reported[..self.last_count], output.alarm())?;
        self.metrics.record_emitted();
        self.logger.trace_frame(&format!(
            "t={:.1}s sent {} targets ({} bytes)",
            now,
            self.last_count,
            frame.len()
        ));
        Some(frame)
    }

    /// Targets as last reported on the wire.
    pub fn snapshot(&self) -> LinkSnapshot {
        LinkSnapshot::from_records(&self.last_reported[..self.last_count])
    }
}

impl Default for RadarLink {
    fn default() -> Self {
        Self::new(
            LinkConfig::default(),
            SimulationConfig::default(),
            ResyncPolicy::default(),
        )
    }
}
