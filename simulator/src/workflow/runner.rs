use crate::generator::script::CommandScript;
use crate::workflow::config::WorkflowConfig;
use anyhow::bail;
use log::{info, warn};
use radarcore::protocol::{EncodedFrame, LinkConfig, LinkSnapshot};
use radarcore::telemetry::MetricsSnapshot;
use radarcore::{LinkEvent, RadarLink};

pub struct WorkflowResult {
    pub ticks: u64,
    pub frames_emitted: usize,
    /// Every byte the sensor transmitted, in order.
    pub stream: Vec<u8>,
    pub config: LinkConfig,
    pub snapshot: LinkSnapshot,
    pub metrics: MetricsSnapshot,
}

/// Deterministic offline run on the virtual clock.
#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self, inject: &[u8]) -> anyhow::Result<WorkflowResult> {
        self.execute_with(inject, |_, _| {})
    }

    /// Runs the workflow; `on_frame` sees the tick number and the snapshot
    /// after every emitted frame.
    pub fn execute_with(
        &self,
        inject: &[u8],
        mut on_frame: impl FnMut(u64, &LinkSnapshot),
    ) -> anyhow::Result<WorkflowResult> {
        if self.config.ticks == 0 {
            bail!("workflow needs at least one tick");
        }

        let mut link = RadarLink::new(
            self.config.link,
            self.config.simulation.clone(),
            self.config.resync,
        );
        let mut script = CommandScript::new(self.config.commands.clone());
        let mut stream = Vec::new();
        let mut frames_emitted = 0;

        feed_bytes(&mut link, inject);
        for tick in 1..=self.config.ticks {
            if let Some(frame) = step(&mut link, &mut script) {
                stream.extend_from_slice(frame.as_bytes());
                frames_emitted += 1;
                on_frame(tick, &link.snapshot());
            }
        }

        if script.remaining() > 0 {
            warn!(
                "{} scheduled commands fall after the last tick",
                script.remaining()
            );
        }

        Ok(WorkflowResult {
            ticks: self.config.ticks,
            frames_emitted,
            stream,
            config: *link.config(),
            snapshot: link.snapshot(),
            metrics: link.metrics().snapshot(),
        })
    }
}

/// Delivers the commands due at the coming tick, then runs that tick.
pub fn step(link: &mut RadarLink, script: &mut CommandScript) -> Option<EncodedFrame> {
    let next_tick = link.clock().ticks() + 1;
    for frame in script.due(next_tick) {
        feed_bytes(link, frame.as_bytes());
    }
    link.on_tick()
}

/// Delivers bytes to the link one at a time, as the UART would.
pub fn feed_bytes(link: &mut RadarLink, bytes: &[u8]) {
    for &byte in bytes {
        if let Some(LinkEvent::Command { command, outcome }) = link.on_byte(byte) {
            info!("command {:?} -> {:?}", command, outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::script::ScheduledCommand;
    use radarcore::protocol::{Command, FrameCodec};
    use radarcore::RadarController;

    fn workflow(ticks: u64) -> WorkflowConfig {
        WorkflowConfig::from_args(ticks, 21, Default::default())
    }

    #[test]
    fn runner_emits_decodable_stream() {
        let result = Runner::new(workflow(200)).execute(&[]).unwrap();
        assert!(result.frames_emitted > 0);
        assert_eq!(result.metrics.frames_emitted, result.frames_emitted);

        let mut controller = RadarController::default();
        let decoded = result
            .stream
            .iter()
            .filter_map(|&byte| controller.on_byte(byte, 0.0))
            .count();
        assert_eq!(decoded, result.frames_emitted);
    }

    #[test]
    fn scheduled_config_window_pauses_stream() {
        let mut cfg = workflow(100);
        cfg.commands = vec![
            ScheduledCommand {
                tick: 20,
                command: Command::EnableConfig,
            },
            ScheduledCommand {
                tick: 21,
                command: Command::SetDetectionParams {
                    max_distance: 60,
                    direction: 1,
                    min_speed: 20,
                },
            },
            ScheduledCommand {
                tick: 70,
                command: Command::DisableConfig,
            },
        ];

        let mut emitted_ticks = Vec::new();
        let result = Runner::new(cfg)
            .execute_with(&[], |tick, _| emitted_ticks.push(tick))
            .unwrap();
        assert!(emitted_ticks.iter().all(|&tick| !(20..70).contains(&tick)));
        assert!(emitted_ticks.iter().any(|&tick| tick >= 70));
        assert_eq!(result.config.max_distance, 60);
        assert_eq!(result.config.min_speed, 20);
        assert!(!result.config.config_enabled);
        assert_eq!(result.metrics.commands_applied, 3);
    }

    #[test]
    fn injected_enable_blocks_every_frame() {
        let result = Runner::new(workflow(50))
            .execute(Command::EnableConfig.encode().as_bytes())
            .unwrap();
        assert_eq!(result.frames_emitted, 0);
        assert!(result.stream.is_empty());
        assert!(result.config.config_enabled);
    }

    #[test]
    fn zero_ticks_is_rejected() {
        assert!(Runner::new(workflow(0)).execute(&[]).is_err());
    }

    #[test]
    fn every_frame_in_stream_is_well_formed() {
        let result = Runner::new(workflow(300)).execute(&[]).unwrap();
        let mut offset = 0;
        while offset < result.stream.len() {
            let count = result.stream[offset + 6] as usize;
            let len = 12 + count * 5;
            let frame = FrameCodec::parse_telemetry(&result.stream[offset..offset + len]).unwrap();
            assert!(frame.count() >= 1);
            offset += len;
        }
        assert_eq!(offset, result.stream.len());
    }
}
