use crate::prelude::{LinkError, LinkResult};
use crate::protocol::config::{DirectionFilter, LinkConfig};
use crate::protocol::constants::*;
use crate::protocol::frame::EncodedFrame;
use crate::telemetry::log::LogManager;
use serde::{Deserialize, Serialize};

/// Commands carried by `FD FC FB FA | LEN | OPCODE | params | 04 03 02 01`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    EnableConfig,
    DisableConfig,
    SetDetectionParams {
        max_distance: u8,
        direction: u8,
        min_speed: u8,
    },
    SetSensitivity {
        sensitivity: u8,
    },
    Unknown {
        opcode: u16,
    },
}

impl Command {
    pub fn opcode(&self) -> u16 {
        match self {
            Command::EnableConfig => OPCODE_ENABLE_CONFIG,
            Command::DisableConfig => OPCODE_DISABLE_CONFIG,
            Command::SetDetectionParams { .. } => OPCODE_SET_DETECTION_PARAMS,
            Command::SetSensitivity { .. } => OPCODE_SET_SENSITIVITY,
            Command::Unknown { opcode } => *opcode,
        }
    }

    pub fn encode(&self) -> EncodedFrame {
        let mut buf = [0u8; 3];
        let params: &[u8] = match *self {
            // Enable carries the protocol version word 0x0001.
            Command::EnableConfig => {
                buf[..2].copy_from_slice(&[0x01, 0x00]);
                &buf[..2]
            }
            Command::DisableConfig | Command::Unknown { .. } => &buf[..0],
            Command::SetDetectionParams {
                max_distance,
                direction,
                min_speed,
            } => {
                buf = [max_distance, direction, min_speed];
                &buf[..]
            }
            Command::SetSensitivity { sensitivity } => {
                buf[0] = sensitivity;
                &buf[..1]
            }
        };

        let payload_len = (2 + params.len()) as u16;
        let mut frame = EncodedFrame::new();
        frame.extend(&COMMAND_HEADER);
        frame.extend(&payload_len.to_le_bytes());
        frame.extend(&self.opcode().to_le_bytes());
        frame.extend(params);
        frame.extend(&COMMAND_FOOTER);
        frame
    }

    /// Parses a complete candidate, header through footer. The declared
    /// length is not checked; the sensor reads parameters by position.
    pub fn parse(candidate: &[u8]) -> LinkResult<Self> {
        const FIXED: usize = 4 + 2 + 2 + 4;
        if candidate.len() < FIXED {
            return Err(LinkError::Truncated(format!(
                "{} bytes, command needs at least {}",
                candidate.len(),
                FIXED
            )));
        }
        if candidate[..4] != COMMAND_HEADER {
            return Err(LinkError::HeaderMismatch { kind: "command" });
        }

        let opcode = u16::from_le_bytes([candidate[6], candidate[7]]);
        let params = &candidate[8..candidate.len() - 4];
        let require = |needed: usize| {
            if params.len() < needed {
                Err(LinkError::Truncated(format!(
                    "opcode 0x{:04X} needs {} parameter bytes, got {}",
                    opcode,
                    needed,
                    params.len()
                )))
            } else {
                Ok(())
            }
        };

        match opcode {
            OPCODE_ENABLE_CONFIG => Ok(Command::EnableConfig),
            OPCODE_DISABLE_CONFIG => Ok(Command::DisableConfig),
            OPCODE_SET_DETECTION_PARAMS => {
                require(3)?;
                Ok(Command::SetDetectionParams {
                    max_distance: params[0],
                    direction: params[1],
                    min_speed: params[2],
                })
            }
            OPCODE_SET_SENSITIVITY => {
                require(1)?;
                Ok(Command::SetSensitivity {
                    sensitivity: params[0],
                })
            }
            other => Ok(Command::Unknown { opcode: other }),
        }
    }
}

/// Result of handing a command to the protocol.
#[derive(Debug)]
pub enum CommandOutcome {
    Applied,
    Ignored(LinkError),
}

impl CommandOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied)
    }
}

/// Applies command frames to the link configuration.
///
/// Parameter writes are only honoured while configuration mode is open;
/// values are accepted verbatim, including ones outside the documented ranges.
pub struct CommandProtocol {
    config: LinkConfig,
    logger: LogManager,
}

impl CommandProtocol {
    pub fn new(config: LinkConfig) -> Self {
        Self {
            config,
            logger: LogManager::new("RADAR"),
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn config_enabled(&self) -> bool {
        self.config.config_enabled
    }

    pub fn apply(&mut self, command: &Command) -> CommandOutcome {
        self.logger.trace_frame(&format!(
            "Command received: 0x{:04X} (config state: {})",
            command.opcode(),
            if self.config.config_enabled {
                "OPEN"
            } else {
                "LOCKED"
            }
        ));

        match *command {
            Command::EnableConfig => {
                self.config.config_enabled = true;
                self.logger.record("Mode -> CONFIG ENABLED");
                CommandOutcome::Applied
            }
            Command::DisableConfig => {
                self.config.config_enabled = false;
                self.logger.record("Mode -> CONFIG CLOSED");
                CommandOutcome::Applied
            }
            Command::SetDetectionParams {
                max_distance,
                direction,
                min_speed,
            } if self.config.config_enabled => {
                self.config.max_distance = max_distance;
                self.config.direction_filter = DirectionFilter::from_byte(direction);
                self.config.min_speed = min_speed;
                self.logger.record(&format!(
                    "UPDATE -> range {}m | dir {} | min speed {}",
                    max_distance, direction, min_speed
                ));
                CommandOutcome::Applied
            }
            Command::SetSensitivity { sensitivity } if self.config.config_enabled => {
                self.config.sensitivity = sensitivity;
                self.logger
                    .record(&format!("UPDATE -> sensitivity {}", sensitivity));
                CommandOutcome::Applied
            }
            Command::SetDetectionParams { .. } | Command::SetSensitivity { .. } => {
                self.ignore(LinkError::ConfigLocked(command.opcode()))
            }
            Command::Unknown { opcode } => self.ignore(LinkError::UnknownOpcode(opcode)),
        }
    }

    fn ignore(&self, err: LinkError) -> CommandOutcome {
        self.logger.warn(&err.to_string());
        CommandOutcome::Ignored(err)
    }
}

impl Default for CommandProtocol {
    fn default() -> Self {
        Self::new(LinkConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SET_PARAMS: Command = Command::SetDetectionParams {
        max_distance: 80,
        direction: 2,
        min_speed: 12,
    };

    #[test]
    fn enable_frame_matches_wire_capture() {
        assert_eq!(
            Command::EnableConfig.encode().as_bytes(),
            &[0xFD, 0xFC, 0xFB, 0xFA, 0x04, 0x00, 0xFF, 0x00, 0x01, 0x00, 0x04, 0x03, 0x02, 0x01]
        );
        assert_eq!(
            Command::DisableConfig.encode().as_bytes(),
            &[0xFD, 0xFC, 0xFB, 0xFA, 0x02, 0x00, 0xFE, 0x00, 0x04, 0x03, 0x02, 0x01]
        );
    }

    #[test]
    fn parse_reads_parameters_by_position() {
        let frame = SET_PARAMS.encode();
        assert_eq!(Command::parse(frame.as_bytes()).unwrap(), SET_PARAMS);

        let sensitivity = Command::SetSensitivity { sensitivity: 9 }.encode();
        assert_eq!(
            Command::parse(sensitivity.as_bytes()).unwrap(),
            Command::SetSensitivity { sensitivity: 9 }
        );
    }

    #[test]
    fn parse_reports_unknown_opcode_and_short_params() {
        let unknown = Command::Unknown { opcode: 0x0061 }.encode();
        assert_eq!(
            Command::parse(unknown.as_bytes()).unwrap(),
            Command::Unknown { opcode: 0x0061 }
        );

        let short = [
            0xFD, 0xFC, 0xFB, 0xFA, 0x03, 0x00, 0x02, 0x00, 0x50, 0x04, 0x03, 0x02, 0x01,
        ];
        assert!(matches!(
            Command::parse(&short),
            Err(LinkError::Truncated(_))
        ));
    }

    #[test]
    fn parameter_writes_require_config_mode() {
        let mut protocol = CommandProtocol::default();
        let before = *protocol.config();

        let outcome = protocol.apply(&SET_PARAMS);
        assert!(matches!(
            outcome,
            CommandOutcome::Ignored(LinkError::ConfigLocked(0x0002))
        ));
        let outcome = protocol.apply(&Command::SetSensitivity { sensitivity: 12 });
        assert!(!outcome.is_applied());
        assert_eq!(*protocol.config(), before);
    }

    #[test]
    fn parameter_writes_overwrite_only_their_fields() {
        let mut protocol = CommandProtocol::default();
        assert!(protocol.apply(&Command::EnableConfig).is_applied());
        assert!(protocol.config_enabled());

        assert!(protocol.apply(&SET_PARAMS).is_applied());
        let config = *protocol.config();
        assert_eq!(config.max_distance, 80);
        assert_eq!(config.direction_filter, DirectionFilter::Receding);
        assert_eq!(config.min_speed, 12);
        assert_eq!(config.sensitivity, 5);

        assert!(protocol
            .apply(&Command::SetSensitivity { sensitivity: 200 })
            .is_applied());
        assert_eq!(protocol.config().sensitivity, 200);
        assert_eq!(protocol.config().max_distance, 80);

        assert!(protocol.apply(&Command::DisableConfig).is_applied());
        assert!(!protocol.config_enabled());
    }

    #[test]
    fn unknown_opcode_leaves_state_untouched() {
        let mut protocol = CommandProtocol::default();
        protocol.apply(&Command::EnableConfig);
        let before = *protocol.config();
        let outcome = protocol.apply(&Command::Unknown { opcode: 0x00A0 });
        assert!(matches!(
            outcome,
            CommandOutcome::Ignored(LinkError::UnknownOpcode(0x00A0))
        ));
        assert_eq!(*protocol.config(), before);
    }
}
