//! Wire constants for the LD2451 serial link.

pub const TELEMETRY_HEADER: [u8; 4] = [0xF4, 0xF3, 0xF2, 0xF1];
pub const TELEMETRY_FOOTER: [u8; 4] = [0xF8, 0xF7, 0xF6, 0xF5];
pub const COMMAND_HEADER: [u8; 4] = [0xFD, 0xFC, 0xFB, 0xFA];
pub const COMMAND_FOOTER: [u8; 4] = [0x04, 0x03, 0x02, 0x01];

pub const OPCODE_ENABLE_CONFIG: u16 = 0x00FF;
pub const OPCODE_DISABLE_CONFIG: u16 = 0x00FE;
pub const OPCODE_SET_DETECTION_PARAMS: u16 = 0x0002;
pub const OPCODE_SET_SENSITIVITY: u16 = 0x0003;

/// Simultaneously tracked targets; also the most target blocks a frame may carry.
pub const MAX_TARGETS: usize = 5;
pub const TARGET_BLOCK_LEN: usize = 5;

/// Header + length + count + alarm + blocks + footer.
pub const MAX_FRAME_LEN: usize = 4 + 2 + 2 + MAX_TARGETS * TARGET_BLOCK_LEN + 4;
/// Receive window; must hold the largest telemetry frame.
pub const RECEIVE_CAPACITY: usize = 64;

/// Raw angle byte for a target on the center line.
pub const ANGLE_CENTER: u8 = 0x80;
pub const DIRECTION_APPROACHING: u8 = 0x01;
pub const DIRECTION_RECEDING: u8 = 0x00;

pub const BAUD_RATE: u32 = 115_200;
