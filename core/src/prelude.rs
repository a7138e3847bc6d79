use crate::simulation::target::Target;

/// Common error type for frame assembly and command handling.
///
/// None of these are fatal: the byte and tick entry points log them and carry
/// on with the next byte.
#[derive(thiserror::Error, Debug)]
pub enum LinkError {
    #[error("header mismatch for {kind} frame")]
    HeaderMismatch { kind: &'static str },
    #[error("frame too long: more than {capacity} bytes before a footer")]
    FrameTooLong { capacity: usize },
    #[error("truncated frame: {0}")]
    Truncated(String),
    #[error("payload length mismatch: declared {declared}, expected {expected}")]
    PayloadLength { declared: u16, expected: u16 },
    #[error("too many targets: {0}")]
    TooManyTargets(usize),
    #[error("unknown opcode 0x{0:04X}")]
    UnknownOpcode(u16),
    #[error("command 0x{0:04X} ignored: config not enabled")]
    ConfigLocked(u16),
    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type LinkResult<T> = Result<T, LinkError>;

/// Strategy used to advance one active target by a single tick.
///
/// Profiles only touch kinematics; spawn and removal stay with the simulation.
pub trait MotionProfile: Send {
    fn name(&self) -> &'static str;
    fn advance(&self, target: &mut Target, dt: f32);
}
