//! LD2451 serial link: telemetry framing, command frames and byte decoding.

pub mod buffer;
pub mod command;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod frame;
pub mod record;
pub mod snapshot;

pub use buffer::ReceiveBuffer;
pub use command::{Command, CommandOutcome, CommandProtocol};
pub use config::{DirectionFilter, LinkConfig};
pub use decoder::{DecodedFrame, FrameDecoder, ResyncPolicy};
pub use frame::{EncodedFrame, FrameCodec, TelemetryFrame};
pub use record::{TargetRecord, TargetReport};
pub use snapshot::{LinkSnapshot, TargetView};
