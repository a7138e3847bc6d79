//! Core of the LD2451 radar link emulator.
//!
//! The sensor side simulates passing traffic and streams telemetry frames;
//! the same serial line carries command frames that open configuration mode
//! and change detection parameters. The controller side decodes the stream
//! into a snapshot for downstream consumers.

pub mod controller;
pub mod driver;
pub mod math;
pub mod prelude;
pub mod protocol;
pub mod simulation;
pub mod telemetry;

pub use controller::RadarController;
pub use driver::{LinkEvent, RadarLink, SimulationClock};
pub use prelude::{LinkError, LinkResult, MotionProfile};
