pub mod config;
pub mod motion;
pub mod simulator;
pub mod target;

pub use config::{BrakingParams, ProfileKind, SimulationConfig, VeerParams};
pub use motion::{build_profile, BrakeAndVeer, ConstantSpeed, NearFieldBraking, PassingVeer};
pub use simulator::{TargetSimulation, TickOutput};
pub use target::Target;
