use crate::math::kinematics::Kinematics;
use crate::protocol::record::TargetReport;
use serde::{Deserialize, Serialize};

/// One simulated target slot. Slots are reused; an inactive slot is free.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Target {
    /// Meters from the sensor.
    pub distance: f32,
    /// m/s, always positive; `approaching` gives the sign of travel.
    pub speed: f32,
    /// Signed offset from the center line.
    pub angle: f32,
    pub approaching: bool,
    pub active: bool,
}

impl Target {
    pub fn approaching(distance: f32, speed: f32) -> Self {
        Self {
            distance,
            speed,
            angle: 0.0,
            approaching: true,
            active: true,
        }
    }

    pub fn receding(distance: f32, speed: f32) -> Self {
        Self {
            approaching: false,
            ..Self::approaching(distance, speed)
        }
    }

    /// Moves the target along the track for `dt` seconds.
    pub fn travel(&mut self, dt: f32) {
        let step = self.speed * dt;
        if self.approaching {
            self.distance -= step;
        } else {
            self.distance += step;
        }
    }

    /// Report for the encoder; `jitter` only perturbs the reported distance.
    pub fn report(&self, jitter: f32) -> TargetReport {
        TargetReport {
            distance: self.distance + jitter,
            speed_kmh: Kinematics::mps_to_kmh(self.speed),
            angle: self.angle,
            approaching: self.approaching,
        }
    }

    pub fn deactivate(&mut self) {
        *self = Target::default();
    }
}
