use crate::math::kinematics::Kinematics;
use crate::protocol::constants::{ANGLE_CENTER, DIRECTION_APPROACHING, DIRECTION_RECEDING};
use serde::{Deserialize, Serialize};

/// Target kinematics in engineering units, as handed to the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TargetReport {
    /// Meters.
    pub distance: f32,
    pub speed_kmh: f32,
    /// Signed offset from the center line.
    pub angle: f32,
    pub approaching: bool,
}

/// One 5-byte target block: `{angle, distance, direction, speed, snr}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TargetRecord {
    pub angle: i8,
    pub distance: u8,
    pub approaching: bool,
    pub speed: u8,
    pub snr: u8,
}

impl TargetRecord {
    /// Narrows a report to wire units. Values are clamped into range, then
    /// truncated toward zero; `snr = clamp(255 - 2 * distance)`.
    pub fn narrow(report: &TargetReport) -> Self {
        let angle = if report.angle.is_nan() {
            0
        } else {
            report.angle.clamp(i8::MIN as f32, i8::MAX as f32) as i8
        };
        Self {
            angle,
            distance: Kinematics::narrow_u8(report.distance),
            approaching: report.approaching,
            speed: Kinematics::narrow_u8(report.speed_kmh),
            snr: Kinematics::narrow_u8(255.0 - report.distance * 2.0),
        }
    }

    pub fn to_block(&self) -> [u8; 5] {
        let angle = (self.angle as i16 + ANGLE_CENTER as i16) as u8;
        let direction = if self.approaching {
            DIRECTION_APPROACHING
        } else {
            DIRECTION_RECEDING
        };
        [angle, self.distance, direction, self.speed, self.snr]
    }

    pub fn from_block(block: &[u8]) -> Self {
        Self {
            angle: (block[0] as i16 - ANGLE_CENTER as i16) as i8,
            distance: block[1],
            approaching: block[2] == DIRECTION_APPROACHING,
            speed: block[3],
            snr: block[4],
        }
    }
}
