use serde::{Deserialize, Serialize};

/// Direction filter as carried by `SET_DETECTION_PARAMS`.
///
/// Values outside 0..=2 are kept verbatim in `Reserved`, the sensor accepts them too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionFilter {
    Both,
    Approaching,
    Receding,
    Reserved(u8),
}

impl DirectionFilter {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 => DirectionFilter::Both,
            1 => DirectionFilter::Approaching,
            2 => DirectionFilter::Receding,
            other => DirectionFilter::Reserved(other),
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            DirectionFilter::Both => 0,
            DirectionFilter::Approaching => 1,
            DirectionFilter::Receding => 2,
            DirectionFilter::Reserved(other) => other,
        }
    }
}

/// Detection parameters held by the sensor; factory defaults on every start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub config_enabled: bool,
    pub direction_filter: DirectionFilter,
    /// Meters.
    pub max_distance: u8,
    /// km/h.
    pub min_speed: u8,
    pub sensitivity: u8,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            config_enabled: false,
            direction_filter: DirectionFilter::Approaching,
            max_distance: 100,
            min_speed: 5,
            sensitivity: 5,
        }
    }
}
