use serde::{Deserialize, Serialize};

/// Selectable motion profile for every active target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    #[default]
    ConstantSpeed,
    NearFieldBraking,
    PassingVeer,
    BrakeAndVeer,
}

impl std::str::FromStr for ProfileKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "constant_speed" | "constant" => Ok(ProfileKind::ConstantSpeed),
            "near_field_braking" | "braking" => Ok(ProfileKind::NearFieldBraking),
            "passing_veer" | "veer" => Ok(ProfileKind::PassingVeer),
            "brake_and_veer" => Ok(ProfileKind::BrakeAndVeer),
            other => Err(format!("unknown motion profile '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrakingParams {
    /// Braking starts below this distance (m).
    pub threshold_m: f32,
    /// Speed shed per tick (m/s).
    pub decel_per_tick: f32,
    pub floor_speed: f32,
}

impl Default for BrakingParams {
    fn default() -> Self {
        Self {
            threshold_m: 30.0,
            decel_per_tick: 0.5,
            floor_speed: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VeerParams {
    pub band_near_m: f32,
    pub band_far_m: f32,
    /// Offset reached at the near edge of the band. 0x50 on the wire for -48.
    pub peak_offset: f32,
}

impl Default for VeerParams {
    fn default() -> Self {
        Self {
            band_near_m: 2.0,
            band_far_m: 12.0,
            peak_offset: -48.0,
        }
    }
}

/// Simulation tunables. Link parameters (range, speed floor, direction) come
/// from `LinkConfig` instead so commands can change them at run time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub tick_interval_ms: u64,
    pub seed: u64,
    pub profile: ProfileKind,
    /// Upper bound of the per-wave spawn count; capped at the slot count.
    pub max_spawn: u8,
    pub stagger_m: f32,
    pub speed_spread_kmh: u16,
    pub wave_interval_min_ms: u64,
    pub wave_interval_max_ms: u64,
    pub first_wave_delay_ms: u64,
    /// Targets at or below this distance have passed the sensor.
    pub exit_near_m: f32,
    /// Targets beyond this distance have left the track.
    pub exit_far_m: f32,
    pub receding_spawn_m: f32,
    /// Amplitude of the uniform jitter added to reported distances.
    pub jitter_m: f32,
    pub braking: BrakingParams,
    pub veer: VeerParams,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            seed: 0,
            profile: ProfileKind::ConstantSpeed,
            max_spawn: 5,
            stagger_m: 10.0,
            speed_spread_kmh: 80,
            wave_interval_min_ms: 3_000,
            wave_interval_max_ms: 10_000,
            first_wave_delay_ms: 1_000,
            exit_near_m: 1.0,
            exit_far_m: 150.0,
            receding_spawn_m: 2.0,
            jitter_m: 0.0,
            braking: BrakingParams::default(),
            veer: VeerParams::default(),
        }
    }
}

impl SimulationConfig {
    pub fn dt(&self) -> f32 {
        self.tick_interval_ms as f32 / 1000.0
    }
}
