/// Unit conversions and narrowing helpers shared by the simulation and codec.
pub struct Kinematics;

const KMH_PER_MPS: f32 = 3.6;

impl Kinematics {
    pub fn kmh_to_mps(kmh: f32) -> f32 {
        kmh / KMH_PER_MPS
    }

    pub fn mps_to_kmh(mps: f32) -> f32 {
        mps * KMH_PER_MPS
    }

    /// Linear interpolation of `x` from `[x0, x1]` onto `[y0, y1]`, clamped to the segment.
    pub fn interpolate(x: f32, x0: f32, x1: f32, y0: f32, y1: f32) -> f32 {
        if (x1 - x0).abs() < f32::EPSILON {
            return y0;
        }
        let t = ((x - x0) / (x1 - x0)).clamp(0.0, 1.0);
        y0 + (y1 - y0) * t
    }

    /// Clamps into the byte range, then truncates toward zero.
    pub fn narrow_u8(value: f32) -> u8 {
        if value.is_nan() {
            return 0;
        }
        value.clamp(0.0, 255.0) as u8
    }
}
