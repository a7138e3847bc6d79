use crate::math::kinematics::Kinematics;
use crate::prelude::MotionProfile;
use crate::simulation::config::{BrakingParams, ProfileKind, VeerParams};
use crate::simulation::target::Target;

/// Straight-line travel at the spawn speed.
pub struct ConstantSpeed;

impl MotionProfile for ConstantSpeed {
    fn name(&self) -> &'static str {
        "constant_speed"
    }

    fn advance(&self, target: &mut Target, dt: f32) {
        target.travel(dt);
    }
}

/// Approaching targets shed speed inside the near field, down to a floor.
pub struct NearFieldBraking {
    params: BrakingParams,
}

impl NearFieldBraking {
    pub fn new(params: BrakingParams) -> Self {
        Self { params }
    }

    fn brake(&self, target: &mut Target) {
        if target.approaching
            && target.distance < self.params.threshold_m
            && target.speed > self.params.floor_speed
        {
            target.speed = (target.speed - self.params.decel_per_tick).max(self.params.floor_speed);
        }
    }
}

impl MotionProfile for NearFieldBraking {
    fn name(&self) -> &'static str {
        "near_field_braking"
    }

    fn advance(&self, target: &mut Target, dt: f32) {
        self.brake(target);
        target.travel(dt);
    }
}

/// Lateral offset animated across the passing band.
pub struct PassingVeer {
    params: VeerParams,
}

impl PassingVeer {
    pub fn new(params: VeerParams) -> Self {
        Self { params }
    }

    /// Offset as a function of distance alone: zero at the far edge of the
    /// band, `peak_offset` at the near edge, center outside the band.
    pub fn angle_at(&self, distance: f32) -> f32 {
        let VeerParams {
            band_near_m,
            band_far_m,
            peak_offset,
        } = self.params;
        if distance < band_near_m || distance > band_far_m {
            return 0.0;
        }
        Kinematics::interpolate(distance, band_far_m, band_near_m, 0.0, peak_offset)
    }
}

impl MotionProfile for PassingVeer {
    fn name(&self) -> &'static str {
        "passing_veer"
    }

    fn advance(&self, target: &mut Target, dt: f32) {
        target.travel(dt);
        target.angle = self.angle_at(target.distance);
    }
}

/// Braking in the near field, then veering through the passing band.
pub struct BrakeAndVeer {
    braking: NearFieldBraking,
    veer: PassingVeer,
}

impl MotionProfile for BrakeAndVeer {
    fn name(&self) -> &'static str {
        "brake_and_veer"
    }

    fn advance(&self, target: &mut Target, dt: f32) {
        self.braking.brake(target);
        target.travel(dt);
        target.angle = self.veer.angle_at(target.distance);
    }
}

pub fn build_profile(
    kind: ProfileKind,
    braking: BrakingParams,
    veer: VeerParams,
) -> Box<dyn MotionProfile> {
    match kind {
        ProfileKind::ConstantSpeed => Box::new(ConstantSpeed),
        ProfileKind::NearFieldBraking => Box::new(NearFieldBraking::new(braking)),
        ProfileKind::PassingVeer => Box::new(PassingVeer::new(veer)),
        ProfileKind::BrakeAndVeer => Box::new(BrakeAndVeer {
            braking: NearFieldBraking::new(braking),
            veer: PassingVeer::new(veer),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_speed_keeps_speed_and_angle() {
        let mut target = Target::approaching(20.0, 10.0);
        ConstantSpeed.advance(&mut target, 0.1);
        assert_eq!(target.distance, 19.0);
        assert_eq!(target.speed, 10.0);
        assert_eq!(target.angle, 0.0);
    }

    #[test]
    fn braking_only_inside_threshold_and_stops_at_floor() {
        let profile = NearFieldBraking::new(BrakingParams::default());

        let mut far = Target::approaching(40.0, 10.0);
        profile.advance(&mut far, 0.1);
        assert_eq!(far.speed, 10.0);

        let mut near = Target::approaching(25.0, 10.0);
        profile.advance(&mut near, 0.1);
        assert_eq!(near.speed, 9.5);

        let mut slow = Target::approaching(25.0, 2.2);
        profile.advance(&mut slow, 0.1);
        assert_eq!(slow.speed, 2.0);
        profile.advance(&mut slow, 0.1);
        assert_eq!(slow.speed, 2.0);
    }

    #[test]
    fn receding_targets_do_not_brake() {
        let profile = NearFieldBraking::new(BrakingParams::default());
        let mut target = Target::receding(5.0, 10.0);
        profile.advance(&mut target, 0.1);
        assert_eq!(target.speed, 10.0);
    }

    #[test]
    fn veer_depends_on_distance_only() {
        let veer = PassingVeer::new(VeerParams::default());
        assert_eq!(veer.angle_at(20.0), 0.0);
        assert_eq!(veer.angle_at(12.0), 0.0);
        assert_eq!(veer.angle_at(7.0), -24.0);
        assert_eq!(veer.angle_at(2.0), -48.0);
        assert_eq!(veer.angle_at(1.5), 0.0);

        let mut a = Target::approaching(8.0, 10.0);
        let mut b = Target {
            angle: 33.0,
            ..Target::approaching(8.0, 10.0)
        };
        veer.advance(&mut a, 0.1);
        veer.advance(&mut b, 0.1);
        assert_eq!(a.angle, b.angle);
    }

    #[test]
    fn builder_selects_requested_profile() {
        let names: Vec<_> = [
            ProfileKind::ConstantSpeed,
            ProfileKind::NearFieldBraking,
            ProfileKind::PassingVeer,
            ProfileKind::BrakeAndVeer,
        ]
        .into_iter()
        .map(|kind| build_profile(kind, BrakingParams::default(), VeerParams::default()).name())
        .collect();
        assert_eq!(
            names,
            vec![
                "constant_speed",
                "near_field_braking",
                "passing_veer",
                "brake_and_veer"
            ]
        );
    }
}
