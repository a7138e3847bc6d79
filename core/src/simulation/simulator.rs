use crate::math::kinematics::Kinematics;
use crate::prelude::MotionProfile;
use crate::protocol::config::{DirectionFilter, LinkConfig};
use crate::protocol::constants::MAX_TARGETS;
use crate::protocol::record::TargetReport;
use crate::simulation::config::SimulationConfig;
use crate::simulation::motion::build_profile;
use crate::simulation::target::Target;
use crate::telemetry::log::LogManager;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Reports produced by one tick, ready for the frame encoder.
#[derive(Debug, Clone, Copy)]
pub struct TickOutput {
    reports: [TargetReport; MAX_TARGETS],
    count: usize,
    alarm: bool,
}

impl TickOutput {
    pub fn reports(&self) -> &[TargetReport] {
        &self.reports[..self.count]
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Raised when any reported target is approaching.
    pub fn alarm(&self) -> bool {
        self.alarm
    }
}

/// Fixed-capacity traffic simulation behind the sensor.
///
/// Each tick: spawn a wave when due, advance every active target through
/// the motion profile, free slots that left the track, then report.
pub struct TargetSimulation {
    config: SimulationConfig,
    slots: [Target; MAX_TARGETS],
    profile: Box<dyn MotionProfile>,
    rng: StdRng,
    next_wave_time: f64,
    logger: LogManager,
}

impl TargetSimulation {
    pub fn new(config: SimulationConfig) -> Self {
        let profile = build_profile(config.profile, config.braking, config.veer);
        Self::with_profile(config, profile)
    }

    pub fn with_profile(config: SimulationConfig, profile: Box<dyn MotionProfile>) -> Self {
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            next_wave_time: config.first_wave_delay_ms as f64 / 1000.0,
            slots: [Target::default(); MAX_TARGETS],
            profile,
            config,
            logger: LogManager::new("RADAR"),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn profile_name(&self) -> &'static str {
        self.profile.name()
    }

    pub fn dt(&self) -> f32 {
        self.config.dt()
    }

    pub fn next_wave_time(&self) -> f64 {
        self.next_wave_time
    }

    /// Pushes the next spawn wave to `time` seconds.
    pub fn schedule_wave(&mut self, time: f64) {
        self.next_wave_time = time;
    }

    /// Places a target in the first free slot; `false` when all slots are taken.
    pub fn insert(&mut self, target: Target) -> bool {
        match self.slots.iter_mut().find(|slot| !slot.active) {
            Some(slot) => {
                *slot = Target {
                    active: true,
                    ..target
                };
                true
            }
            None => false,
        }
    }

    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.slots.iter().filter(|slot| slot.active)
    }

    pub fn active_count(&self) -> usize {
        self.targets().count()
    }

    /// Advances the simulation to `now` (seconds). Returns `None` while the
    /// link is in configuration mode: nothing moves and nothing is reported.
    pub fn tick(&mut self, now: f64, link: &LinkConfig) -> Option<TickOutput> {
        if link.config_enabled {
            return None;
        }

        if now >= self.next_wave_time {
            self.spawn_wave(now, link);
        }

        let dt = self.dt();
        let (exit_near, exit_far) = (self.config.exit_near_m, self.config.exit_far_m);
        for target in self.slots.iter_mut().filter(|slot| slot.active) {
            self.profile.advance(target, dt);
            let left_track = if target.approaching {
                target.distance <= exit_near
            } else {
                target.distance > exit_far
            };
            if left_track {
                self.logger.trace_frame(&format!(
                    "target left the track at {:.1}m",
                    target.distance
                ));
                target.deactivate();
            }
        }

        let mut output = TickOutput {
            reports: [TargetReport::default(); MAX_TARGETS],
            count: 0,
            alarm: false,
        };
        let amplitude = self.config.jitter_m;
        for target in self.slots.iter().filter(|slot| slot.active) {
            let jitter = if amplitude > 0.0 {
                self.rng.gen_range(-amplitude..=amplitude)
            } else {
                0.0
            };
            output.reports[output.count] = target.report(jitter);
            output.alarm |= target.approaching;
            output.count += 1;
        }
        Some(output)
    }

    fn spawn_wave(&mut self, now: f64, link: &LinkConfig) {
        let max_spawn = self.config.max_spawn.clamp(1, MAX_TARGETS as u8);
        let wanted = self.rng.gen_range(1..=max_spawn);
        self.logger
            .record(&format!("TRAFFIC WAVE: spawning {} targets", wanted));

        let mut spawned = 0u8;
        for slot in self.slots.iter_mut() {
            if spawned >= wanted {
                break;
            }
            if slot.active {
                continue;
            }

            let approaching = match link.direction_filter {
                DirectionFilter::Approaching | DirectionFilter::Reserved(_) => true,
                DirectionFilter::Receding => false,
                DirectionFilter::Both => self.rng.gen_bool(0.5),
            };
            let spread = if self.config.speed_spread_kmh > 0 {
                self.rng.gen_range(0..self.config.speed_spread_kmh)
            } else {
                0
            };
            let speed = Kinematics::kmh_to_mps(link.min_speed as f32 + spread as f32);
            let stagger = spawned as f32 * self.config.stagger_m;

            *slot = if approaching {
                Target::approaching(link.max_distance as f32 + stagger, speed)
            } else {
                Target::receding(self.config.receding_spawn_m + stagger, speed)
            };
            spawned += 1;
        }

        let (lo, hi) = (
            self.config.wave_interval_min_ms,
            self.config.wave_interval_max_ms,
        );
        let wait_ms = if hi > lo { self.rng.gen_range(lo..hi) } else { lo };
        self.next_wave_time = now + wait_ms as f64 / 1000.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::config::ProfileKind;

    /// No spontaneous waves: only inserted targets move.
    fn quiet_config() -> SimulationConfig {
        SimulationConfig {
            first_wave_delay_ms: u64::MAX / 2,
            ..Default::default()
        }
    }

    fn ticks_until_removed(sim: &mut TargetSimulation, link: &LinkConfig) -> usize {
        let dt = sim.dt() as f64;
        let mut ticks = 0;
        while sim.active_count() > 0 {
            ticks += 1;
            sim.tick(ticks as f64 * dt, link);
            assert!(ticks < 10_000, "target never left the track");
        }
        ticks
    }

    #[test]
    fn lifecycle_takes_predicted_tick_count() {
        let link = LinkConfig::default();
        for speed in [5.0f32, 10.0, 20.0] {
            let mut sim = TargetSimulation::new(quiet_config());
            assert!(sim.insert(Target::approaching(100.0, speed)));
            let expected = ((100.0 - 1.0) / (speed * 0.1)).ceil() as usize;
            assert_eq!(ticks_until_removed(&mut sim, &link), expected, "speed {}", speed);
        }
    }

    #[test]
    fn target_at_threshold_is_removed_and_not_reported() {
        let mut sim = TargetSimulation::new(quiet_config());
        sim.insert(Target::approaching(2.0, 10.0));
        let output = sim.tick(0.1, &LinkConfig::default()).unwrap();
        assert!(output.is_empty());
        assert_eq!(sim.active_count(), 0);
    }

    #[test]
    fn config_mode_freezes_targets() {
        let mut sim = TargetSimulation::new(quiet_config());
        sim.insert(Target::approaching(50.0, 10.0));
        let link = LinkConfig {
            config_enabled: true,
            ..Default::default()
        };
        for tick in 1..=20 {
            assert!(sim.tick(tick as f64 * 0.1, &link).is_none());
        }
        assert_eq!(sim.targets().next().unwrap().distance, 50.0);
    }

    #[test]
    fn wave_spawns_at_max_distance_with_stagger() {
        let config = SimulationConfig {
            seed: 7,
            first_wave_delay_ms: 0,
            ..Default::default()
        };
        let mut sim = TargetSimulation::new(config);
        let link = LinkConfig::default();
        sim.tick(0.0, &link).unwrap();

        let count = sim.active_count();
        assert!((1..=MAX_TARGETS).contains(&count));
        for (index, target) in sim.targets().enumerate() {
            assert!(target.approaching);
            let spawned_at = link.max_distance as f32 + index as f32 * 10.0;
            let travelled = spawned_at - target.distance;
            assert!((travelled - target.speed * 0.1).abs() < 1e-3);
            let kmh = Kinematics::mps_to_kmh(target.speed);
            assert!(kmh >= 5.0 - 1e-3 && kmh < 85.0 + 1e-3);
        }
        assert!(sim.next_wave_time() >= 3.0 && sim.next_wave_time() < 10.0);
    }

    #[test]
    fn receding_filter_spawns_outbound_targets() {
        let config = SimulationConfig {
            seed: 3,
            first_wave_delay_ms: 0,
            ..Default::default()
        };
        let mut sim = TargetSimulation::new(config);
        let link = LinkConfig {
            direction_filter: DirectionFilter::Receding,
            ..Default::default()
        };
        let output = sim.tick(0.0, &link).unwrap();
        assert!(!output.alarm());
        assert!(sim.targets().all(|target| !target.approaching && target.distance > 2.0));
    }

    #[test]
    fn spawns_never_exceed_free_slots() {
        let mut sim = TargetSimulation::new(SimulationConfig {
            first_wave_delay_ms: 0,
            wave_interval_min_ms: 0,
            wave_interval_max_ms: 0,
            ..Default::default()
        });
        let link = LinkConfig::default();
        for tick in 0..50 {
            sim.tick(tick as f64 * 0.1, &link);
            assert!(sim.active_count() <= MAX_TARGETS);
        }
    }

    #[test]
    fn rescheduled_wave_fires_at_new_time() {
        let mut sim = TargetSimulation::new(quiet_config());
        let link = LinkConfig::default();
        sim.schedule_wave(0.5);
        sim.tick(0.4, &link);
        assert_eq!(sim.active_count(), 0);
        sim.tick(0.5, &link);
        assert!(sim.active_count() >= 1);
        assert!(sim.next_wave_time() >= 3.5);
    }

    #[test]
    fn long_range_spawns_survive_and_report() {
        let mut sim = TargetSimulation::new(SimulationConfig {
            seed: 5,
            first_wave_delay_ms: 0,
            max_spawn: MAX_TARGETS as u8,
            ..Default::default()
        });
        let link = LinkConfig {
            max_distance: 200,
            ..Default::default()
        };
        let output = sim.tick(0.0, &link).unwrap();
        assert!(sim.active_count() >= 1);
        assert_eq!(output.reports().len(), sim.active_count());
        assert!(output.reports().iter().all(|report| report.distance > 150.0));
    }

    #[test]
    fn far_exit_frees_slot() {
        let mut sim = TargetSimulation::new(quiet_config());
        sim.insert(Target::receding(149.5, 10.0));
        sim.tick(0.1, &LinkConfig::default());
        assert_eq!(sim.active_count(), 0);
        assert!(sim.insert(Target::approaching(10.0, 1.0)));
    }

    #[test]
    fn jitter_is_bounded_and_leaves_state_alone() {
        let mut sim = TargetSimulation::new(SimulationConfig {
            jitter_m: 0.5,
            seed: 11,
            ..quiet_config()
        });
        sim.insert(Target::approaching(60.0, 10.0));
        let link = LinkConfig::default();
        for tick in 1..=10 {
            let output = sim.tick(tick as f64 * 0.1, &link).unwrap();
            let stored = sim.targets().next().unwrap().distance;
            let reported = output.reports()[0].distance;
            assert!((reported - stored).abs() <= 0.5 + 1e-4);
            assert_eq!(stored, 60.0 - tick as f32);
        }
    }

    #[test]
    fn same_seed_same_traffic() {
        let config = SimulationConfig {
            seed: 99,
            profile: ProfileKind::BrakeAndVeer,
            jitter_m: 0.3,
            ..Default::default()
        };
        let link = LinkConfig::default();
        let mut a = TargetSimulation::new(config.clone());
        let mut b = TargetSimulation::new(config);
        for tick in 1..=300 {
            let now = tick as f64 * 0.1;
            let left = a.tick(now, &link).unwrap();
            let right = b.tick(now, &link).unwrap();
            assert_eq!(left.reports(), right.reports());
        }
    }
}
