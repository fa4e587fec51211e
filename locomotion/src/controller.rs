/*!
Per-tick orchestration.

One `LocomotionCore::tick` per fixed physics step. The tick is a pure function
of `(state, body snapshot, input, terrain, dt)`: it never touches a live rigid
body. It returns the next `LocomotionState` and a list of `BodyCommand`s for
the physics integrator to apply.

Order within a tick (each step feeds the next):
1. sample the ground under the body;
2. ease roll/pitch toward level, so later directions use the corrected frame;
3. hover spring-damper force, then downforce;
4. ground/air damping;
5. slope classification and slide force;
6. integrate speed;
7. pick the move direction (slope-projected or forward);
8. translation command;
9. yaw from steering, then the final rotation command.
*/

use crate::{
    config::{Config, ConfigError, DriveMode},
    constants::FORWARD,
    ground::{GroundSensor, TerrainProbe},
    input::InputFrame,
    orientation,
    slope::SlopeReading,
    speed, suspension,
    telemetry::Telemetry,
    turn,
    types::{BodySnapshot, GroundSample, LocomotionState, Quat, Vec3},
    utils::yaw_rotation,
};

/// A request for the physics integrator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BodyCommand {
    /// Continuous force at the center of mass for this tick (N).
    ApplyForce(Vec3),
    /// Translate the body by this delta (m).
    MovePosition(Vec3),
    /// Replace the body's linear velocity (m/s).
    SetLinearVelocity(Vec3),
    /// Replace the body's orientation.
    SetRotation(Quat),
    SetDamping { linear: f32, angular: f32 },
}

/// Everything one tick produced.
#[derive(Clone, Debug, PartialEq)]
pub struct TickOutput {
    pub state: LocomotionState,
    pub commands: Vec<BodyCommand>,
    pub ground: GroundSample,
    pub telemetry: Telemetry,
}

impl TickOutput {
    /// Sum of all forces requested this tick.
    pub fn total_force(&self) -> Vec3 {
        self.commands
            .iter()
            .filter_map(|c| match c {
                BodyCommand::ApplyForce(f) => Some(*f),
                _ => None,
            })
            .sum()
    }
}

/// The hover-kart locomotion controller for one vehicle tuning.
///
/// Holds only immutable configuration, so one core can drive any number of
/// vehicles, from any number of threads. Each vehicle's `LocomotionState` must
/// be ticked sequentially.
#[derive(Clone, Debug)]
pub struct LocomotionCore {
    config: Config,
    sensor: GroundSensor,
}

impl LocomotionCore {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let sensor = GroundSensor::from_config(&config)?;

        log::info!(
            "locomotion core ready: max_speed={} hover_height={} probes={} features={:?} drive={:?}",
            config.max_speed,
            config.hover_height,
            config.probe_offsets.len() + 1,
            config.features,
            config.drive_mode,
        );
        Ok(Self { config, sensor })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sensor(&self) -> &GroundSensor {
        &self.sensor
    }

    /// Run one fixed-timestep update.
    pub fn tick(
        &self,
        state: &LocomotionState,
        body: &BodySnapshot,
        input: InputFrame,
        terrain: &impl TerrainProbe,
        dt: f32,
    ) -> TickOutput {
        let config = &self.config;
        let features = config.features;
        let input = input.sanitized();
        let body = sanitize_body(body, state);
        let mut commands = Vec::with_capacity(6);

        // 1) Ground.
        let ground = self.sensor.sample(terrain, body.position, body.orientation);
        let damping = BodyCommand::SetDamping {
            linear: if ground.grounded {
                config.ground_linear_damping
            } else {
                config.air_linear_damping
            },
            angular: config.angular_damping,
        };

        if !(dt.is_finite() && dt > 0.0) {
            if dt != 0.0 {
                log::warn!("skipping locomotion for invalid dt {dt}");
            }
            commands.push(damping);
            let held = LocomotionState {
                position: body.position,
                orientation: body.orientation,
                ..*state
            }
            .with_speed(state.current_speed, config.max_speed);
            return TickOutput {
                telemetry: self.telemetry(&ground, &input, held.current_speed, 0.0, 0.0, false),
                state: held,
                commands,
                ground,
            };
        }

        // 2) Upright correction.
        let mut orientation = body.orientation;
        if features.upright {
            orientation = orientation::correct(orientation, dt, config.upright_rate);
        }

        // 3) Hover and downforce.
        if features.hover {
            let force = suspension::hover_force(&ground, body.vertical_velocity(), config);
            if force != Vec3::zeros() {
                commands.push(BodyCommand::ApplyForce(force));
            }
        }
        if features.downforce {
            let force = suspension::downforce(&ground, &orientation, body.speed(), config);
            if force != Vec3::zeros() {
                commands.push(BodyCommand::ApplyForce(force));
            }
        }

        // 4) Damping.
        commands.push(damping);

        // 5) Slope.
        let slope = if features.slope_handling {
            SlopeReading::classify(&ground, config)
        } else {
            SlopeReading::ignored(&ground)
        };
        if let Some(force) = slope.slide_force() {
            commands.push(BodyCommand::ApplyForce(force));
        }

        // 6) Speed.
        let current_speed = speed::step(&input, state.current_speed, config, dt);

        // 7) Direction.
        let forward = orientation * FORWARD;
        let move_direction = slope.move_direction(forward);

        // 8) Translation.
        let displacement = move_direction * (current_speed * dt);
        match config.drive_mode {
            DriveMode::Kinematic => commands.push(BodyCommand::MovePosition(displacement)),
            DriveMode::Velocity => {
                let mut target = move_direction * current_speed;
                if !slope.on_traversable_slope() {
                    target.y = body.linear_velocity.y;
                }
                let velocity = body.linear_velocity.lerp(&target, config.grip);
                commands.push(BodyCommand::SetLinearVelocity(velocity));
            }
        }

        // 9) Yaw.
        let yaw_delta_deg = turn::yaw_delta(input.steer, current_speed, config, dt);
        if yaw_delta_deg != 0.0 {
            orientation = yaw_rotation(yaw_delta_deg.to_radians()) * orientation;
        }
        if orientation != body.orientation {
            commands.push(BodyCommand::SetRotation(orientation));
        }

        let telemetry = self.telemetry(
            &ground,
            &input,
            current_speed,
            slope.angle_deg,
            yaw_delta_deg,
            slope.on_traversable_slope(),
        );

        TickOutput {
            state: LocomotionState {
                current_speed,
                position: body.position + displacement,
                orientation,
            },
            commands,
            ground,
            telemetry,
        }
    }

    fn telemetry(
        &self,
        ground: &GroundSample,
        input: &InputFrame,
        speed: f32,
        slope_angle_deg: f32,
        yaw_delta_deg: f32,
        on_traversable_slope: bool,
    ) -> Telemetry {
        Telemetry {
            speed,
            max_speed: self.config.max_speed,
            grounded: ground.grounded,
            ground_ratio: ground.ground_ratio,
            braking: input.brake,
            slope_angle_deg,
            on_traversable_slope,
            yaw_delta_deg,
        }
    }
}

/// Replace non-finite body readings with the state's own pose and zero velocity.
fn sanitize_body(body: &BodySnapshot, state: &LocomotionState) -> BodySnapshot {
    let finite = |v: &Vec3| v.iter().all(|x| x.is_finite());

    let position = if finite(&body.position) {
        body.position
    } else {
        log::warn!("body position is not finite; using last proposed position");
        state.position
    };
    let orientation = if body.orientation.coords.iter().all(|x| x.is_finite()) {
        body.orientation
    } else {
        log::warn!("body orientation is not finite; using last proposed orientation");
        state.orientation
    };
    let linear_velocity = body.linear_velocity.map(|x| if x.is_finite() { x } else { 0.0 });

    BodySnapshot {
        position,
        orientation,
        linear_velocity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Features,
        curve::TurnResponseCurve,
        ground::tests::{NoTerrain, PlaneProbe},
        utils::yaw_of,
    };
    use nalgebra as na;

    const DT: f32 = 0.1;

    fn config() -> Config {
        Config {
            max_speed: 40.0,
            acceleration: 8.0,
            deceleration: 10.0,
            brake_force: 20.0,
            base_turn_speed: 100.0,
            min_turn_speed: 40.0,
            turn_response_curve: TurnResponseCurve::linear(1.0, 0.4),
            ground_check_distance: 2.0,
            hover_height: 1.0,
            hover_force_gain: 50.0,
            hover_damping: 10.0,
            ..Config::default()
        }
    }

    fn body_at(state: &LocomotionState) -> BodySnapshot {
        BodySnapshot::kinematic(state)
    }

    fn hovering() -> LocomotionState {
        LocomotionState::at_rest(Vec3::new(0.0, 1.0, 0.0), Quat::identity())
    }

    fn forces(out: &TickOutput) -> Vec<Vec3> {
        out.commands
            .iter()
            .filter_map(|c| match c {
                BodyCommand::ApplyForce(f) => Some(*f),
                _ => None,
            })
            .collect()
    }

    fn displacement(out: &TickOutput) -> Option<Vec3> {
        out.commands.iter().find_map(|c| match c {
            BodyCommand::MovePosition(d) => Some(*d),
            _ => None,
        })
    }

    #[test]
    fn rejects_invalid_config() {
        let bad = Config {
            ground_check_distance: 0.5,
            hover_height: 1.0,
            ..config()
        };
        assert!(matches!(
            LocomotionCore::new(bad),
            Err(ConfigError::GroundCheckTooShort { .. })
        ));
    }

    #[test]
    fn five_ticks_of_full_throttle_reach_four_mps() {
        let core = LocomotionCore::new(config()).unwrap();
        let ground = PlaneProbe::flat(0.0);
        let mut state = hovering();
        let mut travelled = 0.0;

        for _ in 0..5 {
            let out = core.tick(&state, &body_at(&state), InputFrame::new(1.0, 0.0, false), &ground, DT);
            travelled += displacement(&out).unwrap().z;
            state = out.state;
        }

        assert!((state.current_speed - 4.0).abs() < 1.0e-4);
        // 0.08 + 0.16 + 0.24 + 0.32 + 0.40
        assert!((travelled - 1.2).abs() < 1.0e-4);
        assert!((state.position.z - 1.2).abs() < 1.0e-4);
        assert_eq!(state.orientation, Quat::identity());
    }

    #[test]
    fn coasting_and_braking_scenarios() {
        let core = LocomotionCore::new(config()).unwrap();
        let ground = PlaneProbe::flat(0.0);

        let top = hovering().with_speed(40.0, 40.0);
        let out = core.tick(&top, &body_at(&top), InputFrame::default(), &ground, DT);
        assert!((out.state.current_speed - 39.0).abs() < 1.0e-4);

        let mut state = hovering().with_speed(5.0, 40.0);
        let brake = InputFrame::new(0.0, 0.0, true);
        let mut speeds = Vec::new();
        for _ in 0..3 {
            state = core.tick(&state, &body_at(&state), brake, &ground, DT).state;
            speeds.push(state.current_speed);
        }
        assert!((speeds[0] - 3.0).abs() < 1.0e-4);
        assert_eq!(speeds[2], 0.0);
        assert!(speeds.iter().all(|s| *s >= 0.0));
    }

    #[test]
    fn steering_at_half_speed_turns_four_point_nine_degrees() {
        let core = LocomotionCore::new(config()).unwrap();
        let ground = PlaneProbe::flat(0.0);
        // One coasting step brings 21 down to exactly 20 before steering is evaluated.
        let state = hovering().with_speed(21.0, 40.0);

        let out = core.tick(&state, &body_at(&state), InputFrame::new(0.0, 1.0, false), &ground, DT);
        assert!((out.state.current_speed - 20.0).abs() < 1.0e-4);
        assert!((out.telemetry.yaw_delta_deg - 4.9).abs() < 1.0e-3);
        assert!((yaw_of(&out.state.orientation).to_degrees() - 4.9).abs() < 1.0e-3);
        assert!(
            out.commands
                .iter()
                .any(|c| matches!(c, BodyCommand::SetRotation(_)))
        );
    }

    #[test]
    fn stationary_kart_does_not_spin() {
        let core = LocomotionCore::new(config()).unwrap();
        let state = hovering();
        let out = core.tick(&state, &body_at(&state), InputFrame::new(0.0, 1.0, false), &PlaneProbe::flat(0.0), DT);

        assert_eq!(out.telemetry.yaw_delta_deg, 0.0);
        assert_eq!(out.state.orientation, Quat::identity());
        assert!(
            !out.commands
                .iter()
                .any(|c| matches!(c, BodyCommand::SetRotation(_)))
        );
    }

    #[test]
    fn hover_force_holds_ride_height() {
        let core = LocomotionCore::new(config()).unwrap();
        let ground = PlaneProbe::flat(0.0);

        let low = LocomotionState::at_rest(Vec3::new(0.0, 0.5, 0.0), Quat::identity());
        let out = core.tick(&low, &body_at(&low), InputFrame::default(), &ground, DT);
        assert_eq!(forces(&out), vec![Vec3::new(0.0, 25.0, 0.0)]);

        // At ride height and at rest: no force at all.
        let level = hovering();
        let out = core.tick(&level, &body_at(&level), InputFrame::default(), &ground, DT);
        assert!(forces(&out).is_empty());

        // Falling through the ride height is damped.
        let falling = BodySnapshot {
            linear_velocity: Vec3::new(0.0, -2.0, 0.0),
            ..body_at(&level)
        };
        let out = core.tick(&level, &falling, InputFrame::default(), &ground, DT);
        assert_eq!(forces(&out), vec![Vec3::new(0.0, 20.0, 0.0)]);
    }

    #[test]
    fn airborne_gets_air_damping_and_no_hover() {
        let config = Config {
            ground_linear_damping: 3.0,
            air_linear_damping: 0.1,
            angular_damping: 0.5,
            ..config()
        };
        let core = LocomotionCore::new(config).unwrap();
        let state = LocomotionState::at_rest(Vec3::new(0.0, 10.0, 0.0), Quat::identity());

        let out = core.tick(&state, &body_at(&state), InputFrame::default(), &NoTerrain, DT);
        assert!(!out.ground.grounded);
        assert!(forces(&out).is_empty());
        assert!(out.commands.contains(&BodyCommand::SetDamping {
            linear: 0.1,
            angular: 0.5
        }));

        let out = core.tick(&hovering(), &body_at(&hovering()), InputFrame::default(), &PlaneProbe::flat(0.0), DT);
        assert!(out.commands.contains(&BodyCommand::SetDamping {
            linear: 3.0,
            angular: 0.5
        }));
    }

    #[test]
    fn gentle_slope_hugs_the_surface() {
        let core = LocomotionCore::new(config()).unwrap();
        let slope = PlaneProbe::tilted(20.0);
        let state = LocomotionState::at_rest(Vec3::new(0.0, 1.0, 0.0), Quat::identity()).with_speed(10.0, 40.0);

        let out = core.tick(&state, &body_at(&state), InputFrame::new(1.0, 0.0, false), &slope, DT);
        let d = displacement(&out).unwrap();
        assert!(out.telemetry.on_traversable_slope);
        assert!(d.normalize().dot(&slope.normal).abs() < 1.0e-4);
        assert!(out.commands.iter().all(|c| !matches!(c, BodyCommand::ApplyForce(f) if f.y < 0.0)));
    }

    #[test]
    fn steep_slope_pushes_the_kart_off() {
        let core = LocomotionCore::new(config()).unwrap();
        let cliff = PlaneProbe::tilted(60.0);
        let state = hovering();

        let out = core.tick(&state, &body_at(&state), InputFrame::default(), &cliff, DT);
        assert!(!out.telemetry.on_traversable_slope);
        let n = cliff.normal;
        let slide = Vec3::new(n.x, -n.y, n.z) * config().slope_slide_force;
        assert!(forces(&out).iter().any(|f| (f - slide).norm() < 1.0e-4));
    }

    #[test]
    fn disabled_features_emit_nothing_extra() {
        let config = Config {
            features: Features {
                hover: false,
                slope_handling: false,
                upright: false,
                downforce: false,
            },
            ..config()
        };
        let core = LocomotionCore::new(config).unwrap();
        let tilted = Quat::from_axis_angle(&na::Vector3::z_axis(), 0.3);
        let state = LocomotionState::at_rest(Vec3::new(0.0, 0.2, 0.0), tilted);

        let out = core.tick(&state, &body_at(&state), InputFrame::default(), &PlaneProbe::tilted(70.0), DT);
        assert!(forces(&out).is_empty());
        assert_eq!(out.state.orientation, tilted);
    }

    #[test]
    fn upright_correction_runs_while_airborne() {
        let core = LocomotionCore::new(config()).unwrap();
        let tumbling = Quat::from_axis_angle(&na::Vector3::z_axis(), 1.0);
        let state = LocomotionState::at_rest(Vec3::new(0.0, 50.0, 0.0), tumbling);

        let out = core.tick(&state, &body_at(&state), InputFrame::default(), &NoTerrain, DT);
        let level = Quat::identity();
        assert!(out.state.orientation.angle_to(&level) < tumbling.angle_to(&level));
    }

    #[test]
    fn downforce_presses_moving_kart_down() {
        let config = Config {
            downforce: 10.0,
            features: Features {
                hover: false,
                downforce: true,
                ..Features::default()
            },
            ..config()
        };
        let core = LocomotionCore::new(config).unwrap();
        let state = hovering();
        let body = BodySnapshot {
            linear_velocity: Vec3::new(0.0, 0.0, 3.0),
            ..body_at(&state)
        };

        let out = core.tick(&state, &body, InputFrame::default(), &PlaneProbe::flat(0.0), DT);
        assert_eq!(forces(&out), vec![Vec3::new(0.0, -30.0, 0.0)]);
        assert_eq!(out.total_force(), Vec3::new(0.0, -30.0, 0.0));
    }

    #[test]
    fn velocity_mode_blends_by_grip_and_keeps_vertical_velocity() {
        let config = Config {
            drive_mode: DriveMode::Velocity,
            grip: 0.5,
            ..config()
        };
        let core = LocomotionCore::new(config).unwrap();
        let state = hovering().with_speed(10.0, 40.0);
        let body = BodySnapshot {
            linear_velocity: Vec3::new(4.0, -1.0, 0.0),
            ..body_at(&state)
        };

        let out = core.tick(&state, &body, InputFrame::default(), &PlaneProbe::flat(0.0), DT);
        // Coasting: 10 → 9; target (0, -1, 9); halfway from (4, -1, 0).
        let velocity = out
            .commands
            .iter()
            .find_map(|c| match c {
                BodyCommand::SetLinearVelocity(v) => Some(*v),
                _ => None,
            })
            .unwrap();
        assert!((velocity - Vec3::new(2.0, -1.0, 4.5)).norm() < 1.0e-4);
        assert!(displacement(&out).is_none());
        assert!((out.state.position.z - 0.9).abs() < 1.0e-4);
    }

    #[test]
    fn degenerate_input_never_reaches_state() {
        let core = LocomotionCore::new(config()).unwrap();
        let ground = PlaneProbe::flat(0.0);
        let state = hovering().with_speed(10.0, 40.0);

        let out = core.tick(&state, &body_at(&state), InputFrame::new(f32::NAN, f32::INFINITY, false), &ground, DT);
        assert!(out.state.current_speed.is_finite());
        assert!(out.state.position.iter().all(|v| v.is_finite()));
        assert!(out.state.orientation.coords.iter().all(|v| v.is_finite()));
        // NaN throttle reads as zero: a coasting tick. Infinite steer clamps to full right.
        assert!((out.state.current_speed - 9.0).abs() < 1.0e-4);
        assert!(out.telemetry.yaw_delta_deg > 0.0);

        let corrupt_body = BodySnapshot {
            position: Vec3::new(f32::NAN, 0.0, 0.0),
            linear_velocity: Vec3::new(0.0, f32::NAN, 0.0),
            ..body_at(&state)
        };
        let out = core.tick(&state, &corrupt_body, InputFrame::default(), &ground, DT);
        assert!(out.state.position.iter().all(|v| v.is_finite()));
        assert!(out.total_force().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn invalid_dt_only_sets_damping() {
        let core = LocomotionCore::new(config()).unwrap();
        let state = hovering().with_speed(12.0, 40.0);

        for dt in [0.0, -0.1, f32::NAN] {
            let out = core.tick(&state, &body_at(&state), InputFrame::new(1.0, 1.0, false), &PlaneProbe::flat(0.0), dt);
            assert_eq!(out.state, state);
            assert_eq!(out.commands.len(), 1);
            assert!(matches!(out.commands[0], BodyCommand::SetDamping { .. }));
        }
    }

    #[test]
    fn skipped_tick_reports_the_clamped_speed() {
        let core = LocomotionCore::new(config()).unwrap();
        let state = LocomotionState {
            current_speed: 55.0,
            ..hovering()
        };

        let out = core.tick(&state, &body_at(&state), InputFrame::default(), &PlaneProbe::flat(0.0), 0.0);
        assert_eq!(out.state.current_speed, 40.0);
        assert_eq!(out.telemetry.speed, out.state.current_speed);
    }

    #[test]
    fn speed_clamp_holds_over_long_mixed_runs() {
        let core = LocomotionCore::new(config()).unwrap();
        let ground = PlaneProbe::flat(0.0);
        let mut state = hovering();
        for i in 0..1_000 {
            let input = match (i / 120) % 4 {
                0 => InputFrame::new(1.0, 0.5, false),
                1 => InputFrame::new(-1.0, -0.5, false),
                2 => InputFrame::new(0.0, 1.0, true),
                _ => InputFrame::default(),
            };
            state = core.tick(&state, &body_at(&state), input, &ground, DT).state;
            assert!((-20.0..=40.0).contains(&state.current_speed));
        }
    }

    #[test]
    fn vehicles_tick_independently_in_parallel() {
        let core = LocomotionCore::new(config()).unwrap();
        let ground = PlaneProbe::flat(0.0);

        let finals: Vec<f32> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|i| {
                    let core = &core;
                    let ground = &ground;
                    scope.spawn(move || {
                        let throttle = InputFrame::new(0.25 * (i + 1) as f32, 0.0, false);
                        let mut state = hovering();
                        for _ in 0..10 {
                            state = core.tick(&state, &body_at(&state), throttle, ground, DT).state;
                        }
                        state.current_speed
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        // 0.25 throttle: 10 * 0.25 * 8 * 0.1 = 2; then 4, 6, 8.
        for (i, speed) in finals.iter().enumerate() {
            assert!((speed - 2.0 * (i + 1) as f32).abs() < 1.0e-3, "vehicle {i}: {speed}");
        }
    }
}
