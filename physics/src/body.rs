use kart_locomotion::{BodyCommand, BodySnapshot};
use rapier3d::prelude::RigidBody;

/// Read the pose and velocity the core needs from a Rapier body.
pub fn body_snapshot(body: &RigidBody) -> BodySnapshot {
    BodySnapshot {
        position: *body.translation(),
        orientation: *body.rotation(),
        linear_velocity: *body.linvel(),
    }
}

/// Carry out one tick's commands on `body`.
///
/// User forces are cleared first: the core's forces are valid for a single tick
/// and Rapier otherwise keeps applying them. Kinematic bodies are driven through
/// their next-pose setters; dynamic bodies are moved directly.
pub fn apply_commands(body: &mut RigidBody, commands: &[BodyCommand]) {
    body.reset_forces(true);

    for command in commands {
        match *command {
            BodyCommand::ApplyForce(force) => body.add_force(force, true),
            BodyCommand::MovePosition(delta) => {
                let next = body.translation() + delta;
                if body.is_kinematic() {
                    body.set_next_kinematic_translation(next);
                } else {
                    body.set_translation(next, true);
                }
            }
            BodyCommand::SetLinearVelocity(velocity) => body.set_linvel(velocity, true),
            BodyCommand::SetRotation(rotation) => {
                if body.is_kinematic() {
                    body.set_next_kinematic_rotation(rotation);
                } else {
                    body.set_rotation(rotation, true);
                }
            }
            BodyCommand::SetDamping { linear, angular } => {
                body.set_linear_damping(linear);
                body.set_angular_damping(angular);
            }
        }
    }
}
