use std::sync::Arc;

use kart_locomotion::{InputLatch, LocomotionCore, LocomotionState, LogSink, Telemetry, TelemetrySink};
use rapier3d::prelude::{RigidBody, RigidBodyHandle, RigidBodySet};

use crate::{
    body::{apply_commands, body_snapshot},
    terrain::TerrainWorld,
};

/// One kart: its tuning, its memory, its input mailbox and its Rapier body.
pub struct Vehicle {
    core: Arc<LocomotionCore>,
    state: LocomotionState,
    input: Arc<InputLatch>,
    handle: RigidBodyHandle,
    telemetry: Box<dyn TelemetrySink + Send>,
}

impl Vehicle {
    /// Insert `body` into `bodies` and start the kart at rest at the body's pose.
    pub fn spawn(core: Arc<LocomotionCore>, bodies: &mut RigidBodySet, body: RigidBody) -> Self {
        let state = LocomotionState::at_rest(*body.translation(), *body.rotation());
        let handle = bodies.insert(body);

        Self {
            core,
            state,
            input: Arc::new(InputLatch::new()),
            handle,
            telemetry: Box::new(LogSink::new(format!("kart {handle:?}"))),
        }
    }

    pub fn handle(&self) -> RigidBodyHandle {
        self.handle
    }

    pub fn state(&self) -> &LocomotionState {
        &self.state
    }

    /// Replace where per-tick telemetry goes. Defaults to a `LogSink`.
    pub fn set_telemetry_sink(&mut self, sink: impl TelemetrySink + Send + 'static) {
        self.telemetry = Box::new(sink);
    }

    /// Shared handle to the input mailbox, for whatever samples the driver.
    pub fn input(&self) -> Arc<InputLatch> {
        Arc::clone(&self.input)
    }

    /// Run one fixed tick: read the body, tick the core with the latest input,
    /// apply the commands, record telemetry. Returns `None` if the body is no longer in `bodies`.
    pub fn step(
        &mut self,
        bodies: &mut RigidBodySet,
        terrain: &TerrainWorld,
        dt: f32,
    ) -> Option<Telemetry> {
        let Some(body) = bodies.get_mut(self.handle) else {
            log::error!("vehicle body {:?} is missing", self.handle);
            return None;
        };

        let out = self.core.tick(
            &self.state,
            &body_snapshot(body),
            self.input.latest(),
            terrain,
            dt,
        );
        apply_commands(body, &out.commands);
        self.telemetry.record(&out.telemetry);
        self.state = out.state;

        Some(out.telemetry)
    }
}
