// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Suspension Lane
//!
//! Per-wheel spring-damper solve and the per-vehicle job that runs it for all
//! four corners.

mod solver;

pub use solver::SuspensionSolver;

use damper_core::exchange::VehicleOutput;
use damper_core::physics::{BodyHandle, PhysicsQuery};
use damper_core::vehicle::{PerWheel, SuspensionState, VehicleConfig, WheelPosition, WheelSample};

/// One vehicle's worth of work for a worker step.
///
/// A job borrows its own configuration and state and owns its own output
/// slot, so jobs can run concurrently without sharing anything mutable.
#[derive(Debug)]
pub struct SuspensionJob<'a> {
    /// Position of the vehicle in the snapshot.
    pub slot: usize,
    /// Resolved chassis body.
    pub handle: BodyHandle,
    /// Snapshot configuration.
    pub config: &'a VehicleConfig,
    /// Persistent per-wheel state.
    pub states: &'a mut PerWheel<SuspensionState>,
    /// Result of the job.
    pub output: VehicleOutput,
}

impl<'a> SuspensionJob<'a> {
    /// Creates a job with a not-yet-stepped output.
    pub fn new(
        slot: usize,
        handle: BodyHandle,
        config: &'a VehicleConfig,
        states: &'a mut PerWheel<SuspensionState>,
    ) -> Self {
        Self {
            slot,
            handle,
            config,
            states,
            output: VehicleOutput::skipped(config.id),
        }
    }

    /// Reads the chassis pose and solves the four wheels.
    ///
    /// If the chassis has no transform any more the job is left unstepped and
    /// the state is untouched.
    pub fn run<Q: PhysicsQuery + ?Sized>(&mut self, query: &Q, dt: f32) {
        let Some(chassis_world) = query.body_transform(self.handle) else {
            log::debug!("Vehicle {}: chassis transform unavailable.", self.config.id);
            return;
        };

        for wheel in WheelPosition::ALL {
            let state = &mut self.states[wheel];
            SuspensionSolver::compute(
                query,
                Some(self.handle),
                &chassis_world,
                self.config.suspension(wheel),
                state,
                &mut self.output.debug,
                dt,
            );
            self.output.wheels[wheel] = WheelSample::from(&*state);
        }
        self.output.stepped = true;
    }
}
