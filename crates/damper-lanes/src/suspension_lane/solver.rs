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

use damper_core::debug::{DebugDrawBuffer, DebugDrawCategory, DebugDrawCommand};
use damper_core::math::{clamp, saturate, LinearRgba, RigidTransform};
use damper_core::physics::{BodyHandle, PhysicsQuery};
use damper_core::vehicle::{SuspensionConfig, SuspensionState};

const RAY_THICKNESS: f32 = 2.0;
const FORCE_THICKNESS: f32 = 2.5;
const FORCE_ARROW_SIZE: f32 = 20.0;
/// Length of the force arrow per unit of force.
const FORCE_ARROW_SCALE: f32 = 0.02;

/// Raycast spring-damper suspension.
///
/// The solver is stateless: everything that survives a step lives in the
/// caller's [`SuspensionState`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SuspensionSolver;

impl SuspensionSolver {
    /// Solves one wheel for one step and stores the result in `state`.
    ///
    /// Casts a ray from the attach point down the suspension axis for
    /// `travel + wheel_radius`, ignoring `chassis`. Without a hit the state is
    /// reset and no force is produced. With a hit, the spring and damper
    /// forces are combined, clamped to `[0, max_force]` and projected onto the
    /// contact normal.
    ///
    /// The ray line and the force arrow are both tagged
    /// [`DebugDrawCategory::Suspension`]. This departs from hosts that file
    /// the force arrow under `Engine`: there, an `Engine` filter shows the
    /// arrows; here, only a `Suspension` filter does.
    pub fn compute<Q: PhysicsQuery + ?Sized>(
        query: &Q,
        chassis: Option<BodyHandle>,
        chassis_world: &RigidTransform,
        config: &SuspensionConfig,
        state: &mut SuspensionState,
        debug: &mut DebugDrawBuffer,
        dt: f32,
    ) {
        let tuning = &config.tuning;
        let ray_length = tuning.ray_length();
        // Also rejects NaN.
        if !(ray_length > 0.0) {
            state.reset();
            return;
        }

        let attach_world = *chassis_world * config.attach_local;
        let origin = attach_world.translation;
        let up = attach_world.up().normalize();
        let down = -up;

        if DebugDrawBuffer::is_recording() {
            debug.push(DebugDrawCommand::line(
                origin,
                origin + down * ray_length,
                LinearRgba::MAGENTA,
                RAY_THICKNESS,
                DebugDrawCategory::Suspension,
            ));
        }

        let Some(hit) = query.cast_ray(origin, down, ray_length, chassis) else {
            state.reset();
            return;
        };

        let hit_distance = (hit.point - origin).dot(down);
        let compression = saturate(1.0 - hit_distance / ray_length);
        let velocity = if dt > 0.0 {
            (compression - state.previous_compression_ratio) / dt
        } else {
            0.0
        };

        let spring_force = compression * tuning.spring_stiffness;
        let damping_force = if velocity > 0.0 {
            velocity * tuning.bump_damping
        } else {
            velocity * tuning.rebound_damping
        };
        let total_force = clamp(spring_force + damping_force, 0.0, tuning.max_force.max(0.0));

        // Keep only the part of the axial force that pushes along the contact
        // normal.
        let axial = up * total_force;
        let normal = hit.normal.normalize();
        let force = normal * axial.dot(normal).max(0.0);

        *state = SuspensionState {
            in_contact: true,
            previous_compression_ratio: compression,
            spring_force,
            damping_force,
            total_force,
            force,
            force_point: origin,
        };

        if DebugDrawBuffer::is_recording() {
            debug.push(DebugDrawCommand::arrow(
                origin,
                origin + force * FORCE_ARROW_SCALE,
                FORCE_ARROW_SIZE,
                LinearRgba::EMERALD,
                FORCE_THICKNESS,
                DebugDrawCategory::Suspension,
            ));
        }
    }
}
