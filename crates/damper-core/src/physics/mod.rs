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

//! # Physics Abstractions
//!
//! The narrow contract through which the suspension pipeline talks to a rigid
//! body solver. The pipeline never integrates bodies itself: it casts rays,
//! reads chassis poses and pushes forces.

use serde::{Deserialize, Serialize};

use crate::math::{RigidTransform, Vec3};

/// Stable, solver-wide identity of a rigid body.
///
/// Unlike a [`BodyHandle`], an index survives being copied across contexts:
/// the coordinator reads it from gameplay state, the worker resolves it back to
/// a handle. A body that is recreated gets a new index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyIndex(pub u64);

/// Resolved reference to a live body inside the solver.
///
/// Only meaningful on the worker side, for as long as the body with
/// [`BodyHandle::index`] exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    /// Storage slot of the body inside the solver.
    pub slot: u32,
    /// The stable index the body was created with.
    pub index: BodyIndex,
}

impl BodyHandle {
    /// Creates a new handle.
    pub fn new(slot: u32, index: BodyIndex) -> Self {
        Self { slot, index }
    }
}

/// Result of a successful ray cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// World-space impact point.
    pub point: Vec3,
    /// World-space surface normal at the impact point (unit length).
    pub normal: Vec3,
    /// Distance from the ray origin to the impact point.
    pub distance: f32,
}

/// Read-only queries against the physics scene.
///
/// Implementations must be shareable across worker threads: the per-vehicle
/// fan-out calls [`cast_ray`](PhysicsQuery::cast_ray) concurrently.
pub trait PhysicsQuery: Send + Sync {
    /// Casts a ray from `origin` along `direction` (unit length) up to
    /// `max_distance`, ignoring every collider of the `ignore` body.
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        ignore: Option<BodyHandle>,
    ) -> Option<RaycastHit>;

    /// Snapshot of every live body handle in the scene.
    fn live_bodies(&self) -> Vec<BodyHandle>;

    /// Resolves a stable body index into a live handle.
    ///
    /// The provided implementation scans [`live_bodies`](PhysicsQuery::live_bodies)
    /// and returns the first match, so it costs O(n) in the number of bodies.
    fn resolve_body_handle(&self, index: BodyIndex) -> Option<BodyHandle> {
        self.live_bodies().into_iter().find(|h| h.index == index)
    }

    /// World transform of the body's reference frame.
    fn body_transform(&self, handle: BodyHandle) -> Option<RigidTransform>;

    /// World-space center of mass of the body.
    fn center_of_mass(&self, handle: BodyHandle) -> Option<Vec3>;
}

/// A physics scene that also accepts forces.
pub trait PhysicsScene: PhysicsQuery {
    /// Adds `force` (world space) at world `point` for the current step.
    ///
    /// Implementations derive the torque about the body's center of mass,
    /// see [`torque_about`].
    fn apply_force_at_point(&mut self, handle: BodyHandle, point: Vec3, force: Vec3);
}

/// Torque produced by `force` applied at `point` about `center_of_mass`.
#[inline]
pub fn torque_about(center_of_mass: Vec3, point: Vec3, force: Vec3) -> Vec3 {
    (point - center_of_mass).cross(force)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TwoBodies;

    impl PhysicsQuery for TwoBodies {
        fn cast_ray(&self, _: Vec3, _: Vec3, _: f32, _: Option<BodyHandle>) -> Option<RaycastHit> {
            None
        }

        fn live_bodies(&self) -> Vec<BodyHandle> {
            vec![
                BodyHandle::new(0, BodyIndex(7)),
                BodyHandle::new(1, BodyIndex(9)),
            ]
        }

        fn body_transform(&self, _: BodyHandle) -> Option<RigidTransform> {
            None
        }

        fn center_of_mass(&self, _: BodyHandle) -> Option<Vec3> {
            None
        }
    }

    #[test]
    fn default_resolution_scans_live_bodies() {
        let scene = TwoBodies;
        assert_eq!(
            scene.resolve_body_handle(BodyIndex(9)),
            Some(BodyHandle::new(1, BodyIndex(9)))
        );
        assert_eq!(scene.resolve_body_handle(BodyIndex(3)), None);
    }

    #[test]
    fn off_center_force_produces_torque() {
        let torque = torque_about(Vec3::ZERO, Vec3::X, Vec3::Y);
        assert_eq!(torque, Vec3::Z);
        assert_eq!(torque_about(Vec3::X, Vec3::X, Vec3::Y), Vec3::ZERO);
    }
}
