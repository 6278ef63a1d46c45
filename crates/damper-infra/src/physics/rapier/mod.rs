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

//! Rapier implementation of the suspension pipeline's physics scene.
//!
//! Chassis are dynamic bodies carrying one box collider. The ground is a
//! standalone fixed collider whose top face sits at the configured height.
//! Every body is tagged with a fresh [`BodyIndex`] stored in its user data,
//! so a handle whose slot was recycled no longer resolves.

mod conversions;

use std::sync::atomic::{AtomicUsize, Ordering};

use damper_core::math::{RigidTransform, Vec3};
use damper_core::physics::{BodyHandle, BodyIndex, PhysicsQuery, PhysicsScene, RaycastHit};
use rapier3d::prelude::*;

use conversions::{from_rapier_pose, from_rapier_vec, to_rapier_pose, to_rapier_vec};

/// Default gravity, in centimetres per second squared along -Y.
const DEFAULT_GRAVITY: Vec3 = Vec3::new(0.0, -980.0, 0.0);
/// Scenes are authored in centimetres.
const LENGTH_UNIT: f32 = 100.0;
const GROUND_HALF_SIZE: f32 = 100_000.0;
const GROUND_HALF_THICKNESS: f32 = 100.0;

/// Creation parameters of a chassis body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    /// Initial world transform.
    pub transform: RigidTransform,
    /// Mass; zero or less makes the body fixed.
    pub mass: f32,
    /// Half extents of the box collider centered on the body origin.
    pub half_extents: Vec3,
}

impl BodyDesc {
    /// A box body of the given mass.
    pub fn new(transform: RigidTransform, mass: f32, half_extents: Vec3) -> Self {
        Self {
            transform,
            mass,
            half_extents,
        }
    }
}

/// A rapier world with a flat ground, implementing [`PhysicsScene`].
pub struct RapierScene {
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    gravity: Vector,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    next_index: u64,
    resolve_calls: AtomicUsize,
}

impl RapierScene {
    /// Creates an empty scene whose ground top face is at `ground_height`.
    pub fn new(ground_height: f32) -> Self {
        let mut scene = Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: to_rapier_vec(DEFAULT_GRAVITY),
            integration_parameters: IntegrationParameters {
                length_unit: LENGTH_UNIT,
                ..IntegrationParameters::default()
            },
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            next_index: 1,
            resolve_calls: AtomicUsize::new(0),
        };
        let ground = ColliderBuilder::cuboid(GROUND_HALF_SIZE, GROUND_HALF_THICKNESS, GROUND_HALF_SIZE)
            .translation(Vector::new(0.0, ground_height - GROUND_HALF_THICKNESS, 0.0))
            .build();
        let handle = scene.collider_set.insert(ground);
        scene.register_collider(handle);
        scene
    }

    /// Replaces the gravity vector.
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = to_rapier_vec(gravity);
        self
    }

    /// Adds a chassis body and returns its handle.
    pub fn add_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let index = BodyIndex(self.next_index);
        self.next_index += 1;

        let builder = if desc.mass > 0.0 {
            RigidBodyBuilder::dynamic()
        } else {
            RigidBodyBuilder::fixed()
        };
        let rigid_body = builder
            .position(to_rapier_pose(desc.transform))
            .user_data(u128::from(index.0))
            .build();
        let rb_handle = self.rigid_body_set.insert(rigid_body);

        let mut collider = ColliderBuilder::cuboid(desc.half_extents.x, desc.half_extents.y, desc.half_extents.z);
        if desc.mass > 0.0 {
            collider = collider.mass(desc.mass);
        }
        let co_handle = self
            .collider_set
            .insert_with_parent(collider.build(), rb_handle, &mut self.rigid_body_set);
        self.register_collider(co_handle);

        let slot = rb_handle.into_raw_parts().0;
        log::debug!("Added body {index:?} in slot {slot}.");
        BodyHandle::new(slot, index)
    }

    /// Removes a body and its collider. Returns `false` if the handle was stale.
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        let Some(rb_handle) = self.rapier_handle(handle) else {
            return false;
        };
        self.rigid_body_set.remove(
            rb_handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
        log::debug!("Removed body {:?}.", handle.index);
        true
    }

    /// Linear velocity of a body.
    pub fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.body(handle).map(|rb| from_rapier_vec(rb.linvel()))
    }

    /// Angular velocity of a body.
    pub fn angular_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.body(handle).map(|rb| from_rapier_vec(rb.angvel()))
    }

    /// Force added since the last [`step`](Self::step).
    pub fn accumulated_force(&self, handle: BodyHandle) -> Option<Vec3> {
        self.body(handle).map(|rb| from_rapier_vec(rb.user_force()))
    }

    /// Torque added since the last [`step`](Self::step).
    pub fn accumulated_torque(&self, handle: BodyHandle) -> Option<Vec3> {
        self.body(handle).map(|rb| from_rapier_vec(rb.user_torque()))
    }

    /// Number of live bodies, the ground excluded.
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    /// How many times a body index was resolved into a handle.
    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::Relaxed)
    }

    /// Advances the simulation by `dt`, then clears the forces added
    /// through [`PhysicsScene::apply_force_at_point`].
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            &(),
            &(),
        );
        for (_, rb) in self.rigid_body_set.iter_mut() {
            rb.reset_forces(false);
            rb.reset_torques(false);
        }
    }

    /// Makes a freshly inserted collider visible to ray casts before the
    /// next step refreshes the broad phase.
    fn register_collider(&mut self, handle: ColliderHandle) {
        if let Some(collider) = self.collider_set.get(handle) {
            let aabb = collider.compute_aabb();
            self.broad_phase.set_aabb(&self.integration_parameters, handle, aabb);
        }
    }

    fn rapier_handle(&self, handle: BodyHandle) -> Option<RigidBodyHandle> {
        let (rb, rb_handle) = self.rigid_body_set.get_unknown_gen(handle.slot)?;
        (rb.user_data == u128::from(handle.index.0)).then_some(rb_handle)
    }

    fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.rapier_handle(handle).and_then(|h| self.rigid_body_set.get(h))
    }
}

impl Default for RapierScene {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl PhysicsQuery for RapierScene {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        ignore: Option<BodyHandle>,
    ) -> Option<RaycastHit> {
        let mut filter = QueryFilter::default();
        if let Some(ignored) = ignore.and_then(|h| self.rapier_handle(h)) {
            filter = filter.exclude_rigid_body(ignored);
        }
        let query_pipeline = self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.rigid_body_set,
            &self.collider_set,
            filter,
        );
        let ray = Ray::new(to_rapier_vec(origin), to_rapier_vec(direction));
        let (_, hit) = query_pipeline.cast_ray_and_get_normal(&ray, max_distance, true)?;
        Some(RaycastHit {
            point: from_rapier_vec(ray.point_at(hit.time_of_impact)),
            normal: from_rapier_vec(hit.normal),
            distance: hit.time_of_impact,
        })
    }

    fn live_bodies(&self) -> Vec<BodyHandle> {
        self.rigid_body_set
            .iter()
            .map(|(h, rb)| BodyHandle::new(h.into_raw_parts().0, BodyIndex(rb.user_data as u64)))
            .collect()
    }

    fn resolve_body_handle(&self, index: BodyIndex) -> Option<BodyHandle> {
        self.resolve_calls.fetch_add(1, Ordering::Relaxed);
        self.live_bodies().into_iter().find(|h| h.index == index)
    }

    fn body_transform(&self, handle: BodyHandle) -> Option<RigidTransform> {
        self.body(handle).map(|rb| from_rapier_pose(rb.position()))
    }

    fn center_of_mass(&self, handle: BodyHandle) -> Option<Vec3> {
        self.body(handle).map(|rb| from_rapier_vec(rb.center_of_mass()))
    }
}

impl PhysicsScene for RapierScene {
    fn apply_force_at_point(&mut self, handle: BodyHandle, point: Vec3, force: Vec3) {
        let Some(rb) = self
            .rapier_handle(handle)
            .and_then(|h| self.rigid_body_set.get_mut(h))
        else {
            log::warn!("Force applied to stale body handle {handle:?}; ignored.");
            return;
        };
        rb.add_force_at_point(to_rapier_vec(force), to_rapier_vec(point), true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use damper_core::math::Quaternion;

    fn box_at(scene: &mut RapierScene, y: f32, mass: f32) -> BodyHandle {
        scene.add_body(BodyDesc::new(
            RigidTransform::from_translation(Vec3::new(0.0, y, 0.0)),
            mass,
            Vec3::ONE,
        ))
    }

    #[test]
    fn ray_hits_ground_below() {
        let scene = RapierScene::default();
        let hit = scene
            .cast_ray(Vec3::new(3.0, 110.0, -2.0), -Vec3::Y, 200.0, None)
            .unwrap();
        assert_relative_eq!(hit.distance, 110.0, epsilon = 1e-3);
        assert_relative_eq!(hit.point, Vec3::new(3.0, 0.0, -2.0), epsilon = 1e-3);
        assert_relative_eq!(hit.normal, Vec3::Y, epsilon = 1e-5);
    }

    #[test]
    fn ray_misses_out_of_range_or_away() {
        let scene = RapierScene::new(-5.0);
        assert!(scene.cast_ray(Vec3::new(0.0, 110.0, 0.0), -Vec3::Y, 100.0, None).is_none());
        assert!(scene.cast_ray(Vec3::new(0.0, 10.0, 0.0), Vec3::Y, 100.0, None).is_none());
        assert!(scene.cast_ray(Vec3::new(0.0, 10.0, 0.0), Vec3::X, 100.0, None).is_none());
    }

    #[test]
    fn body_box_blocks_ray_unless_ignored() {
        let mut scene = RapierScene::default();
        let body = box_at(&mut scene, 5.0, 1.0);
        let origin = Vec3::new(0.0, 10.0, 0.0);

        let hit = scene.cast_ray(origin, -Vec3::Y, 20.0, None).unwrap();
        assert_relative_eq!(hit.distance, 4.0, epsilon = 1e-4);
        assert_relative_eq!(hit.normal, Vec3::Y, epsilon = 1e-5);

        let hit = scene.cast_ray(origin, -Vec3::Y, 20.0, Some(body)).unwrap();
        assert_relative_eq!(hit.distance, 10.0, epsilon = 1e-4);
    }

    #[test]
    fn removed_slot_is_reused_with_a_new_index() {
        let mut scene = RapierScene::default();
        let first = box_at(&mut scene, 50.0, 1.0);
        assert!(scene.remove_body(first));
        assert!(!scene.remove_body(first));

        let second = box_at(&mut scene, 50.0, 1.0);
        assert_eq!(second.slot, first.slot);
        assert_ne!(second.index, first.index);
        assert_eq!(scene.body_count(), 1);
        assert!(scene.body_transform(first).is_none());
        assert_eq!(scene.resolve_body_handle(second.index), Some(second));
        assert_eq!(scene.resolve_body_handle(first.index), None);
        assert_eq!(scene.resolve_calls(), 2);
    }

    #[test]
    fn off_center_force_accumulates_torque() {
        let mut scene = RapierScene::default();
        let body = box_at(&mut scene, 50.0, 1.0);
        let com = scene.center_of_mass(body).unwrap();
        assert_relative_eq!(com, Vec3::new(0.0, 50.0, 0.0), epsilon = 1e-5);

        scene.apply_force_at_point(body, com + Vec3::X, Vec3::Y);
        scene.apply_force_at_point(body, com, Vec3::Y);

        assert_relative_eq!(scene.accumulated_force(body).unwrap(), Vec3::new(0.0, 2.0, 0.0));
        assert_relative_eq!(scene.accumulated_torque(body).unwrap(), Vec3::Z, epsilon = 1e-5);
    }

    #[test]
    fn step_integrates_gravity_and_clears_forces() {
        let mut scene = RapierScene::default().with_gravity(Vec3::new(0.0, -10.0, 0.0));
        let body = box_at(&mut scene, 50.0, 1.0);
        scene.apply_force_at_point(body, Vec3::new(0.0, 50.0, 0.0), Vec3::X);
        scene.step(0.5);

        assert_relative_eq!(scene.linear_velocity(body).unwrap(), Vec3::new(0.5, -5.0, 0.0), epsilon = 1e-4);
        assert!(scene.body_transform(body).unwrap().translation.y < 50.0);
        assert_eq!(scene.accumulated_force(body), Some(Vec3::ZERO));
        assert_eq!(scene.accumulated_torque(body), Some(Vec3::ZERO));
    }

    #[test]
    fn pure_torque_rolls_a_long_box() {
        // Izz of a 3 kg box with half extents (1, 1, 10) is 2.
        let mut scene = RapierScene::default().with_gravity(Vec3::ZERO);
        let body = scene.add_body(BodyDesc::new(
            RigidTransform::from_translation(Vec3::new(0.0, 50.0, 0.0)),
            3.0,
            Vec3::new(1.0, 1.0, 10.0),
        ));
        let com = scene.center_of_mass(body).unwrap();
        scene.apply_force_at_point(body, com + Vec3::X, Vec3::Y);
        scene.apply_force_at_point(body, com - Vec3::X, -Vec3::Y);
        assert_relative_eq!(scene.accumulated_torque(body).unwrap(), Vec3::new(0.0, 0.0, 2.0), epsilon = 1e-5);

        scene.step(0.01);

        let spin = scene.angular_velocity(body).unwrap();
        assert_relative_eq!(spin, Vec3::new(0.0, 0.0, 0.01), epsilon = 1e-6);
        let rotation = scene.body_transform(body).unwrap().rotation;
        let rolled = rotation.rotate_vec3(Vec3::X);
        let angle = rolled.y.atan2(rolled.x);
        assert!(angle > 0.5e-4 && angle < 1.5e-4, "roll angle {angle}");
        assert_relative_eq!(scene.linear_velocity(body).unwrap(), Vec3::ZERO, epsilon = 1e-6);
    }

    #[test]
    fn fixed_bodies_do_not_move() {
        let mut scene = RapierScene::default();
        let start = RigidTransform::new(Vec3::new(0.0, 50.0, 0.0), Quaternion::IDENTITY);
        let body = scene.add_body(BodyDesc::new(start, 0.0, Vec3::ONE));
        scene.apply_force_at_point(body, Vec3::new(0.0, 50.0, 0.0), Vec3::Y);
        assert_eq!(scene.accumulated_force(body), Some(Vec3::ZERO));

        scene.step(1.0);
        assert_relative_eq!(scene.body_transform(body).unwrap().translation, start.translation);
    }

    #[test]
    fn raised_ground_shortens_the_ray() {
        let scene = RapierScene::new(25.0);
        let hit = scene.cast_ray(Vec3::new(0.0, 100.0, 0.0), -Vec3::Y, 100.0, None).unwrap();
        assert_relative_eq!(hit.distance, 75.0, epsilon = 1e-3);
        assert_relative_eq!(hit.point.y, 25.0, epsilon = 1e-3);
    }
}
