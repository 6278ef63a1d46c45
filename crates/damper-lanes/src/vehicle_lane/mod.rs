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

//! Vehicle Lane
//!
//! The worker's per-vehicle state cache: creation and destruction driven by
//! the snapshot's add/remove lists, and lazy resolution of body indices into
//! live handles.

use std::collections::HashMap;

use damper_core::physics::{BodyHandle, BodyIndex, PhysicsQuery};
use damper_core::vehicle::{PerWheel, SuspensionState, VehicleConfig, VehicleId};

use crate::suspension_lane::SuspensionJob;

/// Worker-owned physics data of one vehicle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehiclePhysicsData {
    /// Persistent state of the four suspensions.
    pub suspensions: PerWheel<SuspensionState>,
    /// Body index the cached handle was resolved from.
    pub body_index: Option<BodyIndex>,
    /// Cached live handle of the chassis body.
    pub handle: Option<BodyHandle>,
}

/// Outcome of [`VehiclePhysicsData::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleResolution {
    /// The cached handle is still valid.
    Cached(BodyHandle),
    /// The handle was resolved during this call.
    Resolved(BodyHandle),
    /// The vehicle currently has no body.
    NoBody,
    /// No live body carries the index yet.
    Unresolved(BodyIndex),
}

impl HandleResolution {
    /// The usable handle, if any.
    pub fn handle(self) -> Option<BodyHandle> {
        match self {
            HandleResolution::Cached(h) | HandleResolution::Resolved(h) => Some(h),
            HandleResolution::NoBody | HandleResolution::Unresolved(_) => None,
        }
    }
}

impl VehiclePhysicsData {
    /// Brings the cached handle in line with `body_index`.
    ///
    /// A changed index drops the cached handle. A missing handle is looked up
    /// through [`PhysicsQuery::resolve_body_handle`] and cached on success, so
    /// the lookup happens once per attachment.
    pub fn resolve<Q: PhysicsQuery + ?Sized>(
        &mut self,
        body_index: Option<BodyIndex>,
        query: &Q,
    ) -> HandleResolution {
        if self.body_index != body_index {
            self.body_index = body_index;
            self.handle = None;
        }

        let Some(index) = body_index else {
            return HandleResolution::NoBody;
        };
        if let Some(handle) = self.handle {
            return HandleResolution::Cached(handle);
        }

        match query.resolve_body_handle(index) {
            Some(handle) => {
                self.handle = Some(handle);
                HandleResolution::Resolved(handle)
            }
            None => HandleResolution::Unresolved(index),
        }
    }
}

/// Counts of a [`VehicleStateCache::reconcile`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Entries created.
    pub added: usize,
    /// Entries destroyed.
    pub removed: usize,
}

/// Jobs ready to dispatch plus bookkeeping of the preparation pass.
#[derive(Debug, Default)]
pub struct PreparedStep<'a> {
    /// One job per vehicle that can be stepped, in snapshot order.
    pub jobs: Vec<SuspensionJob<'a>>,
    /// Snapshot vehicles without cached physics data.
    pub missing: usize,
    /// Snapshot vehicles without a usable body this step.
    pub unresolved: usize,
    /// Handles resolved during this preparation.
    pub resolved: usize,
}

/// Per-vehicle physics data, keyed by [`VehicleId`].
#[derive(Debug, Default)]
pub struct VehicleStateCache {
    entries: HashMap<VehicleId, VehiclePhysicsData>,
}

impl VehicleStateCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies registry changes: additions first, then removals.
    ///
    /// An id both added and removed in the same snapshot leaves no entry.
    pub fn reconcile(&mut self, added: &[VehicleId], removed: &[VehicleId]) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();

        for id in added {
            if self.entries.contains_key(id) {
                log::debug!("Vehicle {id} added twice; keeping its state.");
                continue;
            }
            self.entries.insert(*id, VehiclePhysicsData::default());
            summary.added += 1;
        }

        for id in removed {
            if self.entries.remove(id).is_some() {
                summary.removed += 1;
            } else {
                log::debug!("Vehicle {id} removed without physics data.");
            }
        }

        if summary != ReconcileSummary::default() {
            log::debug!(
                "State cache reconciled: +{} -{} ({} live).",
                summary.added,
                summary.removed,
                self.entries.len()
            );
        }
        summary
    }

    /// Resolves handles and builds one job per steppable snapshot vehicle.
    ///
    /// Vehicles without data or without a resolvable body are counted and
    /// left out; the step goes on for everyone else.
    pub fn prepare<'a, Q: PhysicsQuery + ?Sized>(
        &'a mut self,
        vehicles: &'a [VehicleConfig],
        query: &Q,
    ) -> PreparedStep<'a> {
        let mut slots: HashMap<VehicleId, &'a mut VehiclePhysicsData> =
            self.entries.iter_mut().map(|(id, data)| (*id, data)).collect();
        let mut prepared = PreparedStep {
            jobs: Vec::with_capacity(vehicles.len()),
            ..Default::default()
        };

        for (slot, config) in vehicles.iter().enumerate() {
            let Some(data) = slots.remove(&config.id) else {
                log::error!("Vehicle {} has no physics data; skipping.", config.id);
                prepared.missing += 1;
                continue;
            };

            let handle = match data.resolve(config.body_index, query) {
                HandleResolution::Cached(handle) => handle,
                HandleResolution::Resolved(handle) => {
                    log::debug!("Vehicle {} attached to body {:?}.", config.id, handle);
                    prepared.resolved += 1;
                    handle
                }
                HandleResolution::NoBody => {
                    log::trace!("Vehicle {} has no body this step.", config.id);
                    prepared.unresolved += 1;
                    continue;
                }
                HandleResolution::Unresolved(index) => {
                    log::trace!("Vehicle {}: body {:?} not live yet.", config.id, index);
                    prepared.unresolved += 1;
                    continue;
                }
            };

            prepared
                .jobs
                .push(SuspensionJob::new(slot, handle, config, &mut data.suspensions));
        }
        prepared
    }

    /// Physics data of one vehicle.
    pub fn get(&self, id: &VehicleId) -> Option<&VehiclePhysicsData> {
        self.entries.get(id)
    }

    /// Whether the cache holds data for `id`.
    pub fn contains(&self, id: &VehicleId) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of cached vehicles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use damper_core::math::{RigidTransform, Vec3};
    use damper_core::physics::RaycastHit;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scene with a fixed body list that counts handle lookups.
    #[derive(Default)]
    struct Bodies {
        live: Vec<BodyHandle>,
        lookups: AtomicUsize,
    }

    impl PhysicsQuery for Bodies {
        fn cast_ray(&self, _: Vec3, _: Vec3, _: f32, _: Option<BodyHandle>) -> Option<RaycastHit> {
            None
        }

        fn live_bodies(&self) -> Vec<BodyHandle> {
            self.lookups.fetch_add(1, Ordering::Relaxed);
            self.live.clone()
        }

        fn body_transform(&self, _: BodyHandle) -> Option<RigidTransform> {
            Some(RigidTransform::IDENTITY)
        }

        fn center_of_mass(&self, _: BodyHandle) -> Option<Vec3> {
            Some(Vec3::ZERO)
        }
    }

    fn config(id: VehicleId, body: Option<u64>) -> VehicleConfig {
        VehicleConfig {
            id,
            body_index: body.map(BodyIndex),
            suspensions: PerWheel::default(),
        }
    }

    #[test]
    fn add_then_remove_in_one_snapshot_leaves_nothing() {
        let mut cache = VehicleStateCache::new();
        let id = VehicleId::new();
        let summary = cache.reconcile(&[id], &[id]);
        assert_eq!(summary, ReconcileSummary { added: 1, removed: 1 });
        assert!(cache.is_empty());
    }

    #[test]
    fn duplicate_add_keeps_existing_state() {
        let mut cache = VehicleStateCache::new();
        let id = VehicleId::new();
        cache.reconcile(&[id], &[]);
        if let Some(data) = cache.entries.get_mut(&id) {
            data.body_index = Some(BodyIndex(9));
        }
        let summary = cache.reconcile(&[id], &[]);
        assert_eq!(summary.added, 0);
        assert_eq!(cache.get(&id).and_then(|d| d.body_index), Some(BodyIndex(9)));
    }

    #[test]
    fn handle_is_resolved_once_and_reresolved_on_index_change() {
        let scene = Bodies {
            live: vec![BodyHandle::new(0, BodyIndex(10)), BodyHandle::new(1, BodyIndex(20))],
            ..Default::default()
        };
        let mut data = VehiclePhysicsData::default();

        let first = data.resolve(Some(BodyIndex(10)), &scene);
        assert_eq!(first, HandleResolution::Resolved(BodyHandle::new(0, BodyIndex(10))));
        for _ in 0..5 {
            assert!(matches!(data.resolve(Some(BodyIndex(10)), &scene), HandleResolution::Cached(_)));
        }
        assert_eq!(scene.lookups.load(Ordering::Relaxed), 1);

        let moved = data.resolve(Some(BodyIndex(20)), &scene);
        assert_eq!(moved, HandleResolution::Resolved(BodyHandle::new(1, BodyIndex(20))));
        data.resolve(Some(BodyIndex(20)), &scene);
        assert_eq!(scene.lookups.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn unresolvable_index_is_retried_and_detach_clears_handle() {
        let scene = Bodies::default();
        let mut data = VehiclePhysicsData::default();
        assert_eq!(
            data.resolve(Some(BodyIndex(3)), &scene),
            HandleResolution::Unresolved(BodyIndex(3))
        );
        assert_eq!(
            data.resolve(Some(BodyIndex(3)), &scene),
            HandleResolution::Unresolved(BodyIndex(3))
        );
        assert_eq!(scene.lookups.load(Ordering::Relaxed), 2);

        data.handle = Some(BodyHandle::new(0, BodyIndex(3)));
        assert_eq!(data.resolve(None, &scene), HandleResolution::NoBody);
        assert_eq!(data.handle, None);
    }

    #[test]
    fn prepare_skips_missing_and_unresolved_vehicles() {
        let scene = Bodies {
            live: vec![BodyHandle::new(4, BodyIndex(1))],
            ..Default::default()
        };
        let (ready, no_body, unknown_body, no_data) =
            (VehicleId::new(), VehicleId::new(), VehicleId::new(), VehicleId::new());
        let mut cache = VehicleStateCache::new();
        cache.reconcile(&[ready, no_body, unknown_body], &[]);

        let snapshot = vec![
            config(no_data, Some(1)),
            config(ready, Some(1)),
            config(no_body, None),
            config(unknown_body, Some(77)),
        ];
        let prepared = cache.prepare(&snapshot, &scene);

        assert_eq!(prepared.jobs.len(), 1);
        assert_eq!(prepared.jobs[0].slot, 1);
        assert_eq!(prepared.jobs[0].config.id, ready);
        assert_eq!(prepared.missing, 1);
        assert_eq!(prepared.unresolved, 2);
        assert_eq!(prepared.resolved, 1);
    }
}
