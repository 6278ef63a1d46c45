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

use std::collections::{HashMap, HashSet};
use std::mem;
use std::sync::{Arc, Weak};

use damper_core::debug::{DebugDrawFilter, DebugDrawSettings, DebugRenderSink};
use damper_core::exchange::{ExchangeChannel, StepInput};
use damper_core::vehicle::{PerWheel, VehicleConfig, VehicleId, WheelSample};
use damper_telemetry::{CounterHandle, GaugeHandle, HistogramHandle, MetricsRegistry, MetricsResult, ScopedMetricTimer};

use super::VehicleActor;

const NAMESPACE: &str = "coordinator";

#[derive(Debug)]
struct CoordinatorMetrics {
    snapshot_build_ms: HistogramHandle,
    vehicles: GaugeHandle,
    outputs_drained: CounterHandle,
    inputs_superseded: CounterHandle,
    dead_references: CounterHandle,
}

impl CoordinatorMetrics {
    fn new(registry: &MetricsRegistry) -> MetricsResult<Self> {
        Ok(Self {
            snapshot_build_ms: registry.register_histogram(
                NAMESPACE,
                "snapshot_build_time",
                "Duration of a snapshot build",
                "ms",
                vec![0.05, 0.1, 0.5, 1.0, 4.0],
            )?,
            vehicles: registry.register_gauge(NAMESPACE, "vehicles", "Registered vehicles", "count")?,
            outputs_drained: registry.register_counter(NAMESPACE, "outputs_drained", "Step outputs consumed")?,
            inputs_superseded: registry.register_counter(
                NAMESPACE,
                "inputs_superseded",
                "Snapshots overwritten before the worker took them",
            )?,
            dead_references: registry.register_counter(
                NAMESPACE,
                "dead_references",
                "Registry entries whose actor was gone at snapshot time",
            )?,
        })
    }
}

fn record(result: MetricsResult<impl Sized>) {
    if let Err(e) = result {
        log::warn!("Failed to record coordinator metric: {e}");
    }
}

#[derive(Debug)]
struct RegistryEntry {
    id: VehicleId,
    actor: Weak<dyn VehicleActor>,
}

/// Gameplay-side owner of the vehicle registry.
///
/// Once per gameplay tick: [`build_step_input`](Self::build_step_input) to
/// publish a snapshot, then [`consume_outputs`](Self::consume_outputs) to pick
/// up whatever the worker produced in the meantime.
pub struct VehicleCoordinator {
    channel: Arc<ExchangeChannel>,
    registry: Vec<RegistryEntry>,
    registered: HashSet<VehicleId>,
    pending_added: Vec<VehicleId>,
    pending_removed: Vec<VehicleId>,
    timestamp: u64,
    last_answered: Option<u64>,
    latest_wheels: HashMap<VehicleId, PerWheel<WheelSample>>,
    debug_settings: DebugDrawSettings,
    debug_filter: DebugDrawFilter,
    metrics: Option<CoordinatorMetrics>,
    shut_down: bool,
}

impl VehicleCoordinator {
    /// Creates a coordinator publishing into `channel`.
    pub fn new(channel: Arc<ExchangeChannel>, debug_settings: DebugDrawSettings) -> Self {
        let debug_filter = debug_settings.filter();
        Self {
            channel,
            registry: Vec::new(),
            registered: HashSet::new(),
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
            timestamp: 0,
            last_answered: None,
            latest_wheels: HashMap::new(),
            debug_settings,
            debug_filter,
            metrics: None,
            shut_down: false,
        }
    }

    /// Registers the coordinator's metrics under the `coordinator` namespace.
    pub fn with_telemetry(mut self, registry: &MetricsRegistry) -> MetricsResult<Self> {
        self.metrics = Some(CoordinatorMetrics::new(registry)?);
        Ok(self)
    }

    /// Registers a vehicle and returns its new id.
    ///
    /// Only a weak reference is kept: dropping the actor is enough to take it
    /// out of future snapshots.
    pub fn register<A: VehicleActor + 'static>(&mut self, actor: &Arc<A>) -> VehicleId {
        let weak: Weak<dyn VehicleActor> = Arc::downgrade(actor) as Weak<dyn VehicleActor>;
        self.register_weak(weak)
    }

    /// Registers a vehicle from an already type-erased weak reference.
    pub fn register_weak(&mut self, actor: Weak<dyn VehicleActor>) -> VehicleId {
        let id = VehicleId::new();
        self.registry.push(RegistryEntry { id, actor });
        self.registered.insert(id);
        self.pending_added.push(id);
        log::debug!("Registered vehicle {id}.");
        self.update_vehicle_gauge();
        id
    }

    /// Unregisters a vehicle. Returns `false` for unknown ids.
    pub fn unregister(&mut self, id: VehicleId) -> bool {
        if !self.registered.remove(&id) {
            log::warn!("Ignoring unregister of unknown vehicle {id}.");
            return false;
        }
        self.registry.retain(|entry| entry.id != id);
        self.pending_removed.push(id);
        self.latest_wheels.remove(&id);
        log::debug!("Unregistered vehicle {id}.");
        self.update_vehicle_gauge();
        true
    }

    fn update_vehicle_gauge(&self) {
        if let Some(metrics) = &self.metrics {
            record(metrics.vehicles.set(self.registry.len() as f64));
        }
    }

    /// Builds a snapshot of every live vehicle and publishes it.
    ///
    /// Entries whose actor was dropped are left out of the snapshot but stay
    /// registered until unregistered. Pending registry changes travel with
    /// the snapshot and are cleared. Returns a copy of the published input.
    pub fn build_step_input(&mut self) -> StepInput {
        let _timer = ScopedMetricTimer::maybe(self.metrics.as_ref().map(|m| &m.snapshot_build_ms));

        let mut dead = 0u64;
        let vehicles: Vec<VehicleConfig> = self
            .registry
            .iter()
            .filter_map(|entry| {
                let Some(actor) = entry.actor.upgrade() else {
                    log::debug!("Vehicle {} is gone; leaving it out of the snapshot.", entry.id);
                    dead += 1;
                    return None;
                };
                Some(VehicleConfig {
                    id: entry.id,
                    body_index: actor.body_index(),
                    suspensions: PerWheel::from_fn(|wheel| actor.suspension(wheel)),
                })
            })
            .collect();

        self.timestamp += 1;
        let input = StepInput {
            timestamp: self.timestamp,
            vehicles,
            added: mem::take(&mut self.pending_added),
            removed: mem::take(&mut self.pending_removed),
        };

        let superseded = self.channel.publish_input(input.clone());
        log::trace!(
            "Published snapshot #{} ({} vehicles, +{} -{}).",
            input.timestamp,
            input.vehicles.len(),
            input.added.len(),
            input.removed.len()
        );

        if let Some(metrics) = &self.metrics {
            if dead > 0 {
                record(metrics.dead_references.increment_by(dead));
            }
            if superseded {
                record(metrics.inputs_superseded.increment());
            }
        }
        input
    }

    /// Drains every queued step output, oldest first.
    ///
    /// Wheel samples of stepped vehicles are kept for
    /// [`latest_wheels`](Self::latest_wheels). Debug commands are filtered and
    /// scaled by the debug settings and handed to `sink`; with debug drawing
    /// disabled the outputs are still drained. Results for vehicles
    /// unregistered in the meantime are discarded. Returns the number of
    /// outputs drained.
    pub fn consume_outputs<K: DebugRenderSink + ?Sized>(&mut self, sink: &mut K) -> usize {
        let mut drained = 0;
        for output in self.channel.drain_outputs() {
            drained += 1;
            self.last_answered = Some(output.timestamp);

            for vehicle in output.vehicles {
                if !self.registered.contains(&vehicle.id) {
                    continue;
                }
                if vehicle.stepped {
                    self.latest_wheels.insert(vehicle.id, vehicle.wheels);
                }
                if !self.debug_filter.enabled || vehicle.debug.is_empty() {
                    continue;
                }
                let commands = self.debug_filter.apply(vehicle.debug.as_slice());
                if !commands.is_empty() {
                    sink.submit(vehicle.id, &commands);
                }
            }
        }

        if drained > 0 {
            log::trace!("Drained {drained} step outputs.");
            if let Some(metrics) = &self.metrics {
                record(metrics.outputs_drained.increment_by(drained as u64));
            }
        }
        drained
    }

    /// Wheel samples from the most recent step that solved `id`.
    pub fn latest_wheels(&self, id: VehicleId) -> Option<&PerWheel<WheelSample>> {
        self.latest_wheels.get(&id)
    }

    /// Timestamp of the newest input the worker answered.
    pub fn last_answered_timestamp(&self) -> Option<u64> {
        self.last_answered
    }

    /// Timestamp of the newest published input.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Replaces the debug draw settings.
    pub fn set_debug_settings(&mut self, settings: DebugDrawSettings) {
        self.debug_filter = settings.filter();
        self.debug_settings = settings;
    }

    /// Current debug draw settings.
    pub fn debug_settings(&self) -> &DebugDrawSettings {
        &self.debug_settings
    }

    /// Number of registered vehicles, live or not.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether no vehicle is registered.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: VehicleId) -> bool {
        self.registered.contains(&id)
    }

    /// Whether [`shutdown`](Self::shutdown) ran.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Detaches the worker and empties the registry.
    ///
    /// Closes the channel so nothing more is published or consumed,
    /// unregisters every vehicle and discards residual outputs. Idempotent;
    /// also runs on drop.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.channel.close();

        let ids: Vec<VehicleId> = self.registry.iter().map(|entry| entry.id).collect();
        for id in ids {
            self.unregister(id);
        }
        self.pending_added.clear();
        self.pending_removed.clear();

        let residual = self.channel.drain_outputs().count();
        self.latest_wheels.clear();
        log::info!("Vehicle coordinator shut down ({residual} residual outputs discarded).");
    }
}

impl Drop for VehicleCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for VehicleCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VehicleCoordinator")
            .field("vehicles", &self.registry.len())
            .field("timestamp", &self.timestamp)
            .field("last_answered", &self.last_answered)
            .field("shut_down", &self.shut_down)
            .finish()
    }
}
