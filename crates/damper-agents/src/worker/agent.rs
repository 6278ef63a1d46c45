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

use std::sync::Arc;

use damper_core::config::WorkerSettings;
use damper_core::exchange::{ExchangeChannel, StepOutput, VehicleOutput};
use damper_core::physics::PhysicsScene;
use damper_lanes::{default_dispatch, DispatchLane, PreparedStep, VehicleStateCache};
use damper_telemetry::{CounterHandle, GaugeHandle, HistogramHandle, MetricsRegistry, MetricsResult, ScopedMetricTimer};

use super::{StepError, StepReport};

const NAMESPACE: &str = "worker";

/// Telemetry handles of the worker.
#[derive(Debug)]
struct WorkerMetrics {
    step_time_ms: HistogramHandle,
    vehicle_count: GaugeHandle,
    handles_resolved: CounterHandle,
    vehicles_skipped: CounterHandle,
    desyncs: CounterHandle,
    missing_data: CounterHandle,
    debug_commands_dropped: CounterHandle,
}

impl WorkerMetrics {
    fn new(registry: &MetricsRegistry) -> MetricsResult<Self> {
        Ok(Self {
            step_time_ms: registry.register_histogram(
                NAMESPACE,
                "step_time",
                "Duration of a worker step",
                "ms",
                vec![0.1, 0.5, 1.0, 2.0, 4.0, 8.0, 16.0],
            )?,
            vehicle_count: registry.register_gauge(
                NAMESPACE,
                "vehicles",
                "Vehicles in the last consumed snapshot",
                "count",
            )?,
            handles_resolved: registry.register_counter(
                NAMESPACE,
                "handles_resolved",
                "Body handles resolved from body indices",
            )?,
            vehicles_skipped: registry.register_counter(
                NAMESPACE,
                "vehicles_skipped",
                "Snapshot vehicles left out of a step",
            )?,
            desyncs: registry.register_counter(
                NAMESPACE,
                "desyncs",
                "Steps where snapshot and state cache sizes differed",
            )?,
            missing_data: registry.register_counter(
                NAMESPACE,
                "missing_data",
                "Snapshot vehicles without physics data",
            )?,
            debug_commands_dropped: registry.register_counter(
                NAMESPACE,
                "debug_commands_dropped",
                "Debug draw commands dropped by full buffers",
            )?,
        })
    }
}

/// Logs instead of failing: telemetry must never break a step.
fn record(result: MetricsResult<impl Sized>) {
    if let Err(e) = result {
        log::warn!("Failed to record worker metric: {e}");
    }
}

/// Physics-side owner of per-vehicle state.
///
/// Call [`step`](Self::step) once per physics step, from the thread that owns
/// the physics scene. The worker never touches gameplay objects: all it knows
/// about a vehicle comes from the latest snapshot.
#[derive(Debug)]
pub struct SuspensionWorker {
    channel: Arc<ExchangeChannel>,
    cache: VehicleStateCache,
    dispatch: Box<dyn DispatchLane>,
    settings: WorkerSettings,
    metrics: Option<WorkerMetrics>,
}

impl SuspensionWorker {
    /// Creates a worker reading from `channel`.
    pub fn new(channel: Arc<ExchangeChannel>, settings: WorkerSettings) -> Self {
        let dispatch = default_dispatch(settings.force_single_thread);
        log::info!("Suspension worker using {} dispatch.", dispatch.strategy_name());
        Self {
            channel,
            cache: VehicleStateCache::new(),
            dispatch,
            settings,
            metrics: None,
        }
    }

    /// Replaces the dispatch strategy.
    pub fn with_dispatch(mut self, dispatch: Box<dyn DispatchLane>) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Registers the worker's metrics under the `worker` namespace.
    pub fn with_telemetry(mut self, registry: &MetricsRegistry) -> MetricsResult<Self> {
        self.metrics = Some(WorkerMetrics::new(registry)?);
        Ok(self)
    }

    /// Applies new settings, re-selecting the dispatch strategy.
    pub fn set_settings(&mut self, settings: WorkerSettings) {
        if settings.force_single_thread != self.settings.force_single_thread {
            self.dispatch = default_dispatch(settings.force_single_thread);
            log::info!("Suspension worker switched to {} dispatch.", self.dispatch.strategy_name());
        }
        self.settings = settings;
    }

    /// Current settings.
    pub fn settings(&self) -> &WorkerSettings {
        &self.settings
    }

    /// Name of the active dispatch strategy.
    pub fn strategy_name(&self) -> &'static str {
        self.dispatch.strategy_name()
    }

    /// The per-vehicle state cache.
    pub fn cache(&self) -> &VehicleStateCache {
        &self.cache
    }

    /// Runs one physics step.
    ///
    /// Without a scene the step fails before consuming any input, so the
    /// pending snapshot is kept for the next attempt. Without a new snapshot
    /// the step is idle. Otherwise the state cache is reconciled, every
    /// resolvable vehicle is solved through the dispatch lane, the forces are
    /// applied to the scene in snapshot order and a [`StepOutput`] is queued.
    /// An empty snapshot produces no output.
    pub fn step<S: PhysicsScene>(&mut self, scene: Option<&mut S>, dt: f32) -> Result<StepReport, StepError> {
        let Some(scene) = scene else {
            log::error!("Suspension step invoked without a physics scene.");
            return Err(StepError::SceneUnavailable);
        };
        let Some(input) = self.channel.try_take_input() else {
            log::trace!("No new snapshot; idle step.");
            return Ok(StepReport::idle());
        };

        let _timer = ScopedMetricTimer::maybe(self.metrics.as_ref().map(|m| &m.step_time_ms));
        let mut report = StepReport {
            timestamp: Some(input.timestamp),
            ..Default::default()
        };

        self.cache.reconcile(&input.added, &input.removed);

        if input.vehicles.is_empty() {
            log::trace!("Snapshot #{} is empty; nothing to publish.", input.timestamp);
            return Ok(report);
        }

        if input.vehicles.len() != self.cache.len() {
            log::warn!(
                "Snapshot #{} lists {} vehicles but {} have physics data.",
                input.timestamp,
                input.vehicles.len(),
                self.cache.len()
            );
            report.desync = true;
        }

        let PreparedStep {
            mut jobs,
            missing,
            resolved,
            ..
        } = self.cache.prepare(&input.vehicles, &*scene);
        report.resolved = resolved;

        self.dispatch.dispatch(&mut jobs, &*scene, dt);

        let force_scale = self.settings.force_scale;
        let mut outputs: Vec<VehicleOutput> = input.vehicles.iter().map(|v| VehicleOutput::skipped(v.id)).collect();
        let mut dropped_debug = 0u64;
        for job in jobs {
            if job.output.stepped {
                for (_, state) in job.states.iter().filter(|(_, s)| s.in_contact) {
                    scene.apply_force_at_point(job.handle, state.force_point, state.force * force_scale);
                }
                report.stepped += 1;
            }
            dropped_debug += u64::from(job.output.debug.dropped());
            outputs[job.slot] = job.output;
        }
        report.skipped = input.vehicles.len() - report.stepped;

        self.channel.publish_output(StepOutput {
            timestamp: input.timestamp,
            vehicles: outputs,
        });
        report.published = true;

        log::trace!(
            "Step #{}: {} stepped, {} skipped, {} resolved.",
            input.timestamp,
            report.stepped,
            report.skipped,
            report.resolved
        );

        if let Some(metrics) = &self.metrics {
            record(metrics.vehicle_count.set(input.vehicles.len() as f64));
            record(metrics.handles_resolved.increment_by(resolved as u64));
            record(metrics.vehicles_skipped.increment_by(report.skipped as u64));
            record(metrics.missing_data.increment_by(missing as u64));
            record(metrics.debug_commands_dropped.increment_by(dropped_debug));
            if report.desync {
                record(metrics.desyncs.increment());
            }
        }

        Ok(report)
    }
}
