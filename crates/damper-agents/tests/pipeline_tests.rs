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

use std::sync::{Arc, Mutex};

use approx::assert_relative_eq;
use damper_agents::{pair, StepError, SuspensionWorker, VehicleActor, VehicleCoordinator};
use damper_core::config::{DamperConfig, WorkerSettings};
use damper_core::debug::{DebugDrawSettings, DebugDrawShape};
use damper_core::math::{RigidTransform, Vec3};
use damper_core::physics::{BodyHandle, BodyIndex};
use damper_core::vehicle::{SuspensionConfig, SuspensionTuning, WheelPosition};
use damper_infra::{BodyDesc, RapierScene, RecordingDebugRenderer};
use damper_telemetry::MetricsRegistry;

const DT: f32 = 1.0 / 60.0;
const RIDE_HEIGHT: f32 = 100.0;

/// A four-wheeled test vehicle whose chassis body can be swapped.
struct TestCar {
    body: Mutex<Option<BodyIndex>>,
}

impl TestCar {
    fn on(body: Option<BodyIndex>) -> Arc<Self> {
        Arc::new(Self { body: Mutex::new(body) })
    }

    fn attach_to(&self, body: Option<BodyIndex>) {
        *self.body.lock().unwrap() = body;
    }
}

impl VehicleActor for TestCar {
    fn body_index(&self) -> Option<BodyIndex> {
        *self.body.lock().unwrap()
    }

    fn suspension(&self, wheel: WheelPosition) -> SuspensionConfig {
        let (x, z) = match wheel {
            WheelPosition::FrontLeft => (-100.0, 150.0),
            WheelPosition::FrontRight => (100.0, 150.0),
            WheelPosition::RearLeft => (-100.0, -150.0),
            WheelPosition::RearRight => (100.0, -150.0),
        };
        SuspensionConfig::new(
            RigidTransform::from_translation(Vec3::new(x, 0.0, z)),
            SuspensionTuning::default(),
        )
    }
}

fn chassis_at(world: &mut RapierScene, x: f32) -> BodyHandle {
    world.add_body(BodyDesc::new(
        RigidTransform::from_translation(Vec3::new(x, RIDE_HEIGHT, 0.0)),
        20.0,
        Vec3::new(120.0, 20.0, 170.0),
    ))
}

fn setup() -> (VehicleCoordinator, SuspensionWorker, RapierScene) {
    let (coordinator, worker) = pair(&DamperConfig::default());
    (coordinator, worker, RapierScene::default())
}

#[test]
fn register_and_unregister_in_one_tick_leaves_no_state() -> anyhow::Result<()> {
    let (mut coordinator, mut worker, mut world) = setup();
    let car = TestCar::on(None);

    let id = coordinator.register(&car);
    assert!(coordinator.unregister(id));
    let input = coordinator.build_step_input();
    assert_eq!(input.added, vec![id]);
    assert_eq!(input.removed, vec![id]);

    let report = worker.step(Some(&mut world), DT)?;
    assert_eq!(report.timestamp, Some(1));
    assert!(!report.published);
    assert!(worker.cache().is_empty());
    assert_eq!(coordinator.consume_outputs(&mut ()), 0);
    Ok(())
}

#[test]
fn full_tick_pushes_the_chassis_and_reports_wheels() -> anyhow::Result<()> {
    let (mut coordinator, mut worker, mut world) = setup();
    let chassis = chassis_at(&mut world, 0.0);
    let car = TestCar::on(Some(chassis.index));
    let id = coordinator.register(&car);

    coordinator.build_step_input();
    let report = worker.step(Some(&mut world), DT)?;
    assert_eq!(report.stepped, 1);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.resolved, 1);
    assert!(report.published);

    // The chassis box is ignored, every ray reaches the ground 100 below and
    // the first compression velocity saturates each wheel at max force.
    let force = world.accumulated_force(chassis).unwrap();
    assert_relative_eq!(force, Vec3::new(0.0, 4.0 * 7500.0, 0.0), epsilon = 1e-2);
    assert_relative_eq!(world.accumulated_torque(chassis).unwrap(), Vec3::ZERO, epsilon = 1e-2);

    let mut recorder = RecordingDebugRenderer::new();
    assert_eq!(coordinator.consume_outputs(&mut recorder), 1);
    assert_eq!(coordinator.last_answered_timestamp(), Some(1));

    let wheels = coordinator.latest_wheels(id).unwrap();
    for (_, sample) in wheels.iter() {
        assert!(sample.in_contact);
        assert_relative_eq!(sample.compression_ratio, 1.0 - 100.0 / 110.0, epsilon = 1e-5);
    }

    let commands = recorder.for_vehicle(id);
    assert_eq!(commands.len(), 8);
    assert_eq!(commands.iter().filter(|c| c.shape == DebugDrawShape::Arrow).count(), 4);
    Ok(())
}

#[test]
fn force_scale_multiplies_the_applied_forces() -> anyhow::Result<()> {
    let config = DamperConfig {
        worker: WorkerSettings {
            force_scale: 100.0,
            ..Default::default()
        },
        ..Default::default()
    };
    let (mut coordinator, mut worker) = pair(&config);
    let mut world = RapierScene::default();
    let chassis = chassis_at(&mut world, 0.0);
    let car = TestCar::on(Some(chassis.index));
    let id = coordinator.register(&car);

    coordinator.build_step_input();
    worker.step(Some(&mut world), DT)?;
    let force = world.accumulated_force(chassis).unwrap();
    assert_relative_eq!(force, Vec3::new(0.0, 100.0 * 4.0 * 7500.0, 0.0), epsilon = 1.0);

    // Reported wheel forces stay unscaled.
    coordinator.consume_outputs(&mut ());
    for (_, sample) in coordinator.latest_wheels(id).unwrap().iter() {
        assert_relative_eq!(sample.force, Vec3::new(0.0, 7500.0, 0.0), epsilon = 1e-2);
    }
    Ok(())
}

#[test]
fn changed_body_index_is_resolved_once() -> anyhow::Result<()> {
    let (mut coordinator, mut worker, mut world) = setup();
    let first = chassis_at(&mut world, 0.0);
    let second = chassis_at(&mut world, 2000.0);
    let car = TestCar::on(Some(first.index));
    coordinator.register(&car);

    let mut resolved = Vec::new();
    for tick in 0..6 {
        if tick == 3 {
            car.attach_to(Some(second.index));
        }
        coordinator.build_step_input();
        resolved.push(worker.step(Some(&mut world), DT)?.resolved);
    }

    assert_eq!(resolved, vec![1, 0, 0, 1, 0, 0]);
    assert_eq!(world.resolve_calls(), 2);
    Ok(())
}

#[test]
fn outputs_are_drained_oldest_first() -> anyhow::Result<()> {
    let (mut coordinator, mut worker, mut world) = setup();
    let chassis = chassis_at(&mut world, 0.0);
    let car = TestCar::on(Some(chassis.index));
    coordinator.register(&car);

    for _ in 0..3 {
        coordinator.build_step_input();
        worker.step(Some(&mut world), DT)?;
    }

    assert_eq!(coordinator.consume_outputs(&mut ()), 3);
    assert_eq!(coordinator.last_answered_timestamp(), Some(3));
    assert_eq!(coordinator.consume_outputs(&mut ()), 0);
    Ok(())
}

#[test]
fn worker_only_sees_the_latest_snapshot() -> anyhow::Result<()> {
    let (mut coordinator, mut worker, mut world) = setup();
    let chassis = chassis_at(&mut world, 0.0);
    let car = TestCar::on(Some(chassis.index));
    let id = coordinator.register(&car);

    coordinator.build_step_input();
    let second = coordinator.build_step_input();
    assert!(second.added.is_empty(), "registry changes were already sent");

    let report = worker.step(Some(&mut world), DT)?;
    assert_eq!(report.timestamp, Some(2));
    // The superseded snapshot's registration still reached the worker.
    assert!(worker.cache().contains(&id));
    assert_eq!(report.stepped, 1);

    assert!(worker.step(Some(&mut world), DT)?.is_idle());
    Ok(())
}

#[test]
fn debug_commands_are_filtered_and_scaled() -> anyhow::Result<()> {
    let (mut coordinator, mut worker, mut world) = setup();
    let chassis = chassis_at(&mut world, 0.0);
    let car = TestCar::on(Some(chassis.index));
    coordinator.register(&car);
    let mut recorder = RecordingDebugRenderer::new();

    coordinator.set_debug_settings(DebugDrawSettings {
        categories: "engine, aero".into(),
        ..Default::default()
    });
    coordinator.build_step_input();
    worker.step(Some(&mut world), DT)?;
    assert_eq!(coordinator.consume_outputs(&mut recorder), 1);
    assert_eq!(recorder.command_count(), 0);

    coordinator.set_debug_settings(DebugDrawSettings {
        enabled: false,
        ..Default::default()
    });
    coordinator.build_step_input();
    worker.step(Some(&mut world), DT)?;
    assert_eq!(coordinator.consume_outputs(&mut recorder), 1);
    assert_eq!(recorder.command_count(), 0);

    coordinator.set_debug_settings(DebugDrawSettings {
        categories: "Suspension".into(),
        thickness_scale: 0.5,
        ..Default::default()
    });
    coordinator.build_step_input();
    worker.step(Some(&mut world), DT)?;
    coordinator.consume_outputs(&mut recorder);
    assert_eq!(recorder.command_count(), 8);
    for command in recorder.commands() {
        match command.shape {
            DebugDrawShape::Line => assert_relative_eq!(command.thickness, 1.0),
            DebugDrawShape::Arrow => assert_relative_eq!(command.thickness, 1.25),
            other => panic!("unexpected {other:?}"),
        }
    }
    Ok(())
}

#[test]
fn missing_scene_fails_without_consuming_the_snapshot() -> anyhow::Result<()> {
    let (mut coordinator, mut worker, mut world) = setup();
    let chassis = chassis_at(&mut world, 0.0);
    let car = TestCar::on(Some(chassis.index));
    coordinator.register(&car);
    coordinator.build_step_input();

    let err = worker.step::<RapierScene>(None, DT).unwrap_err();
    assert_eq!(err, StepError::SceneUnavailable);

    let report = worker.step(Some(&mut world), DT)?;
    assert_eq!(report.timestamp, Some(1));
    assert_eq!(report.stepped, 1);
    Ok(())
}

#[test]
fn vehicle_without_body_is_skipped() -> anyhow::Result<()> {
    let (mut coordinator, mut worker, mut world) = setup();
    let car = TestCar::on(None);
    let id = coordinator.register(&car);

    coordinator.build_step_input();
    let report = worker.step(Some(&mut world), DT)?;
    assert_eq!(report.stepped, 0);
    assert_eq!(report.skipped, 1);
    assert!(report.published);

    assert_eq!(coordinator.consume_outputs(&mut ()), 1);
    assert!(coordinator.latest_wheels(id).is_none());
    Ok(())
}

#[test]
fn dropped_actor_leaves_an_empty_snapshot() -> anyhow::Result<()> {
    let (mut coordinator, mut worker, mut world) = setup();
    let car = TestCar::on(None);
    let id = coordinator.register(&car);
    drop(car);

    let input = coordinator.build_step_input();
    assert!(input.vehicles.is_empty());

    let report = worker.step(Some(&mut world), DT)?;
    assert!(!report.published);
    assert!(worker.cache().contains(&id));
    Ok(())
}

#[test]
fn shutdown_detaches_the_worker() -> anyhow::Result<()> {
    let (mut coordinator, mut worker, mut world) = setup();
    let chassis = chassis_at(&mut world, 0.0);
    let car = TestCar::on(Some(chassis.index));
    coordinator.register(&car);
    coordinator.build_step_input();

    coordinator.shutdown();
    assert!(coordinator.is_empty());
    assert!(worker.step(Some(&mut world), DT)?.is_idle());
    Ok(())
}

#[test]
fn sequential_and_parallel_workers_push_identical_forces() -> anyhow::Result<()> {
    let mut forces = Vec::new();
    for force_single_thread in [true, false] {
        let config = DamperConfig {
            worker: WorkerSettings {
                force_single_thread,
                ..Default::default()
            },
            ..Default::default()
        };
        let (mut coordinator, mut worker) = pair(&config);
        let mut world = RapierScene::default();
        let mut cars = Vec::new();
        let mut chassis = Vec::new();
        for i in 0..16 {
            let body = chassis_at(&mut world, i as f32 * 500.0);
            let car = TestCar::on(Some(body.index));
            coordinator.register(&car);
            cars.push(car);
            chassis.push(body);
        }

        let mut run = Vec::new();
        for _ in 0..10 {
            coordinator.build_step_input();
            worker.step(Some(&mut world), DT)?;
            run.extend(chassis.iter().map(|&body| world.accumulated_force(body)));
            world.step(DT);
        }
        forces.push(run);
    }

    assert_eq!(forces[0], forces[1]);
    Ok(())
}

#[test]
fn dispatch_switches_between_steps_without_changing_forces() -> anyhow::Result<()> {
    let run = |switching: bool| -> anyhow::Result<(Vec<Option<Vec3>>, Vec<&'static str>)> {
        let (mut coordinator, mut worker, mut world) = setup();
        let mut cars = Vec::new();
        let mut chassis = Vec::new();
        for i in 0..8 {
            let body = chassis_at(&mut world, i as f32 * 500.0);
            let car = TestCar::on(Some(body.index));
            coordinator.register(&car);
            cars.push(car);
            chassis.push(body);
        }

        let mut forces = Vec::new();
        let mut strategies = Vec::new();
        for tick in 0..6 {
            if switching {
                worker.set_settings(WorkerSettings {
                    force_single_thread: tick % 2 == 1,
                    ..worker.settings().clone()
                });
                assert_eq!(worker.settings().force_single_thread, tick % 2 == 1);
            }
            strategies.push(worker.strategy_name());
            coordinator.build_step_input();
            worker.step(Some(&mut world), DT)?;
            forces.extend(chassis.iter().map(|&body| world.accumulated_force(body)));
            world.step(DT);
        }
        Ok((forces, strategies))
    };

    let (steady, _) = run(false)?;
    let (switched, strategies) = run(true)?;
    assert_eq!(switched, steady);

    let threaded = if cfg!(feature = "parallel") { "Parallel" } else { "Sequential" };
    assert_eq!(
        strategies,
        vec![threaded, "Sequential", threaded, "Sequential", threaded, "Sequential"]
    );
    Ok(())
}

#[test]
fn worker_metrics_follow_the_steps() -> anyhow::Result<()> {
    let registry = MetricsRegistry::new();
    let (coordinator, worker) = pair(&DamperConfig::default());
    let mut coordinator = coordinator.with_telemetry(&registry)?;
    let mut worker = worker.with_telemetry(&registry)?;
    let mut world = RapierScene::default();
    let chassis = chassis_at(&mut world, 0.0);
    let car = TestCar::on(Some(chassis.index));
    coordinator.register(&car);

    for _ in 0..2 {
        coordinator.build_step_input();
        worker.step(Some(&mut world), DT)?;
    }
    coordinator.consume_outputs(&mut ());

    let snapshot = registry.snapshot();
    let value = |name: &str| snapshot.iter().find(|m| m.id == name).map(|m| m.value);
    assert_eq!(value("worker:handles_resolved"), Some(1.0));
    assert_eq!(value("worker:vehicles"), Some(1.0));
    assert_eq!(value("worker:desyncs"), Some(0.0));
    assert_eq!(value("coordinator:outputs_drained"), Some(2.0));
    assert_eq!(
        snapshot.iter().find(|m| m.id == "worker:step_time").and_then(|m| m.count),
        Some(2)
    );
    Ok(())
}
