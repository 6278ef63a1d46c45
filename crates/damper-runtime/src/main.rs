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

//! Drives a small fleet of vehicles through the suspension pipeline.
//!
//! The coordinator runs on the main thread, the worker and the rapier scene
//! on a physics thread. Both tick at 60 Hz without waiting on each
//! other. At the end the metrics snapshot is printed as JSON.
//!
//! Usage: `damper-runtime [CONFIG.ron|CONFIG.json] [--ticks N] [--vehicles N]`

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use damper_agents::{pair, VehicleActor, VehicleCoordinator};
use damper_core::config::DamperConfig;
use damper_core::math::{RigidTransform, Vec3};
use damper_core::physics::{BodyIndex, PhysicsQuery};
use damper_core::vehicle::{PerWheel, SuspensionConfig, VehicleId, WheelPosition};
use damper_infra::{BodyDesc, LogDebugRenderer, RapierScene};
use damper_telemetry::MetricsRegistry;

const TICK: Duration = Duration::from_micros(16_667);
const CHASSIS_MASS: f32 = 10.0;
const CHASSIS_HALF_EXTENTS: Vec3 = Vec3::new(120.0, 20.0, 170.0);
const SPAWN_HEIGHT: f32 = 100.0;
const SPACING: f32 = 500.0;

struct Options {
    config: Option<PathBuf>,
    ticks: u32,
    vehicles: u32,
}

fn parse_args() -> Result<Options> {
    let mut options = Options {
        config: None,
        ticks: 240,
        vehicles: 4,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--ticks" => {
                let value = args.next().context("--ticks needs a value")?;
                options.ticks = value.parse().with_context(|| format!("invalid tick count '{value}'"))?;
            }
            "--vehicles" => {
                let value = args.next().context("--vehicles needs a value")?;
                options.vehicles = value
                    .parse()
                    .with_context(|| format!("invalid vehicle count '{value}'"))?;
            }
            flag if flag.starts_with("--") => bail!("unknown flag '{flag}'"),
            path => options.config = Some(PathBuf::from(path)),
        }
    }
    Ok(options)
}

fn load_config(path: Option<&Path>) -> Result<DamperConfig> {
    let Some(path) = path else {
        log::info!("No configuration file given; using defaults.");
        return Ok(DamperConfig::default());
    };
    let source = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let config = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => DamperConfig::from_json_str(&source),
        _ => DamperConfig::from_ron_str(&source),
    }
    .with_context(|| format!("failed to load {}", path.display()))?;
    log::info!("Loaded configuration from {}.", path.display());
    Ok(config)
}

/// A rigid four-wheeled car bound to one chassis body.
struct DemoCar {
    body: BodyIndex,
    suspensions: PerWheel<SuspensionConfig>,
}

impl VehicleActor for DemoCar {
    fn body_index(&self) -> Option<BodyIndex> {
        Some(self.body)
    }

    fn suspension(&self, wheel: WheelPosition) -> SuspensionConfig {
        self.suspensions[wheel]
    }
}

fn wheel_offset(wheel: WheelPosition) -> Vec3 {
    match wheel {
        WheelPosition::FrontLeft => Vec3::new(-100.0, 0.0, 150.0),
        WheelPosition::FrontRight => Vec3::new(100.0, 0.0, 150.0),
        WheelPosition::RearLeft => Vec3::new(-100.0, 0.0, -150.0),
        WheelPosition::RearRight => Vec3::new(100.0, 0.0, -150.0),
    }
}

fn log_compression(coordinator: &VehicleCoordinator, ids: &[VehicleId], tick: u32) {
    for id in ids {
        match coordinator.latest_wheels(*id) {
            Some(wheels) => {
                let mean = wheels.iter().map(|(_, s)| s.compression_ratio).sum::<f32>() / 4.0;
                log::info!("tick {tick}: vehicle {id} mean compression {mean:.3}");
            }
            None => log::info!("tick {tick}: vehicle {id} has no results yet"),
        }
    }
}

fn main() -> Result<()> {
    damper_telemetry::init_logging("info");
    let options = parse_args()?;
    let config = load_config(options.config.as_deref())?;

    let registry = MetricsRegistry::new();
    let (coordinator, worker) = pair(&config);
    let mut coordinator = coordinator.with_telemetry(&registry)?;
    let mut worker = worker.with_telemetry(&registry)?;

    let mut world = RapierScene::default();
    let mut cars = Vec::new();
    let mut ids = Vec::new();
    let mut chassis = Vec::new();
    for i in 0..options.vehicles {
        let spawn = Vec3::new(i as f32 * SPACING, SPAWN_HEIGHT, 0.0);
        let body = world.add_body(BodyDesc::new(
            RigidTransform::from_translation(spawn),
            CHASSIS_MASS,
            CHASSIS_HALF_EXTENTS,
        ));
        let car = Arc::new(DemoCar {
            body: body.index,
            suspensions: PerWheel::from_fn(|wheel| {
                SuspensionConfig::new(RigidTransform::from_translation(wheel_offset(wheel)), config.suspension)
            }),
        });
        ids.push(coordinator.register(&car));
        cars.push(car);
        chassis.push(body);
    }
    log::info!(
        "Spawned {} vehicles; running {} ticks with {} dispatch.",
        options.vehicles,
        options.ticks,
        worker.strategy_name()
    );

    let running = AtomicBool::new(true);
    let running = &running;
    let dt = TICK.as_secs_f32();
    let mut renderer = LogDebugRenderer::new();

    let world = thread::scope(|scope| -> Result<RapierScene> {
        let physics = scope.spawn(move || -> Result<RapierScene> {
            let mut steps = 0u64;
            let mut idle = 0u64;
            while running.load(Ordering::Acquire) {
                if worker.step(Some(&mut world), dt)?.is_idle() {
                    idle += 1;
                }
                world.step(dt);
                steps += 1;
                thread::sleep(TICK);
            }
            log::info!("Physics thread stopped after {steps} steps ({idle} without a new snapshot).");
            Ok(world)
        });

        for tick in 1..=options.ticks {
            coordinator.build_step_input();
            thread::sleep(TICK);
            coordinator.consume_outputs(&mut renderer);
            if tick % 60 == 0 {
                log_compression(&coordinator, &ids, tick);
            }
        }
        running.store(false, Ordering::Release);

        physics.join().map_err(|_| anyhow!("physics thread panicked"))?
    })?;

    for (id, body) in ids.iter().zip(&chassis) {
        if let Some(transform) = world.body_transform(*body) {
            log::info!("Vehicle {id} chassis rests at y = {:.1}.", transform.translation.y);
        }
    }
    log::info!("{} debug commands forwarded to the renderer.", renderer.submitted());

    coordinator.shutdown();
    drop(cars);

    println!("{}", registry.snapshot_json()?);
    Ok(())
}
