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

//! # Damper Agents
//!
//! The two orchestrators of the suspension pipeline and the constructor that
//! pairs them:
//!
//! - [`VehicleCoordinator`] lives on the gameplay side. It owns the vehicle
//!   registry, publishes a snapshot once per gameplay tick and consumes step
//!   results.
//! - [`SuspensionWorker`] lives on the physics side. It owns per-vehicle
//!   suspension state and runs the solver once per physics step.
//!
//! The only thing the two share is an [`ExchangeChannel`].

#![warn(missing_docs)]

pub mod coordinator;
pub mod worker;

use std::sync::Arc;

use damper_core::config::DamperConfig;
use damper_core::exchange::ExchangeChannel;

pub use coordinator::{VehicleActor, VehicleCoordinator};
pub use worker::{StepError, StepReport, SuspensionWorker};

/// Creates a coordinator and a worker connected by a fresh channel.
///
/// The coordinator takes the debug draw settings of `config`, the worker its
/// worker settings.
pub fn pair(config: &DamperConfig) -> (VehicleCoordinator, SuspensionWorker) {
    let channel = Arc::new(ExchangeChannel::new());
    let coordinator = VehicleCoordinator::new(channel.clone(), config.debug_draw.clone());
    let worker = SuspensionWorker::new(channel, config.worker.clone());
    (coordinator, worker)
}
