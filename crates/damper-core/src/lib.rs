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

//! # Damper Core
//!
//! Foundational crate containing the math primitives, the physics query
//! contract, the vehicle data model, debug-draw types and the channel that
//! carries step packets between the coordinator and the worker.

#![warn(missing_docs)]

pub mod config;
pub mod debug;
pub mod exchange;
pub mod math;
pub mod physics;
pub mod vehicle;

pub use config::DamperConfig;
pub use exchange::{ExchangeChannel, StepInput, StepOutput, VehicleOutput};
pub use vehicle::{VehicleConfig, VehicleId, WheelPosition};
