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

//! # Damper Lanes
//!
//! Hot-path execution pipelines of the suspension worker.
//!
//! A lane is a swappable strategy for one performance-critical task. This
//! crate holds the per-wheel suspension solver, the worker's per-vehicle state
//! cache, and the strategies that fan vehicle jobs out over threads.

#![warn(missing_docs)]

pub mod dispatch_lane;
pub mod suspension_lane;
pub mod vehicle_lane;

pub use dispatch_lane::{default_dispatch, DispatchLane, SequentialDispatch};
#[cfg(feature = "parallel")]
pub use dispatch_lane::ParallelDispatch;
pub use suspension_lane::{SuspensionJob, SuspensionSolver};
pub use vehicle_lane::{
    HandleResolution, PreparedStep, ReconcileSummary, VehiclePhysicsData, VehicleStateCache,
};
