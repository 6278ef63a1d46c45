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

use crate::debug::DebugDrawBuffer;
use crate::vehicle::{PerWheel, VehicleConfig, VehicleId, WheelSample};

/// Snapshot published by the coordinator once per gameplay tick.
///
/// Immutable once published.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepInput {
    /// Monotonically increasing snapshot counter.
    pub timestamp: u64,
    /// Every live vehicle, copied by value.
    pub vehicles: Vec<VehicleConfig>,
    /// Vehicles registered since the previous snapshot.
    pub added: Vec<VehicleId>,
    /// Vehicles unregistered since the previous snapshot.
    pub removed: Vec<VehicleId>,
}

impl StepInput {
    /// Whether the snapshot carries registry changes.
    pub fn has_registry_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

/// Per-vehicle result of one worker step.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleOutput {
    /// Vehicle the result belongs to.
    pub id: VehicleId,
    /// `false` when the vehicle was skipped this step (no data or no body).
    pub stepped: bool,
    /// Per-wheel summary.
    pub wheels: PerWheel<WheelSample>,
    /// Debug commands emitted while solving.
    pub debug: DebugDrawBuffer,
}

impl VehicleOutput {
    /// An output for a vehicle that was not stepped.
    pub fn skipped(id: VehicleId) -> Self {
        Self {
            id,
            stepped: false,
            wheels: PerWheel::default(),
            debug: DebugDrawBuffer::new(),
        }
    }
}

/// Result published by the worker for one consumed [`StepInput`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutput {
    /// Timestamp of the input this output answers.
    pub timestamp: u64,
    /// One entry per snapshot vehicle, in snapshot order.
    pub vehicles: Vec<VehicleOutput>,
}
