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

use damper_core::debug::{DebugDrawCommand, DebugRenderSink};
use damper_core::vehicle::VehicleId;

/// A sink that keeps every submission, for tests and tooling.
#[derive(Debug, Clone, Default)]
pub struct RecordingDebugRenderer {
    batches: Vec<(VehicleId, Vec<DebugDrawCommand>)>,
}

impl RecordingDebugRenderer {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every submission, in order.
    pub fn batches(&self) -> &[(VehicleId, Vec<DebugDrawCommand>)] {
        &self.batches
    }

    /// Every recorded command, in submission order.
    pub fn commands(&self) -> impl Iterator<Item = &DebugDrawCommand> + '_ {
        self.batches.iter().flat_map(|(_, commands)| commands.iter())
    }

    /// Commands submitted for one vehicle.
    pub fn for_vehicle(&self, vehicle: VehicleId) -> Vec<&DebugDrawCommand> {
        self.batches
            .iter()
            .filter(|(id, _)| *id == vehicle)
            .flat_map(|(_, commands)| commands.iter())
            .collect()
    }

    /// Number of recorded commands.
    pub fn command_count(&self) -> usize {
        self.batches.iter().map(|(_, commands)| commands.len()).sum()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&mut self) {
        self.batches.clear();
    }
}

impl DebugRenderSink for RecordingDebugRenderer {
    fn submit(&mut self, vehicle: VehicleId, commands: &[DebugDrawCommand]) {
        self.batches.push((vehicle, commands.to_vec()));
    }
}
