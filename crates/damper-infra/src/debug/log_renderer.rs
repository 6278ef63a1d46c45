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

/// A sink that writes every command to the `log` facade at debug level.
#[derive(Debug, Default)]
pub struct LogDebugRenderer {
    submitted: usize,
}

impl LogDebugRenderer {
    /// Creates a renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of commands received.
    pub fn submitted(&self) -> usize {
        self.submitted
    }
}

impl DebugRenderSink for LogDebugRenderer {
    fn submit(&mut self, vehicle: VehicleId, commands: &[DebugDrawCommand]) {
        for command in commands {
            log::debug!(
                "[{}] {vehicle}: {:?} {:?} -> {:?} ({:.2}s)",
                command.category,
                command.shape,
                command.start,
                command.end,
                command.duration
            );
        }
        self.submitted += commands.len();
    }
}
