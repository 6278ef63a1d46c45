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

use tinyvec::ArrayVec;

use super::DebugDrawCommand;

/// Maximum number of commands a single vehicle may emit per step.
pub const MAX_DEBUG_COMMANDS_PER_VEHICLE: usize = 64;

/// Fixed-capacity inline list of debug draw commands.
///
/// Pushes past [`MAX_DEBUG_COMMANDS_PER_VEHICLE`] are dropped and counted.
/// Without the `debug-draw` feature every push is a no-op.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugDrawBuffer {
    commands: ArrayVec<[DebugDrawCommand; MAX_DEBUG_COMMANDS_PER_VEHICLE]>,
    dropped: u32,
}

impl DebugDrawBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether pushes are recorded in this build.
    #[inline]
    pub const fn is_recording() -> bool {
        cfg!(feature = "debug-draw")
    }

    /// Records a command, or drops it when the buffer is full.
    #[inline]
    pub fn push(&mut self, command: DebugDrawCommand) {
        #[cfg(feature = "debug-draw")]
        {
            if self.commands.try_push(command).is_some() {
                self.dropped = self.dropped.saturating_add(1);
            }
        }
        #[cfg(not(feature = "debug-draw"))]
        {
            let _ = command;
        }
    }

    /// Recorded commands, in push order.
    pub fn as_slice(&self) -> &[DebugDrawCommand] {
        self.commands.as_slice()
    }

    /// Number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of commands dropped because the buffer was full.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Empties the buffer and resets the drop counter.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.dropped = 0;
    }
}
