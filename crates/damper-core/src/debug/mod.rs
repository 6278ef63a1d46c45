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

//! Deferred debug drawing.
//!
//! The worker cannot draw: it records [`DebugDrawCommand`]s into a bounded
//! per-vehicle [`DebugDrawBuffer`]. The coordinator filters them through the
//! active [`DebugDrawSettings`] and forwards the survivors to a
//! [`DebugRenderSink`].

mod buffer;
mod category;
mod command;
mod settings;

pub use buffer::{DebugDrawBuffer, MAX_DEBUG_COMMANDS_PER_VEHICLE};
pub use category::{CategoryMask, CategoryParseError, DebugDrawCategory};
pub use command::{DebugDrawCommand, DebugDrawShape};
pub use settings::{DebugDrawFilter, DebugDrawSettings};

use crate::vehicle::VehicleId;

/// Receives the debug commands of one vehicle, already filtered and scaled.
pub trait DebugRenderSink {
    /// Draws `commands` emitted for `vehicle`.
    fn submit(&mut self, vehicle: VehicleId, commands: &[DebugDrawCommand]);
}

/// A sink that discards everything.
impl DebugRenderSink for () {
    fn submit(&mut self, _vehicle: VehicleId, _commands: &[DebugDrawCommand]) {}
}
