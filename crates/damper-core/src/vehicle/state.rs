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

use crate::math::Vec3;

/// Runtime state of one suspension, persisted by the worker between steps.
///
/// The default value is the "no contact" state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SuspensionState {
    /// Whether the last probe hit the ground.
    pub in_contact: bool,
    /// Compression ratio of the previous step, in `[0, 1]`.
    pub previous_compression_ratio: f32,
    /// Spring force of the last step.
    pub spring_force: f32,
    /// Damping force of the last step (signed).
    pub damping_force: f32,
    /// Clamped total force magnitude of the last step.
    pub total_force: f32,
    /// Force vector applied to the chassis on the last step.
    pub force: Vec3,
    /// World point the force was applied at.
    pub force_point: Vec3,
}

impl SuspensionState {
    /// Resets to the no-contact state.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Per-wheel summary reported back to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelSample {
    /// Whether the wheel touched the ground this step.
    pub in_contact: bool,
    /// Compression ratio in `[0, 1]`.
    pub compression_ratio: f32,
    /// Force applied to the chassis.
    pub force: Vec3,
    /// Where the force was applied.
    pub force_point: Vec3,
}

impl From<&SuspensionState> for WheelSample {
    fn from(state: &SuspensionState) -> Self {
        Self {
            in_contact: state.in_contact,
            compression_ratio: state.previous_compression_ratio,
            force: state.force,
            force_point: state.force_point,
        }
    }
}
