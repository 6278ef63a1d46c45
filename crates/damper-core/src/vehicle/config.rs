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

use serde::{Deserialize, Serialize};

use super::{PerWheel, VehicleId, WheelPosition};
use crate::math::RigidTransform;
use crate::physics::BodyIndex;

/// Tunable parameters of one suspension, without its placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuspensionTuning {
    /// Maximum spring travel along the suspension axis.
    pub travel: f32,
    /// Spring constant (force per unit of compression ratio).
    pub spring_stiffness: f32,
    /// Damping coefficient while the spring compresses.
    pub bump_damping: f32,
    /// Damping coefficient while the spring extends.
    pub rebound_damping: f32,
    /// Absolute cap on the force this suspension can produce.
    pub max_force: f32,
    /// Wheel radius, added to `travel` to build the ray length.
    pub wheel_radius: f32,
}

impl SuspensionTuning {
    /// Length of the ground probe: travel plus wheel radius.
    #[inline]
    pub fn ray_length(&self) -> f32 {
        self.travel + self.wheel_radius
    }
}

impl Default for SuspensionTuning {
    fn default() -> Self {
        Self {
            travel: 80.0,
            spring_stiffness: 35_000.0,
            bump_damping: 4_300.0,
            rebound_damping: 3_000.0,
            max_force: 7_500.0,
            wheel_radius: 30.0,
        }
    }
}

/// Immutable per-step configuration of one suspension.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SuspensionConfig {
    /// Attach frame relative to the chassis body frame. Its +Y is the
    /// suspension axis.
    pub attach_local: RigidTransform,
    /// Spring and damper parameters.
    pub tuning: SuspensionTuning,
}

impl SuspensionConfig {
    /// Creates a config attached at `attach_local`.
    pub fn new(attach_local: RigidTransform, tuning: SuspensionTuning) -> Self {
        Self {
            attach_local,
            tuning,
        }
    }
}

/// By-value snapshot of one vehicle, as sent to the worker.
///
/// It holds no reference into gameplay state.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleConfig {
    /// Stable vehicle identity.
    pub id: VehicleId,
    /// Chassis body the forces are applied to, if it currently has one.
    pub body_index: Option<BodyIndex>,
    /// Suspension configuration per corner.
    pub suspensions: PerWheel<SuspensionConfig>,
}

impl VehicleConfig {
    /// Configuration of one corner.
    #[inline]
    pub fn suspension(&self, wheel: WheelPosition) -> &SuspensionConfig {
        &self.suspensions[wheel]
    }
}
