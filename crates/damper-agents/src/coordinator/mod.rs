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

//! The vehicle coordinator: the gameplay-side half of the pipeline.

mod agent;

pub use agent::VehicleCoordinator;

use damper_core::physics::BodyIndex;
use damper_core::vehicle::{SuspensionConfig, WheelPosition};

/// A gameplay vehicle as seen by the coordinator.
///
/// The coordinator only keeps weak references to actors and reads them by
/// value while building a snapshot; nothing else crosses into the worker.
pub trait VehicleActor: Send + Sync {
    /// Stable index of the chassis body, if the vehicle currently has one.
    fn body_index(&self) -> Option<BodyIndex>;

    /// Current configuration of one suspension.
    fn suspension(&self, wheel: WheelPosition) -> SuspensionConfig;
}
