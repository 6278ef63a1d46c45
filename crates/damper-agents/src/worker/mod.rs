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

//! The suspension worker: the physics-side half of the pipeline.

mod agent;

pub use agent::SuspensionWorker;

use thiserror::Error;

/// Fatal preconditions of a worker step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StepError {
    /// The step was invoked without a physics scene.
    #[error("no physics scene is available for the suspension step")]
    SceneUnavailable,
}

/// What a single [`SuspensionWorker::step`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Timestamp of the consumed input; `None` when there was nothing to take.
    pub timestamp: Option<u64>,
    /// Vehicles whose suspensions were solved.
    pub stepped: usize,
    /// Snapshot vehicles left out this step.
    pub skipped: usize,
    /// Body handles resolved during this step.
    pub resolved: usize,
    /// The snapshot and the state cache disagreed on the vehicle count.
    pub desync: bool,
    /// An output was queued for the coordinator.
    pub published: bool,
}

impl StepReport {
    /// Report of a step that found no new input.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Whether the step had nothing to do.
    pub fn is_idle(&self) -> bool {
        self.timestamp.is_none()
    }
}
