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

//! Dispatch Lane
//!
//! Strategies that run a batch of independent [`SuspensionJob`]s. Jobs never
//! share mutable data, so every strategy yields identical results for the
//! same batch.

#[cfg(feature = "parallel")]
mod parallel;

#[cfg(feature = "parallel")]
pub use parallel::ParallelDispatch;

use std::fmt::Debug;

use damper_core::physics::PhysicsQuery;

use crate::suspension_lane::SuspensionJob;

/// A swappable strategy for running the per-vehicle jobs of a step.
pub trait DispatchLane: Debug + Send + Sync {
    /// Human-readable strategy name, for logs.
    fn strategy_name(&self) -> &'static str;

    /// Runs every job against `query` and returns once all of them finished.
    fn dispatch(&self, jobs: &mut [SuspensionJob<'_>], query: &dyn PhysicsQuery, dt: f32);
}

/// Runs jobs one after another on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialDispatch;

impl DispatchLane for SequentialDispatch {
    fn strategy_name(&self) -> &'static str {
        "Sequential"
    }

    fn dispatch(&self, jobs: &mut [SuspensionJob<'_>], query: &dyn PhysicsQuery, dt: f32) {
        for job in jobs.iter_mut() {
            job.run(query, dt);
        }
    }
}

/// Picks the dispatch strategy for the given settings.
///
/// Without the `parallel` feature every choice is sequential.
pub fn default_dispatch(force_single_thread: bool) -> Box<dyn DispatchLane> {
    #[cfg(feature = "parallel")]
    {
        if !force_single_thread {
            return Box::new(ParallelDispatch::default());
        }
    }
    #[cfg(not(feature = "parallel"))]
    {
        if !force_single_thread {
            log::debug!("Built without the `parallel` feature; dispatching sequentially.");
        }
    }
    Box::new(SequentialDispatch)
}
