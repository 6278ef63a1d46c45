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

use rayon::prelude::*;

use damper_core::physics::PhysicsQuery;

use super::DispatchLane;
use crate::suspension_lane::SuspensionJob;

/// Fans jobs out over the rayon thread pool.
///
/// Batches smaller than `min_batch` run inline; spawning work for a couple of
/// vehicles costs more than it saves.
#[derive(Debug, Clone, Copy)]
pub struct ParallelDispatch {
    min_batch: usize,
}

impl ParallelDispatch {
    /// Creates a strategy that only fans out batches of at least `min_batch`
    /// jobs.
    pub fn with_min_batch(min_batch: usize) -> Self {
        Self { min_batch }
    }
}

impl Default for ParallelDispatch {
    fn default() -> Self {
        Self::with_min_batch(2)
    }
}

impl DispatchLane for ParallelDispatch {
    fn strategy_name(&self) -> &'static str {
        "Parallel"
    }

    fn dispatch(&self, jobs: &mut [SuspensionJob<'_>], query: &dyn PhysicsQuery, dt: f32) {
        if jobs.len() < self.min_batch {
            jobs.iter_mut().for_each(|job| job.run(query, dt));
            return;
        }
        jobs.par_iter_mut().for_each(|job| job.run(query, dt));
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{fleet, run};
    use super::*;
    use crate::dispatch_lane::SequentialDispatch;

    #[test]
    fn parallel_matches_sequential_bit_for_bit() {
        let fleet = fleet(64);
        let sequential = run(&SequentialDispatch, &fleet, 5);
        let parallel = run(&ParallelDispatch::with_min_batch(1), &fleet, 5);
        assert_eq!(sequential.len(), 64 * 4 * 5);
        assert_eq!(sequential, parallel);
    }
}
