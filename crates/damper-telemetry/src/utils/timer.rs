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

//! RAII timers that record scope durations into histograms.

use std::time::{Duration, Instant};

use crate::metrics::registry::HistogramHandle;

/// A started wall-clock measurement.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    /// Starts measuring now.
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }

    /// Time since the stopwatch was started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time since start, in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Records the lifetime of a scope, in milliseconds, into a histogram when
/// dropped. Early returns are measured too.
#[derive(Debug)]
pub struct ScopedMetricTimer<'a> {
    stopwatch: Stopwatch,
    histogram: Option<&'a HistogramHandle>,
}

impl<'a> ScopedMetricTimer<'a> {
    /// Starts timing into `histogram`.
    pub fn new(histogram: &'a HistogramHandle) -> Self {
        Self::maybe(Some(histogram))
    }

    /// Starts timing; records nothing when `histogram` is `None`.
    pub fn maybe(histogram: Option<&'a HistogramHandle>) -> Self {
        Self {
            stopwatch: Stopwatch::new(),
            histogram,
        }
    }
}

impl Drop for ScopedMetricTimer<'_> {
    fn drop(&mut self) {
        if let Some(histogram) = self.histogram {
            if let Err(e) = histogram.observe(self.stopwatch.elapsed_ms()) {
                log::warn!("Failed to record {}: {e}", histogram.id());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MetricsRegistry;

    #[test]
    fn records_on_drop() {
        let registry = MetricsRegistry::new();
        let histogram = registry
            .register_histogram("test", "scope", "", "ms", vec![1000.0])
            .unwrap();
        {
            let _timer = ScopedMetricTimer::new(&histogram);
        }
        {
            let _timer = ScopedMetricTimer::maybe(None);
        }
        assert_eq!(histogram.count().unwrap(), 1);
    }
}
