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

//! # Damper Telemetry
//!
//! Observability for the suspension pipeline: a metrics registry with typed
//! counter, gauge and histogram handles, RAII scope timers and the logger
//! bootstrap used by binaries.

#![warn(missing_docs)]

pub mod metrics;
pub mod storage;
pub mod utils;

pub use metrics::registry::{CounterHandle, GaugeHandle, HistogramHandle, MetricsRegistry};
pub use metrics::{Metric, MetricId, MetricSnapshot, MetricType, MetricValue, MetricsError, MetricsResult};
pub use storage::memory_backend::InMemoryBackend;
pub use utils::timer::{ScopedMetricTimer, Stopwatch};

/// Installs `env_logger` as the global logger.
///
/// `RUST_LOG` takes precedence; otherwise `default_filter` applies (for
/// example `"info"`). Calling it twice is harmless: the second call is
/// ignored.
pub fn init_logging(default_filter: &str) {
    let result = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .try_init();
    if result.is_ok() {
        log::debug!("Logger initialized (default filter '{default_filter}').");
    }
}
