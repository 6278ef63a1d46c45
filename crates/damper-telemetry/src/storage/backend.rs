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

//! Storage abstraction behind the metrics registry.

use std::fmt::Debug;

use crate::metrics::{Metric, MetricId, MetricType, MetricValue, MetricsError, MetricsResult};

/// Where metrics live.
///
/// Only `update` must be atomic: handles mutate a metric through it from any
/// thread.
pub trait MetricsBackend: Send + Sync + Debug + 'static {
    /// Stores or replaces a metric.
    fn put_metric(&self, metric: Metric) -> MetricsResult<()>;

    /// A copy of the metric with this id.
    fn get_metric(&self, id: &MetricId) -> MetricsResult<Metric>;

    /// Applies `f` to the stored metric under the backend's lock.
    fn update(&self, id: &MetricId, f: &mut dyn FnMut(&mut Metric) -> MetricsResult<()>) -> MetricsResult<()>;

    /// Whether a metric with this id exists.
    fn contains_metric(&self, id: &MetricId) -> bool;

    /// Every stored metric.
    fn list_all_metrics(&self) -> Vec<Metric>;

    /// Number of stored metrics.
    fn metric_count(&self) -> usize;

    /// Adds `delta` to a counter and returns the new value.
    fn increment_counter(&self, id: &MetricId, delta: u64) -> MetricsResult<u64> {
        let mut result = 0;
        self.update(id, &mut |metric: &mut Metric| match &mut metric.value {
            MetricValue::Counter(value) => {
                *value = value.saturating_add(delta);
                result = *value;
                metric.touch();
                Ok(())
            }
            other => Err(MetricsError::TypeMismatch {
                expected: MetricType::Counter,
                found: other.metric_type(),
            }),
        })?;
        Ok(result)
    }

    /// Sets a gauge.
    fn set_gauge(&self, id: &MetricId, value: f64) -> MetricsResult<()> {
        self.update(id, &mut |metric: &mut Metric| match &mut metric.value {
            MetricValue::Gauge(current) => {
                *current = value;
                metric.touch();
                Ok(())
            }
            other => Err(MetricsError::TypeMismatch {
                expected: MetricType::Gauge,
                found: other.metric_type(),
            }),
        })
    }

    /// Adds a sample to a histogram.
    fn record_histogram_sample(&self, id: &MetricId, sample: f64) -> MetricsResult<()> {
        self.update(id, &mut |metric: &mut Metric| {
            metric.value.observe(sample)?;
            metric.touch();
            Ok(())
        })
    }
}
