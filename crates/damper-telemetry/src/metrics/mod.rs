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

//! Metric identifiers, values and errors.

pub mod registry;

use serde::Serialize;
use std::collections::VecDeque;
use std::fmt::{self, Display};
use std::time::Instant;
use thiserror::Error;

/// Number of raw samples a histogram keeps; older ones are discarded while
/// bucket counts keep accumulating.
pub const HISTOGRAM_SAMPLE_WINDOW: usize = 1024;

/// A structured metric identifier: namespace, name and sorted labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MetricId {
    /// Subsystem, e.g. `"worker"`.
    pub namespace: String,
    /// Metric name, e.g. `"step_time"`.
    pub name: String,
    /// Key-value labels, sorted by key.
    pub labels: Vec<(String, String)>,
}

impl MetricId {
    /// Creates an id without labels.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            labels: Vec::new(),
        }
    }

    /// Adds a label, keeping labels sorted by key.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push((key.into(), value.into()));
        self.labels.sort_by(|a, b| a.0.cmp(&b.0));
        self
    }
}

impl Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)?;
        if !self.labels.is_empty() {
            let labels: Vec<String> = self.labels.iter().map(|(k, v)| format!("{k}={v}")).collect();
            write!(f, "[{}]", labels.join(","))?;
        }
        Ok(())
    }
}

/// Kind of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetricType {
    /// Monotonic count.
    Counter,
    /// Value that goes up and down.
    Gauge,
    /// Distribution of samples over fixed buckets.
    Histogram,
}

/// Current value of a metric.
#[derive(Debug, Clone)]
pub enum MetricValue {
    /// Counter value.
    Counter(u64),
    /// Gauge value.
    Gauge(f64),
    /// Histogram state.
    Histogram {
        /// The most recent samples, oldest first.
        samples: VecDeque<f64>,
        /// Upper bound of each bucket.
        bucket_bounds: Vec<f64>,
        /// Cumulative number of samples `<=` each bound.
        bucket_counts: Vec<u64>,
        /// Number of samples ever recorded.
        count: u64,
        /// Sum of every sample ever recorded.
        sum: f64,
    },
}

impl MetricValue {
    /// The [`MetricType`] of this value.
    pub fn metric_type(&self) -> MetricType {
        match self {
            MetricValue::Counter(_) => MetricType::Counter,
            MetricValue::Gauge(_) => MetricType::Gauge,
            MetricValue::Histogram { .. } => MetricType::Histogram,
        }
    }

    /// Counter value, if this is a counter.
    pub fn as_counter(&self) -> Option<u64> {
        match self {
            MetricValue::Counter(v) => Some(*v),
            _ => None,
        }
    }

    /// Gauge value, if this is a gauge.
    pub fn as_gauge(&self) -> Option<f64> {
        match self {
            MetricValue::Gauge(v) => Some(*v),
            _ => None,
        }
    }

    /// Mean of every recorded sample, if this is a non-empty histogram.
    pub fn histogram_mean(&self) -> Option<f64> {
        match self {
            MetricValue::Histogram { count, sum, .. } if *count > 0 => Some(sum / *count as f64),
            _ => None,
        }
    }

    /// Adds a sample. Fails on anything but a histogram.
    pub(crate) fn observe(&mut self, sample: f64) -> MetricsResult<()> {
        match self {
            MetricValue::Histogram {
                samples,
                bucket_bounds,
                bucket_counts,
                count,
                sum,
            } => {
                if samples.len() == HISTOGRAM_SAMPLE_WINDOW {
                    samples.pop_front();
                }
                samples.push_back(sample);
                for (bound, bucket) in bucket_bounds.iter().zip(bucket_counts.iter_mut()) {
                    if sample <= *bound {
                        *bucket += 1;
                    }
                }
                *count += 1;
                *sum += sample;
                Ok(())
            }
            other => Err(MetricsError::TypeMismatch {
                expected: MetricType::Histogram,
                found: other.metric_type(),
            }),
        }
    }
}

/// A metric with its metadata.
#[derive(Debug, Clone)]
pub struct Metric {
    /// Identifier.
    pub id: MetricId,
    /// What it measures.
    pub description: String,
    /// Unit, e.g. `"ms"`.
    pub unit: String,
    /// Current value.
    pub value: MetricValue,
    /// Last time the value changed.
    pub last_updated: Instant,
}

impl Metric {
    fn with_value(id: MetricId, description: impl Into<String>, unit: impl Into<String>, value: MetricValue) -> Self {
        Self {
            id,
            description: description.into(),
            unit: unit.into(),
            value,
            last_updated: Instant::now(),
        }
    }

    /// A counter starting at `initial_value`.
    pub fn new_counter(id: MetricId, description: impl Into<String>, initial_value: u64) -> Self {
        Self::with_value(id, description, "count", MetricValue::Counter(initial_value))
    }

    /// A gauge starting at `initial_value`.
    pub fn new_gauge(id: MetricId, description: impl Into<String>, unit: impl Into<String>, initial_value: f64) -> Self {
        Self::with_value(id, description, unit, MetricValue::Gauge(initial_value))
    }

    /// An empty histogram with the given bucket upper bounds.
    pub fn new_histogram(
        id: MetricId,
        description: impl Into<String>,
        unit: impl Into<String>,
        bucket_bounds: Vec<f64>,
    ) -> Self {
        let bucket_counts = vec![0; bucket_bounds.len()];
        Self::with_value(
            id,
            description,
            unit,
            MetricValue::Histogram {
                samples: VecDeque::new(),
                bucket_bounds,
                bucket_counts,
                count: 0,
                sum: 0.0,
            },
        )
    }

    /// Marks the metric as just updated.
    pub fn touch(&mut self) {
        self.last_updated = Instant::now();
    }

    /// Serializable summary of the metric.
    pub fn snapshot(&self) -> MetricSnapshot {
        let (value, count) = match &self.value {
            MetricValue::Counter(v) => (*v as f64, None),
            MetricValue::Gauge(v) => (*v, None),
            MetricValue::Histogram { count, .. } => (self.value.histogram_mean().unwrap_or(0.0), Some(*count)),
        };
        MetricSnapshot {
            id: self.id.to_string(),
            metric_type: self.value.metric_type(),
            unit: self.unit.clone(),
            value,
            count,
        }
    }
}

/// Flat, serializable view of a metric. Histograms report their mean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSnapshot {
    /// Formatted metric id.
    pub id: String,
    /// Metric kind.
    pub metric_type: MetricType,
    /// Unit.
    pub unit: String,
    /// Counter or gauge value, or histogram mean.
    pub value: f64,
    /// Histogram sample count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

/// Result alias for metric operations.
pub type MetricsResult<T> = Result<T, MetricsError>;

/// Errors of the metrics system.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    /// No metric with this id is registered.
    #[error("metric not found: {0}")]
    MetricNotFound(MetricId),
    /// The operation does not fit the metric's type.
    #[error("type mismatch: expected {expected:?}, found {found:?}")]
    TypeMismatch {
        /// Type the operation needs.
        expected: MetricType,
        /// Type actually registered.
        found: MetricType,
    },
    /// The storage layer failed.
    #[error("storage error: {0}")]
    StorageError(String),
}
