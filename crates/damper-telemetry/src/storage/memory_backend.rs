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

use std::collections::HashMap;
use std::sync::RwLock;

use super::backend::MetricsBackend;
use crate::metrics::{Metric, MetricId, MetricsError, MetricsResult};

/// Process-local metrics storage behind a `RwLock<HashMap>`.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    storage: RwLock<HashMap<MetricId, Metric>>,
}

impl InMemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Metrics registered under `namespace`.
    pub fn metrics_in_namespace(&self, namespace: &str) -> Vec<Metric> {
        self.storage
            .read()
            .map(|storage| {
                storage
                    .values()
                    .filter(|metric| metric.id.namespace == namespace)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn lock_error(what: &str) -> MetricsError {
    MetricsError::StorageError(format!("failed to acquire {what} lock"))
}

impl MetricsBackend for InMemoryBackend {
    fn put_metric(&self, metric: Metric) -> MetricsResult<()> {
        let mut storage = self.storage.write().map_err(|_| lock_error("write"))?;
        storage.insert(metric.id.clone(), metric);
        Ok(())
    }

    fn get_metric(&self, id: &MetricId) -> MetricsResult<Metric> {
        let storage = self.storage.read().map_err(|_| lock_error("read"))?;
        storage
            .get(id)
            .cloned()
            .ok_or_else(|| MetricsError::MetricNotFound(id.clone()))
    }

    fn update(&self, id: &MetricId, f: &mut dyn FnMut(&mut Metric) -> MetricsResult<()>) -> MetricsResult<()> {
        let mut storage = self.storage.write().map_err(|_| lock_error("write"))?;
        let metric = storage
            .get_mut(id)
            .ok_or_else(|| MetricsError::MetricNotFound(id.clone()))?;
        f(metric)
    }

    fn contains_metric(&self, id: &MetricId) -> bool {
        self.storage
            .read()
            .map(|storage| storage.contains_key(id))
            .unwrap_or(false)
    }

    fn list_all_metrics(&self) -> Vec<Metric> {
        self.storage
            .read()
            .map(|storage| storage.values().cloned().collect())
            .unwrap_or_default()
    }

    fn metric_count(&self) -> usize {
        self.storage.read().map(|storage| storage.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricValue;

    #[test]
    fn put_get_and_update() {
        let backend = InMemoryBackend::new();
        let id = MetricId::new("worker", "steps");
        backend
            .put_metric(Metric::new_counter(id.clone(), "Steps", 0))
            .expect("put");

        assert_eq!(backend.increment_counter(&id, 3), Ok(3));
        assert_eq!(backend.get_metric(&id).expect("get").value.as_counter(), Some(3));
        assert!(backend.set_gauge(&id, 1.0).is_err());
        assert_eq!(backend.metric_count(), 1);
    }

    #[test]
    fn missing_metric_is_reported() {
        let backend = InMemoryBackend::new();
        let id = MetricId::new("nope", "nothing");
        assert_eq!(
            backend.increment_counter(&id, 1),
            Err(MetricsError::MetricNotFound(id.clone()))
        );
        assert!(!backend.contains_metric(&id));
    }

    #[test]
    fn namespace_filter() {
        let backend = InMemoryBackend::new();
        backend
            .put_metric(Metric::new_gauge(MetricId::new("worker", "a"), "", "", 0.0))
            .expect("put");
        backend
            .put_metric(Metric::new_gauge(MetricId::new("coordinator", "b"), "", "", 0.0))
            .expect("put");
        let worker = backend.metrics_in_namespace("worker");
        assert_eq!(worker.len(), 1);
        assert!(matches!(worker[0].value, MetricValue::Gauge(_)));
    }
}
