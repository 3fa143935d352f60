//! In-memory health store for tests and embedding.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use super::HealthStore;
use crate::catalog::MetricType;
use crate::error::StoreError;
use crate::sample::Sample;

#[derive(Default)]
struct State {
    samples: Vec<Sample>,
    readable: BTreeSet<MetricType>,
    shareable: BTreeSet<MetricType>,
    save_calls: Vec<usize>,
}

/// A [`HealthStore`] backed by a `Vec`, with switches for simulating an
/// uncooperative host.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    unsupported: BTreeSet<MetricType>,
    fail_authorization: bool,
    fail_queries: bool,
    fail_saves: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend the host does not know `metric`.
    pub fn without_support(mut self, metric: MetricType) -> Self {
        self.unsupported.insert(metric);
        self
    }

    pub fn failing_authorization(mut self) -> Self {
        self.fail_authorization = true;
        self
    }

    pub fn failing_queries(mut self) -> Self {
        self.fail_queries = true;
        self
    }

    pub fn failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A poisoned lock only means a test panicked mid-call; the data is still usable.
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Seed samples directly, bypassing authorization.
    pub fn insert(&self, samples: impl IntoIterator<Item = Sample>) {
        self.lock().samples.extend(samples);
    }

    pub fn samples(&self) -> Vec<Sample> {
        self.lock().samples.clone()
    }

    pub fn can_read(&self, metric: MetricType) -> bool {
        self.lock().readable.contains(&metric)
    }

    pub fn can_share(&self, metric: MetricType) -> bool {
        self.lock().shareable.contains(&metric)
    }

    /// Batch sizes of every save call received, in order.
    pub fn save_calls(&self) -> Vec<usize> {
        self.lock().save_calls.clone()
    }
}

#[async_trait]
impl HealthStore for InMemoryStore {
    fn supports(&self, metric: MetricType) -> bool {
        !self.unsupported.contains(&metric)
    }

    async fn request_authorization(
        &self,
        share: &BTreeSet<MetricType>,
        read: &BTreeSet<MetricType>,
    ) -> Result<(), StoreError> {
        if self.fail_authorization {
            return Err(StoreError::Unavailable("authorization prompt failed".into()));
        }
        let mut state = self.lock();
        state.shareable.extend(share.iter().copied());
        state.readable.extend(read.iter().copied());
        Ok(())
    }

    async fn query(
        &self,
        metric: MetricType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Sample>, StoreError> {
        if self.fail_queries {
            return Err(StoreError::Unavailable("query failed".into()));
        }
        let state = self.lock();
        if !state.readable.contains(&metric) {
            return Ok(Vec::new());
        }
        let mut found: Vec<Sample> = state
            .samples
            .iter()
            .filter(|s| s.metric() == metric && s.intersects(start, end))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.start().cmp(&a.start()));
        Ok(found)
    }

    async fn save(&self, samples: &[Sample]) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.save_calls.push(samples.len());
        if self.fail_saves {
            return Err(StoreError::Unavailable("write rejected".into()));
        }
        if let Some(denied) = samples.iter().find(|s| !state.shareable.contains(&s.metric())) {
            return Err(StoreError::Denied(format!(
                "not authorized to share {}",
                denied.metric()
            )));
        }
        state.samples.extend(samples.iter().cloned());
        Ok(())
    }
}
