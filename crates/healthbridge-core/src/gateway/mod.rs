//! Store gateway: the one seam between the bridge and a health store.
//!
//! [`HealthStore`] is implemented by whatever owns the data (the host
//! platform, the local SQLite store, an in-memory fake). [`StoreGateway`]
//! wraps a single store instance, classifies its failures into
//! [`BridgeError`]s and is shared by reference across sessions.
//!
//! Authorization is opaque by contract: a store may grant or deny each type
//! silently. Denied types show up later as empty query results, never as a
//! failed authorization request.

pub mod memory;

pub use memory::InMemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::catalog::MetricType;
use crate::error::{BridgeError, StoreError};
use crate::sample::Sample;

/// A permissioned health data store.
#[async_trait]
pub trait HealthStore: Send + Sync {
    /// Whether the store knows this metric type at all.
    fn supports(&self, metric: MetricType) -> bool;

    /// Ask for write access to `share` and read access to `read`.
    async fn request_authorization(
        &self,
        share: &BTreeSet<MetricType>,
        read: &BTreeSet<MetricType>,
    ) -> Result<(), StoreError>;

    /// Samples of `metric` whose interval intersects `[start, end]`,
    /// newest start first.
    async fn query(
        &self,
        metric: MetricType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Sample>, StoreError>;

    /// Persist a batch of samples.
    async fn save(&self, samples: &[Sample]) -> Result<(), StoreError>;
}

/// Handle to a metric type the store supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeType(MetricType);

impl NativeType {
    pub fn metric(&self) -> MetricType {
        self.0
    }
}

/// Shared front door to one health store.
#[derive(Clone)]
pub struct StoreGateway {
    store: Arc<dyn HealthStore>,
}

impl StoreGateway {
    pub fn new(store: Arc<dyn HealthStore>) -> Self {
        Self { store }
    }

    /// The store's handle for `metric`, or `None` if unsupported.
    pub fn native_type(&self, metric: MetricType) -> Option<NativeType> {
        self.store.supports(metric).then_some(NativeType(metric))
    }

    /// Request read and write access for exactly the given types.
    ///
    /// Types the store does not support are left out of the request.
    pub async fn request_authorization(
        &self,
        types: impl IntoIterator<Item = MetricType>,
    ) -> Result<(), BridgeError> {
        let requested: BTreeSet<MetricType> = types
            .into_iter()
            .filter_map(|m| self.native_type(m))
            .map(|n| n.metric())
            .collect();
        if requested.is_empty() {
            debug!("authorization request with no supported types");
            return Ok(());
        }

        self.store
            .request_authorization(&requested, &requested)
            .await
            .map_err(|e| {
                warn!(error = %e, "authorization request failed");
                BridgeError::Authorization(e.to_string())
            })?;
        info!(types = requested.len(), "authorization requested");
        Ok(())
    }

    /// Samples of `metric` intersecting `[start, end]`, newest first.
    ///
    /// A reversed window is empty and never reaches the store.
    pub async fn query(
        &self,
        metric: MetricType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Sample>, BridgeError> {
        let native = self.native_type(metric).ok_or_else(|| {
            BridgeError::DataUnavailable(format!("{metric} is not supported by this store"))
        })?;
        if start > end {
            debug!(%metric, %start, %end, "empty query window");
            return Ok(Vec::new());
        }

        let samples = self
            .store
            .query(native.metric(), start, end)
            .await
            .map_err(|e| {
                warn!(%metric, error = %e, "query failed");
                BridgeError::DataUnavailable(e.to_string())
            })?;
        debug!(%metric, count = samples.len(), "query complete");
        Ok(samples)
    }

    /// Save a batch. On failure, any subset of the batch may have been
    /// persisted; the store does not say which.
    pub async fn save(&self, samples: &[Sample]) -> Result<(), BridgeError> {
        self.store.save(samples).await.map_err(|e| {
            warn!(count = samples.len(), error = %e, "save failed");
            BridgeError::Save(e.to_string())
        })?;
        info!(count = samples.len(), "samples saved");
        Ok(())
    }
}
