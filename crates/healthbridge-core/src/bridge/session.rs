//! Per-metric export/import session.
//!
//! A session owns the sample list loaded for one metric type and the user's
//! selection within it. Errors are an overlay: a failed load keeps whatever
//! was shown before, and the flagged error stays until dismissed or until
//! the next successful operation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::MetricType;
use crate::codec;
use crate::error::BridgeError;
use crate::gateway::StoreGateway;
use crate::sample::Sample;

/// Where a session is in its load cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Nothing loaded yet.
    Idle,
    /// A query is in flight.
    Loading,
    /// The last successful query's samples, newest first.
    Ready(Vec<Sample>),
    /// The store does not support this metric type.
    Unsupported,
}

/// Outcome of a successful import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub saved: usize,
    pub shifted_to_now: bool,
}

pub struct BridgeSession {
    gateway: StoreGateway,
    metric: MetricType,
    state: SessionState,
    selection: BTreeSet<Uuid>,
    last_error: Option<BridgeError>,
    reset_to_current_time: bool,
}

impl BridgeSession {
    pub fn new(gateway: StoreGateway, metric: MetricType) -> Self {
        let state = if gateway.native_type(metric).is_some() {
            SessionState::Idle
        } else {
            SessionState::Unsupported
        };
        Self {
            gateway,
            metric,
            state,
            selection: BTreeSet::new(),
            last_error: None,
            reset_to_current_time: false,
        }
    }

    pub fn metric(&self) -> MetricType {
        self.metric
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == SessionState::Loading
    }

    pub fn is_supported(&self) -> bool {
        self.state != SessionState::Unsupported
    }

    /// Samples from the last successful load; empty otherwise.
    pub fn samples(&self) -> &[Sample] {
        match &self.state {
            SessionState::Ready(samples) => samples,
            _ => &[],
        }
    }

    pub fn last_error(&self) -> Option<&BridgeError> {
        self.last_error.as_ref()
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    pub fn reset_to_current_time(&self) -> bool {
        self.reset_to_current_time
    }

    /// When set, a single-sample import is moved to end now.
    pub fn set_reset_to_current_time(&mut self, enabled: bool) {
        self.reset_to_current_time = enabled;
    }

    fn flag(&mut self, error: BridgeError) -> BridgeError {
        warn!(metric = %self.metric, %error, "bridge operation failed");
        self.last_error = Some(error.clone());
        error
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Query the store for `[start, end]` and hold the result.
    ///
    /// On failure the previous state is restored and the error flagged.
    /// Unsupported metrics stay unsupported without contacting the store.
    pub async fn load_data(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(), BridgeError> {
        if !self.is_supported() {
            debug!(metric = %self.metric, "load skipped: unsupported type");
            return Ok(());
        }

        let previous = std::mem::replace(&mut self.state, SessionState::Loading);
        match self.gateway.query(self.metric, start, end).await {
            Ok(samples) => {
                debug!(metric = %self.metric, count = samples.len(), "samples loaded");
                self.selection.clear();
                self.last_error = None;
                self.state = SessionState::Ready(samples);
                Ok(())
            }
            Err(e) => {
                self.state = previous;
                Err(self.flag(e))
            }
        }
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn selection(&self) -> &BTreeSet<Uuid> {
        &self.selection
    }

    fn holds(&self, id: Uuid) -> bool {
        self.samples().iter().any(|s| s.uuid() == id)
    }

    /// Select a loaded sample. Returns false if no such sample is held.
    pub fn select(&mut self, id: Uuid) -> bool {
        if self.holds(id) {
            self.selection.insert(id);
            true
        } else {
            false
        }
    }

    pub fn deselect(&mut self, id: Uuid) -> bool {
        self.selection.remove(&id)
    }

    pub fn toggle(&mut self, id: Uuid) -> bool {
        if self.selection.contains(&id) {
            self.selection.remove(&id);
            false
        } else {
            self.select(id)
        }
    }

    pub fn select_all(&mut self) {
        let ids: Vec<Uuid> = self.samples().iter().map(Sample::uuid).collect();
        self.selection.extend(ids);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ------------------------------------------------------------------
    // Export / import
    // ------------------------------------------------------------------

    /// Wire string of the selected samples, in list order.
    ///
    /// `Ok(None)` when nothing is selected.
    pub fn export_selection(&mut self) -> Result<Option<String>, BridgeError> {
        let selected: Vec<Sample> = self
            .samples()
            .iter()
            .filter(|s| self.selection.contains(&s.uuid()))
            .cloned()
            .collect();
        if selected.is_empty() {
            return Ok(None);
        }

        match codec::export_wire(&selected) {
            Ok(wire) => {
                info!(metric = %self.metric, count = selected.len(), "selection exported");
                Ok(Some(wire))
            }
            Err(e) => Err(self.flag(e)),
        }
    }

    /// Decode a wire string and save it to the store.
    pub async fn import_data(&mut self, wire: &str) -> Result<ImportSummary, BridgeError> {
        self.import_data_at(wire, Utc::now()).await
    }

    /// [`import_data`](Self::import_data) with an explicit "now".
    pub async fn import_data_at(
        &mut self,
        wire: &str,
        now: DateTime<Utc>,
    ) -> Result<ImportSummary, BridgeError> {
        let result = self.prepare_import(wire, now);
        let (samples, shifted_to_now) = match result {
            Ok(prepared) => prepared,
            Err(e) => return Err(self.flag(e)),
        };

        if let Err(e) = self.gateway.save(&samples).await {
            return Err(self.flag(e));
        }
        info!(metric = %self.metric, count = samples.len(), shifted_to_now, "import saved");
        self.last_error = None;
        Ok(ImportSummary {
            saved: samples.len(),
            shifted_to_now,
        })
    }

    fn prepare_import(
        &self,
        wire: &str,
        now: DateTime<Utc>,
    ) -> Result<(Vec<Sample>, bool), BridgeError> {
        if !self.is_supported() {
            return Err(BridgeError::Save(format!(
                "{} is not supported by this store",
                self.metric
            )));
        }

        let mut samples = codec::import_wire(wire)?;
        if let Some((i, other)) = samples
            .iter()
            .enumerate()
            .find(|(_, s)| s.metric() != self.metric)
        {
            return Err(BridgeError::invalid(format!(
                "record {i}: {} sample cannot be imported as {}",
                other.metric(),
                self.metric
            )));
        }

        let shift = self.reset_to_current_time && samples.len() == 1;
        if shift {
            samples = samples
                .into_iter()
                .map(|s| s.shifted_to_end_at(now))
                .collect();
        }
        Ok((samples, shift))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CategoryTypeId, QuantityTypeId};
    use crate::gateway::InMemoryStore;
    use crate::units::{Quantity, Unit};
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    const STEPS: MetricType = MetricType::Quantity(QuantityTypeId::StepCount);
    const SLEEP: MetricType = MetricType::Category(CategoryTypeId::SleepAnalysis);

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, d, 12, 0, 0).unwrap()
    }

    fn steps_on(d: u32, n: f64) -> Sample {
        Sample::quantity(STEPS, Quantity::new(n, Unit::Count), day(d), day(d) + Duration::hours(1))
            .unwrap()
    }

    async fn setup(store: InMemoryStore, metric: MetricType) -> (BridgeSession, Arc<InMemoryStore>) {
        let store = Arc::new(store);
        let gateway = StoreGateway::new(store.clone());
        gateway.request_authorization([metric]).await.unwrap();
        (BridgeSession::new(gateway, metric), store)
    }

    #[tokio::test]
    async fn test_load_moves_idle_to_ready() {
        let (mut session, store) = setup(InMemoryStore::new(), STEPS).await;
        store.insert([steps_on(1, 100.0), steps_on(2, 200.0)]);
        assert_eq!(session.state(), &SessionState::Idle);

        session.load_data(day(1), day(3)).await.unwrap();
        assert_eq!(session.samples().len(), 2);
        assert!(!session.is_loading());
        assert!(session.last_error().is_none());
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_list() {
        let store = Arc::new(InMemoryStore::new());
        let gateway = StoreGateway::new(store.clone());
        gateway.request_authorization([STEPS]).await.unwrap();
        store.insert([steps_on(1, 100.0)]);
        let mut session = BridgeSession::new(gateway, STEPS);
        session.load_data(day(1), day(2)).await.unwrap();

        let failing = StoreGateway::new(Arc::new(InMemoryStore::new().failing_queries()));
        let held = session.samples().to_vec();
        session.gateway = failing;

        let err = session.load_data(day(1), day(2)).await.unwrap_err();
        assert!(matches!(err, BridgeError::DataUnavailable(_)));
        assert_eq!(session.samples(), held.as_slice());
        assert_eq!(session.last_error(), Some(&err));

        session.dismiss_error();
        assert!(session.last_error().is_none());
    }

    #[tokio::test]
    async fn test_failed_first_load_returns_to_idle() {
        let (mut session, _) = setup(InMemoryStore::new().failing_queries(), STEPS).await;
        assert!(session.load_data(day(1), day(2)).await.is_err());
        assert_eq!(session.state(), &SessionState::Idle);
    }

    #[tokio::test]
    async fn test_unsupported_type_is_a_state_not_an_error() {
        let (mut session, _) = setup(InMemoryStore::new().without_support(STEPS), STEPS).await;
        assert_eq!(session.state(), &SessionState::Unsupported);
        session.load_data(day(1), day(2)).await.unwrap();
        assert_eq!(session.state(), &SessionState::Unsupported);
        assert!(session.last_error().is_none());
    }

    #[tokio::test]
    async fn test_selection_only_accepts_loaded_samples() {
        let (mut session, store) = setup(InMemoryStore::new(), STEPS).await;
        let held = steps_on(1, 10.0);
        store.insert([held.clone()]);
        session.load_data(day(1), day(2)).await.unwrap();

        assert!(!session.select(Uuid::new_v4()));
        assert!(session.select(held.uuid()));
        assert!(!session.toggle(held.uuid()));
        assert!(session.selection().is_empty());
        session.select_all();
        assert_eq!(session.selection().len(), 1);
    }

    #[tokio::test]
    async fn test_reload_clears_selection() {
        let (mut session, store) = setup(InMemoryStore::new(), STEPS).await;
        store.insert([steps_on(1, 10.0)]);
        session.load_data(day(1), day(2)).await.unwrap();
        session.select_all();

        session.load_data(day(1), day(2)).await.unwrap();
        assert!(session.selection().is_empty());
    }

    #[tokio::test]
    async fn test_empty_selection_exports_nothing() {
        let (mut session, store) = setup(InMemoryStore::new(), STEPS).await;
        store.insert([steps_on(1, 10.0)]);
        session.load_data(day(1), day(2)).await.unwrap();
        assert_eq!(session.export_selection().unwrap(), None);
    }

    #[tokio::test]
    async fn test_export_contains_only_selected_samples() {
        let (mut session, store) = setup(InMemoryStore::new(), STEPS).await;
        let keep = steps_on(1, 10.0);
        store.insert([keep.clone(), steps_on(2, 20.0)]);
        session.load_data(day(1), day(3)).await.unwrap();
        session.select(keep.uuid());

        let wire = session.export_selection().unwrap().unwrap();
        let records = codec::decode_wire(&wire).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].uuid, keep.uuid());
        assert_eq!(records[0].quantity, Some(10.0));
    }

    #[tokio::test]
    async fn test_import_saves_whole_batch() {
        let (mut session, store) = setup(InMemoryStore::new(), STEPS).await;
        let wire = codec::export_wire(&[steps_on(1, 1.0), steps_on(2, 2.0)]).unwrap();

        let summary = session.import_data(&wire).await.unwrap();
        assert_eq!(summary, ImportSummary { saved: 2, shifted_to_now: false });
        assert_eq!(store.samples().len(), 2);
    }

    #[tokio::test]
    async fn test_import_of_empty_batch_calls_save_with_nothing() {
        let (mut session, store) = setup(InMemoryStore::new(), STEPS).await;
        let wire = codec::export_wire(&[]).unwrap();

        let summary = session.import_data(&wire).await.unwrap();
        assert_eq!(summary.saved, 0);
        assert_eq!(store.save_calls(), vec![0]);
    }

    #[tokio::test]
    async fn test_invalid_import_saves_nothing() {
        let (mut session, store) = setup(InMemoryStore::new(), STEPS).await;
        let err = session.import_data("%%%").await.unwrap_err();
        assert!(matches!(err, BridgeError::InvalidData(_)));
        assert!(store.save_calls().is_empty());
        assert!(session.last_error().is_some());
    }

    #[tokio::test]
    async fn test_import_rejects_other_metric_types() {
        let (mut session, store) = setup(InMemoryStore::new(), STEPS).await;
        let night = Sample::category(SLEEP, 0, day(1), day(1) + Duration::hours(7)).unwrap();
        let wire = codec::export_wire(&[steps_on(1, 1.0), night]).unwrap();

        let err = session.import_data(&wire).await.unwrap_err();
        assert!(matches!(err, BridgeError::InvalidData(msg) if msg.starts_with("record 1:")));
        assert!(store.save_calls().is_empty());
    }

    #[tokio::test]
    async fn test_save_error_propagates() {
        let (mut session, _) = setup(InMemoryStore::new().failing_saves(), STEPS).await;
        let wire = codec::export_wire(&[steps_on(1, 1.0)]).unwrap();
        let err = session.import_data(&wire).await.unwrap_err();
        assert!(matches!(err, BridgeError::Save(_)));
    }

    #[tokio::test]
    async fn test_reset_to_current_time_shifts_single_sample() {
        let (mut session, store) = setup(InMemoryStore::new(), SLEEP).await;
        session.set_reset_to_current_time(true);
        let night = Sample::category(SLEEP, 1, day(1), day(1) + Duration::hours(8)).unwrap();
        let wire = codec::export_wire(&[night]).unwrap();
        let now = day(20);

        let summary = session.import_data_at(&wire, now).await.unwrap();
        assert!(summary.shifted_to_now);
        let saved = &store.samples()[0];
        assert_eq!(saved.end(), now);
        assert_eq!(saved.duration(), Duration::hours(8));
    }

    #[tokio::test]
    async fn test_reset_to_current_time_ignores_batches() {
        let (mut session, store) = setup(InMemoryStore::new(), STEPS).await;
        session.set_reset_to_current_time(true);
        let wire = codec::export_wire(&[steps_on(1, 1.0), steps_on(2, 2.0)]).unwrap();

        let summary = session.import_data_at(&wire, day(20)).await.unwrap();
        assert!(!summary.shifted_to_now);
        assert!(store.samples().iter().all(|s| s.end() < day(20)));
    }
}
