//! # HealthBridge Core Library
//!
//! This library moves personal health samples in and out of a health data
//! store as a portable, copy-pasteable string. It follows a CLI-first
//! philosophy: every operation is available via the standalone CLI binary,
//! which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Catalog**: static registry of metric types grouped into categories
//! - **Codec**: conversion between native samples and wire records, plus
//!   the base64/JSON wire string
//! - **Gateway**: the single async seam to a health store
//! - **Bridge**: per-metric session tying queries, selection, export and
//!   import together
//! - **Storage**: TOML configuration and a SQLite-backed store
//!
//! ## Key Components
//!
//! - [`HealthStore`]: Trait a store implements
//! - [`StoreGateway`]: Shared front door to one store
//! - [`BridgeSession`]: Export/import state machine for one metric
//! - [`SampleRecord`]: Wire form of a sample

pub mod catalog;
pub mod units;
pub mod sample;
pub mod codec;
pub mod gateway;
pub mod bridge;
pub mod display;
pub mod storage;
pub mod error;

pub use catalog::{MetricCategory, MetricKind, MetricType, QuantityTypeId, CategoryTypeId};
pub use units::{Quantity, Unit};
pub use sample::{Metadata, MetadataValue, Sample, SamplePayload};
pub use codec::SampleRecord;
pub use gateway::{HealthStore, InMemoryStore, NativeType, StoreGateway};
pub use bridge::{BridgeSession, ImportSummary, SessionState};
pub use storage::{Config, SqliteHealthStore};
pub use error::{BridgeError, ConfigError, CoreError, StoreError};
