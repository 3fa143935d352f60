//! Orchestration of gateway and codec calls for one metric at a time.

pub mod session;

pub use session::{BridgeSession, ImportSummary, SessionState};
