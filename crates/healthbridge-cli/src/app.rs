//! Process-wide handles shared by the store commands.

use std::path::PathBuf;
use std::sync::Arc;

use healthbridge_core::catalog::{self, MetricType};
use healthbridge_core::{Config, SqliteHealthStore, StoreGateway};

/// Configuration plus the one gateway every command talks through.
pub struct App {
    pub config: Config,
    pub gateway: StoreGateway,
}

impl App {
    /// Open the sample store at `store`, or the configured path.
    pub fn open(config: Config, store: Option<PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = match store {
            Some(path) => path,
            None => config.database_path()?,
        };
        tracing::debug!(path = %path.display(), "opening sample store");
        let store = SqliteHealthStore::open(&path)?;
        Ok(Self {
            config,
            gateway: StoreGateway::new(Arc::new(store)),
        })
    }
}

/// Resolve a metric identifier given on the command line.
pub fn resolve_metric(identifier: &str) -> Result<MetricType, Box<dyn std::error::Error>> {
    catalog::resolve(identifier).ok_or_else(|| {
        format!("unknown metric type: {identifier} (see `healthbridge catalog categories`)").into()
    })
}
