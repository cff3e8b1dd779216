// ABOUTME: Read-only build context handed to every task action
// ABOUTME: Carries configuration, path layout, and run identity

use chrono::{DateTime, Utc};

use crate::config::{Config, Paths};

/// Configuration snapshot for one run. Constructed once from parsed
/// CLI/config input and shared by reference with every action; actions never
/// read ambient global state.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub config: Config,
    pub run_id: String,
    pub start_time: DateTime<Utc>,
}

impl BuildContext {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            run_id: uuid::Uuid::new_v4().to_string(),
            start_time: Utc::now(),
        }
    }

    pub fn paths(&self) -> &Paths {
        &self.config.paths
    }
}
