//! Tracing-backed activity log

use serde_json::Value;
use tracing::{error, info};

use crate::domain::{ActivityLog, DomainError};

/// Emits activities as `tracing` events. Infallible by construction.
#[derive(Debug, Default, Clone)]
pub struct TracingActivityLog;

impl TracingActivityLog {
    pub fn new() -> Self {
        Self
    }
}

impl ActivityLog for TracingActivityLog {
    fn activity(&self, name: &str, detail: Value) {
        info!(activity = name, detail = %detail, "activity");
    }

    fn error(&self, error: &DomainError, context: Value) {
        error!(error = %error, context = %context, "operation failed");
    }
}
