//! Activity and error reporting collaborator
//!
//! Fire-and-forget: implementations must never fail or block callers, so
//! reporting can sit inside retry loops and error paths without masking
//! the original outcome.

use std::fmt::Debug;

use serde_json::Value;

use super::DomainError;

/// Sink for operational events.
pub trait ActivityLog: Send + Sync + Debug {
    /// Records a named activity with structured detail.
    fn activity(&self, name: &str, detail: Value);

    /// Records an error with the context it occurred in.
    fn error(&self, error: &DomainError, context: Value);
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::RwLock;

    /// Captures events for assertions in tests.
    #[derive(Debug, Default)]
    pub struct RecordingActivityLog {
        activities: RwLock<Vec<(String, Value)>>,
        errors: RwLock<Vec<(String, Value)>>,
    }

    impl RecordingActivityLog {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn activity_names(&self) -> Vec<String> {
            self.activities
                .read()
                .unwrap()
                .iter()
                .map(|(name, _)| name.clone())
                .collect()
        }

        pub fn error_count(&self) -> usize {
            self.errors.read().unwrap().len()
        }

        pub fn count_activity(&self, name: &str) -> usize {
            self.activities
                .read()
                .unwrap()
                .iter()
                .filter(|(n, _)| n == name)
                .count()
        }
    }

    impl ActivityLog for RecordingActivityLog {
        fn activity(&self, name: &str, detail: Value) {
            self.activities
                .write()
                .unwrap()
                .push((name.to_string(), detail));
        }

        fn error(&self, error: &DomainError, context: Value) {
            self.errors
                .write()
                .unwrap()
                .push((error.to_string(), context));
        }
    }
}
