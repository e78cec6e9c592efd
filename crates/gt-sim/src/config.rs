//! Scheduler configuration.

use std::time::Duration;

use gt_catalog::Route;

use crate::{SimError, SimResult};

/// Tunables for a [`Scheduler`][crate::Scheduler].
///
/// Typically deserialized from JSON by the application (with the `serde`
/// feature); every field has a default.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SchedulerConfig {
    /// Period of every route's tick timer, in milliseconds.  Must be > 0.
    /// Default: 2000.
    pub tick_interval_ms: u64,

    /// Maximum samples kept per pass; the oldest are dropped first.
    /// `None` keeps every sample of the pass.
    pub history_capacity: Option<usize>,

    /// Replaces the route name in sample labels (`"{prefix} #{n}"`).
    pub label_prefix: Option<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 2_000,
            history_capacity: None,
            label_prefix:     None,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> SimResult<()> {
        if self.tick_interval_ms == 0 {
            return Err(SimError::Config("tick_interval_ms must be greater than 0".into()));
        }
        if self.history_capacity == Some(0) {
            return Err(SimError::Config("history_capacity must be greater than 0".into()));
        }
        Ok(())
    }

    #[inline]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Label of the `n`-th sample of a pass over `route`.
    pub fn label(&self, route: &Route, n: usize) -> String {
        let prefix = self.label_prefix.as_deref().unwrap_or(route.name());
        format!("{prefix} #{n}")
    }
}
