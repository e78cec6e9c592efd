//! Position history of one pass over a route.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use gt_core::{GeoPoint, Tick};

/// What kind of step a sample records.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum StepState {
    /// The agent reached a path coordinate.
    #[default]
    Point,
}

/// One recorded position.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionSample {
    pub timestamp:  DateTime<Utc>,
    /// Route-local tick at which the sample was taken.
    pub tick:       Tick,
    /// Index of `coordinate` in the route's coordinate sequence.
    pub path_index: usize,
    pub coordinate: GeoPoint,
    pub label:      String,
    pub step_state: StepState,
}

/// Append-only sample log, optionally bounded.
///
/// With a capacity, appending to a full log drops the oldest sample.
#[derive(Clone, Debug, Default)]
pub struct History {
    samples:  VecDeque<PositionSample>,
    capacity: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log keeping at most `capacity` samples.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            samples:  VecDeque::with_capacity(capacity.min(1024)),
            capacity: Some(capacity),
        }
    }

    pub fn append(&mut self, sample: PositionSample) {
        if let Some(cap) = self.capacity {
            if cap == 0 {
                return;
            }
            while self.samples.len() >= cap {
                self.samples.pop_front();
            }
        }
        self.samples.push_back(sample);
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&PositionSample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PositionSample> + '_ {
        self.samples.iter()
    }

    /// Owned copy of the samples, oldest first.
    pub fn snapshot(&self) -> Vec<PositionSample> {
        self.samples.iter().cloned().collect()
    }
}
