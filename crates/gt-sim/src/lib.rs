//! `gt-sim`: the per-route tick scheduler of the geotrack engine.
//!
//! # Tick
//!
//! ```text
//! every tick_interval_ms, per active route:
//!   ① Guard     stale tick (route stopped / restarted) → no-op, timer ends
//!   ② Advance   next = path_index + 1
//!      next < len  → move marker, mark segment path_index covered,
//!                    record sample, dispatch geofence evaluation
//!      next == len → mark every segment covered, reset index, crossing
//!                    index, history and edge state, marker back to start
//!   ③ Evaluate  (off the lock) fetch-or-cache fences, compute inside-set
//!   ④ Apply     (under the lock) drop if stale or overtaken, else diff
//!                against the last inside-set; fire enter / exit once
//!                the lock is released
//! ```
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`scheduler`] | `Scheduler`, `TickOutcome`, `EvaluationHandle`, `AgentSnapshot` |
//! | [`builder`]   | `SchedulerBuilder`                                          |
//! | [`config`]    | `SchedulerConfig`                                           |
//! | [`sink`]      | `MapSink`, `NoopSink`, `RecordingSink`, `TracingSink`       |
//! | [`observer`]  | `TrackingObserver`, `CallbackObserver`, `ChannelObserver`   |
//! | [`error`]     | `SimError`, `SimResult<T>`                                  |
//!
//! # Cargo features
//!
//! | Feature | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | `SchedulerConfig` and snapshots become (de)serializable.   |

pub mod builder;
pub mod config;
pub mod error;
pub mod observer;
pub mod scheduler;
pub mod sink;


pub use builder::SchedulerBuilder;
pub use config::SchedulerConfig;
pub use error::{SimError, SimResult};
pub use observer::{CallbackObserver, ChannelObserver, NoopObserver, TrackingEvent, TrackingObserver};
pub use scheduler::{AgentSnapshot, EvaluationHandle, Scheduler, TickOutcome};
pub use sink::{MapSink, NoopSink, RecordingSink, SinkCommand, TracingSink};
