//! `gt-agent`: the mutable state of one simulated agent on one route.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                        |
//! |-------------|-----------------------------------------------------------------|
//! | [`state`]   | `RouteAgentState`, `Step`, `EvaluationTicket`, `ReleasedHandles` |
//! | [`history`] | `PositionSample`, `StepState`, `History`                        |
//! | [`timer`]   | `TimerHandle`, abort handle of a route's periodic tick task    |
//!
//! # Path model
//!
//! An active agent sits at `coordinates[path_index]`.  Each tick moves it one
//! coordinate forward.  When the step would leave the path, the pass is
//! complete: the index returns to 0, the history is cleared, and a new pass
//! begins.  `path_index` is therefore always `< len`.
//!
//! This crate holds data and the pure state transitions only.  Cancelling
//! timers and removing markers is the scheduler's job; [`RouteAgentState::reset`]
//! hands the handles back instead of acting on them.

pub mod history;
pub mod state;
pub mod timer;


pub use history::{History, PositionSample, StepState};
pub use state::{EvaluationTicket, ReleasedHandles, RouteAgentState, Step};
pub use timer::TimerHandle;
