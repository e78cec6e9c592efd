//! `RouteAgentState` and its transitions.

use gt_core::{MarkerHandle, Tick};

use crate::{History, PositionSample, TimerHandle};

/// Result of one [`RouteAgentState::advance`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Moved from `coordinates[from]` to `coordinates[to]`; segment `from`
    /// is now covered.
    Moved { from: usize, to: usize },
    /// The pass ended.  Segments `0..segments` are covered, the index is
    /// back at 0 and the history has been cleared.
    Wrapped { segments: usize },
}

/// Identity of a dispatched geofence evaluation.
///
/// An evaluation result may only be applied while the agent is still in the
/// same activation (`generation`) and the same pass (`pass`), and only if no
/// later evaluation of that pass has already been applied (`seq`).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EvaluationTicket {
    pub generation: u64,
    pub pass:       u64,
    pub seq:        u64,
}

/// Handles taken out of the state by [`RouteAgentState::reset`].
///
/// The caller is responsible for cancelling the timer and removing the
/// marker.
#[derive(Debug, Default)]
#[must_use = "released handles must be cancelled / removed by the caller"]
pub struct ReleasedHandles {
    pub timer:  Option<TimerHandle>,
    pub marker: Option<MarkerHandle>,
}

/// Everything the engine tracks for one route's agent.
#[derive(Debug)]
pub struct RouteAgentState {
    active:         bool,
    path_index:     usize,
    /// Sequence number the next applicable evaluation must reach.
    crossing_index: u64,
    history:        History,
    timer:          Option<TimerHandle>,
    marker:         Option<MarkerHandle>,
    /// Bumped on every activation and deactivation.
    generation:     u64,
    /// Bumped on every wrap.
    pass:           u64,
    /// Ticks since activation.
    tick:           Tick,
}

impl Default for RouteAgentState {
    fn default() -> Self {
        Self::new(History::new())
    }
}

impl RouteAgentState {
    /// An inactive agent that will record into `history`.
    pub fn new(history: History) -> Self {
        Self {
            active: false,
            path_index: 0,
            crossing_index: 1,
            history,
            timer: None,
            marker: None,
            generation: 0,
            pass: 0,
            tick: Tick::ZERO,
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn path_index(&self) -> usize {
        self.path_index
    }

    pub fn crossing_index(&self) -> u64 {
        self.crossing_index
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn marker(&self) -> Option<MarkerHandle> {
        self.marker
    }

    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pass(&self) -> u64 {
        self.pass
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// `true` if the agent is active and still in activation `generation`.
    pub fn is_current(&self, generation: u64) -> bool {
        self.active && self.generation == generation
    }

    // ── Lifecycle ───────────────────────────────────────────────────────────

    /// Begin a new activation and return its generation.
    ///
    /// Any handles still held are returned alongside; on a fresh or
    /// properly-stopped agent they are empty.
    pub fn activate(&mut self) -> (u64, ReleasedHandles) {
        let released = self.reset();
        self.active = true;
        self.generation += 1;
        self.pass = 0;
        self.tick = Tick::ZERO;
        (self.generation, released)
    }

    /// Store the handles created for the current activation.
    pub fn attach(&mut self, timer: Option<TimerHandle>, marker: MarkerHandle) {
        self.timer = timer;
        self.marker = Some(marker);
    }

    /// End the current activation.
    pub fn deactivate(&mut self) -> ReleasedHandles {
        self.active = false;
        self.generation += 1;
        self.reset()
    }

    /// Clear path progress and history and take the timer and marker out.
    ///
    /// Does not touch `active`; does not cancel anything.
    pub fn reset(&mut self) -> ReleasedHandles {
        self.path_index = 0;
        self.crossing_index = 1;
        self.history.clear();
        ReleasedHandles {
            timer:  self.timer.take(),
            marker: self.marker.take(),
        }
    }

    // ── Movement ────────────────────────────────────────────────────────────

    /// Advance one coordinate along a path of `len` coordinates.
    ///
    /// `len` must be at least 1.  A one-coordinate path wraps on every call.
    pub fn advance(&mut self, len: usize) -> Step {
        self.tick = self.tick.next();
        let next = self.path_index + 1;
        if self.path_index >= len || next >= len {
            return self.wrap(len);
        }
        let from = self.path_index;
        self.path_index = next;
        Step::Moved { from, to: next }
    }

    fn wrap(&mut self, len: usize) -> Step {
        self.path_index = 0;
        self.crossing_index = 1;
        self.history.clear();
        self.pass += 1;
        Step::Wrapped { segments: len.saturating_sub(1) }
    }

    pub fn record(&mut self, sample: PositionSample) {
        self.history.append(sample);
    }

    // ── Evaluations ─────────────────────────────────────────────────────────

    /// Ticket for an evaluation of the current position.
    pub fn ticket(&self) -> EvaluationTicket {
        EvaluationTicket {
            generation: self.generation,
            pass:       self.pass,
            seq:        self.path_index as u64,
        }
    }

    /// Decide whether a completed evaluation may be applied, and if so,
    /// consume its sequence number.
    ///
    /// Rejects results from a previous activation or pass, and results
    /// overtaken by a later evaluation of the same pass.
    ///
    /// The pass check is stricter than "drop once inactive": a result
    /// dispatched before a wraparound is dropped even though the route is
    /// still active.  The edge state is reset on wrap, so applying it would
    /// diff last pass's position against the new pass.  On a short route
    /// with a slow first fetch this can drop the final exit of a pass.
    pub fn admit(&mut self, ticket: EvaluationTicket) -> bool {
        if !self.is_current(ticket.generation)
            || ticket.pass != self.pass
            || ticket.seq < self.crossing_index
        {
            return false;
        }
        self.crossing_index = ticket.seq + 1;
        true
    }
}
