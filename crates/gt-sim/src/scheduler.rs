//! The `Scheduler`: owner of every route agent and driver of their ticks.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::{Mutex, ReentrantMutex};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use gt_agent::{EvaluationTicket, PositionSample, ReleasedHandles, RouteAgentState, Step, StepState, TimerHandle};
use gt_catalog::{Route, RouteCatalog};
use gt_core::{GeoPoint, RouteId};
use gt_geofence::{CrossingKind, EdgeDetector, GeofenceEvaluator, GeofenceEvent, GeofenceGateway, InsideSet};

use crate::{MapSink, NoopObserver, NoopSink, SchedulerConfig, SimError, SimResult, TrackingObserver};

// ── Outcomes ──────────────────────────────────────────────────────────────────

/// What a single tick did.
#[derive(Debug)]
pub enum TickOutcome {
    /// The route was not active (or the tick belonged to an earlier
    /// activation); nothing changed.
    Stale,

    /// The agent moved to `coordinates[path_index]`, a sample was recorded
    /// and a geofence evaluation was dispatched.
    Advanced {
        position:   GeoPoint,
        path_index: usize,
        evaluation: EvaluationHandle,
    },

    /// The pass completed; the agent is back at its first coordinate.
    Wrapped { position: GeoPoint },
}

impl TickOutcome {
    pub fn is_stale(&self) -> bool {
        matches!(self, TickOutcome::Stale)
    }

    /// The dispatched evaluation, if this tick produced one.
    pub fn into_evaluation(self) -> Option<EvaluationHandle> {
        match self {
            TickOutcome::Advanced { evaluation, .. } => Some(evaluation),
            _ => None,
        }
    }
}

/// An in-flight geofence evaluation.
///
/// Dropping the handle does not cancel the evaluation; its result is still
/// applied when it completes.
#[derive(Debug)]
pub struct EvaluationHandle {
    task: JoinHandle<Vec<GeofenceEvent>>,
}

impl EvaluationHandle {
    /// Wait for the evaluation and return the events it produced.
    ///
    /// Empty when nothing changed, when the fetch failed, or when the result
    /// was stale by the time it completed.
    pub async fn settled(self) -> Vec<GeofenceEvent> {
        match self.task.await {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(error = %e, "geofence evaluation task did not complete");
                Vec::new()
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Read-only view of one agent.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentSnapshot {
    pub route:          RouteId,
    pub active:         bool,
    pub path_index:     usize,
    pub crossing_index: u64,
    /// Completed passes in the current activation.
    pub pass:           u64,
    pub history_len:    usize,
    /// Current marker position; `None` while inactive.
    pub position:       Option<GeoPoint>,
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

/// Starts, stops and advances one simulated agent per catalog route.
///
/// Each active route owns one periodic tokio task that calls the same code
/// path as [`tick`][Self::tick].  All agent state lives behind one mutex;
/// every operation takes it once, mutates, issues its [`MapSink`] commands,
/// and releases it.  [`TrackingObserver`] calls are made after the release,
/// so an observer may query or drive the scheduler.  Geofence evaluations run outside the lock and re-check
/// the agent when they complete, so a result that arrives after `stop` (or
/// after a restart, or a wraparound) is discarded.
///
/// Cloning is cheap and yields a handle to the same scheduler.  Timers hold
/// only a weak reference: once every handle is dropped they stop on their
/// next tick.
///
/// Build with [`SchedulerBuilder`][crate::SchedulerBuilder].
pub struct Scheduler<G, S = NoopSink, O = NoopObserver>
where
    G: GeofenceGateway,
    S: MapSink,
    O: TrackingObserver,
{
    shared: Arc<Shared<G, S, O>>,
}

impl<G, S, O> Clone for Scheduler<G, S, O>
where
    G: GeofenceGateway,
    S: MapSink,
    O: TrackingObserver,
{
    fn clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared) }
    }
}

pub(crate) struct Shared<G: GeofenceGateway, S, O> {
    pub(crate) catalog:   RouteCatalog,
    pub(crate) evaluator: GeofenceEvaluator<G>,
    pub(crate) sink:      S,
    pub(crate) observer:  O,
    pub(crate) config:    SchedulerConfig,
    pub(crate) runtime:   Handle,
    /// Serializes observer delivery.  Taken before `state` and held until the
    /// observer calls for that state change have returned.  Reentrant so an
    /// observer may call back into the scheduler on the same thread.
    pub(crate) delivery:  ReentrantMutex<()>,
    pub(crate) state:     Mutex<State>,
}

/// Observer call owed by a tick, made after the state lock is released.
enum Notice {
    Sample(PositionSample),
    Wrapped,
}

pub(crate) struct State {
    pub(crate) agents: HashMap<RouteId, RouteAgentState>,
    pub(crate) edges:  EdgeDetector,
}

impl<G, S, O> Scheduler<G, S, O>
where
    G: GeofenceGateway,
    S: MapSink,
    O: TrackingObserver,
{
    pub(crate) fn from_shared(shared: Shared<G, S, O>) -> Self {
        Self { shared: Arc::new(shared) }
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Activate `route`: draw its path, place the marker on its first
    /// coordinate and start its timer.  No-op if already active.
    pub fn start(&self, route: &RouteId) -> SimResult<()> {
        let shared = &self.shared;
        let def = shared.route(route)?;

        let mut state = shared.state.lock();
        let State { agents, edges } = &mut *state;
        let agent = agents
            .get_mut(route)
            .ok_or_else(|| SimError::RouteNotFound(route.clone()))?;
        if agent.is_active() {
            return Ok(());
        }

        let (generation, leftover) = agent.activate();
        shared.release(leftover);
        edges.reset(route);

        shared.sink.draw_route(route, def.coordinates());
        let marker = shared.sink.place_marker(route, def.start());
        let timer = shared.spawn_timer(route.clone(), generation);
        agent.attach(Some(timer), marker);

        tracing::info!(
            route = %route,
            generation,
            points = def.len(),
            interval_ms = shared.config.tick_interval_ms,
            "route started"
        );
        Ok(())
    }

    /// Deactivate `route`: cancel its timer, erase its drawing, remove its
    /// marker and reset its progress.  Idempotent.
    ///
    /// No tick of the stopped activation mutates state after this returns,
    /// and evaluations still in flight are discarded on completion.
    pub fn stop(&self, route: &RouteId) -> SimResult<()> {
        let shared = &self.shared;
        let mut state = shared.state.lock();
        let State { agents, edges } = &mut *state;
        let agent = agents
            .get_mut(route)
            .ok_or_else(|| SimError::RouteNotFound(route.clone()))?;
        if agent.is_active() {
            shared.deactivate(route, agent, edges);
            tracing::info!(route = %route, "route stopped");
        }
        Ok(())
    }

    /// Stop every active route.
    pub fn shutdown(&self) {
        let shared = &self.shared;
        let mut state = shared.state.lock();
        let State { agents, edges } = &mut *state;
        let mut stopped = 0usize;
        for route in shared.catalog.ids() {
            if let Some(agent) = agents.get_mut(route) {
                if agent.is_active() {
                    shared.deactivate(route, agent, edges);
                    stopped += 1;
                }
            }
        }
        tracing::info!(stopped, "scheduler shut down");
    }

    /// Advance `route` by one step, exactly as its timer would.
    ///
    /// Returns [`TickOutcome::Stale`] without touching anything if the route
    /// is inactive.
    pub fn tick(&self, route: &RouteId) -> SimResult<TickOutcome> {
        self.shared.tick(route, None)
    }

    /// Re-issue the drawing commands for `route`'s current state: the path,
    /// the covered segments `[0, path_index)` and the marker position.
    /// Does not change any state.
    pub fn restore_progress(&self, route: &RouteId) -> SimResult<()> {
        self.restore_progress_with(route, true)
    }

    /// Like [`restore_progress`][Self::restore_progress]; with
    /// `fill_covered = false` the covered segments are not replayed.
    pub fn restore_progress_with(&self, route: &RouteId, fill_covered: bool) -> SimResult<()> {
        let shared = &self.shared;
        let def = shared.route(route)?;
        let state = shared.state.lock();
        let agent = state
            .agents
            .get(route)
            .ok_or_else(|| SimError::RouteNotFound(route.clone()))?;
        if !agent.is_active() {
            return Ok(());
        }

        let coordinates = def.coordinates();
        shared.sink.draw_route(route, coordinates);
        if fill_covered {
            for segment in 0..agent.path_index() {
                shared.sink.mark_segment_covered(route, segment);
            }
        }
        if let Some(&position) = coordinates.get(agent.path_index()) {
            shared.sink.move_marker(route, position);
        }
        tracing::debug!(route = %route, path_index = agent.path_index(), fill_covered, "progress restored");
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// `false` for inactive and unknown routes.
    pub fn is_active(&self, route: &RouteId) -> bool {
        self.shared
            .state
            .lock()
            .agents
            .get(route)
            .is_some_and(RouteAgentState::is_active)
    }

    /// Samples of the current pass, oldest first.
    pub fn history(&self, route: &RouteId) -> SimResult<Vec<PositionSample>> {
        let state = self.shared.state.lock();
        state
            .agents
            .get(route)
            .map(|agent| agent.history().snapshot())
            .ok_or_else(|| SimError::RouteNotFound(route.clone()))
    }

    pub fn snapshot(&self, route: &RouteId) -> SimResult<AgentSnapshot> {
        let shared = &self.shared;
        let def = shared.route(route)?;
        let state = shared.state.lock();
        let agent = state
            .agents
            .get(route)
            .ok_or_else(|| SimError::RouteNotFound(route.clone()))?;
        Ok(AgentSnapshot {
            route:          route.clone(),
            active:         agent.is_active(),
            path_index:     agent.path_index(),
            crossing_index: agent.crossing_index(),
            pass:           agent.pass(),
            history_len:    agent.history().len(),
            position:       agent
                .is_active()
                .then(|| def.coordinates().get(agent.path_index()).copied())
                .flatten(),
        })
    }

    /// Active routes in catalog order.
    pub fn active_routes(&self) -> Vec<RouteId> {
        let state = self.shared.state.lock();
        self.shared
            .catalog
            .ids()
            .filter(|id| state.agents.get(*id).is_some_and(RouteAgentState::is_active))
            .cloned()
            .collect()
    }

    pub fn catalog(&self) -> &RouteCatalog {
        &self.shared.catalog
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.shared.config
    }

    pub fn evaluator(&self) -> &GeofenceEvaluator<G> {
        &self.shared.evaluator
    }

    pub fn sink(&self) -> &S {
        &self.shared.sink
    }

    pub fn observer(&self) -> &O {
        &self.shared.observer
    }
}

// ── Internals ─────────────────────────────────────────────────────────────────

impl<G, S, O> Shared<G, S, O>
where
    G: GeofenceGateway,
    S: MapSink,
    O: TrackingObserver,
{
    fn route(&self, id: &RouteId) -> SimResult<&Arc<Route>> {
        self.catalog
            .by_id(id.as_str())
            .ok_or_else(|| SimError::RouteNotFound(id.clone()))
    }

    fn release(&self, handles: ReleasedHandles) {
        if let Some(timer) = handles.timer {
            timer.cancel();
        }
        if let Some(marker) = handles.marker {
            self.sink.remove_marker(marker);
        }
    }

    fn deactivate(&self, route: &RouteId, agent: &mut RouteAgentState, edges: &mut EdgeDetector) {
        let released = agent.deactivate();
        self.release(released);
        edges.reset(route);
        self.sink.erase_route(route);
    }

    /// Spawn the periodic task driving `route` for activation `generation`.
    ///
    /// The first tick fires one period after start.  The task ends by itself
    /// once a tick reports stale.
    fn spawn_timer(self: &Arc<Self>, route: RouteId, generation: u64) -> TimerHandle {
        let weak = Arc::downgrade(self);
        let period = self.config.tick_interval();
        let task = self.runtime.spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(shared) = weak.upgrade() else {
                    break;
                };
                match shared.tick(&route, Some(generation)) {
                    Ok(TickOutcome::Stale) | Err(_) => break,
                    Ok(_) => {}
                }
            }
        });
        TimerHandle::new(task.abort_handle())
    }

    /// One tick.  With `generation`, the tick is stale unless the agent is
    /// still in that activation.
    fn tick(self: &Arc<Self>, route: &RouteId, generation: Option<u64>) -> SimResult<TickOutcome> {
        let _delivery = self.delivery.lock();
        let (outcome, notice) = self.advance(route, generation)?;
        match notice {
            Some(Notice::Sample(sample)) => self.observer.on_sample(route, &sample),
            Some(Notice::Wrapped) => self.observer.on_wrap(route),
            None => {}
        }
        Ok(outcome)
    }

    /// The locked part of a tick: move the agent and issue its map commands.
    fn advance(
        self: &Arc<Self>,
        route:      &RouteId,
        generation: Option<u64>,
    ) -> SimResult<(TickOutcome, Option<Notice>)> {
        let def = Arc::clone(self.route(route)?);

        let mut state = self.state.lock();
        let State { agents, edges } = &mut *state;
        let agent = agents
            .get_mut(route)
            .ok_or_else(|| SimError::RouteNotFound(route.clone()))?;

        let current = match generation {
            Some(g) => agent.is_current(g),
            None => agent.is_active(),
        };
        if !current {
            tracing::trace!(route = %route, "stale tick discarded");
            return Ok((TickOutcome::Stale, None));
        }

        let coordinates = def.coordinates();
        match agent.advance(coordinates.len()) {
            Step::Moved { from, to } => {
                let position = coordinates[to];
                self.sink.move_marker(route, position);
                self.sink.mark_segment_covered(route, from);

                let sample = PositionSample {
                    timestamp:  Utc::now(),
                    tick:       agent.tick(),
                    path_index: to,
                    coordinate: position,
                    label:      self.config.label(&def, to),
                    step_state: StepState::Point,
                };
                agent.record(sample.clone());

                let evaluation = self.dispatch(Arc::clone(&def), position, agent.ticket());
                tracing::debug!(route = %route, path_index = to, tick = %agent.tick(), "tick");
                Ok((
                    TickOutcome::Advanced { position, path_index: to, evaluation },
                    Some(Notice::Sample(sample)),
                ))
            }
            Step::Wrapped { segments } => {
                for segment in 0..segments {
                    self.sink.mark_segment_covered(route, segment);
                }
                edges.reset(route);
                let position = def.start();
                self.sink.move_marker(route, position);
                tracing::debug!(route = %route, pass = agent.pass(), "route wrapped");
                Ok((TickOutcome::Wrapped { position }, Some(Notice::Wrapped)))
            }
        }
    }

    /// Evaluate `position` against the route's collection off the lock.
    fn dispatch(
        self: &Arc<Self>,
        route:    Arc<Route>,
        position: GeoPoint,
        ticket:   EvaluationTicket,
    ) -> EvaluationHandle {
        let shared = Arc::clone(self);
        let task = self.runtime.spawn(async move {
            match shared.evaluator.evaluate(position, route.collection()).await {
                Some(inside) => shared.apply(route.id(), ticket, inside),
                None => Vec::new(),
            }
        });
        EvaluationHandle { task }
    }

    /// Apply a completed evaluation if `ticket` is still admissible.
    ///
    /// Observers are called after the state lock is released.
    fn apply(&self, route: &RouteId, ticket: EvaluationTicket, inside: InsideSet) -> Vec<GeofenceEvent> {
        let _delivery = self.delivery.lock();
        let events = {
            let mut state = self.state.lock();
            let State { agents, edges } = &mut *state;

            let admitted = agents.get_mut(route).is_some_and(|agent| agent.admit(ticket));
            if !admitted {
                tracing::trace!(route = %route, seq = ticket.seq, "stale geofence evaluation discarded");
                return Vec::new();
            }

            let now = Utc::now();
            edges
                .observe(route, inside)
                .into_iter()
                .map(|transition| GeofenceEvent::new(route.clone(), transition, now))
                .collect::<Vec<_>>()
        };

        for event in &events {
            tracing::debug!(route = %route, geofence = %event.geofence, kind = ?event.kind, "geofence crossing");
            match event.kind {
                CrossingKind::Enter => self.observer.on_enter(event),
                CrossingKind::Exit => self.observer.on_exit(event),
            }
        }
        events
    }
}
