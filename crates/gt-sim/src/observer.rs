//! Tracking observer trait: geofence crossings and history updates.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

use gt_agent::PositionSample;
use gt_core::{GeofenceId, RouteId};
use gt_geofence::GeofenceEvent;

/// Callbacks invoked by the [`Scheduler`][crate::Scheduler].
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// Called after the scheduler's state lock is released, one state change at
/// a time, so events of one route arrive in order.  An observer may call
/// back into the scheduler, e.g. to read `history` when a fence is entered.
pub trait TrackingObserver: Send + Sync + 'static {
    /// The agent of `event.route` entered `event.geofence`.
    fn on_enter(&self, _event: &GeofenceEvent) {}

    /// The agent of `event.route` left `event.geofence`.
    fn on_exit(&self, _event: &GeofenceEvent) {}

    /// A sample was appended to `route`'s history.
    fn on_sample(&self, _route: &RouteId, _sample: &PositionSample) {}

    /// `route` completed a pass and restarted from its first coordinate.
    fn on_wrap(&self, _route: &RouteId) {}
}

impl<O: TrackingObserver + ?Sized> TrackingObserver for Arc<O> {
    fn on_enter(&self, event: &GeofenceEvent) {
        (**self).on_enter(event)
    }
    fn on_exit(&self, event: &GeofenceEvent) {
        (**self).on_exit(event)
    }
    fn on_sample(&self, route: &RouteId, sample: &PositionSample) {
        (**self).on_sample(route, sample)
    }
    fn on_wrap(&self, route: &RouteId) {
        (**self).on_wrap(route)
    }
}

/// A [`TrackingObserver`] that does nothing.
pub struct NoopObserver;

impl TrackingObserver for NoopObserver {}

// ── CallbackObserver ──────────────────────────────────────────────────────────

type CrossingFn = Box<dyn Fn(&RouteId, &GeofenceId) + Send + Sync>;

/// Plain `(route, geofence)` callbacks for enter and exit.
///
/// ```rust,ignore
/// let observer = CallbackObserver::new()
///     .with_enter(|route, fence| println!("{route} entered {fence}"))
///     .with_exit(|route, fence| println!("{route} left {fence}"));
/// ```
#[derive(Default)]
pub struct CallbackObserver {
    enter: Option<CrossingFn>,
    exit:  Option<CrossingFn>,
}

impl CallbackObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enter(mut self, f: impl Fn(&RouteId, &GeofenceId) + Send + Sync + 'static) -> Self {
        self.enter = Some(Box::new(f));
        self
    }

    pub fn with_exit(mut self, f: impl Fn(&RouteId, &GeofenceId) + Send + Sync + 'static) -> Self {
        self.exit = Some(Box::new(f));
        self
    }
}

impl TrackingObserver for CallbackObserver {
    fn on_enter(&self, event: &GeofenceEvent) {
        if let Some(f) = &self.enter {
            f(&event.route, &event.geofence);
        }
    }

    fn on_exit(&self, event: &GeofenceEvent) {
        if let Some(f) = &self.exit {
            f(&event.route, &event.geofence);
        }
    }
}

// ── ChannelObserver ───────────────────────────────────────────────────────────

/// Everything a [`ChannelObserver`] forwards.
#[derive(Clone, Debug, PartialEq)]
pub enum TrackingEvent {
    Enter(GeofenceEvent),
    Exit(GeofenceEvent),
    Sample { route: RouteId, sample: PositionSample },
    Wrapped(RouteId),
}

/// Forwards every callback into an unbounded tokio channel.
///
/// Sending never blocks.  Once the receiver is dropped, events are discarded
/// and a single warning is logged.
pub struct ChannelObserver {
    tx:     mpsc::UnboundedSender<TrackingEvent>,
    closed: AtomicBool,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TrackingEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, closed: AtomicBool::new(false) }, rx)
    }

    fn send(&self, event: TrackingEvent) {
        if self.tx.send(event).is_err() && !self.closed.swap(true, Ordering::Relaxed) {
            tracing::warn!("tracking event receiver dropped; discarding further events");
        }
    }
}

impl TrackingObserver for ChannelObserver {
    fn on_enter(&self, event: &GeofenceEvent) {
        self.send(TrackingEvent::Enter(event.clone()));
    }

    fn on_exit(&self, event: &GeofenceEvent) {
        self.send(TrackingEvent::Exit(event.clone()));
    }

    fn on_sample(&self, route: &RouteId, sample: &PositionSample) {
        self.send(TrackingEvent::Sample { route: route.clone(), sample: sample.clone() });
    }

    fn on_wrap(&self, route: &RouteId) {
        self.send(TrackingEvent::Wrapped(route.clone()));
    }
}
