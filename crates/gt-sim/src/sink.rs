//! The map surface the scheduler draws on.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use gt_core::{GeoPoint, MarkerHandle, RouteId};

/// Receives route, progress and marker commands.
///
/// Methods are called synchronously while the scheduler's state lock is held,
/// so commands for one route arrive in the order the state changed.
/// Implementations must return promptly and must not call back into the
/// [`Scheduler`][crate::Scheduler].
pub trait MapSink: Send + Sync + 'static {
    /// Draw the full path of `route`.
    fn draw_route(&self, route: &RouteId, coordinates: &[GeoPoint]);

    /// Render segment `index` (from `coordinates[index]` to
    /// `coordinates[index + 1]`) as covered.
    fn mark_segment_covered(&self, route: &RouteId, index: usize);

    /// Place the agent marker for `route` and return a handle to it.
    fn place_marker(&self, route: &RouteId, coordinate: GeoPoint) -> MarkerHandle;

    fn move_marker(&self, route: &RouteId, coordinate: GeoPoint);

    fn remove_marker(&self, marker: MarkerHandle);

    /// Erase the path and progress drawing of `route`.
    fn erase_route(&self, route: &RouteId);
}

impl<S: MapSink + ?Sized> MapSink for Arc<S> {
    fn draw_route(&self, route: &RouteId, coordinates: &[GeoPoint]) {
        (**self).draw_route(route, coordinates)
    }
    fn mark_segment_covered(&self, route: &RouteId, index: usize) {
        (**self).mark_segment_covered(route, index)
    }
    fn place_marker(&self, route: &RouteId, coordinate: GeoPoint) -> MarkerHandle {
        (**self).place_marker(route, coordinate)
    }
    fn move_marker(&self, route: &RouteId, coordinate: GeoPoint) {
        (**self).move_marker(route, coordinate)
    }
    fn remove_marker(&self, marker: MarkerHandle) {
        (**self).remove_marker(marker)
    }
    fn erase_route(&self, route: &RouteId) {
        (**self).erase_route(route)
    }
}

// ── NoopSink ──────────────────────────────────────────────────────────────────

/// Discards every command.  Marker handles are still unique.
#[derive(Debug, Default)]
pub struct NoopSink {
    next_marker: AtomicU64,
}

impl MapSink for NoopSink {
    fn draw_route(&self, _route: &RouteId, _coordinates: &[GeoPoint]) {}
    fn mark_segment_covered(&self, _route: &RouteId, _index: usize) {}
    fn place_marker(&self, _route: &RouteId, _coordinate: GeoPoint) -> MarkerHandle {
        MarkerHandle(self.next_marker.fetch_add(1, Ordering::Relaxed))
    }
    fn move_marker(&self, _route: &RouteId, _coordinate: GeoPoint) {}
    fn remove_marker(&self, _marker: MarkerHandle) {}
    fn erase_route(&self, _route: &RouteId) {}
}

// ── RecordingSink ─────────────────────────────────────────────────────────────

/// One command received by a [`RecordingSink`].
#[derive(Clone, Debug, PartialEq)]
pub enum SinkCommand {
    DrawRoute { route: RouteId, coordinates: Vec<GeoPoint> },
    MarkSegmentCovered { route: RouteId, index: usize },
    PlaceMarker { route: RouteId, coordinate: GeoPoint, marker: MarkerHandle },
    MoveMarker { route: RouteId, coordinate: GeoPoint },
    RemoveMarker(MarkerHandle),
    EraseRoute(RouteId),
}

/// Keeps every command in arrival order.  Used by tests and replay tools.
#[derive(Debug, Default)]
pub struct RecordingSink {
    commands:    Mutex<Vec<SinkCommand>>,
    next_marker: AtomicU64,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<SinkCommand> {
        self.commands.lock().clone()
    }

    /// Return and forget the recorded commands.
    pub fn take(&self) -> Vec<SinkCommand> {
        std::mem::take(&mut *self.commands.lock())
    }

    /// Covered-segment indices recorded for `route`, in arrival order.
    pub fn covered_segments(&self, route: &RouteId) -> Vec<usize> {
        self.commands
            .lock()
            .iter()
            .filter_map(|c| match c {
                SinkCommand::MarkSegmentCovered { route: r, index } if r == route => Some(*index),
                _ => None,
            })
            .collect()
    }

    /// Last marker position recorded for `route` (placed or moved).
    pub fn marker_position(&self, route: &RouteId) -> Option<GeoPoint> {
        self.commands.lock().iter().rev().find_map(|c| match c {
            SinkCommand::PlaceMarker { route: r, coordinate, .. }
            | SinkCommand::MoveMarker { route: r, coordinate } if r == route => Some(*coordinate),
            _ => None,
        })
    }

    fn push(&self, command: SinkCommand) {
        self.commands.lock().push(command);
    }
}

impl MapSink for RecordingSink {
    fn draw_route(&self, route: &RouteId, coordinates: &[GeoPoint]) {
        self.push(SinkCommand::DrawRoute {
            route:       route.clone(),
            coordinates: coordinates.to_vec(),
        });
    }

    fn mark_segment_covered(&self, route: &RouteId, index: usize) {
        self.push(SinkCommand::MarkSegmentCovered { route: route.clone(), index });
    }

    fn place_marker(&self, route: &RouteId, coordinate: GeoPoint) -> MarkerHandle {
        let marker = MarkerHandle(self.next_marker.fetch_add(1, Ordering::Relaxed));
        self.push(SinkCommand::PlaceMarker { route: route.clone(), coordinate, marker });
        marker
    }

    fn move_marker(&self, route: &RouteId, coordinate: GeoPoint) {
        self.push(SinkCommand::MoveMarker { route: route.clone(), coordinate });
    }

    fn remove_marker(&self, marker: MarkerHandle) {
        self.push(SinkCommand::RemoveMarker(marker));
    }

    fn erase_route(&self, route: &RouteId) {
        self.push(SinkCommand::EraseRoute(route.clone()));
    }
}

// ── TracingSink ───────────────────────────────────────────────────────────────

/// Logs every command at `debug` level.  Handy for headless runs.
#[derive(Debug, Default)]
pub struct TracingSink {
    next_marker: AtomicU64,
}

impl MapSink for TracingSink {
    fn draw_route(&self, route: &RouteId, coordinates: &[GeoPoint]) {
        tracing::debug!(route = %route, points = coordinates.len(), "draw route");
    }

    fn mark_segment_covered(&self, route: &RouteId, index: usize) {
        tracing::debug!(route = %route, segment = index, "segment covered");
    }

    fn place_marker(&self, route: &RouteId, coordinate: GeoPoint) -> MarkerHandle {
        let marker = MarkerHandle(self.next_marker.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(route = %route, at = %coordinate, marker = %marker, "place marker");
        marker
    }

    fn move_marker(&self, route: &RouteId, coordinate: GeoPoint) {
        tracing::debug!(route = %route, at = %coordinate, "move marker");
    }

    fn remove_marker(&self, marker: MarkerHandle) {
        tracing::debug!(marker = %marker, "remove marker");
    }

    fn erase_route(&self, route: &RouteId) {
        tracing::debug!(route = %route, "erase route");
    }
}
