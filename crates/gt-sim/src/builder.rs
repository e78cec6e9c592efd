//! Fluent builder for constructing a [`Scheduler`].

use std::collections::HashMap;

use parking_lot::{Mutex, ReentrantMutex};
use tokio::runtime::Handle;

use gt_agent::{History, RouteAgentState};
use gt_catalog::RouteCatalog;
use gt_geofence::{EdgeDetector, GeofenceEvaluator, GeofenceGateway};

use crate::scheduler::{Shared, State};
use crate::{MapSink, NoopObserver, NoopSink, Scheduler, SchedulerConfig, SimError, SimResult, TrackingObserver};

/// Fluent builder for [`Scheduler<G, S, O>`].
///
/// # Required inputs
///
/// - [`RouteCatalog`]: one inactive agent is created per route
/// - `G: GeofenceGateway`: source of geofence definitions
///
/// # Optional inputs (have defaults)
///
/// | Method           | Default                          |
/// |------------------|----------------------------------|
/// | `.sink(s)`       | [`NoopSink`]                     |
/// | `.observer(o)`   | [`NoopObserver`]                 |
/// | `.config(c)`     | `SchedulerConfig::default()`     |
/// | `.runtime(h)`    | `Handle::try_current()`          |
///
/// # Example
///
/// ```rust,ignore
/// let scheduler = SchedulerBuilder::new(catalog, gateway)
///     .sink(TracingSink::default())
///     .observer(CallbackObserver::new().with_enter(|r, g| println!("{r} → {g}")))
///     .build()?;
/// scheduler.start(&RouteId::new("R1"))?;
/// ```
pub struct SchedulerBuilder<G, S = NoopSink, O = NoopObserver> {
    catalog:  RouteCatalog,
    gateway:  G,
    sink:     S,
    observer: O,
    config:   SchedulerConfig,
    runtime:  Option<Handle>,
}

impl<G: GeofenceGateway> SchedulerBuilder<G> {
    pub fn new(catalog: RouteCatalog, gateway: G) -> Self {
        Self {
            catalog,
            gateway,
            sink:     NoopSink::default(),
            observer: NoopObserver,
            config:   SchedulerConfig::default(),
            runtime:  None,
        }
    }
}

impl<G, S, O> SchedulerBuilder<G, S, O>
where
    G: GeofenceGateway,
    S: MapSink,
    O: TrackingObserver,
{
    /// Where map commands go.
    pub fn sink<S2: MapSink>(self, sink: S2) -> SchedulerBuilder<G, S2, O> {
        SchedulerBuilder {
            catalog:  self.catalog,
            gateway:  self.gateway,
            sink,
            observer: self.observer,
            config:   self.config,
            runtime:  self.runtime,
        }
    }

    /// Who hears about crossings, samples and wraps.
    pub fn observer<O2: TrackingObserver>(self, observer: O2) -> SchedulerBuilder<G, S, O2> {
        SchedulerBuilder {
            catalog:  self.catalog,
            gateway:  self.gateway,
            sink:     self.sink,
            observer,
            config:   self.config,
            runtime:  self.runtime,
        }
    }

    pub fn config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Runtime on which timers and evaluations are spawned.
    ///
    /// If not called, `build` must run inside a tokio runtime.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Validate the configuration, create one inactive agent per route and
    /// return the scheduler.
    pub fn build(self) -> SimResult<Scheduler<G, S, O>> {
        self.config.validate()?;

        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| SimError::NoRuntime)?,
        };

        let agents: HashMap<_, _> = self
            .catalog
            .all()
            .iter()
            .map(|route| {
                let history = match self.config.history_capacity {
                    Some(cap) => History::bounded(cap),
                    None => History::new(),
                };
                (route.id().clone(), RouteAgentState::new(history))
            })
            .collect();

        tracing::info!(
            routes = agents.len(),
            interval_ms = self.config.tick_interval_ms,
            "scheduler built"
        );

        Ok(Scheduler::from_shared(Shared {
            catalog:   self.catalog,
            evaluator: GeofenceEvaluator::new(self.gateway),
            sink:      self.sink,
            observer:  self.observer,
            config:    self.config,
            runtime,
            delivery:  ReentrantMutex::new(()),
            state:     Mutex::new(State {
                agents,
                edges: EdgeDetector::new(),
            }),
        }))
    }
}
