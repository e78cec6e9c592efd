//! corridor: smallest example for the geotrack simulation engine.
//!
//! Replays three delivery runs around Mobile Bay concurrently, printing every
//! geofence crossing as it happens and each route's position history at the
//! end.  Pass a JSON `SchedulerConfig` file as the first argument to override
//! the demo timing:
//!
//! ```text
//! cargo run -p corridor -- config.json
//! RUST_LOG=debug cargo run -p corridor      # includes every map command
//! ```

mod fixtures;

use std::io::Cursor;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use gt_agent::PositionSample;
use gt_catalog::load_routes_reader;
use gt_core::RouteId;
use gt_geofence::load_geofences_reader;
use gt_sim::{ChannelObserver, SchedulerBuilder, SchedulerConfig, TrackingEvent, TracingSink};

// ── Constants ─────────────────────────────────────────────────────────────────

const DEMO_TICK_MS: u64   = 250;
const PHASE_TICKS:  u32   = 6; // ticks per demo phase
const MAX_PRINTED:  usize = 8; // history rows printed per route

// ── Config ────────────────────────────────────────────────────────────────────

fn load_config() -> Result<SchedulerConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {path}"))?;
            let config = serde_json::from_str(&text)
                .with_context(|| format!("parsing config {path}"))?;
            tracing::info!(path = %path, "config loaded");
            Ok(config)
        }
        None => Ok(SchedulerConfig {
            tick_interval_ms: DEMO_TICK_MS,
            ..SchedulerConfig::default()
        }),
    }
}

fn print_history(route: &RouteId, history: &[PositionSample]) {
    println!("{route}: {} samples", history.len());
    for s in history.iter().take(MAX_PRINTED) {
        println!(
            "  {:<6} {:<22} {:>10.4} {:>10.4}  {}",
            s.tick.to_string(),
            s.label,
            s.coordinate.lat,
            s.coordinate.lon,
            s.timestamp.format("%H:%M:%S%.3f"),
        );
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== corridor: geotrack simulation ===");

    // 1. Config, routes, geofences.
    let config = load_config()?;
    let phase = Duration::from_millis(config.tick_interval_ms) * PHASE_TICKS;

    let catalog = load_routes_reader(Cursor::new(fixtures::ROUTES_CSV))?;
    let mut gateway = load_geofences_reader(Cursor::new(fixtures::GEOFENCES_CSV))?;
    gateway.push("bay", fixtures::eastern_shore()?);
    println!(
        "Routes: {}  |  Geofence collections: {}  |  Tick: {} ms",
        catalog.len(),
        gateway.collection_count(),
        config.tick_interval_ms,
    );
    println!();

    // 2. Crossing printer.
    let (observer, mut events) = ChannelObserver::new();
    let printer = tokio::spawn(async move {
        let mut crossings = 0usize;
        while let Some(event) = events.recv().await {
            match event {
                TrackingEvent::Enter(e) => {
                    crossings += 1;
                    println!("  → {:<10} entered {}", e.route, e.geofence);
                }
                TrackingEvent::Exit(e) => {
                    crossings += 1;
                    println!("  ← {:<10} left    {}", e.route, e.geofence);
                }
                TrackingEvent::Wrapped(route) => println!("  ↺ {route:<10} completed a pass"),
                TrackingEvent::Sample { .. } => {}
            }
        }
        crossings
    });

    // 3. Scheduler.
    let scheduler = SchedulerBuilder::new(catalog, gateway)
        .sink(TracingSink::default())
        .observer(observer)
        .config(config)
        .build()?;
    let routes: Vec<RouteId> = scheduler.catalog().ids().cloned().collect();
    let downtown = RouteId::new("downtown");

    // 4. Run: everything on, downtown off for a phase, then back on.
    let t0 = Instant::now();
    for route in &routes {
        scheduler.start(route)?;
    }
    tokio::time::sleep(phase).await;

    scheduler.stop(&downtown)?;
    for route in scheduler.active_routes() {
        scheduler.restore_progress(&route)?;
    }
    tokio::time::sleep(phase).await;

    scheduler.start(&downtown)?;
    tokio::time::sleep(phase).await;

    // 5. Summary.
    println!();
    println!("{:<10} {:<7} {:<6} {:<6} {:<8}", "Route", "Active", "Index", "Pass", "Samples");
    println!("{}", "-".repeat(42));
    for route in &routes {
        let snap = scheduler.snapshot(route)?;
        println!(
            "{:<10} {:<7} {:<6} {:<6} {:<8}",
            route,
            if snap.active { "yes" } else { "no" },
            snap.path_index,
            snap.pass,
            snap.history_len,
        );
    }
    println!();
    for route in &routes {
        print_history(route, &scheduler.history(route)?);
    }

    scheduler.shutdown();
    drop(scheduler);
    let crossings = tokio::time::timeout(Duration::from_secs(1), printer)
        .await
        .context("event printer did not finish")??;

    println!();
    println!("Simulation ran {:.2} s, {crossings} geofence crossings", t0.elapsed().as_secs_f64());
    Ok(())
}
