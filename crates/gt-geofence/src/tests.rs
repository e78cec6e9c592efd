//! Unit tests for gt-geofence.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use gt_core::{CollectionId, GeoPoint, GeofenceId, RouteId};

use crate::{Geofence, GeofenceError, GeofenceGateway, GeofenceResult, InsideSet, StaticGateway};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// One degree of arc on the mean sphere, rounded up to whole metres.
const ONE_DEGREE_M: f64 = 111_195.0;

fn ids(names: &[&str]) -> InsideSet {
    names.iter().map(|n| GeofenceId::new(n)).collect()
}

fn square(id: &str, lat0: f64, lon0: f64, side: f64) -> Geofence {
    Geofence::polygon(id, vec![
        GeoPoint::new(lat0, lon0),
        GeoPoint::new(lat0, lon0 + side),
        GeoPoint::new(lat0 + side, lon0 + side),
        GeoPoint::new(lat0 + side, lon0),
    ])
    .unwrap()
}

/// Gateway that counts calls, sleeps before answering, and fails the first
/// `failures` calls.
struct CountingGateway {
    inner:    StaticGateway,
    calls:    AtomicUsize,
    failures: usize,
    delay:    Duration,
}

impl CountingGateway {
    fn new(inner: StaticGateway, failures: usize, delay: Duration) -> Self {
        Self { inner, calls: AtomicUsize::new(0), failures, delay }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl GeofenceGateway for CountingGateway {
    async fn fetch(&self, collection: &CollectionId) -> GeofenceResult<Vec<Geofence>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if call < self.failures {
            return Err(GeofenceError::Fetch {
                collection: collection.clone(),
                reason:     "backend unavailable".into(),
            });
        }
        self.inner.fetch(collection).await
    }
}

fn harbour_gateway() -> StaticGateway {
    StaticGateway::new().with_collection("harbour", vec![
        Geofence::circle("G1", GeoPoint::new(0.0, 1.0), ONE_DEGREE_M + 5.0).unwrap(),
        Geofence::circle("G2", GeoPoint::new(0.0, 5.0), 1_000.0).unwrap(),
    ])
}

// ── Fences ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod fences {
    use super::*;
    use crate::GeofenceShape;

    #[test]
    fn circle_boundary_is_inclusive() {
        let center = GeoPoint::new(0.0, 1.0);
        let edge = GeoPoint::new(0.0, 2.0);
        let radius = edge.distance_m(center);

        let exact = Geofence::circle("G", center, radius).unwrap();
        assert!(exact.contains(edge));

        let smaller = Geofence::circle("G", center, radius - 0.001).unwrap();
        assert!(!smaller.contains(edge));
    }

    #[test]
    fn zero_radius_contains_only_center() {
        let center = GeoPoint::new(10.0, 10.0);
        let fence = Geofence::circle("G", center, 0.0).unwrap();
        assert!(fence.contains(center));
        assert!(!fence.contains(GeoPoint::new(10.0, 10.0001)));
    }

    #[test]
    fn invalid_radius_rejected() {
        let p = GeoPoint::new(0.0, 0.0);
        assert!(matches!(
            Geofence::circle("G", p, -1.0),
            Err(GeofenceError::InvalidRadius { .. })
        ));
        assert!(Geofence::circle("G", p, f64::NAN).is_err());
    }

    #[test]
    fn polygon_membership() {
        let sq = square("S", 0.0, 0.0, 1.0);
        assert!(sq.contains(GeoPoint::new(0.5, 0.5)));
        assert!(!sq.contains(GeoPoint::new(1.5, 0.5)));
        assert!(!sq.contains(GeoPoint::new(0.5, -0.1)));
        assert!(matches!(sq.shape(), GeofenceShape::Polygon { vertices } if vertices.len() == 4));
    }

    #[test]
    fn degenerate_polygon_rejected() {
        let result = Geofence::polygon("P", vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0)]);
        assert!(matches!(result, Err(GeofenceError::DegeneratePolygon(_))));
    }

    #[test]
    fn circle_bounds_contain_boundary_points() {
        let center = GeoPoint::new(45.0, 7.0);
        let fence = Geofence::circle("G", center, 50_000.0).unwrap();
        let (min, max) = fence.bounds();
        // Sample the boundary at 10° steps by bisecting along each bearing.
        for step in 0..36 {
            let bearing = (step as f64 * 10.0).to_radians();
            let (mut lo, mut hi) = (0.0_f64, 2.0_f64);
            for _ in 0..60 {
                let mid = (lo + hi) / 2.0;
                let p = GeoPoint::new(center.lat + mid * bearing.cos(), center.lon + mid * bearing.sin());
                if fence.contains(p) { lo = mid } else { hi = mid }
            }
            let p = GeoPoint::new(center.lat + lo * bearing.cos(), center.lon + lo * bearing.sin());
            assert!(p.lat >= min[0] && p.lat <= max[0], "lat out of box at step {step}");
            assert!(p.lon >= min[1] && p.lon <= max[1], "lon out of box at step {step}");
        }
    }

    #[test]
    fn polar_circle_spans_all_longitudes() {
        let fence = Geofence::circle("N", GeoPoint::new(89.9, 0.0), 50_000.0).unwrap();
        let (min, max) = fence.bounds();
        assert_eq!(min[1], -180.0);
        assert_eq!(max[1], 180.0);
        assert_eq!(max[0], 90.0);
    }

    #[test]
    fn antimeridian_circle_spans_all_longitudes() {
        let fence = Geofence::circle("D", GeoPoint::new(0.0, 179.99), 10_000.0).unwrap();
        let (min, max) = fence.bounds();
        assert_eq!((min[1], max[1]), (-180.0, 180.0));
        assert!(fence.contains(GeoPoint::new(0.0, -179.995)));
    }
}

// ── GeofenceIndex ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod index {
    use super::*;
    use crate::GeofenceIndex;

    #[test]
    fn matches_linear_scan() {
        let mut fences = Vec::new();
        for i in 0..10 {
            let c = GeoPoint::new(i as f64 * 0.01, i as f64 * 0.01);
            fences.push(Geofence::circle(format!("C{i}"), c, 800.0 + i as f64 * 200.0).unwrap());
        }
        fences.push(square("SQ", 0.02, 0.02, 0.03));
        let index = GeofenceIndex::build(fences.clone());
        assert_eq!(index.len(), 11);

        for a in 0..25 {
            for b in 0..25 {
                let p = GeoPoint::new(a as f64 * 0.004, b as f64 * 0.004);
                let linear: InsideSet = fences
                    .iter()
                    .filter(|f| f.contains(p))
                    .map(|f| f.id().clone())
                    .collect();
                assert_eq!(index.containing(p), linear, "mismatch at {p}");
            }
        }
    }

    #[test]
    fn empty_index_contains_nothing() {
        let index = GeofenceIndex::build(vec![]);
        assert!(index.is_empty());
        assert!(index.containing(GeoPoint::new(0.0, 0.0)).is_empty());
    }
}

// ── EdgeDetector ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod edges {
    use super::*;
    use crate::{CrossingKind, EdgeDetector, Transition};

    fn enter(id: &str) -> Transition {
        Transition { geofence: GeofenceId::new(id), kind: CrossingKind::Enter }
    }

    fn exit(id: &str) -> Transition {
        Transition { geofence: GeofenceId::new(id), kind: CrossingKind::Exit }
    }

    #[test]
    fn one_enter_and_one_exit_per_pass() {
        let route = RouteId::new("R1");
        let mut edges = EdgeDetector::new();
        let sequence = [ids(&[]), ids(&["G"]), ids(&["G"]), ids(&["G"]), ids(&[])];

        let fired: Vec<Transition> = sequence
            .into_iter()
            .flat_map(|set| edges.observe(&route, set))
            .collect();
        assert_eq!(fired, [enter("G"), exit("G")]);
    }

    #[test]
    fn exits_listed_before_enters() {
        let route = RouteId::new("R1");
        let mut edges = EdgeDetector::new();
        edges.observe(&route, ids(&["A"]));
        assert_eq!(edges.observe(&route, ids(&["B"])), [exit("A"), enter("B")]);
        assert_eq!(edges.inside(&route), ids(&["B"]));
    }

    #[test]
    fn reset_refires_enter() {
        let route = RouteId::new("R1");
        let mut edges = EdgeDetector::new();
        assert_eq!(edges.observe(&route, ids(&["G"])), [enter("G")]);
        assert!(edges.observe(&route, ids(&["G"])).is_empty());
        edges.reset(&route);
        assert_eq!(edges.observe(&route, ids(&["G"])), [enter("G")]);
    }

    #[test]
    fn routes_are_independent() {
        let (a, b) = (RouteId::new("A"), RouteId::new("B"));
        let mut edges = EdgeDetector::new();
        edges.observe(&a, ids(&["G"]));
        assert_eq!(edges.observe(&b, ids(&["G"])), [enter("G")]);
        edges.reset(&a);
        assert!(edges.inside(&a).is_empty());
        assert_eq!(edges.inside(&b), ids(&["G"]));
    }
}

// ── Evaluator + cache ─────────────────────────────────────────────────────────

#[cfg(test)]
mod evaluator {
    use std::sync::Arc;

    use super::*;
    use crate::GeofenceEvaluator;

    #[tokio::test]
    async fn evaluates_against_collection() {
        let eval = GeofenceEvaluator::new(harbour_gateway());
        let c = CollectionId::new("harbour");

        let inside = eval.try_evaluate(GeoPoint::new(0.0, 1.0), &c).await.unwrap();
        assert_eq!(inside, ids(&["G1"]));

        let inside = eval.try_evaluate(GeoPoint::new(0.0, 5.001), &c).await.unwrap();
        assert_eq!(inside, ids(&["G2"]));

        assert_eq!(eval.cache().len(), 1);
    }

    #[tokio::test]
    async fn unknown_collection_is_none() {
        let eval = GeofenceEvaluator::new(harbour_gateway());
        let result = eval.evaluate(GeoPoint::new(0.0, 1.0), &CollectionId::new("nowhere")).await;
        assert!(result.is_none());
        assert!(eval.cache().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_first_fetch_runs_once() {
        let gateway = Arc::new(CountingGateway::new(harbour_gateway(), 0, Duration::from_millis(50)));
        let eval = GeofenceEvaluator::new(Arc::clone(&gateway));
        let c = CollectionId::new("harbour");
        let p = GeoPoint::new(0.0, 1.0);

        let (a, b, d) = tokio::join!(
            eval.try_evaluate(p, &c),
            eval.try_evaluate(p, &c),
            eval.try_evaluate(p, &c),
        );
        assert_eq!(a.unwrap(), ids(&["G1"]));
        assert_eq!(b.unwrap(), ids(&["G1"]));
        assert_eq!(d.unwrap(), ids(&["G1"]));
        assert_eq!(gateway.calls(), 1);

        eval.try_evaluate(p, &c).await.unwrap();
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_is_retried() {
        let gateway = Arc::new(CountingGateway::new(harbour_gateway(), 2, Duration::ZERO));
        let eval = GeofenceEvaluator::new(Arc::clone(&gateway));
        let c = CollectionId::new("harbour");
        let p = GeoPoint::new(0.0, 1.0);

        assert!(eval.evaluate(p, &c).await.is_none());
        assert!(eval.evaluate(p, &c).await.is_none());
        assert_eq!(eval.evaluate(p, &c).await, Some(ids(&["G1"])));
        assert_eq!(gateway.calls(), 3);
        assert!(eval.cache().get(&c).is_some());
    }

    #[tokio::test]
    async fn cache_clear_forces_refetch() {
        let gateway = Arc::new(CountingGateway::new(harbour_gateway(), 0, Duration::ZERO));
        let eval = GeofenceEvaluator::new(Arc::clone(&gateway));
        let c = CollectionId::new("harbour");

        eval.index(&c).await.unwrap();
        eval.cache().clear();
        eval.index(&c).await.unwrap();
        assert_eq!(gateway.calls(), 2);
    }
}

// ── CSV loader ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use super::*;
    use crate::load_geofences_reader;

    #[tokio::test]
    async fn loads_collections() {
        let csv = "\
collection_id,geofence_id,lat,lon,radius_m\n\
harbour,G1,0.0,1.0,111200\n\
harbour,G2,0.5,1.5,2500\n\
hills,H1,10.0,10.0,300\n\
";
        let gateway = load_geofences_reader(Cursor::new(csv)).unwrap();
        assert_eq!(gateway.collection_count(), 2);
        let fences = gateway.fetch(&CollectionId::new("harbour")).await.unwrap();
        let names: Vec<&str> = fences.iter().map(|f| f.id().as_str()).collect();
        assert_eq!(names, ["G1", "G2"]);
    }

    #[test]
    fn negative_radius_rejected() {
        let csv = "collection_id,geofence_id,lat,lon,radius_m\nh,G1,0.0,0.0,-5\n";
        assert!(matches!(
            load_geofences_reader(Cursor::new(csv)),
            Err(GeofenceError::InvalidRadius { .. })
        ));
    }

    #[test]
    fn bad_row_is_parse_error() {
        let csv = "collection_id,geofence_id,lat,lon,radius_m\nh,G1,north,0.0,5\n";
        assert!(matches!(load_geofences_reader(Cursor::new(csv)), Err(GeofenceError::Parse(_))));
    }
}
