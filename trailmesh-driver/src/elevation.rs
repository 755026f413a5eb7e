//! Elevation oracle — the core treats elevation sampling as an opaque
//! collaborator (`elevation(lat, lon) → metres`) rather than parsing tiles
//! itself. A failed lookup gets one bounded retry with a short delay, then
//! falls back to a poison value instead of aborting the whole batch.

use std::thread;
use std::time::Duration;

use trailmesh_graph::Node;

/// A point the oracle failed to sample after retrying is reported at this
/// elevation rather than aborting the batch.
pub const POISON_ELEVATION_M: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationChange {
    pub gain_m: f64,
    pub loss_m: f64,
}

/// A source of point elevations. Implementations are assumed internally
/// thread-safe.
pub trait ElevationOracle: Send + Sync {
    /// Single-point elevation lookup; `None` signals a failed call for this
    /// attempt (network/disk error, timeout, missing tile).
    fn elevation_m(&self, lat: f64, lon: f64) -> Option<f64>;
}

/// `elevation_m`, retried once after a short delay, falling back to
/// `POISON_ELEVATION_M` rather than propagating the failure.
fn sample_with_retry(oracle: &dyn ElevationOracle, lat: f64, lon: f64, retry_delay: Duration) -> f64 {
    if let Some(m) = oracle.elevation_m(lat, lon) {
        return m;
    }
    log::warn!("elevation lookup failed for ({lat}, {lon}), retrying once");
    thread::sleep(retry_delay);
    oracle.elevation_m(lat, lon).unwrap_or_else(|| {
        log::warn!("elevation lookup failed twice for ({lat}, {lon}), using poison value");
        POISON_ELEVATION_M
    })
}

/// `elevations(nodes)`: per-node elevation, in node order.
pub fn elevations(oracle: &dyn ElevationOracle, nodes: &[Node], retry_delay: Duration) -> Vec<f64> {
    nodes
        .iter()
        .map(|n| sample_with_retry(oracle, n.lat, n.lon, retry_delay))
        .collect()
}

/// `elevation_gain_loss(nodes)`: total ascent/descent walking the node
/// sequence in order.
pub fn elevation_gain_loss(oracle: &dyn ElevationOracle, nodes: &[Node], retry_delay: Duration) -> ElevationChange {
    let samples = elevations(oracle, nodes, retry_delay);
    let mut gain_m = 0.0;
    let mut loss_m = 0.0;
    for pair in samples.windows(2) {
        let delta = pair[1] - pair[0];
        if delta > 0.0 {
            gain_m += delta;
        } else {
            loss_m += -delta;
        }
    }
    ElevationChange { gain_m, loss_m }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use trailmesh_common::NodeId;

    fn node(lat: f64, lon: f64) -> Node {
        Node {
            id: NodeId::plain(1),
            lat,
            lon,
        }
    }

    struct AlwaysFailsOracle;
    impl ElevationOracle for AlwaysFailsOracle {
        fn elevation_m(&self, _lat: f64, _lon: f64) -> Option<f64> {
            None
        }
    }

    struct FailsOnceOracle(AtomicUsize);
    impl ElevationOracle for FailsOnceOracle {
        fn elevation_m(&self, _lat: f64, _lon: f64) -> Option<f64> {
            if self.0.fetch_add(1, Ordering::SeqCst) == 0 {
                None
            } else {
                Some(42.0)
            }
        }
    }

    #[test]
    fn always_failing_oracle_falls_back_to_poison_value() {
        let oracle = AlwaysFailsOracle;
        let nodes = [node(0.0, 0.0)];
        let samples = elevations(&oracle, &nodes, Duration::from_millis(0));
        assert_eq!(samples, vec![POISON_ELEVATION_M]);
    }

    #[test]
    fn a_single_retry_succeeds_before_falling_back() {
        let oracle = FailsOnceOracle(AtomicUsize::new(0));
        let nodes = [node(0.0, 0.0)];
        let samples = elevations(&oracle, &nodes, Duration::from_millis(0));
        assert_eq!(samples, vec![42.0]);
    }

    #[test]
    fn gain_loss_matches_a_simple_up_down_profile() {
        // An oracle that reports latitude itself as elevation, so the node
        // sequence's lat values directly encode an up-then-down profile.
        struct StepOracle;
        impl ElevationOracle for StepOracle {
            fn elevation_m(&self, lat: f64, _lon: f64) -> Option<f64> {
                Some(lat)
            }
        }
        let nodes = [node(0.0, 0.0), node(100.0, 0.0), node(60.0, 0.0)];
        let change = elevation_gain_loss(&StepOracle, &nodes, Duration::from_millis(0));
        assert_eq!(change.gain_m, 100.0);
        assert_eq!(change.loss_m, 40.0);
    }
}
