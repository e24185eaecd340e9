//! Coverage repositioning: idle units drift toward the road network so they
//! are better placed for the next call.

use crate::network::RoadNetwork;
use crate::spatial::Coordinate;

/// Move `fraction` of the remaining distance toward the nearest node.
/// Returns the position unchanged for an empty network.
pub fn nudge_toward_nearest_node(
    network: &RoadNetwork,
    position: Coordinate,
    fraction: f64,
) -> Coordinate {
    match network.nearest_node(position) {
        Ok(node) => position.step_toward(node.coordinate, fraction),
        Err(_) => position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::RoadNode;

    fn network() -> RoadNetwork {
        RoadNetwork::new(
            vec![
                RoadNode::new("A", "Alpha", 0.0, 0.0),
                RoadNode::new("B", "Bravo", 10.0, 0.0),
            ],
            &[("A", "B")],
        )
        .expect("network")
    }

    #[test]
    fn distance_to_nearest_node_shrinks_monotonically() {
        let network = network();
        let mut position = Coordinate::new(2.0, 3.0);
        let mut last = position.distance_to(Coordinate::new(0.0, 0.0));
        for _ in 0..50 {
            position = nudge_toward_nearest_node(&network, position, 0.05);
            let d = position.distance_to(Coordinate::new(0.0, 0.0));
            assert!(d < last);
            last = d;
        }
        // 0.95^50 of the starting distance.
        assert!((last - 13f64.sqrt() * 0.95f64.powi(50)).abs() < 1e-9);
    }

    #[test]
    fn unit_on_a_node_stays_put() {
        let network = network();
        let on_node = Coordinate::new(10.0, 0.0);
        assert_eq!(nudge_toward_nearest_node(&network, on_node, 0.05), on_node);
    }
}
