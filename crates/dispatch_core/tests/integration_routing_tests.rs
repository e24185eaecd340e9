use std::sync::Arc;

use dispatch_core::network::{RoadNetwork, RoadNode};
use dispatch_core::routing::{
    DirectRouteProvider, FallbackReason, GraphRouteProvider, PathFinder, RouteKind, RouteProvider,
    DEFAULT_DETOUR_RATIO,
};
use dispatch_core::scenario::CityDefinition;
use dispatch_core::spatial::{polyline_length, Coordinate};
use dispatch_core::test_helpers::line_network;

fn koramangala_network() -> RoadNetwork {
    RoadNetwork::from_definition(&CityDefinition::koramangala().network).expect("network")
}

/// Six nodes, one of them isolated, with a few alternative paths.
fn small_graph() -> RoadNetwork {
    RoadNetwork::new(
        vec![
            RoadNode::new("P0", "P0", 0.0, 0.0),
            RoadNode::new("P1", "P1", 1.0, 0.0),
            RoadNode::new("P2", "P2", 2.0, 0.0),
            RoadNode::new("P3", "P3", 1.0, 1.0),
            RoadNode::new("P4", "P4", 2.0, 1.0),
            RoadNode::new("P5", "P5", 5.0, 5.0),
        ],
        &[
            ("P0", "P1"),
            ("P1", "P2"),
            ("P0", "P3"),
            ("P3", "P4"),
            ("P4", "P2"),
            ("P1", "P3"),
        ],
    )
    .expect("network")
}

fn coordinate_of(network: &RoadNetwork, id: &str) -> Coordinate {
    network.node(id).expect("node").coordinate
}

/// Length of the shortest simple path by exhaustive search.
fn brute_force_shortest(network: &RoadNetwork, start: &str, end: &str) -> Option<f64> {
    fn walk(
        network: &RoadNetwork,
        here: &str,
        end: &str,
        visited: &mut Vec<String>,
        length: f64,
        best: &mut Option<f64>,
    ) {
        if here == end {
            if best.map_or(true, |b| length < b) {
                *best = Some(length);
            }
            return;
        }
        for next in network.neighbors(here).expect("neighbors") {
            if visited.iter().any(|v| v == next) {
                continue;
            }
            let step = coordinate_of(network, here).distance_to(coordinate_of(network, next));
            visited.push(next.to_string());
            walk(network, next, end, visited, length + step, best);
            visited.pop();
        }
    }

    let mut best = None;
    let mut visited = vec![start.to_string()];
    walk(network, start, end, &mut visited, 0.0, &mut best);
    best
}

#[test]
fn every_koramangala_path_is_a_valid_walk() {
    let network = koramangala_network();
    let finder = PathFinder::new(&network);
    let ids: Vec<&str> = network.nodes().iter().map(|n| n.id.as_str()).collect();

    for start in &ids {
        for end in &ids {
            let plan = finder.plan_path(start, end).expect("plan");
            assert_eq!(plan.nodes.first().map(String::as_str), Some(*start));
            assert_eq!(plan.nodes.last().map(String::as_str), Some(*end));
            if start == end {
                assert_eq!(plan.nodes.len(), 1);
                continue;
            }
            match plan.fallback {
                Some(_) => assert_eq!(plan.nodes.len(), 2, "{start} -> {end}"),
                None => {
                    for pair in plan.nodes.windows(2) {
                        assert!(
                            network.has_edge(&pair[0], &pair[1]),
                            "{start} -> {end} uses missing edge {} - {}",
                            pair[0],
                            pair[1]
                        );
                    }
                    assert!(plan.length <= plan.straight_line * DEFAULT_DETOUR_RATIO + 1e-12);
                }
            }
        }
    }
}

#[test]
fn isolated_koramangala_nodes_always_fall_back() {
    let network = koramangala_network();
    let finder = PathFinder::new(&network);
    for isolated in ["CheckPost", "WiproPark", "Koramangala80ft", "JyotiNivas"] {
        let plan = finder.plan_path("StJohns", isolated).expect("plan");
        assert_eq!(plan.nodes, vec!["StJohns".to_string(), isolated.to_string()]);
        assert_eq!(plan.fallback, Some(FallbackReason::Disconnected));
    }
}

#[test]
fn a_star_matches_exhaustive_search_on_a_small_graph() {
    let network = small_graph();
    let finder = PathFinder::new(&network);
    let ids: Vec<&str> = network.nodes().iter().map(|n| n.id.as_str()).collect();

    for start in &ids {
        for end in &ids {
            if start == end {
                continue;
            }
            let plan = finder.plan_path(start, end).expect("plan");
            let straight = coordinate_of(&network, start).distance_to(coordinate_of(&network, end));
            match brute_force_shortest(&network, start, end) {
                None => assert_eq!(plan.fallback, Some(FallbackReason::Disconnected)),
                Some(best) if best > straight * DEFAULT_DETOUR_RATIO => {
                    assert_eq!(plan.fallback, Some(FallbackReason::Detour));
                }
                Some(best) => {
                    assert_eq!(plan.fallback, None, "{start} -> {end}");
                    assert!(
                        (plan.length - best).abs() < 1e-6,
                        "{start} -> {end}: {} vs {best}",
                        plan.length
                    );
                }
            }
        }
    }
}

#[test]
fn line_route_visits_every_node() {
    let network = line_network();
    let path = PathFinder::new(&network).find_path("A", "C").expect("path");
    assert_eq!(path, vec!["A", "B", "C"]);
}

#[test]
fn cached_and_uncached_providers_agree() {
    let network = Arc::new(koramangala_network());
    let cached = GraphRouteProvider::new(Arc::clone(&network)).with_cache_capacity(4);
    let uncached = GraphRouteProvider::new(Arc::clone(&network)).with_cache_capacity(0);
    let points: Vec<Coordinate> = network.nodes().iter().map(|n| n.coordinate).collect();

    // Two passes so the small cache both hits and evicts.
    for _ in 0..2 {
        for from in &points {
            for to in &points {
                let a = cached.route(*from, *to).expect("cached route");
                let b = uncached.route(*from, *to).expect("uncached route");
                assert_eq!(a, b);
            }
        }
    }
}

#[test]
fn road_routes_follow_curved_waypoints() {
    let network = Arc::new(koramangala_network());
    let provider = GraphRouteProvider::new(Arc::clone(&network));
    let from = coordinate_of(&network, "MadiwalaMkt");
    let to = coordinate_of(&network, "StJohns");

    let plan = provider.route(from, to).expect("route");
    assert_eq!(plan.kind, RouteKind::Road);
    assert_eq!(plan.nodes, vec!["MadiwalaMkt", "StJohns"]);
    assert_eq!(plan.targets, vec![Coordinate::new(12.9250, 77.6190), to]);
    assert!(plan.length_from(from) > from.distance_to(to));
}

#[test]
fn direct_routes_are_never_longer_than_road_routes() {
    let network = Arc::new(koramangala_network());
    let road = GraphRouteProvider::new(Arc::clone(&network));
    let from = Coordinate::new(12.9300, 77.6100);
    let to = Coordinate::new(12.9440, 77.6245);

    let direct = DirectRouteProvider.route(from, to).expect("direct");
    let graph = road.route(from, to).expect("road");
    let direct_length = polyline_length(&direct.geometry(from));
    assert!((direct_length - from.distance_to(to)).abs() < 1e-12);
    assert!(graph.length_from(from) >= direct_length);
}
