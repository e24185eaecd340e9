//! Path finding and pluggable route providers.
//!
//! [`PathFinder`] runs A* over the [`RoadNetwork`] and applies the direct
//! fallback policy. Two [`RouteProvider`] implementations turn coordinates
//! into animator-ready [`RoutePlan`]s, selectable via [`RouteProviderKind`]:
//!
//! - **`GraphRouteProvider`**: snaps both ends to their nearest nodes, runs
//!   the path finder, expands curved-road waypoints. Node-pair plans are
//!   memoized in an LRU cache.
//! - **`DirectRouteProvider`**: a straight line from origin to destination.
//!
//! The provider is stored as a `Box<dyn RouteProvider>` ECS resource, built
//! from [`RoutingConfig`] when the engine is constructed.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use bevy_ecs::prelude::Resource;
use lru::LruCache;
use pathfinding::prelude::astar;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::network::RoadNetwork;
use crate::spatial::{polyline_length, Coordinate};

/// Fixed-point scale for A* costs (coordinate units → integer cost).
const COST_SCALE: f64 = 1e9;

/// Default maximum ratio of road length to straight-line length before the
/// path finder gives up on the road path.
pub const DEFAULT_DETOUR_RATIO: f64 = 1.5;

const DEFAULT_ROUTE_CACHE_CAPACITY: usize = 256;

// Edge costs round up and the heuristic rounds down, so the integer
// heuristic never exceeds the integer cost of any remaining path.
fn edge_cost(distance: f64) -> u64 {
    (distance * COST_SCALE).ceil() as u64
}

fn heuristic_cost(distance: f64) -> u64 {
    (distance * COST_SCALE).floor() as u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// No road connects the two nodes.
    Disconnected,
    /// A road path exists but is longer than the detour ratio allows.
    Detour,
}

/// Result of a node-to-node path query.
#[derive(Debug, Clone, PartialEq)]
pub struct PathPlan {
    pub nodes: Vec<String>,
    /// Length of the returned node sequence, in coordinate units.
    pub length: f64,
    pub straight_line: f64,
    /// Set when `nodes` is the direct `[start, end]` fallback.
    pub fallback: Option<FallbackReason>,
}

/// A* over the road network with the direct-route fallback policy.
#[derive(Debug, Clone, Copy)]
pub struct PathFinder<'a> {
    network: &'a RoadNetwork,
    detour_ratio: f64,
}

impl<'a> PathFinder<'a> {
    pub fn new(network: &'a RoadNetwork) -> Self {
        Self {
            network,
            detour_ratio: DEFAULT_DETOUR_RATIO,
        }
    }

    pub fn with_detour_ratio(mut self, ratio: f64) -> Self {
        self.detour_ratio = ratio;
        self
    }

    /// Ordered node ids from `start` to `end`, or exactly `[start, end]` when
    /// the graph offers no reasonable road path.
    pub fn find_path(&self, start: &str, end: &str) -> EngineResult<Vec<String>> {
        self.plan_path(start, end).map(|plan| plan.nodes)
    }

    pub fn plan_path(&self, start: &str, end: &str) -> EngineResult<PathPlan> {
        let start_idx = self
            .network
            .index_of(start)
            .ok_or_else(|| EngineError::node_not_found(start))?;
        let end_idx = self
            .network
            .index_of(end)
            .ok_or_else(|| EngineError::node_not_found(end))?;
        Ok(self.plan_indices(start_idx, end_idx))
    }

    pub(crate) fn plan_indices(&self, start: usize, end: usize) -> PathPlan {
        let network = self.network;
        let goal = network.node_at(end).coordinate;
        let straight_line = network.node_at(start).coordinate.distance_to(goal);

        let found = astar(
            &start,
            move |&idx| {
                let here = network.node_at(idx).coordinate;
                network
                    .neighbor_indices(idx)
                    .iter()
                    .map(move |&n| (n, edge_cost(here.distance_to(network.node_at(n).coordinate))))
            },
            move |&idx| heuristic_cost(network.node_at(idx).coordinate.distance_to(goal)),
            move |&idx| idx == end,
        );

        let fallback = match found {
            None => Some(FallbackReason::Disconnected),
            Some((path, _)) => {
                let points: Vec<Coordinate> =
                    path.iter().map(|&i| network.node_at(i).coordinate).collect();
                let length = polyline_length(&points);
                if length > straight_line * self.detour_ratio {
                    Some(FallbackReason::Detour)
                } else {
                    return PathPlan {
                        nodes: path
                            .into_iter()
                            .map(|i| network.node_at(i).id.clone())
                            .collect(),
                        length,
                        straight_line,
                        fallback: None,
                    };
                }
            }
        };

        PathPlan {
            nodes: vec![
                network.node_at(start).id.clone(),
                network.node_at(end).id.clone(),
            ],
            length: straight_line,
            straight_line,
            fallback,
        }
    }
}

/// How a dispatch route was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "reason")]
pub enum RouteKind {
    /// Followed roads on the graph.
    Road,
    /// Graph routing fell back to the direct `[start, end]` node pair.
    Fallback(FallbackReason),
    /// Straight line, no graph involved.
    Direct,
}

/// Animator-ready route between two coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    /// Graph nodes visited, empty for direct routes.
    pub nodes: Vec<String>,
    /// Coordinates to walk through in order; the last one is the destination.
    pub targets: Vec<Coordinate>,
    pub kind: RouteKind,
}

impl RoutePlan {
    /// Full polyline including the origin, for visualization.
    pub fn geometry(&self, origin: Coordinate) -> Vec<Coordinate> {
        std::iter::once(origin)
            .chain(self.targets.iter().copied())
            .collect()
    }

    pub fn length_from(&self, origin: Coordinate) -> f64 {
        polyline_length(&self.geometry(origin))
    }
}

/// Drop targets that repeat the previous point (starting from `origin`), so
/// the animator never spends a segment standing still.
fn compact_targets(origin: Coordinate, targets: Vec<Coordinate>) -> Vec<Coordinate> {
    let mut last = origin;
    let mut compacted = Vec::with_capacity(targets.len());
    for target in targets {
        if target != last {
            compacted.push(target);
            last = target;
        }
    }
    compacted
}

/// Trait for routing backends. Implementations must be `Send + Sync` so the
/// provider can be stored as a shared ECS resource.
pub trait RouteProvider: Send + Sync {
    fn route(&self, from: Coordinate, to: Coordinate) -> EngineResult<RoutePlan>;
}

/// ECS resource wrapping a boxed route provider.
#[derive(Resource)]
pub struct RouteProviderResource(pub Box<dyn RouteProvider>);

/// Straight-line routing: the only target is the destination.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectRouteProvider;

impl RouteProvider for DirectRouteProvider {
    fn route(&self, from: Coordinate, to: Coordinate) -> EngineResult<RoutePlan> {
        Ok(RoutePlan {
            nodes: Vec::new(),
            targets: compact_targets(from, vec![to]),
            kind: RouteKind::Direct,
        })
    }
}

/// Routes along the road graph: nearest node at each end, A* in between,
/// curved-road waypoints expanded, destination appended.
pub struct GraphRouteProvider {
    network: Arc<RoadNetwork>,
    detour_ratio: f64,
    cache: Option<Mutex<LruCache<(usize, usize), PathPlan>>>,
}

impl GraphRouteProvider {
    pub fn new(network: Arc<RoadNetwork>) -> Self {
        Self {
            network,
            detour_ratio: DEFAULT_DETOUR_RATIO,
            cache: None,
        }
    }

    pub fn with_detour_ratio(mut self, ratio: f64) -> Self {
        self.detour_ratio = ratio;
        self
    }

    /// Memoize node-pair plans; a capacity of zero disables the cache.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap)));
        self
    }

    fn plan(&self, start: usize, end: usize) -> PathPlan {
        let finder = PathFinder::new(&self.network).with_detour_ratio(self.detour_ratio);
        let Some(cache) = &self.cache else {
            return finder.plan_indices(start, end);
        };

        if let Ok(mut guard) = cache.lock() {
            if let Some(hit) = guard.get(&(start, end)) {
                return hit.clone();
            }
        }
        let plan = finder.plan_indices(start, end);
        if let Ok(mut guard) = cache.lock() {
            guard.put((start, end), plan.clone());
        }
        plan
    }
}

impl RouteProvider for GraphRouteProvider {
    fn route(&self, from: Coordinate, to: Coordinate) -> EngineResult<RoutePlan> {
        let start = self
            .network
            .nearest_index(from)
            .ok_or_else(|| EngineError::Configuration("road network has no nodes".to_string()))?;
        let end = self
            .network
            .nearest_index(to)
            .ok_or_else(|| EngineError::Configuration("road network has no nodes".to_string()))?;

        let plan = self.plan(start, end);
        let mut targets = self.network.expand_path(&plan.nodes)?;
        targets.push(to);

        Ok(RoutePlan {
            kind: match plan.fallback {
                Some(reason) => RouteKind::Fallback(reason),
                None => RouteKind::Road,
            },
            nodes: plan.nodes,
            targets: compact_targets(from, targets),
        })
    }
}

/// Which routing backend ground units use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteProviderKind {
    #[default]
    Graph,
    Direct,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub provider: RouteProviderKind,
    pub detour_ratio: f64,
    pub cache_capacity: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            provider: RouteProviderKind::Graph,
            detour_ratio: DEFAULT_DETOUR_RATIO,
            cache_capacity: DEFAULT_ROUTE_CACHE_CAPACITY,
        }
    }
}

/// Construct a boxed [`RouteProvider`] from the routing configuration.
pub fn build_route_provider(
    config: &RoutingConfig,
    network: Arc<RoadNetwork>,
) -> Box<dyn RouteProvider> {
    match config.provider {
        RouteProviderKind::Graph => Box::new(
            GraphRouteProvider::new(network)
                .with_detour_ratio(config.detour_ratio)
                .with_cache_capacity(config.cache_capacity),
        ),
        RouteProviderKind::Direct => Box::new(DirectRouteProvider),
    }
}
