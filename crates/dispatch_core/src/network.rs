//! Road network graph: named intersections, undirected roads, and optional
//! curved-road waypoints per directed node pair.
//!
//! The graph is immutable once built. Node order is the definition order and
//! is the stable enumeration order used to break ties in
//! [`RoadNetwork::nearest_node`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::spatial::Coordinate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadNode {
    pub id: String,
    pub name: String,
    pub coordinate: Coordinate,
}

impl RoadNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            coordinate: Coordinate::new(lat, lng),
        }
    }
}

/// Interior points approximating a curved road between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveDefinition {
    pub from: String,
    pub to: String,
    pub points: Vec<Coordinate>,
    /// Register the reversed point list for `to -> from` as well.
    #[serde(default = "default_both_directions")]
    pub both_directions: bool,
}

fn default_both_directions() -> bool {
    true
}

/// Serializable description of a road network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkDefinition {
    pub nodes: Vec<RoadNode>,
    /// Undirected roads, each listed once.
    pub edges: Vec<(String, String)>,
    #[serde(default)]
    pub curves: Vec<CurveDefinition>,
}

#[derive(Debug, Clone)]
pub struct RoadNetwork {
    nodes: Vec<RoadNode>,
    index: HashMap<String, usize>,
    adjacency: Vec<Vec<usize>>,
    curves: HashMap<(usize, usize), Vec<Coordinate>>,
    edge_count: usize,
}

impl RoadNetwork {
    /// Build the graph and expand the edge list into a bidirectional
    /// adjacency map. Fails on an empty node set, duplicate node ids,
    /// self-loops and edges that reference unknown nodes.
    pub fn new<S: AsRef<str>>(nodes: Vec<RoadNode>, edges: &[(S, S)]) -> EngineResult<Self> {
        if nodes.is_empty() {
            return Err(EngineError::Configuration(
                "road network has no nodes".to_string(),
            ));
        }

        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.id.clone(), i).is_some() {
                return Err(EngineError::Configuration(format!(
                    "duplicate node id {}",
                    node.id
                )));
            }
        }

        let mut network = Self {
            adjacency: vec![Vec::new(); nodes.len()],
            nodes,
            index,
            curves: HashMap::new(),
            edge_count: 0,
        };

        for (a, b) in edges {
            network.add_edge(a.as_ref(), b.as_ref())?;
        }
        Ok(network)
    }

    pub fn from_definition(definition: &NetworkDefinition) -> EngineResult<Self> {
        let mut network = Self::new(definition.nodes.clone(), &definition.edges)?;
        for curve in &definition.curves {
            network.add_curve(
                &curve.from,
                &curve.to,
                curve.points.clone(),
                curve.both_directions,
            )?;
        }
        Ok(network)
    }

    fn add_edge(&mut self, a: &str, b: &str) -> EngineResult<()> {
        let ia = self.require_index(a)?;
        let ib = self.require_index(b)?;
        if ia == ib {
            return Err(EngineError::Configuration(format!("self-loop edge on {a}")));
        }
        // Duplicate edges collapse into one adjacency entry.
        if self.adjacency[ia].contains(&ib) {
            return Ok(());
        }
        self.adjacency[ia].push(ib);
        self.adjacency[ib].push(ia);
        self.edge_count += 1;
        Ok(())
    }

    /// Attach interior waypoints to the directed pair `from -> to`. The pair
    /// must be joined by an edge.
    pub fn add_curve(
        &mut self,
        from: &str,
        to: &str,
        points: Vec<Coordinate>,
        both_directions: bool,
    ) -> EngineResult<()> {
        let ia = self.require_index(from)?;
        let ib = self.require_index(to)?;
        if !self.adjacency[ia].contains(&ib) {
            return Err(EngineError::Configuration(format!(
                "curve {from} -> {to} has no matching edge"
            )));
        }
        if both_directions {
            let mut reversed = points.clone();
            reversed.reverse();
            self.curves.insert((ib, ia), reversed);
        }
        self.curves.insert((ia, ib), points);
        Ok(())
    }

    fn require_index(&self, id: &str) -> EngineResult<usize> {
        self.index.get(id).copied().ok_or_else(|| {
            EngineError::Configuration(format!("edge or curve references unknown node {id}"))
        })
    }

    pub fn nodes(&self) -> &[RoadNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn node(&self, id: &str) -> Option<&RoadNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub(crate) fn node_at(&self, index: usize) -> &RoadNode {
        &self.nodes[index]
    }

    pub(crate) fn neighbor_indices(&self, index: usize) -> &[usize] {
        &self.adjacency[index]
    }

    /// Neighbor ids of `id` in edge-definition order.
    pub fn neighbors(&self, id: &str) -> EngineResult<Vec<&str>> {
        let i = self
            .index_of(id)
            .ok_or_else(|| EngineError::node_not_found(id))?;
        Ok(self.adjacency[i]
            .iter()
            .map(|&n| self.nodes[n].id.as_str())
            .collect())
    }

    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        match (self.index_of(a), self.index_of(b)) {
            (Some(ia), Some(ib)) => self.adjacency[ia].contains(&ib),
            _ => false,
        }
    }

    /// Interior waypoints for `from -> to`; empty for straight roads.
    pub fn curve(&self, from: &str, to: &str) -> &[Coordinate] {
        match (self.index_of(from), self.index_of(to)) {
            (Some(ia), Some(ib)) => self.curve_between(ia, ib),
            _ => &[],
        }
    }

    pub(crate) fn curve_between(&self, from: usize, to: usize) -> &[Coordinate] {
        self.curves
            .get(&(from, to))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Closest node by planar distance; the first node in definition order
    /// wins ties.
    pub fn nearest_node(&self, coordinate: Coordinate) -> EngineResult<&RoadNode> {
        self.nearest_index(coordinate)
            .map(|i| &self.nodes[i])
            .ok_or_else(|| EngineError::Configuration("road network has no nodes".to_string()))
    }

    pub(crate) fn nearest_index(&self, coordinate: Coordinate) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, node) in self.nodes.iter().enumerate() {
            let d = node.coordinate.distance_to(coordinate);
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((i, d)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Expand a node path into the flat list of targets the animator walks:
    /// the first node, then for every consecutive pair the `A -> B` curve
    /// points followed by `B` itself.
    pub fn expand_path(&self, path: &[String]) -> EngineResult<Vec<Coordinate>> {
        let indices = path
            .iter()
            .map(|id| {
                self.index_of(id)
                    .ok_or_else(|| EngineError::node_not_found(id.as_str()))
            })
            .collect::<EngineResult<Vec<_>>>()?;

        let Some(&first) = indices.first() else {
            return Ok(Vec::new());
        };
        let mut targets = vec![self.nodes[first].coordinate];
        for pair in indices.windows(2) {
            targets.extend_from_slice(self.curve_between(pair[0], pair[1]));
            targets.push(self.nodes[pair[1]].coordinate);
        }
        Ok(targets)
    }
}
