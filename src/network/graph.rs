use std::collections::{HashMap, VecDeque};

use geo::euclidean_length::EuclideanLength;
use geo::{Coordinate, LineString, MultiPoint, Point};
use num_traits::ToPrimitive;

use crate::error::NetworkError;


/// How line endpoints are turned into node identities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeIdentity {
    /// Bit-identical coordinates only (`-0.0` and `0.0` are the same node).
    Exact,
    /// Coordinates are rounded to multiples of `precision` first.
    Snapped { precision: f64 },
}

impl Default for NodeIdentity {
    fn default() -> Self {
        NodeIdentity::Exact
    }
}

impl NodeIdentity {
    pub fn from_precision(precision: Option<f64>) -> Self {
        match precision {
            None => NodeIdentity::Exact,
            Some(p) if p > 0.0 && p.is_finite() => NodeIdentity::Snapped { precision: p },
            Some(p) => {
                tracing::warn!(precision = p, "ignoring invalid snap precision");
                NodeIdentity::Exact
            }
        }
    }

    fn key(&self, coord: &Coordinate<f64>) -> NodeKey {
        if let NodeIdentity::Snapped { precision } = self {
            let x = (coord.x / precision).round().to_i64();
            let y = (coord.y / precision).round().to_i64();
            if let (Some(x), Some(y)) = (x, y) {
                return NodeKey::Snapped(x, y);
            }
        }

        let bits = |v: f64| if v == 0.0 { 0.0_f64.to_bits() } else { v.to_bits() };
        NodeKey::Exact(bits(coord.x), bits(coord.y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum NodeKey {
    Exact(u64, u64),
    Snapped(i64, i64),
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    /// Full resolution geometry, as stored in the source, running `from` to `to`.
    pub geometry: LineString<f64>,
    pub weight: f64,
}

/// Undirected, weighted line network.
///
/// Nodes are indexed in the order they were discovered while reading the
/// lines. The graph is never mutated after building.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Coordinate<f64>>,
    edges: Vec<Edge>,
    /// `adjacency[node] = [(neighbour, edge index), ...]`
    adjacency: Vec<Vec<(usize, usize)>>,
}

impl Graph {
    fn new(nodes: Vec<Coordinate<f64>>, edges: Vec<Edge>) -> Self {
        let mut adjacency = vec![Vec::new(); nodes.len()];
        for (i, edge) in edges.iter().enumerate() {
            adjacency[edge.from].push((edge.to, i));
            if edge.from != edge.to {
                adjacency[edge.to].push((edge.from, i));
            }
        }

        Graph {
            nodes,
            edges,
            adjacency,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> &[Coordinate<f64>] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<Coordinate<f64>> {
        self.nodes.get(index).copied()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn neighbours(&self, node: usize) -> &[(usize, usize)] {
        &self.adjacency[node]
    }

    pub fn nodes_multi_point(&self) -> MultiPoint<f64> {
        MultiPoint(self.nodes.iter().map(|c| Point::from(*c)).collect())
    }

    /// Node indices of every connected component, each in discovery order.
    fn components(&self) -> Vec<Vec<usize>> {
        let mut visited = vec![false; self.nodes.len()];
        let mut components = Vec::new();

        for seed in 0..self.nodes.len() {
            if visited[seed] {
                continue;
            }

            visited[seed] = true;
            let mut component = vec![seed];
            let mut queue = VecDeque::from(vec![seed]);
            while let Some(node) = queue.pop_front() {
                for &(neighbour, _) in &self.adjacency[node] {
                    if !visited[neighbour] {
                        visited[neighbour] = true;
                        component.push(neighbour);
                        queue.push_back(neighbour);
                    }
                }
            }

            component.sort_unstable();
            components.push(component);
        }

        components
    }

    /// Sub graph of the component with the most nodes. Ties go to the
    /// component holding the earliest discovered node.
    fn largest_component(self) -> Self {
        let components = self.components();
        if components.len() <= 1 {
            return self;
        }

        let largest = components
            .iter()
            .fold(&components[0], |best, c| if c.len() > best.len() { c } else { best });

        let mut remap: Vec<Option<usize>> = vec![None; self.nodes.len()];
        for (new_index, &old_index) in largest.iter().enumerate() {
            remap[old_index] = Some(new_index);
        }

        let nodes = largest.iter().map(|&i| self.nodes[i]).collect();
        let edges = self
            .edges
            .into_iter()
            .filter_map(|edge| {
                Some(Edge {
                    from: remap[edge.from]?,
                    to: remap[edge.to]?,
                    ..edge
                })
            })
            .collect();

        tracing::debug!(
            components = components.len(),
            retained_nodes = largest.len(),
            "restricted network to its largest component"
        );

        Graph::new(nodes, edges)
    }
}

/// Builds a [`Graph`] with one edge per line.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    identity: NodeIdentity,
    largest_component_only: bool,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        GraphBuilder {
            identity: NodeIdentity::Exact,
            largest_component_only: true,
        }
    }
}

impl GraphBuilder {
    pub fn with_node_identity(mut self, identity: NodeIdentity) -> Self {
        self.identity = identity;
        self
    }

    pub fn keep_all_components(mut self) -> Self {
        self.largest_component_only = false;
        self
    }

    /// Lines with fewer than two coordinates or a non-finite length are skipped.
    pub fn build<'a, I>(&self, lines: I) -> Result<Graph, NetworkError>
    where
        I: IntoIterator<Item = &'a LineString<f64>>,
    {
        let mut keys: HashMap<NodeKey, usize> = HashMap::new();
        let mut nodes: Vec<Coordinate<f64>> = Vec::new();
        let mut edges: Vec<Edge> = Vec::new();
        let mut skipped = 0_usize;

        let identity = self.identity;
        let mut node_index = |coord: &Coordinate<f64>| -> usize {
            *keys.entry(identity.key(coord)).or_insert_with(|| {
                nodes.push(*coord);
                nodes.len() - 1
            })
        };

        for line in lines {
            let (first, last) = match (line.0.first(), line.0.last()) {
                (Some(first), Some(last)) if line.0.len() >= 2 => (first, last),
                _ => {
                    skipped += 1;
                    continue;
                }
            };

            let weight = line.euclidean_length();
            if !weight.is_finite() {
                skipped += 1;
                continue;
            }

            let from = node_index(first);
            let to = node_index(last);
            edges.push(Edge {
                from,
                to,
                geometry: line.clone(),
                weight,
            });
        }

        if skipped > 0 {
            tracing::warn!(skipped, "skipped unusable lines");
        }

        if edges.is_empty() {
            return Err(NetworkError::EmptyGraph);
        }

        let graph = Graph::new(nodes, edges);
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built network graph"
        );

        if self.largest_component_only {
            Ok(graph.largest_component())
        } else {
            Ok(graph)
        }
    }
}
