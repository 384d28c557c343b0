use std::cmp::Ordering;
use std::collections::BinaryHeap;

use geo::{Coordinate, LineString};

use super::Graph;
use crate::error::NetworkError;


#[derive(Clone, Copy, Debug)]
struct State {
    cost: f64,
    node: usize,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.node == other.node
    }
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed, BinaryHeap is a max-heap
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A resolved shortest path.
#[derive(Clone, Debug)]
pub struct Route {
    /// Node indices from start to end.
    pub nodes: Vec<usize>,
    /// Edge geometries along the path, each oriented to continue where the previous one ended.
    pub segments: Vec<LineString<f64>>,
    /// All segments joined into one line, shared junction points appear once.
    pub path: LineString<f64>,
    pub distance: f64,
}

/// Dijkstra search from node `start` to node `end`.
///
/// Ties between equally long paths are resolved in no particular order.
pub fn shortest_path(graph: &Graph, start: usize, end: usize) -> Result<Route, NetworkError> {
    let len = graph.node_count();
    for index in [start, end] {
        if index >= len {
            return Err(NetworkError::IndexOutOfRange { index, len });
        }
    }

    let mut dist: Vec<f64> = vec![f64::INFINITY; len];
    // (previous node, edge used to get here)
    let mut prev: Vec<Option<(usize, usize)>> = vec![None; len];
    dist[start] = 0.0;

    let mut heap = BinaryHeap::new();
    heap.push(State {
        cost: 0.0,
        node: start,
    });

    while let Some(State { cost, node }) = heap.pop() {
        if cost > dist[node] {
            continue;
        }

        if node == end {
            break;
        }

        for &(neighbour, edge) in graph.neighbours(node) {
            let next = cost + graph.edges()[edge].weight;
            if next < dist[neighbour] {
                dist[neighbour] = next;
                prev[neighbour] = Some((node, edge));
                heap.push(State {
                    cost: next,
                    node: neighbour,
                });
            }
        }
    }

    if !dist[end].is_finite() {
        return Err(NetworkError::NoPath { start, end });
    }

    let mut nodes = vec![end];
    let mut edges = Vec::new();
    let mut current = end;
    while let Some((node, edge)) = prev[current] {
        nodes.push(node);
        edges.push(edge);
        current = node;
    }
    nodes.reverse();
    edges.reverse();

    // start is always a valid index here
    let origin = graph.nodes()[start];
    let segments = orient_segments(graph, &edges, origin);
    let path = join_segments(&segments, origin);

    tracing::debug!(
        start,
        end,
        hops = edges.len(),
        distance = dist[end],
        "resolved shortest path"
    );

    Ok(Route {
        nodes,
        segments,
        path,
        distance: dist[end],
    })
}

fn squared_distance(a: &Coordinate<f64>, b: &Coordinate<f64>) -> f64 {
    let (dx, dy) = (a.x - b.x, a.y - b.y);
    dx * dx + dy * dy
}

/// Flips each edge geometry whose last point is closer to the running
/// endpoint than its first point. The running endpoint starts at `origin`.
///
/// Unlike a plain "take the first line as stored" join, the first segment is
/// oriented as well, so a route always begins at its start node even when the
/// source line was digitised the other way round.
fn orient_segments(graph: &Graph, edges: &[usize], origin: Coordinate<f64>) -> Vec<LineString<f64>> {
    let mut current = origin;

    edges
        .iter()
        .map(|&edge| {
            let mut coords = graph.edges()[edge].geometry.0.clone();

            if let (Some(first), Some(last)) = (coords.first(), coords.last()) {
                if squared_distance(first, &current) > squared_distance(last, &current) {
                    coords.reverse();
                }
            }
            if let Some(last) = coords.last() {
                current = *last;
            }

            LineString(coords)
        })
        .collect()
}

fn join_segments(segments: &[LineString<f64>], origin: Coordinate<f64>) -> LineString<f64> {
    if segments.is_empty() {
        return LineString(vec![origin]);
    }

    let mut coords: Vec<Coordinate<f64>> = Vec::new();
    for segment in segments {
        let mut points = segment.0.iter().peekable();
        if coords.last() == points.peek().copied() {
            points.next();
        }
        coords.extend(points);
    }

    LineString(coords)
}
