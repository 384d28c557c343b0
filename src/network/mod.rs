//! Line network graph and shortest path queries.

mod graph;
mod solver;

pub use graph::{Graph, GraphBuilder, NodeIdentity};
pub use solver::shortest_path;
