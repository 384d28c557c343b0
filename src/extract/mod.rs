//! Raster cells to line network: sample labelled cells, then link neighbours.

mod linker;
mod sampler;

pub use linker::{default_max_distance, link, to_multi_line_string};
pub use sampler::sample;
