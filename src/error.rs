/// Failure kinds of the extraction and routing pipeline.
///
/// All of these are reported to the caller as values. A batch run over many
/// rasters may skip an `EmptySelection` and carry on, a failed route query
/// leaves its graph untouched.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum NetworkError {
    #[error("The pixel value {} does not occur in the raster", .0)]
    EmptySelection(f64),

    #[error("The line network contains no usable features")]
    EmptyGraph,

    #[error("Node index {} is out of range, the network has {} nodes", .index, .len)]
    IndexOutOfRange { index: usize, len: usize },

    #[error("There is no path between node {} and node {}", .start, .end)]
    NoPath { start: usize, end: usize },

    #[error("Malformed affine transform: {}", .0)]
    MalformedTransform(String),
}
