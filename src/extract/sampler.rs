use geo::Coordinate;

use crate::error::NetworkError;
use crate::raster::RasterGrid;


/// Collects the world coordinates of every cell equal to `target_value`.
///
/// Comparison is exact, the value is expected to be a class label.
pub fn sample(grid: &RasterGrid, target_value: f64) -> Result<Vec<Coordinate<f64>>, NetworkError> {
    let transform = grid.transform();

    let points: Vec<Coordinate<f64>> = grid
        .cells()
        .filter(|(_, _, value)| *value == target_value)
        .map(|(col, row, _)| transform.offset_to_world(col, row))
        .collect();

    if points.is_empty() {
        tracing::warn!(target_value, "pixel value does not occur in the raster");
        return Err(NetworkError::EmptySelection(target_value));
    }

    tracing::debug!(count = points.len(), target_value, "sampled raster cells");

    Ok(points)
}
