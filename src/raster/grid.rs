use geo::Coordinate;

use super::AffineTransform;


/// A single raster band held in memory.
///
/// Cells are stored row-major, no-data cells are `NaN`.
#[derive(Debug, Clone)]
pub struct RasterGrid {
    columns: usize,
    rows: usize,
    transform: AffineTransform,
    data: Vec<f64>,
}

impl RasterGrid {
    pub fn new(columns: usize, rows: usize, transform: AffineTransform, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), columns * rows);

        RasterGrid {
            columns,
            rows,
            transform,
            data,
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.columns, self.rows)
    }

    pub fn transform(&self) -> &AffineTransform {
        &self.transform
    }

    pub fn value(&self, col: usize, row: usize) -> Option<f64> {
        if col >= self.columns || row >= self.rows {
            return None;
        }

        self.data.get(col + row * self.columns).copied()
    }

    /// Value of the cell containing the world coordinate `coord`.
    pub fn value_at(&self, coord: Coordinate<f64>) -> Option<f64> {
        let (col, row) = self.transform.world_to_offset(coord)?;
        self.value(col, row)
    }

    /// Iterates `(col, row, value)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let columns = self.columns;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, v)| (i % columns, i / columns, *v))
    }

    pub fn with_transform(self, transform: AffineTransform) -> Self {
        RasterGrid { transform, ..self }
    }

    /// Truncates every value toward zero, turning a float raster into class labels.
    pub fn truncate_to_integer(&self) -> Self {
        RasterGrid {
            columns: self.columns,
            rows: self.rows,
            transform: self.transform,
            data: self.data.iter().map(|v| v.trunc()).collect(),
        }
    }
}
