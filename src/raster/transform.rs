use geo::Coordinate;
use num_traits::ToPrimitive;

use crate::error::NetworkError;


/// Maps integer grid offsets to world coordinates.
///
/// Coefficients are kept in GDAL geo-transform order:
/// `(origin_x, pixel_width, row_rotation, origin_y, column_rotation, pixel_height)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    pub origin_x: f64,
    pub pixel_width: f64,
    pub row_rotation: f64,
    pub origin_y: f64,
    pub column_rotation: f64,
    pub pixel_height: f64,
}

impl AffineTransform {
    /// Transform without rotation, as written by most raster formats.
    pub fn north_up(
        origin_x: f64,
        pixel_width: f64,
        origin_y: f64,
        pixel_height: f64,
    ) -> Result<Self, NetworkError> {
        AffineTransform::from_coefficients(&[origin_x, pixel_width, 0.0, origin_y, 0.0, pixel_height])
    }

    pub fn from_coefficients(coefficients: &[f64]) -> Result<Self, NetworkError> {
        let c = match coefficients {
            [a, b, c, d, e, f] => [*a, *b, *c, *d, *e, *f],
            _ => {
                return Err(NetworkError::MalformedTransform(format!(
                    "expected 6 coefficients, got {}",
                    coefficients.len()
                )))
            }
        };

        if c.iter().any(|v| !v.is_finite()) {
            return Err(NetworkError::MalformedTransform(format!(
                "non-finite coefficient in {:?}",
                c
            )));
        }

        if c[1] == 0.0 || c[5] == 0.0 {
            return Err(NetworkError::MalformedTransform(
                "pixel width and pixel height must be non-zero".to_string(),
            ));
        }

        Ok(AffineTransform {
            origin_x: c[0],
            pixel_width: c[1],
            row_rotation: c[2],
            origin_y: c[3],
            column_rotation: c[4],
            pixel_height: c[5],
        })
    }

    pub fn coefficients(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            self.row_rotation,
            self.origin_y,
            self.column_rotation,
            self.pixel_height,
        ]
    }

    /// World coordinate of the center of cell (`col`, `row`).
    pub fn offset_to_world(&self, col: usize, row: usize) -> Coordinate<f64> {
        let col = col as f64 + 0.5;
        let row = row as f64 + 0.5;

        Coordinate {
            x: self.origin_x + self.pixel_width * col + self.row_rotation * row,
            y: self.origin_y + self.column_rotation * col + self.pixel_height * row,
        }
    }

    /// Cell (`col`, `row`) containing `coord`. Rotation terms are ignored.
    ///
    /// Offsets are truncated toward zero, so anything up to one pixel before
    /// the origin still lands in the first row or column.
    pub fn world_to_offset(&self, coord: Coordinate<f64>) -> Option<(usize, usize)> {
        let col = ((coord.x - self.origin_x) / self.pixel_width).trunc().to_usize()?;
        let row = ((coord.y - self.origin_y) / self.pixel_height).trunc().to_usize()?;

        Some((col, row))
    }
}
