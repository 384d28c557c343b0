use std::collections::HashMap;

use geo::euclidean_distance::EuclideanDistance;
use geo::{Coordinate, Line, LineString, MultiLineString, Point};
use rayon::iter::{IntoParallelIterator, ParallelIterator};

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use geo::euclidean_length::EuclideanLength;
    use geo::{Coordinate, Line};
    use rstest::rstest;

    use crate::extract::linker::link_pairwise;
    use crate::extract::{default_max_distance, link, to_multi_line_string};

    fn c(x: f64, y: f64) -> Coordinate<f64> {
        Coordinate { x, y }
    }

    /// Cell centers of a 10m raster forming an "L" plus one far away cell.
    fn l_shape() -> Vec<Coordinate<f64>> {
        vec![
            c(5.0, 45.0),
            c(5.0, 35.0),
            c(5.0, 25.0),
            c(15.0, 25.0),
            c(25.0, 25.0),
            c(95.0, 95.0),
        ]
    }

    fn key(line: &Line<f64>) -> ((u64, u64), (u64, u64)) {
        let a = (line.start.x.to_bits(), line.start.y.to_bits());
        let b = (line.end.x.to_bits(), line.end.y.to_bits());
        if a <= b { (a, b) } else { (b, a) }
    }

    #[rstest]
    #[case(10.0, 15.0)]
    #[case(-10.0, 15.0)]
    #[case(1.0, 2.0)]
    #[case(0.5, 1.0)]
    fn default_max_distance_is_ceiled_pixel_diagonal(#[case] pixel_width: f64, #[case] expected: f64) {
        assert_eq!(default_max_distance(pixel_width), expected);
    }

    #[test]
    fn empty_and_single_inputs_produce_no_segments() {
        assert!(link(&[], 15.0).is_empty());
        assert!(link(&[c(1.0, 1.0)], 15.0).is_empty());
    }

    #[test]
    fn links_eight_connected_neighbours_only() {
        let segments = link(&l_shape(), default_max_distance(10.0));

        assert_eq!(segments, vec![
            Line::new(c(5.0, 45.0), c(5.0, 35.0)),
            Line::new(c(5.0, 35.0), c(5.0, 25.0)),
            Line::new(c(5.0, 35.0), c(15.0, 25.0)),
            Line::new(c(5.0, 25.0), c(15.0, 25.0)),
            Line::new(c(15.0, 25.0), c(25.0, 25.0)),
        ]);
    }

    #[test]
    fn threshold_is_strict() {
        let points = vec![c(0.0, 0.0), c(3.0, 4.0)];

        assert!(link(&points, 5.0).is_empty());
        assert_eq!(link(&points, 5.000001).len(), 1);
    }

    #[test]
    fn non_positive_distance_links_nothing() {
        assert!(link(&l_shape(), 0.0).is_empty());
        assert!(link(&l_shape(), -3.0).is_empty());
        assert!(link(&l_shape(), f64::NAN).is_empty());
    }

    #[test]
    fn bucketed_search_matches_pairwise_enumeration() {
        // deterministic scatter including negative coordinates and bucket borders
        let points: Vec<_> = (0..200)
            .map(|i| {
                let x = ((i * 37) % 101) as f64 * 0.7 - 30.0;
                let y = ((i * 53) % 89) as f64 * 0.9 - 15.0;
                c(x, y)
            })
            .collect();

        for max_distance in [0.5, 1.5, 4.0, 15.0, f64::INFINITY] {
            assert_eq!(link(&points, max_distance), link_pairwise(&points, max_distance));
        }
    }

    #[test]
    fn segments_are_short_unique_and_bounded() {
        let points = l_shape();
        let n = points.len();
        let max_distance = 25.0;
        let segments = link(&points, max_distance);

        assert!(segments.len() <= n * (n - 1) / 2);
        assert!(segments.iter().all(|s| s.euclidean_length() < max_distance));

        let unique: HashSet<_> = segments.iter().map(key).collect();
        assert_eq!(unique.len(), segments.len());
    }

    #[test]
    fn input_order_does_not_change_the_segment_set() {
        let points = l_shape();
        let mut reversed = points.clone();
        reversed.reverse();

        let forward: HashSet<_> = link(&points, 15.0).iter().map(key).collect();
        let backward: HashSet<_> = link(&reversed, 15.0).iter().map(key).collect();

        assert_eq!(forward, backward);
    }

    #[test]
    fn packs_segments_into_one_multi_line() {
        let segments = link(&l_shape(), 15.0);
        let multi_line = to_multi_line_string(&segments);

        assert_eq!(multi_line.0.len(), segments.len());
        assert_eq!(multi_line.0[0].0, vec![c(5.0, 45.0), c(5.0, 35.0)]);
    }
}

/// Largest distance at which two cell centers can still be 8-connected neighbours.
pub fn default_max_distance(pixel_width: f64) -> f64 {
    (2.0 * pixel_width.powi(2)).sqrt().ceil()
}

fn distance(a: Coordinate<f64>, b: Coordinate<f64>) -> f64 {
    Point::from(a).euclidean_distance(&Point::from(b))
}

/// Uniform grid of buckets with an edge length of `max_distance`.
///
/// Two points closer than `max_distance` always sit in the same or in
/// adjacent buckets.
struct BucketIndex {
    size: f64,
    buckets: HashMap<(i64, i64), Vec<usize>>,
}

impl BucketIndex {
    fn new(points: &[Coordinate<f64>], size: f64) -> Self {
        let mut index = BucketIndex {
            size,
            buckets: HashMap::new(),
        };

        for (i, point) in points.iter().enumerate() {
            let key = index.key(point);
            index.buckets.entry(key).or_insert_with(Vec::new).push(i);
        }

        index
    }

    fn key(&self, point: &Coordinate<f64>) -> (i64, i64) {
        (
            (point.x / self.size).floor() as i64,
            (point.y / self.size).floor() as i64,
        )
    }

    /// Indices greater than `i` found in the 3x3 neighbourhood of point `i`, ascending.
    fn candidates_after(&self, i: usize, points: &[Coordinate<f64>]) -> Vec<usize> {
        let (bx, by) = self.key(&points[i]);

        let mut candidates: Vec<usize> = Vec::new();
        for dx in -1..=1_i64 {
            for dy in -1..=1_i64 {
                let key = (bx.saturating_add(dx), by.saturating_add(dy));
                if let Some(bucket) = self.buckets.get(&key) {
                    candidates.extend(bucket.iter().filter(|j| **j > i));
                }
            }
        }

        // saturated keys at the i64 limits may visit a bucket twice
        candidates.sort_unstable();
        candidates.dedup();
        candidates
    }
}

/// Connects every pair of points closer than `max_distance`.
///
/// Each unordered pair is considered once and emitted as `(points[i], points[j])`
/// with `i < j`, ordered by `(i, j)`. The result is identical to
/// [`link_pairwise`] but only visits neighbouring buckets.
pub fn link(points: &[Coordinate<f64>], max_distance: f64) -> Vec<Line<f64>> {
    // also rejects NaN
    if points.len() < 2 || !(max_distance > 0.0) {
        return Vec::new();
    }

    let index = BucketIndex::new(points, max_distance);

    let per_point: Vec<Vec<Line<f64>>> = (0..points.len())
        .into_par_iter()
        .map(|i| {
            index
                .candidates_after(i, points)
                .into_iter()
                .filter(|j| distance(points[i], points[*j]) < max_distance)
                .map(|j| Line::new(points[i], points[j]))
                .collect()
        })
        .collect();

    let segments: Vec<Line<f64>> = per_point.into_iter().flatten().collect();

    tracing::debug!(
        points = points.len(),
        segments = segments.len(),
        buckets = index.buckets.len(),
        "linked points"
    );

    segments
}

/// Reference implementation evaluating all n·(n−1)/2 pairs.
#[cfg(test)]
pub fn link_pairwise(points: &[Coordinate<f64>], max_distance: f64) -> Vec<Line<f64>> {
    let mut segments = Vec::new();

    for (i, a) in points.iter().enumerate() {
        for b in points.iter().skip(i + 1) {
            if distance(*a, *b) < max_distance {
                segments.push(Line::new(*a, *b));
            }
        }
    }

    segments
}

pub fn to_multi_line_string(segments: &[Line<f64>]) -> MultiLineString<f64> {
    MultiLineString(
        segments
            .iter()
            .map(|s| LineString(vec![s.start, s.end]))
            .collect(),
    )
}
