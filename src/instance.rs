//! The problem being searched: a city set and its distance matrix.

use crate::error::Error;
use crate::tour::Tour;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// A location on the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A read-only instance shared by every run of a session. The matrix is
/// computed once; `distances[i][j] == distances[j][i]` and the diagonal
/// is zero.
#[derive(Debug, Clone)]
pub struct TspInstance {
    points: Vec<Point>,
    distances: Vec<Vec<f64>>,
}

impl TspInstance {
    /// Draws `cities` distinct integer-grid points uniformly from a
    /// `width × height` area, redrawing on collision.
    pub fn generate(cities: usize, width: usize, height: usize, seed: u64) -> Result<Self, Error> {
        if cities < 3 {
            return Err(Error::InvalidInstance(format!(
                "a tour needs at least 3 cities, got {}",
                cities
            )));
        }
        if width.saturating_mul(height) < cities {
            return Err(Error::InvalidInstance(format!(
                "cannot place {} distinct cities on a {}x{} grid",
                cities, width, height
            )));
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let mut taken = FxHashSet::default();
        let mut points = Vec::with_capacity(cities);
        while points.len() < cities {
            let x = rng.random_range(0..width);
            let y = rng.random_range(0..height);
            if taken.insert((x, y)) {
                points.push(Point {
                    x: x as f64,
                    y: y as f64,
                });
            }
        }
        Ok(Self::with_points(points))
    }

    /// Builds an instance from explicit coordinates.
    pub fn from_points(points: Vec<Point>) -> Result<Self, Error> {
        if points.len() < 3 {
            return Err(Error::InvalidInstance(format!(
                "a tour needs at least 3 cities, got {}",
                points.len()
            )));
        }
        let mut seen = FxHashSet::default();
        for point in &points {
            if !point.x.is_finite() || !point.y.is_finite() {
                return Err(Error::InvalidInstance(format!(
                    "coordinates must be finite, got ({}, {})",
                    point.x, point.y
                )));
            }
            // adding 0.0 folds -0.0 into the same key as 0.0
            if !seen.insert(((point.x + 0.0).to_bits(), (point.y + 0.0).to_bits())) {
                return Err(Error::InvalidInstance(format!(
                    "duplicate point ({}, {})",
                    point.x, point.y
                )));
            }
        }
        Ok(Self::with_points(points))
    }

    /// Builds an instance from a full distance matrix, with no coordinates
    /// attached. The matrix must be square, symmetric, non-negative and
    /// zero on the diagonal.
    pub fn from_matrix(distances: Vec<Vec<f64>>) -> Result<Self, Error> {
        let n = distances.len();
        if n < 3 {
            return Err(Error::InvalidInstance(format!(
                "a tour needs at least 3 cities, got {}",
                n
            )));
        }
        for (i, row) in distances.iter().enumerate() {
            if row.len() != n {
                return Err(Error::InvalidInstance(format!(
                    "row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    n
                )));
            }
        }
        for i in 0..n {
            if distances[i][i] != 0.0 {
                return Err(Error::InvalidInstance(format!(
                    "nonzero distance {} from city {} to itself",
                    distances[i][i], i
                )));
            }
            for j in 0..n {
                let d = distances[i][j];
                if !d.is_finite() || d < 0.0 {
                    return Err(Error::InvalidInstance(format!(
                        "distance between {} and {} is {}",
                        i, j, d
                    )));
                }
                if (d - distances[j][i]).abs() > 1e-9 {
                    return Err(Error::InvalidInstance(format!(
                        "asymmetric distances between {} and {}",
                        i, j
                    )));
                }
            }
        }
        Ok(Self {
            points: Vec::new(),
            distances,
        })
    }

    fn with_points(points: Vec<Point>) -> Self {
        let n = points.len();
        let mut distances = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = points[i].distance(&points[j]);
                distances[i][j] = d;
                distances[j][i] = d;
            }
        }
        Self { points, distances }
    }

    pub fn size(&self) -> usize {
        self.distances.len()
    }

    /// The coordinates, when the instance was built from them. Empty for
    /// matrix-built instances.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distances[i][j]
    }

    /// Closed-tour length, checking that the tour fits this instance.
    pub fn evaluate(&self, tour: &Tour) -> Result<f64, Error> {
        if tour.len() != self.size() {
            return Err(Error::InvalidPermutation(format!(
                "tour over {} cities evaluated on an instance of {}",
                tour.len(),
                self.size()
            )));
        }
        Ok(self.tour_length(tour))
    }

    /// Hot-path evaluation. Tours built inside this crate are permutations
    /// of the right length by construction.
    pub(crate) fn tour_length(&self, tour: &Tour) -> f64 {
        debug_assert_eq!(tour.len(), self.size());
        let order = tour.cities();
        let mut total = 0.0;
        for position in 0..order.len() {
            let next = (position + 1) % order.len();
            total += self.distances[order[position]][order[next]];
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> TspInstance {
        TspInstance::from_points(vec![
            Point { x: 0.0, y: 0.0 },
            Point { x: 1.0, y: 0.0 },
            Point { x: 1.0, y: 1.0 },
            Point { x: 0.0, y: 1.0 },
        ])
        .unwrap()
    }

    #[test]
    fn generated_matrices_are_symmetric_with_zero_diagonal() {
        for seed in 0..10 {
            let instance = TspInstance::generate(15, 50, 50, seed).unwrap();
            for i in 0..instance.size() {
                assert_eq!(instance.distance(i, i), 0.0);
                for j in 0..instance.size() {
                    assert_eq!(instance.distance(i, j), instance.distance(j, i));
                }
            }
        }
    }

    #[test]
    fn generated_points_are_distinct() {
        let instance = TspInstance::generate(40, 7, 7, 3).unwrap();
        let points = instance.points();
        assert_eq!(points.len(), 40);
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                assert!(points[i] != points[j]);
            }
        }
    }

    #[test]
    fn rejects_too_few_cities() {
        assert!(matches!(
            TspInstance::generate(2, 100, 100, 1),
            Err(Error::InvalidInstance(_))
        ));
        assert!(matches!(
            TspInstance::from_points(vec![Point { x: 0.0, y: 0.0 }]),
            Err(Error::InvalidInstance(_))
        ));
    }

    #[test]
    fn rejects_a_grid_smaller_than_the_city_count() {
        assert!(matches!(
            TspInstance::generate(10, 3, 3, 1),
            Err(Error::InvalidInstance(_))
        ));
    }

    #[test]
    fn rejects_duplicate_points() {
        let result = TspInstance::from_points(vec![
            Point { x: 0.0, y: 0.0 },
            Point { x: 1.0, y: 1.0 },
            Point { x: 0.0, y: 0.0 },
        ]);
        assert!(matches!(result, Err(Error::InvalidInstance(_))));
    }

    #[test]
    fn rejects_non_finite_points() {
        assert!(matches!(
            TspInstance::from_points(vec![
                Point { x: f64::NAN, y: 0.0 },
                Point { x: 1.0, y: 0.0 },
                Point { x: 0.0, y: 1.0 },
            ]),
            Err(Error::InvalidInstance(_))
        ));
        assert!(matches!(
            TspInstance::from_points(vec![
                Point { x: 0.0, y: f64::INFINITY },
                Point { x: 1.0, y: 0.0 },
                Point { x: 0.0, y: 1.0 },
            ]),
            Err(Error::InvalidInstance(_))
        ));
    }

    #[test]
    fn the_two_signed_zeros_are_one_point() {
        assert!(matches!(
            TspInstance::from_points(vec![
                Point { x: 0.0, y: 0.0 },
                Point { x: -0.0, y: 0.0 },
                Point { x: 1.0, y: 1.0 },
            ]),
            Err(Error::InvalidInstance(_))
        ));
    }

    #[test]
    fn rejects_bad_matrices() {
        let ragged = vec![vec![0.0, 1.0], vec![1.0, 0.0, 2.0], vec![2.0, 2.0, 0.0]];
        assert!(TspInstance::from_matrix(ragged).is_err());

        let asymmetric = vec![
            vec![0.0, 1.0, 2.0],
            vec![1.5, 0.0, 1.0],
            vec![2.0, 1.0, 0.0],
        ];
        assert!(TspInstance::from_matrix(asymmetric).is_err());

        let nonzero_diagonal = vec![
            vec![0.5, 1.0, 2.0],
            vec![1.0, 0.0, 1.0],
            vec![2.0, 1.0, 0.0],
        ];
        assert!(TspInstance::from_matrix(nonzero_diagonal).is_err());

        let negative = vec![
            vec![0.0, -1.0, 2.0],
            vec![-1.0, 0.0, 1.0],
            vec![2.0, 1.0, 0.0],
        ];
        assert!(TspInstance::from_matrix(negative).is_err());
    }

    #[test]
    fn accepts_a_valid_matrix() {
        let matrix = vec![
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.0, 1.0],
            vec![2.0, 1.0, 0.0],
        ];
        let instance = TspInstance::from_matrix(matrix).unwrap();
        assert_eq!(instance.size(), 3);
        assert!(instance.points().is_empty());
    }

    #[test]
    fn evaluates_the_unit_square() {
        let instance = unit_square();
        let tour = Tour::new(vec![0, 1, 2, 3]).unwrap();
        let length = instance.evaluate(&tour).unwrap();
        assert!((length - 4.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_a_tour_of_the_wrong_size() {
        let instance = unit_square();
        let tour = Tour::new(vec![0, 1, 2]).unwrap();
        assert!(matches!(
            instance.evaluate(&tour),
            Err(Error::InvalidPermutation(_))
        ));
    }

    #[test]
    fn fitness_is_invariant_under_rotation_and_reversal() {
        let instance = TspInstance::generate(9, 100, 100, 5).unwrap();
        let tour = Tour::new(vec![3, 1, 4, 0, 8, 6, 2, 7, 5]).unwrap();
        let length = instance.evaluate(&tour).unwrap();

        let mut rotated = tour.cities().to_vec();
        rotated.rotate_left(4);
        let rotated = Tour::new(rotated).unwrap();
        assert!((instance.evaluate(&rotated).unwrap() - length).abs() < 1e-9);

        let mut reversed = tour.cities().to_vec();
        reversed.reverse();
        let reversed = Tour::new(reversed).unwrap();
        assert!((instance.evaluate(&reversed).unwrap() - length).abs() < 1e-9);
    }
}
