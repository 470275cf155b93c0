//! Candidate solutions: tours and their fitness.

use crate::error::Error;
use crate::instance::TspInstance;
use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::fmt;

/// An ordering of all cities, visited exactly once and closed back to the
/// start. Construction validates the permutation; the perturbations below
/// cannot break it, so the search loops never re-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tour(Vec<usize>);

impl Tour {
    pub fn new(order: Vec<usize>) -> Result<Self, Error> {
        match Self::permutation_error(&order) {
            None => Ok(Self(order)),
            Some(message) => Err(Error::InvalidPermutation(message)),
        }
    }

    /// Internal constructor for orders already known to be permutations,
    /// such as crossover and repair output.
    pub(crate) fn unchecked(order: Vec<usize>) -> Self {
        debug_assert!(Self::permutation_error(&order).is_none());
        Self(order)
    }

    fn permutation_error(order: &[usize]) -> Option<String> {
        let n = order.len();
        let mut seen = vec![false; n];
        for &city in order {
            if city >= n {
                return Some(format!(
                    "city index {} out of range for {} cities",
                    city, n
                ));
            }
            if seen[city] {
                return Some(format!("city {} appears more than once", city));
            }
            seen[city] = true;
        }
        None
    }

    /// A uniformly random tour over `n` cities.
    pub fn random<R: Rng>(n: usize, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(rng);
        Self(order)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn cities(&self) -> &[usize] {
        &self.0
    }

    /// Exchanges the cities at positions `i` and `j`.
    pub fn swap(&mut self, i: usize, j: usize) {
        self.0.swap(i, j);
    }

    /// Reverses the segment of positions `start..=end`.
    pub fn reverse_segment(&mut self, start: usize, end: usize) {
        self.0[start..=end].reverse();
    }
}

impl fmt::Display for Tour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(" "))
    }
}

/// A tour with its fitness, computed once at construction and never
/// touched afterwards. New candidates are made, not edited.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub tour: Tour,
    pub fitness: f64,
}

impl Candidate {
    pub(crate) fn evaluated(tour: Tour, instance: &TspInstance) -> Self {
        let fitness = instance.tour_length(&tour);
        Self { tour, fitness }
    }
}
