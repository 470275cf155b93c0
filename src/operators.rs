//! Perturbation and recombination of tours.

use crate::error::Error;
use crate::tour::Tour;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Relative weights of the two local moves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SearchConfig {
    pub random_swap: f64,
    pub random_reverse: f64,
}

pub const DEFAULT_SEARCH: SearchConfig = SearchConfig {
    random_swap: 0.5,
    random_reverse: 0.5,
};

impl SearchConfig {
    pub fn validate(&self) -> Result<(), Error> {
        let sum = self.random_swap + self.random_reverse;
        if self.random_swap < 0.0 || self.random_reverse < 0.0 || !(sum > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "search weights must be non-negative with a positive sum, got {} and {}",
                self.random_swap, self.random_reverse
            )));
        }
        Ok(())
    }
}

/// Generates successor tours by a weighted choice between swapping two
/// positions and reversing a segment. Either move keeps the tour a
/// permutation and always changes it.
#[derive(Debug, Clone, Copy)]
pub struct Neighborhood {
    swap_ratio: f64,
}

impl Neighborhood {
    pub fn new(search_method: &Option<SearchConfig>) -> Self {
        let method = search_method.unwrap_or(DEFAULT_SEARCH);
        let sum = method.random_swap + method.random_reverse;
        Self {
            swap_ratio: method.random_swap / sum,
        }
    }

    /// Applies one random move in place.
    pub fn perturb<R: Rng>(&self, tour: &mut Tour, rng: &mut R) {
        if rng.random::<f64>() < self.swap_ratio {
            let (i, j) = distinct_pair(tour.len(), rng);
            tour.swap(i, j);
        } else {
            let (start, end) = ordered_pair(tour.len(), rng);
            tour.reverse_segment(start, end);
        }
    }

    /// Clones the tour and applies one random move to the clone.
    pub fn neighbor<R: Rng>(&self, tour: &Tour, rng: &mut R) -> Tour {
        let mut next = tour.clone();
        self.perturb(&mut next, rng);
        next
    }
}

/// Order-preserving crossover: a random-length prefix of the first parent,
/// then the second parent's remaining cities in their original order. The
/// offspring is a permutation whenever the parents are.
pub fn order_crossover<R: Rng>(first: &Tour, second: &Tour, rng: &mut R) -> Tour {
    let n = first.len();
    let split = rng.random_range(1..n);
    let mut order = first.cities()[..split].to_vec();
    let mut used = vec![false; n];
    for &city in &order {
        used[city] = true;
    }
    for &city in second.cities() {
        if !used[city] {
            order.push(city);
        }
    }
    Tour::unchecked(order)
}

fn distinct_pair<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    let i = rng.random_range(0..n);
    let mut j = rng.random_range(0..n);
    while j == i {
        j = rng.random_range(0..n);
    }
    (i, j)
}

fn ordered_pair<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    let (i, j) = distinct_pair(n, rng);
    if i < j {
        (i, j)
    } else {
        (j, i)
    }
}
