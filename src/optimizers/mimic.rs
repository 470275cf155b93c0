//! MIMIC, an estimation-of-distribution search.
//!
//! Each generation ranks the population by tour length, keeps an elite
//! fraction, fits a first-order positional chain model to it (which city
//! starts a tour, which city follows which), and resamples the whole
//! population from the model. Samples can repeat a city; repair fills
//! the holes from the transition weights so every sample stays a
//! permutation.

use super::{fittest, roulette, Optimizer, RunOutcome, RunSettings, Termination, REPORT_INTERVAL};
use crate::instance::TspInstance;
use crate::interface::{Interface, Message};
use crate::optimizers::CurvePoint;
use crate::tour::{Candidate, Tour};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

const DEFAULT_CONVERGENCE_THRESHOLD: f64 = 1e-9;

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mimic {
    pub population_size: usize,
    /// Fraction of the ranked population the model is fitted to.
    pub keep_percent: f64,
    /// Elite fitness variance below this ends the run.
    pub convergence_threshold: Option<f64>,
}

impl Mimic {
    fn elite_len(&self) -> usize {
        let kept = (self.population_size as f64 * self.keep_percent).floor() as usize;
        kept.clamp(2, self.population_size)
    }
}

impl Optimizer for Mimic {
    fn solve(
        &self,
        instance: &TspInstance,
        settings: &RunSettings,
        interface: &dyn Interface,
    ) -> RunOutcome {
        let mut rng = StdRng::seed_from_u64(settings.seed);
        let n = instance.size();
        let threshold = self
            .convergence_threshold
            .unwrap_or(DEFAULT_CONVERGENCE_THRESHOLD);
        let elite_len = self.elite_len();
        let mut population: Vec<Candidate> = (0..self.population_size)
            .map(|_| Candidate::evaluated(Tour::random(n, &mut rng), instance))
            .collect();
        let mut best = fittest(&population).clone();
        let mut curve = vec![CurvePoint {
            iteration: 0,
            fitness: best.fitness,
        }];
        let mut attempts = 0;
        let mut iteration = 0;
        let mut termination = Termination::ExhaustedBudget;

        while iteration < settings.max_iterations {
            population.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));
            let elite = &population[..elite_len];
            if fitness_variance(elite) < threshold {
                termination = Termination::VarianceCollapse;
                break;
            }
            iteration += 1;
            let model = ChainModel::fit(elite, n);
            population = (0..self.population_size)
                .map(|_| {
                    let tour = model.repair(model.sample(&mut rng));
                    Candidate::evaluated(tour, instance)
                })
                .collect();
            let leader = fittest(&population);
            let leader_fitness = leader.fitness;
            if leader_fitness < best.fitness {
                best = leader.clone();
                attempts = 0;
                interface.send(Message::BetterSolution {
                    iteration,
                    fitness: best.fitness,
                    tour: best.tour.clone(),
                });
            } else {
                attempts += 1;
            }
            if attempts == settings.max_attempts {
                termination = Termination::NoImprovementStall;
            }
            curve.push(CurvePoint {
                iteration,
                fitness: best.fitness,
            });
            if iteration % REPORT_INTERVAL == 0 {
                interface.send(Message::Progress {
                    iteration,
                    temperature: None,
                    fitness: leader_fitness,
                    best: best.fitness,
                });
            }
            if matches!(termination, Termination::NoImprovementStall) {
                break;
            }
        }

        interface.send(Message::Finished {
            iterations: iteration,
            fitness: best.fitness,
            termination,
        });
        RunOutcome {
            best,
            curve,
            iterations: iteration,
            termination,
        }
    }
}

/// First-order positional model: counts of which city opens a tour and,
/// per city, counts of the city that immediately follows it. The chain
/// does not wrap, so the last position of an elite tour feeds no
/// transition.
struct ChainModel {
    first: Vec<f64>,
    transitions: Vec<Vec<f64>>,
}

impl ChainModel {
    fn fit(elite: &[Candidate], n: usize) -> ChainModel {
        let mut first = vec![0.0; n];
        let mut transitions = vec![vec![0.0; n]; n];
        for candidate in elite {
            let order = candidate.tour.cities();
            first[order[0]] += 1.0;
            for pair in order.windows(2) {
                transitions[pair[0]][pair[1]] += 1.0;
            }
        }
        ChainModel { first, transitions }
    }

    /// Walks the chain once. Every step conditions on the raw draw even
    /// when it repeats an earlier city; a repeat leaves a hole. A row
    /// with no observed successors draws uniformly. The first position
    /// is never a hole.
    fn sample<R: Rng>(&self, rng: &mut R) -> Vec<Option<usize>> {
        let n = self.first.len();
        let mut used = vec![false; n];
        let mut draws = Vec::with_capacity(n);
        let mut current = roulette(&self.first, rng);
        used[current] = true;
        draws.push(Some(current));
        for _ in 1..n {
            let city = roulette(&self.transitions[current], rng);
            if used[city] {
                draws.push(None);
            } else {
                used[city] = true;
                draws.push(Some(city));
            }
            current = city;
        }
        draws
    }

    /// Fills the holes left to right: each takes the unused city with
    /// the highest transition weight out of the city actually placed
    /// just before it, lowest index on ties. Deterministic, so a given
    /// sample always repairs to the same tour.
    fn repair(&self, draws: Vec<Option<usize>>) -> Tour {
        let n = draws.len();
        let mut used = vec![false; n];
        for draw in draws.iter().flatten() {
            used[*draw] = true;
        }
        let mut order: Vec<usize> = Vec::with_capacity(n);
        for draw in draws {
            let city = match draw {
                Some(city) => city,
                None => {
                    let previous = order[order.len() - 1];
                    let row = &self.transitions[previous];
                    let mut filled = usize::MAX;
                    let mut weight = f64::NEG_INFINITY;
                    for city in 0..n {
                        if !used[city] && row[city] > weight {
                            filled = city;
                            weight = row[city];
                        }
                    }
                    used[filled] = true;
                    filled
                }
            };
            order.push(city);
        }
        Tour::unchecked(order)
    }
}

fn fitness_variance(population: &[Candidate]) -> f64 {
    let mean = population
        .iter()
        .map(|candidate| candidate.fitness)
        .sum::<f64>()
        / population.len() as f64;
    population
        .iter()
        .map(|candidate| (candidate.fitness - mean).powi(2))
        .sum::<f64>()
        / population.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::Silent;
    use rand::SeedableRng;

    fn instance() -> TspInstance {
        TspInstance::generate(12, 100, 100, 16).unwrap()
    }

    fn solver() -> Mimic {
        Mimic {
            population_size: 40,
            keep_percent: 0.25,
            convergence_threshold: None,
        }
    }

    #[test]
    fn chain_model_counts_follow_the_elite() {
        let instance = TspInstance::generate(4, 50, 50, 1).unwrap();
        let elite = vec![
            Candidate::evaluated(Tour::new(vec![0, 1, 2, 3]).unwrap(), &instance),
            Candidate::evaluated(Tour::new(vec![0, 2, 1, 3]).unwrap(), &instance),
        ];
        let model = ChainModel::fit(&elite, 4);
        assert_eq!(model.first[0], 2.0);
        assert_eq!(model.first[1], 0.0);
        assert_eq!(model.transitions[0][1], 1.0);
        assert_eq!(model.transitions[0][2], 1.0);
        assert_eq!(model.transitions[1][2], 1.0);
        assert_eq!(model.transitions[1][3], 1.0);
        assert_eq!(model.transitions[2][1], 1.0);
        assert_eq!(model.transitions[2][3], 1.0);
        // the chain does not wrap, so city 3 feeds nothing
        assert!(model.transitions[3].iter().all(|count| *count == 0.0));
    }

    #[test]
    fn samples_repair_to_valid_permutations() {
        let instance = instance();
        let mut rng = StdRng::seed_from_u64(3);
        let elite: Vec<Candidate> = (0..8)
            .map(|_| Candidate::evaluated(Tour::random(12, &mut rng), &instance))
            .collect();
        let model = ChainModel::fit(&elite, 12);
        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            let tour = model.repair(model.sample(&mut rng));
            assert!(Tour::new(tour.cities().to_vec()).is_ok());
        }
    }

    #[test]
    fn repair_breaks_ties_toward_the_lowest_city() {
        let model = ChainModel {
            first: vec![1.0; 4],
            transitions: vec![vec![0.0; 4]; 4],
        };
        let draws = vec![Some(2), None, None, Some(1)];
        let tour = model.repair(draws.clone());
        assert_eq!(tour.cities(), &[2, 0, 3, 1]);
        assert_eq!(model.repair(draws), tour);
    }

    #[test]
    fn three_cities_collapse_before_the_first_generation() {
        // every three-city tour walks the same three edges
        let instance = TspInstance::generate(3, 100, 100, 4).unwrap();
        let settings = RunSettings {
            max_iterations: 50,
            max_attempts: 500,
            seed: 1,
        };
        let outcome = solver().solve(&instance, &settings, &Silent);
        assert_eq!(outcome.termination, Termination::VarianceCollapse);
        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.curve.len(), 1);
    }

    #[test]
    fn identical_seeds_give_identical_runs() {
        let instance = instance();
        let settings = RunSettings {
            max_iterations: 20,
            max_attempts: 500,
            seed: 31,
        };
        let first = solver().solve(&instance, &settings, &Silent);
        let second = solver().solve(&instance, &settings, &Silent);
        assert_eq!(first.best.tour, second.best.tour);
        assert_eq!(first.iterations, second.iterations);
    }

    #[test]
    fn stalls_when_no_generation_improves() {
        let settings = RunSettings {
            max_iterations: 100_000,
            max_attempts: 1,
            seed: 9,
        };
        let outcome = solver().solve(&instance(), &settings, &Silent);
        assert_eq!(outcome.termination, Termination::NoImprovementStall);
        assert!(outcome.iterations < settings.max_iterations);
    }

    #[test]
    fn elite_size_is_clamped() {
        let narrow = Mimic {
            population_size: 10,
            keep_percent: 0.05,
            convergence_threshold: None,
        };
        assert_eq!(narrow.elite_len(), 2);
        let wide = Mimic {
            population_size: 10,
            keep_percent: 1.0,
            convergence_threshold: None,
        };
        assert_eq!(wide.elite_len(), 10);
    }
}
