//! Genetic algorithm.
//!
//! Generational search: fitness-proportionate selection (weighted toward
//! short tours), order-preserving crossover, and the local-move operator
//! as mutation. The whole population is replaced each generation; the
//! best individual ever seen is tracked outside it.

use super::{fittest, roulette, Optimizer, RunOutcome, RunSettings, Termination, REPORT_INTERVAL};
use crate::instance::TspInstance;
use crate::interface::{Interface, Message};
use crate::operators::{order_crossover, Neighborhood, SearchConfig};
use crate::optimizers::CurvePoint;
use crate::tour::{Candidate, Tour};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genetic {
    pub population_size: usize,
    /// Probability that an offspring is perturbed after crossover.
    pub mutation_rate: f64,
    pub search_method: Option<SearchConfig>,
}

impl Optimizer for Genetic {
    fn solve(
        &self,
        instance: &TspInstance,
        settings: &RunSettings,
        interface: &dyn Interface,
    ) -> RunOutcome {
        let mut rng = StdRng::seed_from_u64(settings.seed);
        let neighborhood = Neighborhood::new(&self.search_method);
        let n = instance.size();
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
            iteration += 1;
            // selection weight is the gap to the worst member, so short
            // tours breed more; a fitness-flat population draws uniformly
            let worst = population
                .iter()
                .map(|candidate| candidate.fitness)
                .fold(f64::NEG_INFINITY, f64::max);
            let weights: Vec<f64> = population
                .iter()
                .map(|candidate| worst - candidate.fitness)
                .collect();
            let mut offspring = Vec::with_capacity(self.population_size);
            for _ in 0..self.population_size {
                let first = &population[roulette(&weights, &mut rng)];
                let second = &population[roulette(&weights, &mut rng)];
                let mut child = order_crossover(&first.tour, &second.tour, &mut rng);
                if rng.random::<f64>() < self.mutation_rate {
                    neighborhood.perturb(&mut child, &mut rng);
                }
                offspring.push(Candidate::evaluated(child, instance));
            }
            population = offspring;
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
