//! Simulated annealing.
//!
//! The same neighborhood as hill climbing under Metropolis acceptance: a
//! worsening move passes with probability exp(-delta / T), with T on a
//! geometric schedule clamped at a floor.

use super::{Optimizer, RunOutcome, RunSettings, Termination, REPORT_INTERVAL};
use crate::instance::TspInstance;
use crate::interface::{Interface, Message};
use crate::operators::{Neighborhood, SearchConfig};
use crate::optimizers::CurvePoint;
use crate::tour::{Candidate, Tour};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Geometric cooling: `T(k) = max(t_initial * decay^k, t_min)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Schedule {
    pub t_initial: f64,
    pub decay: f64,
    pub t_min: f64,
}

pub const DEFAULT_SCHEDULE: Schedule = Schedule {
    t_initial: 1.0,
    decay: 0.99,
    t_min: 0.001,
};

impl Schedule {
    /// Temperature at iteration `k`.
    pub fn temperature(&self, k: usize) -> f64 {
        (self.t_initial * self.decay.powi(k as i32)).max(self.t_min)
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedAnnealing {
    pub schedule: Option<Schedule>,
    pub search_method: Option<SearchConfig>,
}

impl Optimizer for SimulatedAnnealing {
    fn solve(
        &self,
        instance: &TspInstance,
        settings: &RunSettings,
        interface: &dyn Interface,
    ) -> RunOutcome {
        let schedule = self.schedule.unwrap_or(DEFAULT_SCHEDULE);
        let mut rng = StdRng::seed_from_u64(settings.seed);
        let neighborhood = Neighborhood::new(&self.search_method);
        let mut current = Candidate::evaluated(Tour::random(instance.size(), &mut rng), instance);
        let mut best = current.clone();
        let mut curve = vec![CurvePoint {
            iteration: 0,
            fitness: best.fitness,
        }];
        let mut attempts = 0;
        let mut iteration = 0;
        let mut termination = Termination::ExhaustedBudget;

        while iteration < settings.max_iterations {
            let temperature = schedule.temperature(iteration);
            iteration += 1;
            let next =
                Candidate::evaluated(neighborhood.neighbor(&current.tour, &mut rng), instance);
            let delta = next.fitness - current.fitness;
            // any acceptance resets the stall counter, accepted worsening
            // moves included
            if delta <= 0.0 || rng.random::<f64>() < (-delta / temperature).exp() {
                current = next;
                attempts = 0;
            } else {
                attempts += 1;
            }
            if current.fitness < best.fitness {
                best = current.clone();
                interface.send(Message::BetterSolution {
                    iteration,
                    fitness: best.fitness,
                    tour: best.tour.clone(),
                });
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
                    temperature: Some(temperature),
                    fitness: current.fitness,
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
