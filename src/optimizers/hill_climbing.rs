//! Hill climbing with random restarts.
//!
//! Strictly improving local search. When `max_attempts` successive
//! neighbors fail to improve, the walk restarts from a fresh random tour,
//! up to `restarts` times; the best candidate ever seen is kept across
//! restarts.

use super::{Optimizer, RunOutcome, RunSettings, Termination, REPORT_INTERVAL};
use crate::instance::TspInstance;
use crate::interface::{Interface, Message};
use crate::operators::{Neighborhood, SearchConfig};
use crate::optimizers::CurvePoint;
use crate::tour::{Candidate, Tour};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HillClimbing {
    /// How many restarts are allowed before a stall ends the run.
    pub restarts: usize,
    pub search_method: Option<SearchConfig>,
}

impl Optimizer for HillClimbing {
    fn solve(
        &self,
        instance: &TspInstance,
        settings: &RunSettings,
        interface: &dyn Interface,
    ) -> RunOutcome {
        let mut rng = StdRng::seed_from_u64(settings.seed);
        let neighborhood = Neighborhood::new(&self.search_method);
        let mut current = Candidate::evaluated(Tour::random(instance.size(), &mut rng), instance);
        let mut best = current.clone();
        let mut curve = vec![CurvePoint {
            iteration: 0,
            fitness: best.fitness,
        }];
        let mut attempts = 0;
        let mut restarts = 0;
        let mut iteration = 0;
        let mut termination = Termination::ExhaustedBudget;

        while iteration < settings.max_iterations {
            iteration += 1;
            let next = Candidate::evaluated(neighborhood.neighbor(&current.tour, &mut rng), instance);
            if next.fitness < current.fitness {
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
                if restarts == self.restarts {
                    termination = Termination::NoImprovementStall;
                } else {
                    restarts += 1;
                    attempts = 0;
                    current =
                        Candidate::evaluated(Tour::random(instance.size(), &mut rng), instance);
                    interface.send(Message::Restart {
                        iteration,
                        restart: restarts,
                    });
                    // the fresh draw can itself set a record
                    if current.fitness < best.fitness {
                        best = current.clone();
                        interface.send(Message::BetterSolution {
                            iteration,
                            fitness: best.fitness,
                            tour: best.tour.clone(),
                        });
                    }
                }
            }
            curve.push(CurvePoint {
                iteration,
                fitness: best.fitness,
            });
            if iteration % REPORT_INTERVAL == 0 {
                interface.send(Message::Progress {
                    iteration,
                    temperature: None,
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
