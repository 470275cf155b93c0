//! Two-phase benchmark harness.
//!
//! Phase one tunes: every combination from a grid runs once at the tune
//! budget and the shortest tour wins. Phase two sweeps: the winner runs
//! once per iteration budget so its convergence curve can be compared
//! across budgets. Every run's seed is fixed at planning time, which
//! makes a benchmark a pure function of the base seed however many
//! threads execute it.

use crate::config::{self, AlgorithmGrids, HarnessConfig, SolverConfig};
use crate::error::Error;
use crate::instance::TspInstance;
use crate::interface::Silent;
use crate::optimizers::{CurvePoint, RunSettings, Termination};
use crate::tour::Tour;
use serde::Serialize;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Tune,
    Sweep,
}

/// One finished run with everything the reports need.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub phase: Phase,
    pub solver: SolverConfig,
    pub budget: usize,
    pub seed: u64,
    pub iterations: usize,
    pub termination: Termination,
    pub best_fitness: f64,
    pub best_tour: Tour,
    pub elapsed: Duration,
    pub curve: Vec<CurvePoint>,
}

#[derive(Clone)]
struct RunPlan {
    phase: Phase,
    solver: SolverConfig,
    budget: usize,
    seed: u64,
}

/// Spreads run indices across the seed space so every planned run draws
/// an independent stream from one base seed.
pub fn derive_seed(base: u64, index: u64) -> u64 {
    base.wrapping_add(index.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

pub struct BenchmarkHarness {
    instance: TspInstance,
    seed: u64,
    budgets: Vec<usize>,
    tune_budget: usize,
    max_attempts: usize,
    threads: usize,
    records: Vec<RunRecord>,
    planned: usize,
}

impl BenchmarkHarness {
    pub fn new(instance: TspInstance, config: &HarnessConfig) -> Result<Self, Error> {
        let budgets = match &config.budgets {
            Some(budgets) => budgets.clone(),
            None => config::default_budgets(),
        };
        if budgets.is_empty() {
            return Err(Error::InvalidConfig("budgets must not be empty".to_string()));
        }
        if budgets.iter().any(|budget| *budget == 0) {
            return Err(Error::InvalidConfig(
                "every budget must be at least 1".to_string(),
            ));
        }
        let largest = budgets.iter().copied().fold(1, usize::max);
        let tune_budget = config.tune_budget.unwrap_or(largest);
        if tune_budget == 0 {
            return Err(Error::InvalidConfig(
                "tune budget must be at least 1".to_string(),
            ));
        }
        let max_attempts = config.max_attempts.unwrap_or(config::DEFAULT_MAX_ATTEMPTS);
        if max_attempts == 0 {
            return Err(Error::InvalidConfig(
                "max attempts must be at least 1".to_string(),
            ));
        }
        let threads = config.threads.unwrap_or(config::DEFAULT_THREADS);
        if threads == 0 {
            return Err(Error::InvalidConfig(
                "threads must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            instance,
            seed: config.seed.unwrap_or(config::DEFAULT_SEED),
            budgets,
            tune_budget,
            max_attempts,
            threads,
            records: Vec::new(),
            planned: 0,
        })
    }

    fn plan(&mut self, phase: Phase, solver: SolverConfig, budget: usize) -> RunPlan {
        let seed = derive_seed(self.seed, self.planned as u64);
        self.planned += 1;
        RunPlan {
            phase,
            solver,
            budget,
            seed,
        }
    }

    /// Runs every combination once at the tune budget and returns the one
    /// with the shortest tour. Ties keep the earlier combination.
    pub fn tune(&mut self, combinations: Vec<SolverConfig>) -> Result<SolverConfig, Error> {
        if combinations.is_empty() {
            return Err(Error::InvalidConfig(
                "tuning needs at least one combination".to_string(),
            ));
        }
        for solver in &combinations {
            solver.validate()?;
        }
        let jobs: Vec<RunPlan> = combinations
            .into_iter()
            .map(|solver| self.plan(Phase::Tune, solver, self.tune_budget))
            .collect();
        let records = self.execute(jobs);
        let mut ideal = 0;
        for (index, record) in records.iter().enumerate() {
            if record.best_fitness < records[ideal].best_fitness {
                ideal = index;
            }
        }
        let solver = records[ideal].solver.clone();
        self.records.extend(records);
        Ok(solver)
    }

    /// Runs the solver once per budget. The whole sweep shares one
    /// derived seed so the budget is the only thing that varies.
    pub fn sweep(&mut self, solver: SolverConfig) -> Result<(), Error> {
        solver.validate()?;
        let seed = derive_seed(self.seed, self.planned as u64);
        self.planned += 1;
        let jobs: Vec<RunPlan> = self
            .budgets
            .iter()
            .map(|budget| RunPlan {
                phase: Phase::Sweep,
                solver: solver.clone(),
                budget: *budget,
                seed,
            })
            .collect();
        let records = self.execute(jobs);
        self.records.extend(records);
        Ok(())
    }

    /// Tunes and sweeps each configured algorithm in turn; returns the
    /// ideal solver per algorithm in the order they ran.
    pub fn benchmark(&mut self, grids: &AlgorithmGrids) -> Result<Vec<SolverConfig>, Error> {
        let mut ideals = Vec::new();
        if let Some(grid) = &grids.hill_climbing {
            let ideal = self.tune(grid.combinations())?;
            self.sweep(ideal.clone())?;
            ideals.push(ideal);
        }
        if let Some(grid) = &grids.simulated_annealing {
            let ideal = self.tune(grid.combinations())?;
            self.sweep(ideal.clone())?;
            ideals.push(ideal);
        }
        if let Some(grid) = &grids.genetic {
            let ideal = self.tune(grid.combinations())?;
            self.sweep(ideal.clone())?;
            ideals.push(ideal);
        }
        if let Some(grid) = &grids.mimic {
            let ideal = self.tune(grid.combinations())?;
            self.sweep(ideal.clone())?;
            ideals.push(ideal);
        }
        Ok(ideals)
    }

    pub fn records(&self) -> &[RunRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<RunRecord> {
        self.records
    }

    fn run(&self, job: &RunPlan) -> RunRecord {
        let settings = RunSettings {
            max_iterations: job.budget,
            max_attempts: self.max_attempts,
            seed: job.seed,
        };
        // the clock covers the solve alone, not planning or reporting
        let start = Instant::now();
        let outcome = job.solver.solve(&self.instance, &settings, &Silent);
        let elapsed = start.elapsed();
        RunRecord {
            phase: job.phase,
            solver: job.solver.clone(),
            budget: job.budget,
            seed: job.seed,
            iterations: outcome.iterations,
            termination: outcome.termination,
            best_fitness: outcome.best.fitness,
            best_tour: outcome.best.tour,
            elapsed,
            curve: outcome.curve,
        }
    }

    /// Executes a batch, fanning out over the configured threads, and
    /// hands the records back in plan order.
    fn execute(&self, jobs: Vec<RunPlan>) -> Vec<RunRecord> {
        if self.threads <= 1 || jobs.len() <= 1 {
            return jobs.iter().map(|job| self.run(job)).collect();
        }
        let (sender, receiver) = mpsc::channel();
        thread::scope(|scope| {
            for worker in 0..self.threads {
                let batch: Vec<(usize, RunPlan)> = jobs
                    .iter()
                    .cloned()
                    .enumerate()
                    .filter(|(index, _)| index % self.threads == worker)
                    .collect();
                if batch.is_empty() {
                    continue;
                }
                let sender = sender.clone();
                scope.spawn(move || {
                    for (index, job) in batch {
                        sender.send((index, self.run(&job))).unwrap();
                    }
                });
            }
        });
        drop(sender);
        let mut indexed: Vec<(usize, RunRecord)> = receiver.into_iter().collect();
        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, record)| record).collect()
    }
}
