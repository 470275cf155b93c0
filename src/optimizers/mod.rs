//! The search strategies and the contract they share.

use crate::config::SolverConfig;
use crate::instance::TspInstance;
use crate::interface::Interface;
use crate::tour::Candidate;
use rand::Rng;
use serde::Serialize;
use std::fmt;

pub mod genetic;
pub mod hill_climbing;
pub mod mimic;
pub mod simulated_annealing;

/// Progress is reported every this many iterations.
pub(crate) const REPORT_INTERVAL: usize = 100;

/// Per-run limits, plus the seed that makes the run a pure function of its
/// inputs.
#[derive(Debug, Clone, Copy)]
pub struct RunSettings {
    pub max_iterations: usize,
    pub max_attempts: usize,
    pub seed: u64,
}

/// Why a run stopped. None of these are errors; the best candidate found
/// is returned either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The iteration budget ran out.
    ExhaustedBudget,
    /// `max_attempts` successive iterations brought no improvement.
    NoImprovementStall,
    /// The elite fitness spread fell below the convergence threshold.
    VarianceCollapse,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Termination::ExhaustedBudget => "exhausted budget",
            Termination::NoImprovementStall => "no-improvement stall",
            Termination::VarianceCollapse => "variance collapse",
        };
        write!(f, "{}", label)
    }
}

/// One point of a convergence curve: the best fitness seen after
/// `iteration` iterations.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CurvePoint {
    pub iteration: usize,
    pub fitness: f64,
}

/// Everything a single run produces.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub best: Candidate,
    pub curve: Vec<CurvePoint>,
    pub iterations: usize,
    pub termination: Termination,
}

/// The contract every search strategy implements: read the instance,
/// honor the limits, report through the interface, and hand back the best
/// candidate ever observed with the full convergence curve.
pub trait Optimizer {
    fn solve(
        &self,
        instance: &TspInstance,
        settings: &RunSettings,
        interface: &dyn Interface,
    ) -> RunOutcome;
}

impl SolverConfig {
    pub fn solve(
        &self,
        instance: &TspInstance,
        settings: &RunSettings,
        interface: &dyn Interface,
    ) -> RunOutcome {
        match self {
            SolverConfig::HillClimbing(solver) => solver.solve(instance, settings, interface),
            SolverConfig::SimulatedAnnealing(solver) => solver.solve(instance, settings, interface),
            SolverConfig::Genetic(solver) => solver.solve(instance, settings, interface),
            SolverConfig::Mimic(solver) => solver.solve(instance, settings, interface),
        }
    }
}

/// Draws an index with probability proportional to `weights`, falling back
/// to a uniform draw when the weights sum to zero.
pub(crate) fn roulette<R: Rng>(weights: &[f64], rng: &mut R) -> usize {
    let total: f64 = weights.iter().sum();
    if !(total > 0.0) {
        return rng.random_range(0..weights.len());
    }
    let mut remaining = rng.random::<f64>() * total;
    for (index, &weight) in weights.iter().enumerate() {
        remaining -= weight;
        if remaining <= 0.0 {
            return index;
        }
    }
    weights.len() - 1
}

pub(crate) fn fittest(population: &[Candidate]) -> &Candidate {
    let mut leader = &population[0];
    for candidate in population {
        if candidate.fitness < leader.fitness {
            leader = candidate;
        }
    }
    leader
}
