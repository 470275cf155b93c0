//! Benchmark configuration.
//!
//! A single YAML document describes everything a run needs: the city
//! layout, either one concrete solver or per-algorithm tuning grids,
//! and the harness limits. The defaults in this module reproduce the
//! stock benchmark.

use crate::error::Error;
use crate::instance::{Point, TspInstance};
use crate::optimizers::genetic::Genetic;
use crate::optimizers::hill_climbing::HillClimbing;
use crate::optimizers::mimic::Mimic;
use crate::optimizers::simulated_annealing::{Schedule, SimulatedAnnealing, DEFAULT_SCHEDULE};
use itertools::iproduct;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt;

pub const DEFAULT_SEED: u64 = 1;
pub const DEFAULT_MAX_ATTEMPTS: usize = 500;
pub const DEFAULT_THREADS: usize = 1;

fn default_extent() -> usize {
    100
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

/// Doubling iteration budgets, 2 through 2048.
pub fn default_budgets() -> Vec<usize> {
    (1..=11).map(|k| 1 << k).collect()
}

/// Where the cities come from. The three shapes are told apart by their
/// fields, so plain YAML works without a tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InstanceConfig {
    /// Sample distinct integer coordinates on a grid.
    Generated {
        cities: usize,
        #[serde(default = "default_extent")]
        width: usize,
        #[serde(default = "default_extent")]
        height: usize,
        #[serde(default = "default_seed")]
        seed: u64,
    },
    /// Explicit coordinates.
    Points { points: Vec<Point> },
    /// Explicit symmetric distance matrix.
    Matrix { distances: Vec<Vec<f64>> },
}

impl InstanceConfig {
    pub fn build(&self) -> Result<TspInstance, Error> {
        match self {
            InstanceConfig::Generated {
                cities,
                width,
                height,
                seed,
            } => TspInstance::generate(*cities, *width, *height, *seed),
            InstanceConfig::Points { points } => TspInstance::from_points(points.clone()),
            InstanceConfig::Matrix { distances } => TspInstance::from_matrix(distances.clone()),
        }
    }
}

/// One concrete solver. The `algorithm` tag picks the variant and the
/// remaining fields are that algorithm's parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "algorithm")]
pub enum SolverConfig {
    HillClimbing(HillClimbing),
    SimulatedAnnealing(SimulatedAnnealing),
    Genetic(Genetic),
    Mimic(Mimic),
}

impl SolverConfig {
    /// Short label used in reports.
    pub fn name(&self) -> &'static str {
        match self {
            SolverConfig::HillClimbing(_) => "rhc",
            SolverConfig::SimulatedAnnealing(_) => "sa",
            SolverConfig::Genetic(_) => "ga",
            SolverConfig::Mimic(_) => "mimic",
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        match self {
            SolverConfig::HillClimbing(solver) => {
                if let Some(method) = &solver.search_method {
                    method.validate()?;
                }
            }
            SolverConfig::SimulatedAnnealing(solver) => {
                let schedule = solver.schedule.unwrap_or(DEFAULT_SCHEDULE);
                if !(schedule.t_initial > 0.0 && schedule.t_initial.is_finite()) {
                    return Err(Error::InvalidConfig(format!(
                        "initial temperature must be positive and finite, got {}",
                        schedule.t_initial
                    )));
                }
                if !(schedule.decay > 0.0 && schedule.decay < 1.0) {
                    return Err(Error::InvalidConfig(format!(
                        "decay must lie strictly between 0 and 1, got {}",
                        schedule.decay
                    )));
                }
                if !(schedule.t_min > 0.0) || schedule.t_min > schedule.t_initial {
                    return Err(Error::InvalidConfig(format!(
                        "temperature floor must be positive and at most the initial temperature, got {}",
                        schedule.t_min
                    )));
                }
                if let Some(method) = &solver.search_method {
                    method.validate()?;
                }
            }
            SolverConfig::Genetic(solver) => {
                if solver.population_size < 2 {
                    return Err(Error::InvalidConfig(format!(
                        "population must hold at least 2 tours, got {}",
                        solver.population_size
                    )));
                }
                if !(solver.mutation_rate >= 0.0 && solver.mutation_rate <= 1.0) {
                    return Err(Error::InvalidConfig(format!(
                        "mutation rate must lie in [0, 1], got {}",
                        solver.mutation_rate
                    )));
                }
                if let Some(method) = &solver.search_method {
                    method.validate()?;
                }
            }
            SolverConfig::Mimic(solver) => {
                if solver.population_size < 2 {
                    return Err(Error::InvalidConfig(format!(
                        "population must hold at least 2 tours, got {}",
                        solver.population_size
                    )));
                }
                if !(solver.keep_percent > 0.0 && solver.keep_percent <= 1.0) {
                    return Err(Error::InvalidConfig(format!(
                        "keep percent must lie in (0, 1], got {}",
                        solver.keep_percent
                    )));
                }
                if let Some(threshold) = solver.convergence_threshold {
                    if !(threshold >= 0.0 && threshold.is_finite()) {
                        return Err(Error::InvalidConfig(format!(
                            "convergence threshold must be non-negative and finite, got {}",
                            threshold
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for SolverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverConfig::HillClimbing(solver) => write!(f, "rhc restarts={}", solver.restarts),
            SolverConfig::SimulatedAnnealing(solver) => {
                let schedule = solver.schedule.unwrap_or(DEFAULT_SCHEDULE);
                write!(
                    f,
                    "sa t_initial={} decay={} t_min={}",
                    schedule.t_initial, schedule.decay, schedule.t_min
                )
            }
            SolverConfig::Genetic(solver) => write!(
                f,
                "ga population={} mutation={}",
                solver.population_size, solver.mutation_rate
            ),
            SolverConfig::Mimic(solver) => write!(
                f,
                "mimic population={} keep={}",
                solver.population_size, solver.keep_percent
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HillClimbingGrid {
    pub restarts: Vec<usize>,
}

impl Default for HillClimbingGrid {
    fn default() -> Self {
        Self {
            restarts: vec![0, 5, 20, 30, 45, 60, 75],
        }
    }
}

impl HillClimbingGrid {
    pub fn combinations(&self) -> Vec<SolverConfig> {
        self.restarts
            .iter()
            .map(|restarts| {
                SolverConfig::HillClimbing(HillClimbing {
                    restarts: *restarts,
                    search_method: None,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnealingGrid {
    pub t_initial: Vec<f64>,
    pub decay: Vec<f64>,
    pub t_min: Vec<f64>,
}

impl Default for AnnealingGrid {
    fn default() -> Self {
        Self {
            t_initial: vec![
                1.0, 10.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0,
            ],
            decay: vec![0.99],
            t_min: vec![0.001],
        }
    }
}

impl AnnealingGrid {
    pub fn combinations(&self) -> Vec<SolverConfig> {
        iproduct!(&self.t_initial, &self.decay, &self.t_min)
            .map(|(t_initial, decay, t_min)| {
                SolverConfig::SimulatedAnnealing(SimulatedAnnealing {
                    schedule: Some(Schedule {
                        t_initial: *t_initial,
                        decay: *decay,
                        t_min: *t_min,
                    }),
                    search_method: None,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneticGrid {
    pub population_size: Vec<usize>,
    pub mutation_rate: Vec<f64>,
}

impl Default for GeneticGrid {
    fn default() -> Self {
        Self {
            population_size: vec![10, 50, 100, 200, 300],
            mutation_rate: vec![0.2, 0.4, 0.6, 0.8, 1.0],
        }
    }
}

impl GeneticGrid {
    pub fn combinations(&self) -> Vec<SolverConfig> {
        iproduct!(&self.population_size, &self.mutation_rate)
            .map(|(population_size, mutation_rate)| {
                SolverConfig::Genetic(Genetic {
                    population_size: *population_size,
                    mutation_rate: *mutation_rate,
                    search_method: None,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MimicGrid {
    pub population_size: Vec<usize>,
    pub keep_percent: Vec<f64>,
}

impl Default for MimicGrid {
    fn default() -> Self {
        Self {
            population_size: vec![22],
            keep_percent: vec![0.1, 0.25, 0.5, 0.75],
        }
    }
}

impl MimicGrid {
    pub fn combinations(&self) -> Vec<SolverConfig> {
        iproduct!(&self.population_size, &self.keep_percent)
            .map(|(population_size, keep_percent)| {
                SolverConfig::Mimic(Mimic {
                    population_size: *population_size,
                    keep_percent: *keep_percent,
                    convergence_threshold: None,
                })
            })
            .collect()
    }
}

/// Which algorithms to tune, each with its grid. An algorithm left out
/// of an explicit `grids` section is skipped, so a document listing only
/// `genetic` benchmarks the genetic algorithm alone.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmGrids {
    pub hill_climbing: Option<HillClimbingGrid>,
    pub simulated_annealing: Option<AnnealingGrid>,
    pub genetic: Option<GeneticGrid>,
    pub mimic: Option<MimicGrid>,
}

impl Default for AlgorithmGrids {
    fn default() -> Self {
        Self {
            hill_climbing: Some(HillClimbingGrid::default()),
            simulated_annealing: Some(AnnealingGrid::default()),
            genetic: Some(GeneticGrid::default()),
            mimic: Some(MimicGrid::default()),
        }
    }
}

/// Limits shared by every run the harness schedules.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarnessConfig {
    pub seed: Option<u64>,
    pub budgets: Option<Vec<usize>>,
    /// Budget used while tuning, the largest sweep budget when omitted.
    pub tune_budget: Option<usize>,
    pub max_attempts: Option<usize>,
    pub threads: Option<usize>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    pub instance: InstanceConfig,
    pub solver: Option<SolverConfig>,
    pub grids: Option<AlgorithmGrids>,
    pub harness: Option<HarnessConfig>,
}

fn validate_grid(name: &str, combinations: &[SolverConfig]) -> Result<(), Error> {
    if combinations.is_empty() {
        return Err(Error::InvalidConfig(format!(
            "tuning grid for {} is empty",
            name
        )));
    }
    for solver in combinations {
        solver.validate()?;
    }
    Ok(())
}

impl BenchmarkConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(solver) = &self.solver {
            solver.validate()?;
        }
        if let Some(grids) = &self.grids {
            if let Some(grid) = &grids.hill_climbing {
                validate_grid("hill_climbing", &grid.combinations())?;
            }
            if let Some(grid) = &grids.simulated_annealing {
                validate_grid("simulated_annealing", &grid.combinations())?;
            }
            if let Some(grid) = &grids.genetic {
                validate_grid("genetic", &grid.combinations())?;
            }
            if let Some(grid) = &grids.mimic {
                validate_grid("mimic", &grid.combinations())?;
            }
        }
        if let Some(harness) = &self.harness {
            if let Some(budgets) = &harness.budgets {
                if budgets.is_empty() {
                    return Err(Error::InvalidConfig("budgets must not be empty".to_string()));
                }
                if budgets.iter().any(|budget| *budget == 0) {
                    return Err(Error::InvalidConfig(
                        "every budget must be at least 1".to_string(),
                    ));
                }
            }
            if harness.tune_budget == Some(0) {
                return Err(Error::InvalidConfig(
                    "tune budget must be at least 1".to_string(),
                ));
            }
            if harness.max_attempts == Some(0) {
                return Err(Error::InvalidConfig(
                    "max attempts must be at least 1".to_string(),
                ));
            }
            if harness.threads == Some(0) {
                return Err(Error::InvalidConfig(
                    "threads must be at least 1".to_string(),
                ));
            }
        }
        Ok(())
    }
}
