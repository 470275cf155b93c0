use tourbench::config::{
    AlgorithmGrids, AnnealingGrid, GeneticGrid, HarnessConfig, HillClimbingGrid, MimicGrid,
    SolverConfig,
};
use tourbench::harness::{BenchmarkHarness, Phase};
use tourbench::optimizers::hill_climbing::HillClimbing;
use tourbench::optimizers::simulated_annealing::SimulatedAnnealing;
use tourbench::optimizers::RunSettings;
use tourbench::{Error, Point, Silent, Tour, TspInstance};

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
fn hill_climbing_finds_the_square_perimeter() {
    let solver = HillClimbing {
        restarts: 10,
        search_method: None,
    };
    let settings = RunSettings {
        max_iterations: 500,
        max_attempts: 50,
        seed: 3,
    };
    let outcome = SolverConfig::HillClimbing(solver).solve(&unit_square(), &settings, &Silent);
    assert!(outcome.best.fitness <= 4.0 + 1e-6);
}

#[test]
fn instances_below_three_cities_are_rejected() {
    let lonely = TspInstance::from_points(vec![Point { x: 0.0, y: 0.0 }]);
    assert!(matches!(lonely, Err(Error::InvalidInstance(_))));
    let pair = TspInstance::from_points(vec![
        Point { x: 0.0, y: 0.0 },
        Point { x: 3.0, y: 4.0 },
    ]);
    assert!(matches!(pair, Err(Error::InvalidInstance(_))));
}

#[test]
fn longer_budgets_never_hurt_within_a_sweep() {
    let instance = TspInstance::generate(15, 100, 100, 1).unwrap();
    let settings = HarnessConfig {
        budgets: Some(vec![2, 4, 8, 16]),
        ..HarnessConfig::default()
    };
    let mut harness = BenchmarkHarness::new(instance, &settings).unwrap();
    harness
        .sweep(SolverConfig::SimulatedAnnealing(SimulatedAnnealing {
            schedule: None,
            search_method: None,
        }))
        .unwrap();
    harness
        .sweep(SolverConfig::HillClimbing(HillClimbing {
            restarts: 10,
            search_method: None,
        }))
        .unwrap();
    let fitness: Vec<f64> = harness
        .records()
        .iter()
        .map(|record| record.best_fitness)
        .collect();
    assert_eq!(fitness.len(), 8);
    // each sweep shares one seed, so a longer run extends a shorter one
    for sweep in fitness.chunks(4) {
        for pair in sweep.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
    }
}

fn small_grids() -> AlgorithmGrids {
    AlgorithmGrids {
        hill_climbing: Some(HillClimbingGrid {
            restarts: vec![0, 5],
        }),
        simulated_annealing: Some(AnnealingGrid {
            t_initial: vec![1.0, 10.0],
            decay: vec![0.99],
            t_min: vec![0.001],
        }),
        genetic: Some(GeneticGrid {
            population_size: vec![8],
            mutation_rate: vec![0.2, 0.8],
        }),
        mimic: Some(MimicGrid {
            population_size: vec![10],
            keep_percent: vec![0.5],
        }),
    }
}

fn small_settings(threads: usize) -> HarnessConfig {
    HarnessConfig {
        budgets: Some(vec![2, 4, 8]),
        tune_budget: Some(20),
        threads: Some(threads),
        ..HarnessConfig::default()
    }
}

#[test]
fn a_full_benchmark_produces_consistent_records() {
    let instance = TspInstance::generate(10, 100, 100, 1).unwrap();
    let mut harness = BenchmarkHarness::new(instance, &small_settings(1)).unwrap();
    let ideals = harness.benchmark(&small_grids()).unwrap();
    assert_eq!(ideals.len(), 4);
    let records = harness.records();
    let tuned = records
        .iter()
        .filter(|record| record.phase == Phase::Tune)
        .count();
    let swept = records
        .iter()
        .filter(|record| record.phase == Phase::Sweep)
        .count();
    assert_eq!(tuned, 7);
    assert_eq!(swept, 12);
    for record in records {
        assert!(Tour::new(record.best_tour.cities().to_vec()).is_ok());
        assert_eq!(record.curve.first().map(|point| point.iteration), Some(0));
        for pair in record.curve.windows(2) {
            assert!(pair[1].fitness <= pair[0].fitness);
        }
        assert!(record.iterations <= record.budget);
    }
}

#[test]
fn benchmarks_agree_across_thread_counts() {
    let instance = TspInstance::generate(10, 100, 100, 1).unwrap();
    let mut serial = BenchmarkHarness::new(instance.clone(), &small_settings(1)).unwrap();
    let mut parallel = BenchmarkHarness::new(instance, &small_settings(4)).unwrap();
    let first = serial.benchmark(&small_grids()).unwrap();
    let second = parallel.benchmark(&small_grids()).unwrap();
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(format!("{}", a), format!("{}", b));
    }
    assert_eq!(serial.records().len(), parallel.records().len());
    for (a, b) in serial.records().iter().zip(parallel.records().iter()) {
        assert_eq!(a.phase, b.phase);
        assert_eq!(a.seed, b.seed);
        assert_eq!(a.budget, b.budget);
        assert_eq!(a.iterations, b.iterations);
        assert_eq!(a.best_fitness, b.best_fitness);
        assert_eq!(a.best_tour, b.best_tour);
    }
}
