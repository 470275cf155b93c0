use criterion::{criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tourbench::config::SolverConfig;
use tourbench::operators::Neighborhood;
use tourbench::optimizers::genetic::Genetic;
use tourbench::optimizers::hill_climbing::HillClimbing;
use tourbench::optimizers::mimic::Mimic;
use tourbench::optimizers::simulated_annealing::SimulatedAnnealing;
use tourbench::optimizers::RunSettings;
use tourbench::{Silent, Tour, TspInstance};

fn stock_instance() -> TspInstance {
    TspInstance::generate(22, 100, 100, 1).unwrap()
}

fn time_solver(solver: SolverConfig, budget: usize, name: &str, b: &mut Criterion) {
    let instance = stock_instance();
    let settings = RunSettings {
        max_iterations: budget,
        max_attempts: 500,
        seed: 1,
    };
    b.bench_function(name, |b| {
        b.iter(|| solver.solve(&instance, &settings, &Silent))
    });
}

fn evaluation(b: &mut Criterion) {
    let instance = stock_instance();
    let mut rng = StdRng::seed_from_u64(7);
    let tour = Tour::random(22, &mut rng);
    b.bench_function("tour evaluation", |b| {
        b.iter(|| instance.evaluate(&tour).unwrap())
    });
}

fn neighbor(b: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let tour = Tour::random(22, &mut rng);
    let neighborhood = Neighborhood::new(&None);
    b.bench_function("neighbor move", |b| {
        b.iter(|| neighborhood.neighbor(&tour, &mut rng))
    });
}

fn hill_climbing(b: &mut Criterion) {
    let solver = SolverConfig::HillClimbing(HillClimbing {
        restarts: 5,
        search_method: None,
    });
    time_solver(solver, 256, "hill climbing, 256 iterations", b);
}

fn simulated_annealing(b: &mut Criterion) {
    let solver = SolverConfig::SimulatedAnnealing(SimulatedAnnealing {
        schedule: None,
        search_method: None,
    });
    time_solver(solver, 256, "simulated annealing, 256 iterations", b);
}

fn genetic(b: &mut Criterion) {
    let solver = SolverConfig::Genetic(Genetic {
        population_size: 50,
        mutation_rate: 0.4,
        search_method: None,
    });
    time_solver(solver, 64, "genetic, 64 generations", b);
}

fn mimic(b: &mut Criterion) {
    let solver = SolverConfig::Mimic(Mimic {
        population_size: 22,
        keep_percent: 0.25,
        convergence_threshold: None,
    });
    time_solver(solver, 64, "mimic, 64 generations", b);
}

criterion_group!(
    benches,
    evaluation,
    neighbor,
    hill_climbing,
    simulated_annealing,
    genetic,
    mimic
);
criterion_main!(benches);
