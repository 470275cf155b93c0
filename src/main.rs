//! tourbench: randomized-search benchmarks for the traveling salesman problem.
//!
//! `solve` runs one configured solver on the instance and saves the best
//! tour it finds. `bench` tunes every configured algorithm over its
//! hyperparameter grid, then sweeps each winner across a ladder of
//! iteration budgets to expose how solution quality scales with budget.

use clap::Parser;
use std::thread;
use std::time::Instant;
use tourbench::cli::{Command, CommandLine, CommandLineArgs};
use tourbench::config::{DEFAULT_MAX_ATTEMPTS, DEFAULT_SEED};
use tourbench::harness::{derive_seed, BenchmarkHarness};
use tourbench::interface::{Interface, Message};
use tourbench::optimizers::RunSettings;
use tourbench::Error;

fn main() -> Result<(), Error> {
    let args = CommandLineArgs::parse();
    let command_line = CommandLine::new(args.clone(), None);
    let config = command_line.load_config()?;
    let instance = config.instance.build()?;
    match args.command {
        Command::Solve => {
            let solver = config
                .solver
                .ok_or_else(|| Error::InvalidConfig("no solver configured".to_string()))?;
            let harness_config = config.harness.unwrap_or_default();
            let budget = args.iterations.unwrap_or(1000);
            let max_attempts = harness_config.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS);
            let seed = harness_config.seed.unwrap_or(DEFAULT_SEED);
            let threads = args.threads.or(harness_config.threads).unwrap_or(1);
            if threads == 1 {
                let settings = RunSettings {
                    max_iterations: budget,
                    max_attempts,
                    seed,
                };
                let start = Instant::now();
                let outcome = solver.solve(&instance, &settings, &command_line);
                command_line.send(Message::Elapsed {
                    micros: start.elapsed().as_micros(),
                });
                command_line.write_outcome(&outcome);
            } else {
                // children route their reports by the thread count in their
                // args, so hand them the resolved one, not the raw flag
                let mut child_args = command_line.args.clone();
                child_args.threads = Some(threads);
                let parent = CommandLine::new(child_args, Some(command_line.output_dir.clone()));
                let mut handles = vec![];
                for index in 0..threads {
                    let child = parent.child(index);
                    let instance = instance.clone();
                    let solver = solver.clone();
                    let settings = RunSettings {
                        max_iterations: budget,
                        max_attempts,
                        seed: derive_seed(seed, index as u64),
                    };
                    let handle =
                        thread::spawn(move || solver.solve(&instance, &settings, &child));
                    handles.push(handle);
                }
                let mut outcomes: Vec<_> = handles
                    .into_iter()
                    .map(|handle| handle.join().unwrap())
                    .collect();
                outcomes.sort_by(|a, b| a.best.fitness.total_cmp(&b.best.fitness));
                for outcome in &outcomes {
                    println!(
                        "length {:.3} after {} iterations ({})",
                        outcome.best.fitness, outcome.iterations, outcome.termination
                    );
                }
                command_line.write_outcome(&outcomes[0]);
            }
        }
        Command::Bench => {
            let mut harness_config = config.harness.unwrap_or_default();
            if args.threads.is_some() {
                harness_config.threads = args.threads;
            }
            let grids = config.grids.unwrap_or_default();
            let mut harness = BenchmarkHarness::new(instance, &harness_config)?;
            let ideals = harness.benchmark(&grids)?;
            command_line.write_ideal(&ideals);
            let records = harness.into_records();
            command_line.write_records(&records);
            command_line.write_curves(&records);
        }
    }
    Ok(())
}
