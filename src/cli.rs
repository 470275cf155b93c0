//! Command line entry points.
//!
//! Every invocation gets its own timestamped output directory. Run
//! tables and convergence curves are written as tab-separated files,
//! solver selections as YAML.

use crate::config::{BenchmarkConfig, SolverConfig};
use crate::error::Error;
use crate::harness::RunRecord;
use crate::interface::{Interface, Message};
use crate::optimizers::RunOutcome;
use chrono::Local;
use clap::{Parser, Subcommand};
use csv::WriterBuilder;
use std::fs::{create_dir_all, read_to_string, write, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Clone)]
#[command(name = "tourbench")]
#[command(author, version, about, long_about)]
#[command(propagate_version = true)]
pub struct CommandLineArgs {
    #[command(subcommand)]
    pub command: Command,
    /// Benchmark file, defaults to benchmark.yaml
    pub config: Option<PathBuf>,
    /// Thread count, defaults to 1
    #[arg(short, long)]
    pub threads: Option<usize>,
    /// Iteration budget for solve, defaults to 1000
    #[arg(short, long)]
    pub iterations: Option<usize>,
}

#[derive(Subcommand, Clone)]
pub enum Command {
    /// Run the configured solver once and save the best tour it finds
    Solve,
    /// Tune every configured algorithm on its grid, then sweep the winners across budgets
    Bench,
}

/// Terminal front end, also the reporting channel for running solvers.
pub struct CommandLine {
    pub args: CommandLineArgs,
    pub output_dir: PathBuf,
}

impl CommandLine {
    pub fn new(args: CommandLineArgs, maybe_output_dir: Option<PathBuf>) -> Self {
        let output_dir = maybe_output_dir.unwrap_or_else(|| {
            let time = Local::now().format("%m-%d+%H_%M_%S").to_string();
            PathBuf::from(format!("output-{}", time))
        });
        create_dir_all(output_dir.clone()).unwrap();
        Self { args, output_dir }
    }

    pub fn load_config(&self) -> Result<BenchmarkConfig, Error> {
        let path = self
            .args
            .config
            .clone()
            .unwrap_or(PathBuf::from("benchmark.yaml"));
        let content = read_to_string(&path)
            .map_err(|_| Error::InvalidConfig(format!("cannot read {}", path.display())))?;
        let config: BenchmarkConfig =
            serde_yaml::from_str(&content).map_err(|error| Error::InvalidConfig(format!("{}", error)))?;
        config.validate()?;
        Ok(config)
    }

    /// A nested command line writing into a numbered subdirectory, used
    /// when parallel solves each need their own reports.
    pub fn child(&self, index: usize) -> CommandLine {
        let child_dir = self.output_dir.join(format!("{}", index));
        CommandLine::new(self.args.clone(), Some(child_dir))
    }

    pub fn write_records(&self, records: &[RunRecord]) {
        let path = self.output_dir.join("runs.tsv");
        let mut writer = WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_path(&path)
            .unwrap();
        for record in records {
            writer
                .serialize((
                    record.solver.name(),
                    format!("{}", record.solver),
                    &record.phase,
                    record.budget,
                    record.seed,
                    record.iterations,
                    &record.termination,
                    record.best_fitness,
                    record.elapsed.as_secs_f64(),
                    format!("{}", record.best_tour),
                ))
                .unwrap();
        }
        writer.flush().unwrap();
        println!("run table saved in {}", path.display());
    }

    pub fn write_curves(&self, records: &[RunRecord]) {
        let path = self.output_dir.join("curves.tsv");
        let mut writer = WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_path(&path)
            .unwrap();
        for (index, record) in records.iter().enumerate() {
            for point in &record.curve {
                writer
                    .serialize((
                        index,
                        record.solver.name(),
                        &record.phase,
                        record.budget,
                        point.iteration,
                        point.fitness,
                    ))
                    .unwrap();
            }
        }
        writer.flush().unwrap();
        println!("convergence curves saved in {}", path.display());
    }

    pub fn write_ideal(&self, ideals: &[SolverConfig]) {
        let path = self.output_dir.join("ideal.yaml");
        let content = serde_yaml::to_string(ideals).unwrap();
        write(&path, content).unwrap();
        println!("ideal solvers saved in {}", path.display());
    }

    pub fn write_outcome(&self, outcome: &RunOutcome) {
        let path = self.output_dir.join("solution.yaml");
        let content = serde_yaml::to_string(outcome).unwrap();
        write(&path, content).unwrap();
        println!("best solution saved in {}", path.display());
    }
}

impl Interface for CommandLine {
    fn send(&self, message: Message) {
        // parallel runs append to a log file instead of interleaving on stdout
        let mut writer: Box<dyn Write> = if self.args.threads.unwrap_or(1) > 1 {
            let log_path = self.output_dir.join("log.txt");
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)
                .unwrap();
            Box::new(file)
        } else {
            Box::new(std::io::stdout())
        };
        let result = match message {
            Message::Progress {
                iteration,
                temperature,
                fitness,
                best,
            } => match temperature {
                Some(temperature) => writeln!(
                    &mut writer,
                    "iteration {}, temperature {:.2e}, current {:.3}, best {:.3}",
                    iteration, temperature, fitness, best
                ),
                None => writeln!(
                    &mut writer,
                    "iteration {}, current {:.3}, best {:.3}",
                    iteration, fitness, best
                ),
            },
            Message::Restart { iteration, restart } => writeln!(
                &mut writer,
                "iteration {}: restart {} from a fresh tour",
                iteration, restart
            ),
            Message::BetterSolution {
                iteration,
                fitness,
                tour,
            } => writeln!(
                &mut writer,
                "iteration {}: better tour of length {:.3}\n{}",
                iteration, fitness, tour
            ),
            Message::Finished {
                iterations,
                fitness,
                termination,
            } => writeln!(
                &mut writer,
                "done after {} iterations, best length {:.3}, cause: {}",
                iterations, fitness, termination
            ),
            Message::Elapsed { micros } => writeln!(&mut writer, "one run took {} μs", micros),
        };
        result.unwrap()
    }
}
