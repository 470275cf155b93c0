//! tourbench benchmarks randomized search algorithms on the traveling
//! salesman problem. It implements random-restart hill climbing,
//! simulated annealing, a genetic algorithm and MIMIC over a shared
//! tour representation, and a harness that tunes each algorithm on a
//! hyperparameter grid before sweeping the winner across iteration
//! budgets.
//!
//! `tourbench` is also a command line program; see README.md for usage.

pub mod cli;
pub mod config;
pub mod error;
pub mod harness;
pub mod instance;
pub mod interface;
pub mod operators;
pub mod optimizers;
pub mod tour;

pub use error::Error;
pub use instance::{Point, TspInstance};
pub use interface::{Interface, Message, Silent};
pub use tour::{Candidate, Tour};
