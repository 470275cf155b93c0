//! The reporting seam between the optimizers and whatever front end
//! drives them.
//!
//! Optimizers describe what happened through `Message` values; a front end
//! only has to implement `send` to surface them however it likes. The
//! harness runs with `Silent`, since its records already tell the story.

use crate::optimizers::Termination;
use crate::tour::Tour;
use serde::Serialize;
use serde_with::skip_serializing_none;

#[skip_serializing_none]
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    Progress {
        iteration: usize,
        temperature: Option<f64>,
        fitness: f64,
        best: f64,
    },
    Restart {
        iteration: usize,
        restart: usize,
    },
    BetterSolution {
        iteration: usize,
        fitness: f64,
        tour: Tour,
    },
    Finished {
        iterations: usize,
        fitness: f64,
        termination: Termination,
    },
    Elapsed {
        micros: u128,
    },
}

pub trait Interface {
    fn send(&self, message: Message);
}

/// Discards every message.
pub struct Silent;

impl Interface for Silent {
    fn send(&self, _message: Message) {}
}
