//! Random search

use super::{Problem, SearchStrategy};
use rand::rngs::StdRng;
use tracing::trace;

/// Independent uniform draws within the parameter box
#[derive(Clone, Debug)]
pub struct RandomSearch {
    /// Number of candidates to draw
    pub trials: usize,
}

impl RandomSearch {
    pub fn new(trials: usize) -> Self {
        Self { trials }
    }
}

impl SearchStrategy for RandomSearch {
    fn search(&mut self, problem: &mut Problem<'_>, rng: &mut StdRng) {
        for trial in 0..self.trials {
            let params = problem.sample(rng);
            let score = problem.evaluate(&params);
            trace!(trial, score, "Random trial scored");
        }
    }

    fn name(&self) -> &'static str {
        "random"
    }
}
