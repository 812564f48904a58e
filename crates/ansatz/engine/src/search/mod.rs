//! Parameter search over an ansatz template
//!
//! A search substitutes candidate parameter vectors into the template,
//! scores each numeric instance with the caller's objective and keeps the
//! best one. Failing, panicking or timed-out evaluations score the worst
//! value for the search direction and the search continues.
//!
//! Strategies implement [`SearchStrategy`]; [`SearchMode`] selects one of
//! the built-in ones:
//!
//! - [`RandomSearch`]: independent uniform draws within the ranges
//! - [`NelderMead`]: bounded simplex local search, restarted from uniform draws

mod nelder_mead;
mod random;

pub use nelder_mead::NelderMead;
pub use random::RandomSearch;

use crate::objective::GuardedObjective;
use crate::substitution::substitute;
use ansatz_dsl::{AnsatzError, AnsatzResult, Expr};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Which built-in strategy drives the search
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Random,
    Optimize,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Random => write!(f, "random"),
            Self::Optimize => write!(f, "optimize"),
        }
    }
}

impl FromStr for SearchMode {
    type Err = AnsatzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "optimize" => Ok(Self::Optimize),
            other => Err(AnsatzError::InvalidSearch(format!(
                "unknown search mode '{}' (expected 'random' or 'optimize')",
                other
            ))),
        }
    }
}

/// Whether lower or higher scores are better
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Minimize,
    Maximize,
}

impl Direction {
    /// Score assigned to failed evaluations
    pub fn worst(self) -> f64 {
        match self {
            Self::Minimize => f64::INFINITY,
            Self::Maximize => f64::NEG_INFINITY,
        }
    }

    /// Strictly better; ties keep the incumbent
    pub fn is_better(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Self::Minimize => candidate < incumbent,
            Self::Maximize => candidate > incumbent,
        }
    }

    /// Sign that turns this direction into minimization
    pub(crate) fn sign(self) -> f64 {
        match self {
            Self::Minimize => 1.0,
            Self::Maximize => -1.0,
        }
    }
}

/// Search configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Strategy to use
    pub mode: SearchMode,
    /// Random draws (random mode) or restarts (optimize mode); at least 1
    pub trial_num: usize,
    /// Minimize the objective when true, maximize otherwise
    pub do_minimize: bool,
    /// Wall-clock bound per objective call
    pub timeout_ms: Option<u64>,
    /// Seed for candidate draws; entropy when absent
    pub seed: Option<u64>,
    /// Simplex iterations per restart (optimize mode)
    pub max_iterations: usize,
    /// Score spread at which a restart is considered converged (optimize mode)
    pub tolerance: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::Random,
            trial_num: 100,
            do_minimize: true,
            timeout_ms: None,
            seed: None,
            max_iterations: 200,
            tolerance: 1e-8,
        }
    }
}

impl SearchConfig {
    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_trials(mut self, trial_num: usize) -> Self {
        self.trial_num = trial_num;
        self
    }

    pub fn minimize(mut self) -> Self {
        self.do_minimize = true;
        self
    }

    pub fn maximize(mut self) -> Self {
        self.do_minimize = false;
        self
    }

    /// Per-evaluation time limit, rounded up to whole milliseconds.
    ///
    /// A call that runs past the limit is scored as a failure, but its worker
    /// thread keeps running until the objective returns on its own. An
    /// objective that never returns leaks one thread per timed-out call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let millis = timeout.as_nanos().div_ceil(1_000_000);
        self.timeout_ms = Some(u64::try_from(millis).unwrap_or(u64::MAX));
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn direction(&self) -> Direction {
        if self.do_minimize {
            Direction::Minimize
        } else {
            Direction::Maximize
        }
    }

    /// Check everything that does not depend on the template
    pub fn validate(&self, param_ranges: &[(f64, f64)]) -> AnsatzResult<()> {
        if self.trial_num < 1 {
            return Err(AnsatzError::InvalidSearch(
                "trial_num must be at least 1".into(),
            ));
        }
        if self.mode == SearchMode::Optimize && self.max_iterations < 1 {
            return Err(AnsatzError::InvalidSearch(
                "max_iterations must be at least 1".into(),
            ));
        }
        if self.tolerance.is_nan() || self.tolerance < 0.0 {
            return Err(AnsatzError::InvalidSearch(format!(
                "tolerance must be non-negative, got {}",
                self.tolerance
            )));
        }
        if self.timeout_ms == Some(0) {
            return Err(AnsatzError::InvalidSearch(
                "timeout must be at least 1 ms".into(),
            ));
        }
        for (i, &(lo, hi)) in param_ranges.iter().enumerate() {
            // The width must be finite too, or uniform sampling overflows
            if !lo.is_finite() || !hi.is_finite() || lo > hi || !(hi - lo).is_finite() {
                return Err(AnsatzError::InvalidSearch(format!(
                    "range for param{} must be finite with min <= max, got ({}, {})",
                    i + 1,
                    lo,
                    hi
                )));
            }
        }
        Ok(())
    }

    /// The built-in strategy this configuration selects
    pub fn strategy(&self) -> Box<dyn SearchStrategy> {
        match self.mode {
            SearchMode::Random => Box::new(RandomSearch::new(self.trial_num)),
            SearchMode::Optimize => Box::new(NelderMead::new(
                self.trial_num,
                self.max_iterations,
                self.tolerance,
            )),
        }
    }
}

/// Best candidate found by a search
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub best_params: Vec<f64>,
    pub best_score: f64,
    /// Objective calls made
    pub evaluations: usize,
    /// Calls that failed, panicked or timed out
    pub failures: usize,
}

/// A search strategy explores the parameter box of a [`Problem`]
pub trait SearchStrategy {
    fn search(&mut self, problem: &mut Problem<'_>, rng: &mut StdRng);

    /// Strategy name for logging
    fn name(&self) -> &'static str;
}

/// One search run: the template, its parameter box, the objective and the
/// best record so far
pub struct Problem<'a> {
    template: &'a Expr,
    ranges: &'a [(f64, f64)],
    objective: GuardedObjective,
    direction: Direction,
    best: Option<(Vec<f64>, f64)>,
    evaluations: usize,
    failures: usize,
}

impl<'a> Problem<'a> {
    pub fn new(
        template: &'a Expr,
        ranges: &'a [(f64, f64)],
        objective: GuardedObjective,
        direction: Direction,
    ) -> Self {
        Self {
            template,
            ranges,
            objective,
            direction,
            best: None,
            evaluations: 0,
            failures: 0,
        }
    }

    pub fn dimension(&self) -> usize {
        self.ranges.len()
    }

    pub fn ranges(&self) -> &[(f64, f64)] {
        self.ranges
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Uniform draw from the parameter box
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
        self.ranges
            .iter()
            .map(|&(lo, hi)| if lo < hi { rng.gen_range(lo..=hi) } else { lo })
            .collect()
    }

    /// Clamp a point into the parameter box
    pub fn clamp(&self, point: &mut [f64]) {
        for (x, &(lo, hi)) in point.iter_mut().zip(self.ranges) {
            *x = x.clamp(lo, hi);
        }
    }

    /// Score one candidate and update the best record. Failures score
    /// [`Direction::worst`].
    pub fn evaluate(&mut self, params: &[f64]) -> f64 {
        let numeric = substitute(self.template, params).to_string();
        self.evaluations += 1;

        let score = match self.objective.score(&numeric) {
            Ok(score) => score,
            Err(err) => {
                self.failures += 1;
                debug!(candidate = %numeric, error = %err, "Candidate scored as worst case");
                self.direction.worst()
            }
        };

        let improved = match &self.best {
            None => true,
            Some((_, best)) => self.direction.is_better(score, *best),
        };
        if improved {
            self.best = Some((params.to_vec(), score));
        }
        score
    }

    pub fn best_score(&self) -> Option<f64> {
        self.best.as_ref().map(|(_, score)| *score)
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Finish the run. A run that never evaluated reports the worst score.
    pub fn into_outcome(self) -> SearchOutcome {
        let (best_params, best_score) = self
            .best
            .unwrap_or_else(|| (Vec::new(), self.direction.worst()));
        SearchOutcome {
            best_params,
            best_score,
            evaluations: self.evaluations,
            failures: self.failures,
        }
    }
}
