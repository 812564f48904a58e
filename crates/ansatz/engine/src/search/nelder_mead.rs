//! Bounded Nelder–Mead local search
//!
//! Derivative-free, so it tolerates the infinite scores failed evaluations
//! produce. Every trial point is clamped into the parameter box. Maximization
//! is handled by minimizing the negated score.

use super::{Problem, SearchStrategy};
use rand::rngs::StdRng;
use tracing::debug;

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Initial simplex edge as a fraction of each range's width
const INITIAL_STEP: f64 = 0.05;

/// Restarted simplex search
#[derive(Clone, Debug)]
pub struct NelderMead {
    /// Independent restarts, each from a uniform draw
    pub restarts: usize,
    /// Iteration cap per restart
    pub max_iterations: usize,
    /// Stop a restart once best and worst vertex scores are this close
    pub tolerance: f64,
}

impl NelderMead {
    pub fn new(restarts: usize, max_iterations: usize, tolerance: f64) -> Self {
        Self {
            restarts,
            max_iterations,
            tolerance,
        }
    }

    fn minimize_from(&self, problem: &mut Problem<'_>, start: Vec<f64>) -> usize {
        let sign = problem.direction().sign();
        let cost = |problem: &mut Problem<'_>, x: &[f64]| sign * problem.evaluate(x);

        let n = problem.dimension();
        if n == 0 {
            cost(problem, &start);
            return 0;
        }

        let mut simplex = initial_simplex(problem, start);
        let mut values: Vec<f64> = simplex.iter().map(|x| cost(problem, x)).collect();

        let mut iterations = 0;
        while iterations < self.max_iterations {
            iterations += 1;
            order(&mut simplex, &mut values);

            let best = values[0];
            let worst = values[n];
            if best == f64::INFINITY || (worst - best).abs() <= self.tolerance {
                break;
            }

            let centroid = centroid(&simplex[..n]);

            let mut reflected = along(&centroid, &simplex[n], -REFLECTION);
            problem.clamp(&mut reflected);
            let f_reflected = cost(problem, &reflected);

            if f_reflected < best {
                let mut expanded = along(&centroid, &reflected, EXPANSION);
                problem.clamp(&mut expanded);
                let f_expanded = cost(problem, &expanded);
                if f_expanded < f_reflected {
                    simplex[n] = expanded;
                    values[n] = f_expanded;
                } else {
                    simplex[n] = reflected;
                    values[n] = f_reflected;
                }
                continue;
            }

            if f_reflected < values[n - 1] {
                simplex[n] = reflected;
                values[n] = f_reflected;
                continue;
            }

            // Contract toward the better of the reflected and worst points
            let (toward, f_toward) = if f_reflected < worst {
                (&reflected, f_reflected)
            } else {
                (&simplex[n], worst)
            };
            let mut contracted = along(&centroid, toward, CONTRACTION);
            problem.clamp(&mut contracted);
            let f_contracted = cost(problem, &contracted);

            if f_contracted < f_toward {
                simplex[n] = contracted;
                values[n] = f_contracted;
                continue;
            }

            let anchor = simplex[0].clone();
            for i in 1..=n {
                let mut shrunk = along(&anchor, &simplex[i], SHRINK);
                problem.clamp(&mut shrunk);
                values[i] = cost(problem, &shrunk);
                simplex[i] = shrunk;
            }
        }

        iterations
    }
}

impl SearchStrategy for NelderMead {
    fn search(&mut self, problem: &mut Problem<'_>, rng: &mut StdRng) {
        for restart in 0..self.restarts {
            let start = problem.sample(rng);
            let iterations = self.minimize_from(problem, start);
            debug!(
                restart,
                iterations,
                best = ?problem.best_score(),
                "Simplex restart finished"
            );
        }
    }

    fn name(&self) -> &'static str {
        "nelder-mead"
    }
}

/// `start` plus one vertex per axis, offset by a fraction of the range
/// width (stepping inward when the start sits on the upper bound)
fn initial_simplex(problem: &Problem<'_>, start: Vec<f64>) -> Vec<Vec<f64>> {
    let mut simplex = vec![start.clone()];
    for (axis, &(lo, hi)) in problem.ranges().iter().enumerate() {
        let step = (hi - lo) * INITIAL_STEP;
        let mut vertex = start.clone();
        vertex[axis] = if vertex[axis] + step <= hi {
            vertex[axis] + step
        } else {
            vertex[axis] - step
        };
        vertex[axis] = vertex[axis].clamp(lo, hi);
        simplex.push(vertex);
    }
    simplex
}

/// Sort vertices by ascending cost
fn order(simplex: &mut Vec<Vec<f64>>, values: &mut Vec<f64>) {
    let mut paired: Vec<(Vec<f64>, f64)> = simplex.drain(..).zip(values.drain(..)).collect();
    paired.sort_by(|a, b| a.1.total_cmp(&b.1));
    for (vertex, value) in paired {
        simplex.push(vertex);
        values.push(value);
    }
}

fn centroid(points: &[Vec<f64>]) -> Vec<f64> {
    let dim = points[0].len();
    let mut c = vec![0.0; dim];
    for p in points {
        for (ci, pi) in c.iter_mut().zip(p) {
            *ci += pi;
        }
    }
    let count = points.len() as f64;
    c.iter_mut().for_each(|ci| *ci /= count);
    c
}

/// `origin + t * (target - origin)`
fn along(origin: &[f64], target: &[f64], t: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(target)
        .map(|(o, x)| o + t * (x - o))
        .collect()
}
