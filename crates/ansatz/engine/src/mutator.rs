//! Mutator: seeded substitution of function names

use ansatz_dsl::Expr;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

/// Replace the name of every call, visited in pre-order, with a different
/// declared function drawn uniformly by `rng`. Calls whose name is the only
/// declared function are left alone. Returns the number of replacements.
pub fn mutate_functions<R: Rng + ?Sized>(
    expr: &mut Expr,
    functions: &[String],
    rng: &mut R,
) -> usize {
    let mut replaced = 0;

    expr.visit_mut(&mut |node| {
        let Expr::Call { name, .. } = node else {
            return;
        };

        let candidates: Vec<&String> = functions
            .iter()
            .filter(|f| f.as_str() != name.as_str())
            .collect();
        if let Some(choice) = candidates.choose(&mut *rng) {
            debug!(from = %name, to = %choice, "Function mutated");
            *name = (*choice).clone();
            replaced += 1;
        }
    });

    replaced
}
