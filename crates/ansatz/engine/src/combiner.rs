//! Combiner: additive merge of two ansatz expressions
//!
//! `A + B` becomes the sum of A's top-level terms followed by B's, with B's
//! parameters shifted past A's. Every term that does not already start with
//! a `paramK *` factor gets a fresh coefficient parameter, and the result is
//! renumbered by first appearance.

use ansatz_dsl::{BinaryOp, Expr};
use std::collections::HashMap;

/// Result of an additive merge
#[derive(Clone, Debug, PartialEq)]
pub struct Combined {
    pub expr: Expr,
    pub param_num: usize,
    /// Number of coefficient parameters inserted
    pub insertions: usize,
}

/// Sign a term carries in the top-level sum
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Sign {
    Plus,
    Minus,
}

impl Sign {
    fn op(self) -> BinaryOp {
        match self {
            Self::Plus => BinaryOp::Add,
            Self::Minus => BinaryOp::Sub,
        }
    }
}

/// Merge `left` (with `left_params` parameters) and `right`
pub fn combine(left: &Expr, left_params: usize, right: &Expr, right_params: usize) -> Combined {
    let mut shifted = right.clone();
    shifted.shift_parameters(left_params);

    let mut terms = Vec::new();
    split_terms(left.clone(), Sign::Plus, &mut terms);
    split_terms(shifted, Sign::Plus, &mut terms);

    let mut next_index = left_params + right_params;
    let mut insertions = 0;
    let terms: Vec<(Sign, Expr)> = terms
        .into_iter()
        .map(|(sign, term)| {
            if has_leading_coefficient(&term) {
                (sign, term)
            } else {
                next_index += 1;
                insertions += 1;
                (sign, insert_coefficient(term, next_index))
            }
        })
        .collect();

    let mut iter = terms.into_iter();
    let mut expr = match iter.next() {
        Some((_, first)) => first,
        None => unreachable!("an expression always has at least one term"),
    };
    for (sign, term) in iter {
        expr = Expr::binary(sign.op(), expr, term);
    }

    let param_num = renumber_by_first_appearance(&mut expr);
    Combined {
        expr,
        param_num,
        insertions,
    }
}

/// Flatten the left spine of `+`/`-` nodes into signed terms. Groups are
/// not entered, so `(a + b)` stays a single term.
fn split_terms(expr: Expr, sign: Sign, out: &mut Vec<(Sign, Expr)>) {
    match expr {
        Expr::Binary { op, left, right } if op.is_additive() => {
            split_terms(*left, sign, out);
            let right_sign = match op {
                BinaryOp::Sub => Sign::Minus,
                _ => Sign::Plus,
            };
            out.push((right_sign, *right));
        }
        other => out.push((sign, other)),
    }
}

/// Whether the innermost `*`/`/` node on the term's left spine is
/// `paramK * ...`
fn has_leading_coefficient(term: &Expr) -> bool {
    let mut node = term;
    let mut innermost = None;
    while let Expr::Binary { op, left, .. } = node {
        if !op.is_multiplicative() {
            break;
        }
        innermost = Some((*op, left.as_ref()));
        node = left.as_ref();
    }

    matches!(innermost, Some((BinaryOp::Mul, Expr::Parameter(_))))
}

/// Multiply the head factor of the term's multiplicative chain by
/// `param{index}`, so the coefficient prints first: `paramN * term`
fn insert_coefficient(term: Expr, index: usize) -> Expr {
    match term {
        Expr::Binary { op, left, right } if op.is_multiplicative() => Expr::Binary {
            op,
            left: Box::new(insert_coefficient(*left, index)),
            right,
        },
        head => Expr::binary(BinaryOp::Mul, Expr::Parameter(index), head),
    }
}

/// Renumber parameters 1, 2, ... in order of first appearance and return
/// the number of distinct parameters
pub(crate) fn renumber_by_first_appearance(expr: &mut Expr) -> usize {
    let mut mapping: HashMap<usize, usize> = HashMap::new();
    expr.visit_mut(&mut |node| {
        if let Expr::Parameter(index) = node {
            let next = mapping.len() + 1;
            *index = *mapping.entry(*index).or_insert(next);
        }
    });
    mapping.len()
}
