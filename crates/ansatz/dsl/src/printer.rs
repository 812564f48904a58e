//! Canonical printer
//!
//! Renders an [`Expr`] with single spaces around binary operators and only
//! the parentheses operator precedence requires. Groups are transparent:
//! `(((param1 + param2))) * ((x + y))` prints as `(param1 + param2) * (x + y)`.

use crate::ast::{BinaryOp, Expr};
use std::fmt;

/// Binding strength, weakest first
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Additive,
    Multiplicative,
    Unary,
    Power,
    /// Required of the left operand of `**`
    Atom,
}

impl Precedence {
    fn next(self) -> Self {
        match self {
            Self::Additive => Self::Multiplicative,
            Self::Multiplicative => Self::Unary,
            Self::Unary => Self::Power,
            Self::Power | Self::Atom => Self::Atom,
        }
    }

    fn of(op: BinaryOp) -> Self {
        match op {
            BinaryOp::Add | BinaryOp::Sub => Self::Additive,
            BinaryOp::Mul | BinaryOp::Div => Self::Multiplicative,
            BinaryOp::Pow => Self::Power,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_expr(f, self, Precedence::Additive)
    }
}

fn write_expr(f: &mut fmt::Formatter<'_>, expr: &Expr, required: Precedence) -> fmt::Result {
    match expr {
        Expr::Parameter(index) => write!(f, "param{}", index),
        Expr::Variable(name) => f.write_str(name),
        Expr::Constant(text) => f.write_str(text),
        Expr::Call { name, args } => {
            write!(f, "{}(", name)?;
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_expr(f, arg, Precedence::Additive)?;
            }
            f.write_str(")")
        }
        Expr::Group(inner) => write_expr(f, inner, required),
        Expr::Unary { op, operand } => {
            let parens = Precedence::Unary < required;
            if parens {
                f.write_str("(")?;
            }
            f.write_str(op.symbol())?;
            write_expr(f, operand, Precedence::Unary)?;
            if parens {
                f.write_str(")")?;
            }
            Ok(())
        }
        Expr::Binary { op, left, right } => {
            let precedence = Precedence::of(*op);
            let (left_required, right_required) = if *op == BinaryOp::Pow {
                (precedence.next(), precedence)
            } else {
                (precedence, precedence.next())
            };

            let parens = precedence < required;
            if parens {
                f.write_str("(")?;
            }
            write_expr(f, left, left_required)?;
            write!(f, " {} ", op.symbol())?;
            write_expr(f, right, right_required)?;
            if parens {
                f.write_str(")")?;
            }
            Ok(())
        }
    }
}
