//! Expression AST
//!
//! A closed tree over the seven node kinds an ansatz expression can contain.
//! Every identifier and literal has already been classified by the parser,
//! so a tree never holds an unresolved name.

use std::collections::BTreeSet;

/// Binary arithmetic operators
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "**",
        }
    }

    /// `+` and `-`
    pub fn is_additive(self) -> bool {
        matches!(self, Self::Add | Self::Sub)
    }

    /// `*` and `/`
    pub fn is_multiplicative(self) -> bool {
        matches!(self, Self::Mul | Self::Div)
    }
}

/// Unary sign operators
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
        }
    }
}

/// A classified ansatz expression tree
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// `paramN`, N >= 1
    Parameter(usize),
    /// A declared variable
    Variable(String),
    /// A whitelisted literal, kept as its exact source text
    Constant(String),
    /// Application of a declared function
    Call { name: String, args: Vec<Expr> },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Parenthesized sub-expression
    Group(Box<Expr>),
}

impl Expr {
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Self::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::Call {
            name: name.into(),
            args,
        }
    }

    pub fn group(inner: Expr) -> Self {
        Self::Group(Box::new(inner))
    }

    /// Visit every node in pre-order, left to right
    pub fn visit<'a, F: FnMut(&'a Expr)>(&'a self, f: &mut F) {
        f(self);
        match self {
            Self::Call { args, .. } => {
                for arg in args {
                    arg.visit(f);
                }
            }
            Self::Binary { left, right, .. } => {
                left.visit(f);
                right.visit(f);
            }
            Self::Unary { operand, .. } | Self::Group(operand) => operand.visit(f),
            Self::Parameter(_) | Self::Variable(_) | Self::Constant(_) => {}
        }
    }

    /// Mutable pre-order visit. A node replaced by `f` is descended into
    /// after replacement.
    pub fn visit_mut<F: FnMut(&mut Expr)>(&mut self, f: &mut F) {
        f(self);
        match self {
            Self::Call { args, .. } => {
                for arg in args {
                    arg.visit_mut(f);
                }
            }
            Self::Binary { left, right, .. } => {
                left.visit_mut(f);
                right.visit_mut(f);
            }
            Self::Unary { operand, .. } | Self::Group(operand) => operand.visit_mut(f),
            Self::Parameter(_) | Self::Variable(_) | Self::Constant(_) => {}
        }
    }

    /// Parameter indices in order of appearance, duplicates included
    pub fn parameter_occurrences(&self) -> Vec<usize> {
        let mut out = Vec::new();
        self.visit(&mut |node| {
            if let Self::Parameter(index) = node {
                out.push(*index);
            }
        });
        out
    }

    /// Distinct parameter indices referenced anywhere in the tree
    pub fn parameter_set(&self) -> BTreeSet<usize> {
        self.parameter_occurrences().into_iter().collect()
    }

    /// Add `offset` to every parameter index
    pub fn shift_parameters(&mut self, offset: usize) {
        self.visit_mut(&mut |node| {
            if let Self::Parameter(index) = node {
                *index += offset;
            }
        });
    }

    /// Function names of every call, in pre-order
    pub fn function_calls(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.visit(&mut |node| {
            if let Self::Call { name, .. } = node {
                out.push(name.as_str());
            }
        });
        out
    }
}
