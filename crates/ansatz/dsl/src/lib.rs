//! Ansatz expression grammar
//!
//! An ansatz is a parametrized expression template such as
//! `param1 * sin(param2 * x) + param3`. This crate turns expression text plus
//! a declared [`Vocabulary`] into a classified [`Expr`] tree and its
//! parameter count, and prints trees back in canonical form.
//!
//! # Grammar
//!
//! Unary `+`/`-`, binary `+ - * / **`, function application and
//! parentheses. Every identifier must be a parameter (`param1`, `param2`,
//! ...), a declared variable, a declared function (when called) or a
//! whitelisted constant; every numeric literal must be whitelisted verbatim.
//! Parameters must be numbered contiguously from 1.
//!
//! # Usage
//!
//! ```rust
//! use ansatz_dsl::{parse, Vocabulary};
//!
//! let vocab = Vocabulary::new(["x", "y"], ["sin"]);
//! let parsed = parse("(((param1 + param2))) * sin(x) - param3 / y", &vocab).unwrap();
//!
//! assert_eq!(parsed.param_num, 3);
//! assert_eq!(parsed.expr.to_string(), "(param1 + param2) * sin(x) - param3 / y");
//! ```

#![deny(unsafe_code)]

mod ast;
mod errors;
mod lexer;
mod parser;
mod printer;
mod validator;
mod vocabulary;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use errors::{AnsatzError, AnsatzResult, VocabularyKind};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{parameter_index, LiteralPolicy, Parser};
pub use validator::{count_parameters, validate_vocabulary};
pub use vocabulary::Vocabulary;

/// A validated expression and its parameter count
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedExpression {
    pub expr: Expr,
    pub param_num: usize,
}

/// Parse and validate `input` against `vocabulary`
pub fn parse(input: &str, vocabulary: &Vocabulary) -> AnsatzResult<ParsedExpression> {
    validate_vocabulary(vocabulary)?;
    let expr = Parser::new(input, vocabulary)?.parse()?;
    let param_num = count_parameters(&expr)?;
    Ok(ParsedExpression { expr, param_num })
}
