//! Numeric evaluation of substituted templates
//!
//! Objectives receive templates with every parameter replaced by a number.
//! [`NumericEvaluator`] parses such text against bound variables and a
//! function/constant table and reduces it to an `f64`.

use crate::objective::ObjectiveError;
use ansatz_dsl::{AnsatzError, BinaryOp, Expr, LiteralPolicy, Parser, UnaryOp, Vocabulary};
use std::collections::{BTreeMap, HashMap};
use std::f64::consts;

/// Evaluation failures
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("Parse error: {0}")]
    Parse(#[from] AnsatzError),

    #[error("Function '{name}' takes {expected} argument(s), got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid numeric literal '{0}'")]
    InvalidLiteral(String),

    #[error("Unbound parameter 'param{0}'")]
    UnboundParameter(usize),

    #[error("Unbound variable '{0}'")]
    UnboundVariable(String),

    #[error("Unknown function '{0}'")]
    UnknownFunction(String),
}

impl From<EvalError> for ObjectiveError {
    fn from(err: EvalError) -> Self {
        ObjectiveError::Failed(err.to_string())
    }
}

/// A registered function
#[derive(Clone, Copy, Debug)]
pub enum Function {
    Unary(fn(f64) -> f64),
    Binary(fn(f64, f64) -> f64),
}

impl Function {
    fn arity(self) -> usize {
        match self {
            Self::Unary(_) => 1,
            Self::Binary(_) => 2,
        }
    }
}

/// Evaluates numeric expression text
///
/// ```rust
/// use ansatz_engine::NumericEvaluator;
/// use std::collections::HashMap;
///
/// let eval = NumericEvaluator::new();
/// let bindings = HashMap::from([("x".to_string(), 2.0)]);
/// let value = eval.evaluate("3.0 * sin(pi / 2) + x ** 2.0", &bindings).unwrap();
/// assert!((value - 7.0).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct NumericEvaluator {
    functions: BTreeMap<String, Function>,
    constants: BTreeMap<String, f64>,
}

impl Default for NumericEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl NumericEvaluator {
    /// Evaluator with the default function and constant tables
    pub fn new() -> Self {
        let unary: [(&str, fn(f64) -> f64); 7] = [
            ("sin", f64::sin),
            ("cos", f64::cos),
            ("tan", f64::tan),
            ("exp", f64::exp),
            ("log", f64::ln),
            ("sqrt", f64::sqrt),
            ("abs", f64::abs),
        ];
        let binary: [(&str, fn(f64, f64) -> f64); 3] =
            [("pow", f64::powf), ("max", f64::max), ("min", f64::min)];

        let mut functions = BTreeMap::new();
        for (name, f) in unary {
            functions.insert(name.to_string(), Function::Unary(f));
        }
        for (name, f) in binary {
            functions.insert(name.to_string(), Function::Binary(f));
        }

        let constants = BTreeMap::from([("pi".to_string(), consts::PI), ("e".to_string(), consts::E)]);

        Self {
            functions,
            constants,
        }
    }

    /// Register or replace a function
    pub fn with_function(mut self, name: impl Into<String>, function: Function) -> Self {
        self.functions.insert(name.into(), function);
        self
    }

    /// Register or replace a named constant
    pub fn with_constant(mut self, name: impl Into<String>, value: f64) -> Self {
        self.constants.insert(name.into(), value);
        self
    }

    /// Parse `text` and evaluate it with `bindings` for its variables.
    /// A binding shadows a constant of the same name. Non-finite results
    /// are returned as they are.
    pub fn evaluate(&self, text: &str, bindings: &HashMap<String, f64>) -> Result<f64, EvalError> {
        let vocabulary = Vocabulary::new(bindings.keys(), self.functions.keys()).with_constants(
            self.constants.keys().filter(|k| !bindings.contains_key(*k)),
        );

        let expr = Parser::new(text, &vocabulary)?
            .with_literal_policy(LiteralPolicy::AnyNumeric)
            .parse()?;
        self.eval(&expr, bindings)
    }

    fn eval(&self, expr: &Expr, bindings: &HashMap<String, f64>) -> Result<f64, EvalError> {
        match expr {
            Expr::Parameter(index) => Err(EvalError::UnboundParameter(*index)),
            Expr::Variable(name) => bindings
                .get(name)
                .copied()
                .ok_or_else(|| EvalError::UnboundVariable(name.clone())),
            Expr::Constant(text) => match self.constants.get(text) {
                Some(&value) => Ok(value),
                None => text
                    .parse::<f64>()
                    .map_err(|_| EvalError::InvalidLiteral(text.clone())),
            },
            Expr::Call { name, args } => {
                let function = self
                    .functions
                    .get(name)
                    .copied()
                    .ok_or_else(|| EvalError::UnknownFunction(name.clone()))?;
                if args.len() != function.arity() {
                    return Err(EvalError::ArityMismatch {
                        name: name.clone(),
                        expected: function.arity(),
                        found: args.len(),
                    });
                }
                match function {
                    Function::Unary(f) => Ok(f(self.eval(&args[0], bindings)?)),
                    Function::Binary(f) => {
                        Ok(f(self.eval(&args[0], bindings)?, self.eval(&args[1], bindings)?))
                    }
                }
            }
            Expr::Binary { op, left, right } => {
                let l = self.eval(left, bindings)?;
                let r = self.eval(right, bindings)?;
                Ok(match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => l / r,
                    BinaryOp::Pow => l.powf(r),
                })
            }
            Expr::Unary { op, operand } => {
                let v = self.eval(operand, bindings)?;
                Ok(match op {
                    UnaryOp::Plus => v,
                    UnaryOp::Minus => -v,
                })
            }
            Expr::Group(inner) => self.eval(inner, bindings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ansatz_dsl::VocabularyKind;

    fn eval(text: &str, bindings: &[(&str, f64)]) -> Result<f64, EvalError> {
        let bindings = bindings
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect::<HashMap<_, _>>();
        NumericEvaluator::new().evaluate(text, &bindings)
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("1 + 2 * 3", &[]), Ok(7.0));
        assert_eq!(eval("2 ** 3 ** 2", &[]), Ok(512.0));
        assert_eq!(eval("-2 ** 2", &[]), Ok(-4.0));
        assert_eq!(eval("(-2) ** 2", &[]), Ok(4.0));
        assert_eq!(eval("8 / 4 / 2", &[]), Ok(1.0));
        assert_eq!(eval("2 ** -1", &[]), Ok(0.5));
    }

    #[test]
    fn test_substituted_template() {
        let value = eval("(x - -2.0) ** (-0.5) + 1.0", &[("x", 2.0)]).unwrap();
        assert!((value - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_functions_and_constants() {
        assert_eq!(eval("max(1, min(5, x))", &[("x", 3.0)]), Ok(3.0));
        assert!((eval("cos(pi)", &[]).unwrap() + 1.0).abs() < 1e-12);
        assert!((eval("log(e)", &[]).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(eval("pow(2, 10)", &[]), Ok(1024.0));
    }

    #[test]
    fn test_bindings_shadow_constants() {
        assert_eq!(eval("e * 2", &[("e", 5.0)]), Ok(10.0));
        assert_eq!(eval("pi + x", &[("pi", 3.0), ("x", 1.0)]), Ok(4.0));
        // Unbound constants keep their built-in value
        assert!((eval("e * x", &[("x", 1.0)]).unwrap() - consts::E).abs() < 1e-12);
    }

    #[test]
    fn test_custom_tables() {
        let eval = NumericEvaluator::new()
            .with_function("double", Function::Unary(|v| 2.0 * v))
            .with_constant("tau", consts::TAU);
        let value = eval.evaluate("double(tau)", &HashMap::new()).unwrap();
        assert!((value - 2.0 * consts::TAU).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_passes_through() {
        assert_eq!(eval("1 / 0", &[]), Ok(f64::INFINITY));
        assert!(eval("sqrt(-1)", &[]).unwrap().is_nan());
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            eval("x + y", &[("x", 1.0)]),
            Err(EvalError::Parse(AnsatzError::Vocabulary {
                kind: VocabularyKind::Variable,
                ..
            }))
        ));
        assert!(matches!(
            eval("pow(2)", &[]),
            Err(EvalError::ArityMismatch { expected: 2, found: 1, .. })
        ));
        assert_eq!(eval("param1 * 2", &[]), Err(EvalError::UnboundParameter(1)));
        assert!(matches!(eval("1 +", &[]), Err(EvalError::Parse(_))));
    }

    #[test]
    fn test_into_objective_error() {
        let err: ObjectiveError = EvalError::InvalidLiteral("1e".into()).into();
        assert_eq!(err, ObjectiveError::Failed("Invalid numeric literal '1e'".into()));
    }
}
