//! The ansatz type: a validated template plus its vocabulary and RNG

use crate::combiner::combine;
use crate::mutator::mutate_functions;
use crate::objective::{GuardedObjective, Objective};
use crate::search::{Problem, SearchConfig, SearchOutcome, SearchStrategy};
use crate::substitution::substitute;
use ansatz_dsl::{parse, AnsatzError, AnsatzResult, Expr, Vocabulary};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::ops::Add;
use std::sync::Arc;
use tracing::{debug, info};

/// A parametrized expression template
///
/// Immutable apart from [`Ansatz::mutate`], which rewrites function names in
/// place using the instance's own seeded RNG.
#[derive(Clone, Debug)]
pub struct Ansatz {
    expr: Expr,
    vocabulary: Vocabulary,
    param_num: usize,
    rng: StdRng,
}

impl Ansatz {
    /// Parse and validate `expression` against `vocabulary`. Without a seed
    /// the mutation RNG is seeded from entropy.
    pub fn new(expression: &str, vocabulary: Vocabulary, seed: Option<u64>) -> AnsatzResult<Self> {
        let parsed = parse(expression, &vocabulary)?;
        debug!(
            expression = %parsed.expr,
            param_num = parsed.param_num,
            "Ansatz created"
        );

        Ok(Self {
            expr: parsed.expr,
            vocabulary,
            param_num: parsed.param_num,
            rng: seeded(seed),
        })
    }

    pub fn builder(expression: impl Into<String>) -> AnsatzBuilder {
        AnsatzBuilder::new(expression)
    }

    /// Number of distinct parameters, `param1..=paramN`
    pub fn param_num(&self) -> usize {
        self.param_num
    }

    /// Canonical expression text
    pub fn to_expression(&self) -> String {
        self.expr.to_string()
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Additive merge with `other`
    ///
    /// `other`'s parameters are shifted past ours, terms without a leading
    /// `paramK *` factor get a fresh coefficient and the result is renumbered
    /// by first appearance. Vocabularies are merged and the RNG state is
    /// copied from `self`.
    pub fn combine(&self, other: &Ansatz) -> Ansatz {
        let combined = combine(&self.expr, self.param_num, &other.expr, other.param_num);
        debug!(
            left = self.param_num,
            right = other.param_num,
            insertions = combined.insertions,
            param_num = combined.param_num,
            "Ansatz combined"
        );

        Ansatz {
            expr: combined.expr,
            vocabulary: self.vocabulary.union(&other.vocabulary),
            param_num: combined.param_num,
            rng: self.rng.clone(),
        }
    }

    /// Replace every function call name with a different declared function.
    /// Returns the number of calls renamed.
    pub fn mutate(&mut self) -> usize {
        mutate_functions(&mut self.expr, self.vocabulary.functions(), &mut self.rng)
    }

    /// The template with `params[i]` substituted for `param{i+1}`
    pub fn numeric_expression(&self, params: &[f64]) -> AnsatzResult<String> {
        self.check_arity(params.len())?;
        Ok(substitute(&self.expr, params).to_string())
    }

    /// Search `param_ranges` for the parameters that optimize `objective`,
    /// using the strategy `config` selects
    pub fn apply_to<O>(
        &self,
        objective: O,
        param_ranges: &[(f64, f64)],
        config: &SearchConfig,
    ) -> AnsatzResult<SearchOutcome>
    where
        O: Objective + 'static,
    {
        let mut strategy = config.strategy();
        self.apply_with(strategy.as_mut(), Arc::new(objective), param_ranges, config)
    }

    /// Like [`Ansatz::apply_to`] with a caller-supplied strategy
    pub fn apply_with(
        &self,
        strategy: &mut dyn SearchStrategy,
        objective: Arc<dyn Objective>,
        param_ranges: &[(f64, f64)],
        config: &SearchConfig,
    ) -> AnsatzResult<SearchOutcome> {
        self.check_arity(param_ranges.len())?;
        config.validate(param_ranges)?;

        info!(
            strategy = strategy.name(),
            trials = config.trial_num,
            minimize = config.do_minimize,
            param_num = self.param_num,
            "Parameter search started"
        );

        let mut rng = seeded(config.seed);
        let mut problem = Problem::new(
            &self.expr,
            param_ranges,
            GuardedObjective::new(objective, config.timeout()),
            config.direction(),
        );
        strategy.search(&mut problem, &mut rng);
        let outcome = problem.into_outcome();

        info!(
            best_score = outcome.best_score,
            evaluations = outcome.evaluations,
            failures = outcome.failures,
            "Parameter search finished"
        );
        Ok(outcome)
    }

    fn check_arity(&self, found: usize) -> AnsatzResult<()> {
        if found != self.param_num {
            return Err(AnsatzError::Arity {
                expected: self.param_num,
                found,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Ansatz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}

impl Add<&Ansatz> for &Ansatz {
    type Output = Ansatz;

    fn add(self, rhs: &Ansatz) -> Ansatz {
        self.combine(rhs)
    }
}

impl Add for Ansatz {
    type Output = Ansatz;

    fn add(self, rhs: Ansatz) -> Ansatz {
        self.combine(&rhs)
    }
}

fn seeded(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Builder for [`Ansatz`]
#[derive(Clone, Debug, Default)]
pub struct AnsatzBuilder {
    expression: String,
    variables: Vec<String>,
    functions: Vec<String>,
    constants: Vec<String>,
    seed: Option<u64>,
}

impl AnsatzBuilder {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            ..Default::default()
        }
    }

    pub fn variables<I>(mut self, variables: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.variables = variables.into_iter().map(Into::into).collect();
        self
    }

    pub fn functions<I>(mut self, functions: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.functions = functions.into_iter().map(Into::into).collect();
        self
    }

    /// Literal tokens allowed as constants, matched by exact text
    pub fn constant_whitelist<I>(mut self, constants: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.constants = constants.into_iter().map(Into::into).collect();
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> AnsatzResult<Ansatz> {
        let vocabulary =
            Vocabulary::new(self.variables, self.functions).with_constants(self.constants);
        Ansatz::new(&self.expression, vocabulary, self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::from_fn;
    use ansatz_dsl::VocabularyKind;

    fn ansatz(expression: &str) -> Ansatz {
        Ansatz::builder(expression)
            .variables(["x", "y"])
            .functions(["sin", "cos", "exp"])
            .seed(1)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_and_accessors() {
        let a = ansatz("param2 * sin(param1 * x)");
        assert_eq!(a.param_num(), 2);
        assert_eq!(a.to_expression(), "param2 * sin(param1 * x)");
        assert_eq!(a.to_string(), a.to_expression());
        assert_eq!(a.vocabulary().functions().len(), 3);
    }

    #[test]
    fn test_construction_errors() {
        let err = Ansatz::builder("param1 * x + y")
            .variables(["x"])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            AnsatzError::Vocabulary {
                kind: VocabularyKind::Variable,
                name: "y".into()
            }
        );

        let err = Ansatz::builder("param1 * x + 1")
            .variables(["x"])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            AnsatzError::Vocabulary {
                kind: VocabularyKind::Constant,
                ..
            }
        ));

        let ok = Ansatz::builder("param1 * x + 1")
            .variables(["x"])
            .constant_whitelist(["1"])
            .build();
        assert!(ok.is_ok());
    }

    #[test]
    fn test_combine_merges_vocabularies() {
        let a = Ansatz::builder("sin(param1 * x)")
            .variables(["x"])
            .functions(["sin"])
            .build()
            .unwrap();
        let b = Ansatz::builder("cos(param1 * y)")
            .variables(["y"])
            .functions(["cos"])
            .build()
            .unwrap();

        let c = &a + &b;
        assert_eq!(
            c.to_expression(),
            "param1 * sin(param2 * x) + param3 * cos(param4 * y)"
        );
        assert_eq!(c.param_num(), 4);
        assert_eq!(c.vocabulary().variables(), ["x".to_string(), "y".to_string()]);
        assert_eq!(c.vocabulary().functions(), ["sin".to_string(), "cos".to_string()]);

        let owned = a + b;
        assert_eq!(owned.to_expression(), c.to_expression());
    }

    #[test]
    fn test_mutate_keeps_parameters() {
        let mut a = ansatz("param1 * sin(param2 * x) + cos(y)");
        let before = a.param_num();
        assert_eq!(a.mutate(), 2);
        assert_eq!(a.param_num(), before);
        assert!(!a.to_expression().contains("sin(param2"));
    }

    #[test]
    fn test_numeric_expression() {
        let a = ansatz("(x - param1) ** param2 + param3");
        assert_eq!(
            a.numeric_expression(&[-2.0, -0.5, 1.0]).unwrap(),
            "(x - -2.0) ** (-0.5) + 1.0"
        );
        assert_eq!(
            a.numeric_expression(&[1.0]),
            Err(AnsatzError::Arity {
                expected: 3,
                found: 1
            })
        );
    }

    #[test]
    fn test_apply_to_checks_ranges() {
        let a = ansatz("param1 * x");
        let config = SearchConfig::default().with_trials(1);

        let err = a
            .apply_to(from_fn(|_: &str| Ok(0.0)), &[], &config)
            .unwrap_err();
        assert_eq!(err, AnsatzError::Arity { expected: 1, found: 0 });

        let err = a
            .apply_to(from_fn(|_: &str| Ok(0.0)), &[(1.0, 0.0)], &config)
            .unwrap_err();
        assert!(matches!(err, AnsatzError::InvalidSearch(_)));
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Ansatz>();
    }
}
