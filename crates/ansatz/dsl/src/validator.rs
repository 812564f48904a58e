//! Validator: checks that run before and after parsing
//!
//! Declarations are checked before parsing so that a malformed vocabulary is
//! reported as such rather than as a confusing classification failure.
//! Parameter numbering is checked on the finished tree.

use crate::ast::Expr;
use crate::errors::{AnsatzError, AnsatzResult};
use crate::parser::parameter_index;
use crate::vocabulary::Vocabulary;

/// Validate declared names
pub fn validate_vocabulary(vocabulary: &Vocabulary) -> AnsatzResult<()> {
    for name in vocabulary.variables() {
        validate_declared_name("variable", name)?;
    }
    for name in vocabulary.functions() {
        validate_declared_name("function", name)?;
    }
    if vocabulary.constants().iter().any(|c| c.trim().is_empty()) {
        return Err(AnsatzError::InvalidDeclaration(
            "constant whitelist contains an empty entry".into(),
        ));
    }
    Ok(())
}

fn validate_declared_name(kind: &str, name: &str) -> AnsatzResult<()> {
    let mut chars = name.chars();
    let is_identifier = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !is_identifier {
        return Err(AnsatzError::InvalidDeclaration(format!(
            "{} name '{}' is not an identifier",
            kind, name
        )));
    }
    if parameter_index(name).is_some() {
        return Err(AnsatzError::InvalidDeclaration(format!(
            "{} name '{}' collides with parameter naming",
            kind, name
        )));
    }
    Ok(())
}

/// Check that the referenced parameter indices are exactly `{1..N}` and
/// return N (0 when no parameter is referenced)
pub fn count_parameters(expr: &Expr) -> AnsatzResult<usize> {
    let indices = expr.parameter_set();
    let Some(&max) = indices.iter().next_back() else {
        return Ok(0);
    };

    if indices.len() != max {
        let missing: Vec<String> = (1..=max)
            .filter(|i| !indices.contains(i))
            .map(|i| format!("param{}", i))
            .collect();
        return Err(AnsatzError::ParameterNumbering(format!(
            "parameters must be numbered contiguously from param1 up to param{}; missing {} in '{}'",
            max,
            missing.join(", "),
            expr
        )));
    }
    Ok(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOp;

    fn sum(indices: &[usize]) -> Expr {
        let mut iter = indices.iter().map(|&i| Expr::Parameter(i));
        let first = iter.next().unwrap();
        iter.fold(first, |acc, p| Expr::binary(BinaryOp::Add, acc, p))
    }

    #[test]
    fn test_contiguous_parameters() {
        assert_eq!(count_parameters(&sum(&[1, 2, 3])).unwrap(), 3);
        assert_eq!(count_parameters(&sum(&[3, 1, 2, 1])).unwrap(), 3);
    }

    #[test]
    fn test_no_parameters() {
        assert_eq!(count_parameters(&Expr::Variable("x".into())).unwrap(), 0);
    }

    #[test]
    fn test_gap_is_rejected() {
        let err = count_parameters(&sum(&[1, 3])).unwrap_err();
        match err {
            AnsatzError::ParameterNumbering(message) => {
                assert!(message.contains("missing param2"), "{}", message);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_not_starting_at_one_is_rejected() {
        assert!(count_parameters(&sum(&[2, 3, 4])).is_err());
    }

    #[test]
    fn test_vocabulary_names() {
        assert!(validate_vocabulary(&Vocabulary::new(["x", "long_name"], ["sin"])).is_ok());
        assert!(validate_vocabulary(&Vocabulary::new(["x y"], Vec::<String>::new())).is_err());
        assert!(validate_vocabulary(&Vocabulary::new(["1x"], Vec::<String>::new())).is_err());
        assert!(validate_vocabulary(&Vocabulary::new(Vec::<String>::new(), ["np.sin"])).is_err());
        assert!(validate_vocabulary(&Vocabulary::new(["param2"], Vec::<String>::new())).is_err());
        // not a parameter name, so it may be declared
        assert!(validate_vocabulary(&Vocabulary::new(["param0"], Vec::<String>::new())).is_ok());
    }

    #[test]
    fn test_empty_constant_rejected() {
        let vocab = Vocabulary::new(["x"], Vec::<String>::new()).with_constants([""]);
        assert!(matches!(
            validate_vocabulary(&vocab),
            Err(AnsatzError::InvalidDeclaration(_))
        ));
    }
}
