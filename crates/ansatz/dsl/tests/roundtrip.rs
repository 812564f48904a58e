//! Property tests: canonical printing and parameter counting

use ansatz_dsl::{parse, AnsatzError, BinaryOp, Expr, UnaryOp, Vocabulary};
use proptest::prelude::*;

fn vocab() -> Vocabulary {
    Vocabulary::new(["x", "y"], ["sin", "pow"]).with_constants(["2"])
}

fn leaf() -> impl Strategy<Value = Expr> {
    prop_oneof![
        (1usize..=4).prop_map(Expr::Parameter),
        prop::sample::select(vec!["x", "y"]).prop_map(|v| Expr::Variable(v.to_string())),
        Just(Expr::Constant("2".to_string())),
    ]
}

fn binary_op() -> impl Strategy<Value = BinaryOp> {
    prop_oneof![
        Just(BinaryOp::Add),
        Just(BinaryOp::Sub),
        Just(BinaryOp::Mul),
        Just(BinaryOp::Div),
        Just(BinaryOp::Pow),
    ]
}

fn unary_op() -> impl Strategy<Value = UnaryOp> {
    prop_oneof![Just(UnaryOp::Plus), Just(UnaryOp::Minus)]
}

fn expr_tree() -> impl Strategy<Value = Expr> {
    leaf().prop_recursive(5, 48, 3, |inner| {
        prop_oneof![
            (binary_op(), inner.clone(), inner.clone())
                .prop_map(|(op, l, r)| Expr::binary(op, l, r)),
            (unary_op(), inner.clone()).prop_map(|(op, e)| Expr::unary(op, e)),
            (
                prop::sample::select(vec!["sin", "pow"]),
                prop::collection::vec(inner.clone(), 1..3)
            )
                .prop_map(|(name, args)| Expr::call(name, args)),
            inner.prop_map(Expr::group),
        ]
    })
}

proptest! {
    #[test]
    fn property_canonical_text_is_a_fixed_point(tree in expr_tree()) {
        let text = tree.to_string();
        let indices = tree.parameter_set();
        let contiguous = indices.iter().copied().eq(1..=indices.len());

        match parse(&text, &vocab()) {
            Ok(parsed) => {
                prop_assert!(contiguous);
                prop_assert_eq!(parsed.expr.to_string(), text.clone());
                prop_assert_eq!(parsed.param_num, indices.len());

                let again = parse(&parsed.expr.to_string(), &vocab()).unwrap();
                prop_assert_eq!(again.param_num, parsed.param_num);
            }
            Err(AnsatzError::ParameterNumbering(_)) => prop_assert!(!contiguous),
            Err(other) => prop_assert!(false, "'{}' failed to reparse: {}", text, other),
        }
    }

    #[test]
    fn property_param_num_is_max_index(n in 1usize..12, repeats in 1usize..3) {
        let terms: Vec<String> = (0..repeats)
            .flat_map(|_| (1..=n).rev().map(|i| format!("param{} * x", i)))
            .collect();
        let parsed = parse(&terms.join(" + "), &vocab()).unwrap();
        prop_assert_eq!(parsed.param_num, n);
    }
}
