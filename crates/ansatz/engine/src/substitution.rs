//! Parameter substitution: template tree to numeric instance

use ansatz_dsl::{Expr, UnaryOp};

/// Literal for `value` in shortest round-trip form. Negative values become
/// a unary minus over the magnitude so the printer can parenthesize them.
pub fn numeric_literal(value: f64) -> Expr {
    let text = format!("{:?}", value.abs());
    if value.is_sign_negative() {
        Expr::unary(UnaryOp::Minus, Expr::Constant(text))
    } else {
        Expr::Constant(text)
    }
}

/// Replace every `paramN` with `params[N - 1]`. Indices beyond `params`
/// are left in place.
pub fn substitute(template: &Expr, params: &[f64]) -> Expr {
    let mut expr = template.clone();
    expr.visit_mut(&mut |node| {
        if let Expr::Parameter(index) = node {
            if let Some(&value) = index.checked_sub(1).and_then(|i| params.get(i)) {
                *node = numeric_literal(value);
            }
        }
    });
    expr
}
