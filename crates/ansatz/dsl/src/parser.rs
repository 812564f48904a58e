//! Parser: recursive descent over the ansatz expression grammar
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := factor (('*' | '/') factor)*
//! factor  := ('+' | '-') factor | power
//! power   := primary ('**' factor)?
//! primary := IDENT '(' [expr (',' expr)*] ')' | IDENT | NUMBER | '(' expr ')'
//! ```
//!
//! Identifiers and literals are classified while parsing, in this order:
//! parameter (`paramN`), declared function (only when followed by `(`),
//! declared variable, whitelisted constant. Anything left over is rejected.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::errors::{AnsatzError, AnsatzResult, VocabularyKind};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::vocabulary::Vocabulary;

/// Nesting limit for parentheses, unary signs and calls
const MAX_DEPTH: usize = 256;

/// How numeric literals are classified
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LiteralPolicy {
    /// Only literals whose exact text is in the constant whitelist
    #[default]
    Whitelist,
    /// Any numeric literal (used when evaluating substituted templates)
    AnyNumeric,
}

/// Returns N for `paramN` where N is a positive integer without leading zeros
pub fn parameter_index(ident: &str) -> Option<usize> {
    let digits = ident.strip_prefix("param")?;
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    digits.parse().ok()
}

/// Parser for ansatz expressions
pub struct Parser<'v> {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    vocabulary: &'v Vocabulary,
    literals: LiteralPolicy,
}

impl<'v> Parser<'v> {
    /// Tokenize `input` and prepare to parse it against `vocabulary`
    pub fn new(input: &str, vocabulary: &'v Vocabulary) -> AnsatzResult<Self> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Self {
            tokens,
            pos: 0,
            depth: 0,
            vocabulary,
            literals: LiteralPolicy::default(),
        })
    }

    pub fn with_literal_policy(mut self, literals: LiteralPolicy) -> Self {
        self.literals = literals;
        self
    }

    /// Parse the whole input into a classified tree
    pub fn parse(mut self) -> AnsatzResult<Expr> {
        if self.check(TokenKind::Eof) {
            return Err(AnsatzError::grammar(self.peek().col, "empty expression"));
        }

        let expr = self.parse_expr()?;

        if !self.check(TokenKind::Eof) {
            let tok = self.peek();
            return Err(AnsatzError::grammar(
                tok.col,
                format!("unexpected '{}' after complete expression", tok.text),
            ));
        }
        Ok(expr)
    }

    fn parse_expr(&mut self) -> AnsatzResult<Expr> {
        self.enter()?;
        let mut left = self.parse_term()?;

        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expr::binary(op, left, right);
        }

        self.depth -= 1;
        Ok(left)
    }

    fn parse_term(&mut self) -> AnsatzResult<Expr> {
        let mut left = self.parse_factor()?;

        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_factor(&mut self) -> AnsatzResult<Expr> {
        let op = match self.peek_kind() {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Minus,
            _ => return self.parse_power(),
        };
        self.advance();

        self.enter()?;
        let operand = self.parse_factor()?;
        self.depth -= 1;
        Ok(Expr::unary(op, operand))
    }

    fn parse_power(&mut self) -> AnsatzResult<Expr> {
        let base = self.parse_primary()?;
        if self.check(TokenKind::DoubleStar) {
            self.advance();
            self.enter()?;
            let exponent = self.parse_factor()?;
            self.depth -= 1;
            return Ok(Expr::binary(BinaryOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> AnsatzResult<Expr> {
        let tok = self.peek().clone();

        match tok.kind {
            TokenKind::Identifier => {
                self.advance();
                self.classify_identifier(tok)
            }
            TokenKind::Number => {
                self.advance();
                match self.literals {
                    LiteralPolicy::AnyNumeric => Ok(Expr::Constant(tok.text)),
                    LiteralPolicy::Whitelist if self.vocabulary.is_constant(&tok.text) => {
                        Ok(Expr::Constant(tok.text))
                    }
                    LiteralPolicy::Whitelist => Err(AnsatzError::undeclared(
                        VocabularyKind::Constant,
                        tok.text,
                    )),
                }
            }
            TokenKind::OpenParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::CloseParen)?;
                Ok(Expr::group(inner))
            }
            TokenKind::Eof => Err(AnsatzError::grammar(tok.col, "unexpected end of input")),
            _ => Err(AnsatzError::grammar(
                tok.col,
                format!("unexpected '{}'", tok.text),
            )),
        }
    }

    fn classify_identifier(&mut self, tok: Token) -> AnsatzResult<Expr> {
        let called = self.check(TokenKind::OpenParen);

        if let Some(index) = parameter_index(&tok.text) {
            if called {
                return Err(AnsatzError::grammar(
                    tok.col,
                    format!("parameter '{}' cannot be called", tok.text),
                ));
            }
            return Ok(Expr::Parameter(index));
        }

        if called {
            if !self.vocabulary.is_function(&tok.text) {
                return Err(AnsatzError::undeclared(VocabularyKind::Function, tok.text));
            }
            let args = self.parse_call_args()?;
            return Ok(Expr::call(tok.text, args));
        }

        if self.vocabulary.is_variable(&tok.text) {
            Ok(Expr::Variable(tok.text))
        } else if self.vocabulary.is_constant(&tok.text) {
            Ok(Expr::Constant(tok.text))
        } else {
            Err(AnsatzError::undeclared(VocabularyKind::Variable, tok.text))
        }
    }

    fn parse_call_args(&mut self) -> AnsatzResult<Vec<Expr>> {
        self.expect(TokenKind::OpenParen)?;

        let mut args = Vec::new();
        if !self.check(TokenKind::CloseParen) {
            loop {
                args.push(self.parse_expr()?);
                if self.check(TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        self.expect(TokenKind::CloseParen)?;
        Ok(args)
    }

    // --- Helpers ---

    fn enter(&mut self) -> AnsatzResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(AnsatzError::grammar(
                self.peek().col,
                format!("expression nested deeper than {} levels", MAX_DEPTH),
            ));
        }
        Ok(())
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn expect(&mut self, kind: TokenKind) -> AnsatzResult<()> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            let tok = self.peek();
            let found = if tok.kind == TokenKind::Eof {
                "end of input".to_string()
            } else {
                format!("'{}'", tok.text)
            };
            Err(AnsatzError::grammar(
                tok.col,
                format!("expected '{}', found {}", kind, found),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        Vocabulary::new(["x", "y"], ["sin", "cos", "pow"]).with_constants(["2", "pi"])
    }

    fn parse(input: &str) -> AnsatzResult<Expr> {
        let vocab = vocab();
        Parser::new(input, &vocab)?.parse()
    }

    #[test]
    fn test_parameter_index() {
        assert_eq!(parameter_index("param1"), Some(1));
        assert_eq!(parameter_index("param42"), Some(42));
        assert_eq!(parameter_index("param0"), None);
        assert_eq!(parameter_index("param01"), None);
        assert_eq!(parameter_index("param"), None);
        assert_eq!(parameter_index("param1_"), None);
        assert_eq!(parameter_index("params1"), None);
    }

    #[test]
    fn test_precedence() {
        let expr = parse("param1 + param2 * x").unwrap();
        match expr {
            Expr::Binary {
                op: BinaryOp::Add,
                right,
                ..
            } => assert!(matches!(*right, Expr::Binary { op: BinaryOp::Mul, .. })),
            other => panic!("unexpected tree {:?}", other),
        }
    }

    #[test]
    fn test_unary_binds_looser_than_power() {
        let expr = parse("-x ** param1").unwrap();
        match expr {
            Expr::Unary {
                op: UnaryOp::Minus,
                operand,
            } => assert!(matches!(*operand, Expr::Binary { op: BinaryOp::Pow, .. })),
            other => panic!("unexpected tree {:?}", other),
        }
    }

    #[test]
    fn test_power_exponent_may_be_signed() {
        let expr = parse("x ** -param1").unwrap();
        assert!(matches!(expr, Expr::Binary { op: BinaryOp::Pow, .. }));
    }

    #[test]
    fn test_classification() {
        let expr = parse("pi * sin(param1 * x) + 2 * y").unwrap();
        let mut kinds = Vec::new();
        expr.visit(&mut |node| match node {
            Expr::Parameter(_) => kinds.push("param"),
            Expr::Variable(_) => kinds.push("var"),
            Expr::Constant(_) => kinds.push("const"),
            Expr::Call { .. } => kinds.push("call"),
            _ => {}
        });
        assert_eq!(kinds, vec!["const", "call", "param", "var", "const", "var"]);
    }

    #[test]
    fn test_two_argument_call() {
        let expr = parse("pow(param1 + x, param2)").unwrap();
        match expr {
            Expr::Call { name, args } => {
                assert_eq!(name, "pow");
                assert_eq!(args.len(), 2);
            }
            other => panic!("unexpected tree {:?}", other),
        }
    }

    #[test]
    fn test_undeclared_names() {
        assert_eq!(
            parse("param1 * z").unwrap_err(),
            AnsatzError::Vocabulary {
                kind: VocabularyKind::Variable,
                name: "z".into()
            }
        );
        assert_eq!(
            parse("tan(param1)").unwrap_err(),
            AnsatzError::Vocabulary {
                kind: VocabularyKind::Function,
                name: "tan".into()
            }
        );
        assert_eq!(
            parse("param1 * 3").unwrap_err(),
            AnsatzError::Vocabulary {
                kind: VocabularyKind::Constant,
                name: "3".into()
            }
        );
    }

    #[test]
    fn test_variable_is_not_callable() {
        let err = parse("x(param1)").unwrap_err();
        assert!(matches!(
            err,
            AnsatzError::Vocabulary {
                kind: VocabularyKind::Function,
                ..
            }
        ));
    }

    #[test]
    fn test_function_name_without_call_is_not_a_variable() {
        assert!(parse("sin + param1").is_err());
    }

    #[test]
    fn test_parameter_cannot_be_called() {
        assert!(matches!(
            parse("param1(x)").unwrap_err(),
            AnsatzError::Grammar { .. }
        ));
    }

    #[test]
    fn test_grammar_errors() {
        for input in ["", "   ", "param1 +", "(param1", "param1)", "sin(x,", "x y", "* x"] {
            assert!(
                matches!(parse(input), Err(AnsatzError::Grammar { .. })),
                "input {:?}",
                input
            );
        }
    }

    #[test]
    fn test_any_numeric_policy() {
        let vocab = Vocabulary::new(["x"], Vec::<String>::new());
        let expr = Parser::new("0.125 * x + 1e-3", &vocab)
            .unwrap()
            .with_literal_policy(LiteralPolicy::AnyNumeric)
            .parse()
            .unwrap();
        assert_eq!(expr.to_string(), "0.125 * x + 1e-3");
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}x{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert!(matches!(parse(&deep), Err(AnsatzError::Grammar { .. })));

        let shallow = format!("{}x{}", "(".repeat(10), ")".repeat(10));
        assert!(parse(&shallow).is_ok());
    }

    #[test]
    fn test_power_chain_nesting_limit() {
        let deep = vec!["param1"; MAX_DEPTH + 2].join(" ** ");
        assert!(matches!(parse(&deep), Err(AnsatzError::Grammar { .. })));

        let signed = vec!["-param1"; MAX_DEPTH + 2].join(" ** ");
        assert!(matches!(parse(&signed), Err(AnsatzError::Grammar { .. })));

        let shallow = vec!["param1"; 10].join(" ** ");
        assert!(parse(&shallow).is_ok());
    }
}
