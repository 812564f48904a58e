//! Lexer: tokenizes ansatz expression text
//!
//! Produces the token stream the parser consumes: identifiers, numeric
//! literals, the arithmetic operators `+ - * ** /`, parentheses and commas.
//! Anything else (floor division, `@`, `$`, qualified names) is rejected here.

use crate::errors::{AnsatzError, AnsatzResult};

/// A token produced by the lexer
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The raw source text of the token
    pub text: String,
    /// Column number (1-based)
    pub col: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, col: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            col,
        }
    }
}

/// Token types
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Number,

    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,

    OpenParen,
    CloseParen,
    Comma,

    // End of input
    Eof,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identifier => write!(f, "identifier"),
            Self::Number => write!(f, "number"),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Star => write!(f, "*"),
            Self::DoubleStar => write!(f, "**"),
            Self::Slash => write!(f, "/"),
            Self::OpenParen => write!(f, "("),
            Self::CloseParen => write!(f, ")"),
            Self::Comma => write!(f, ","),
            Self::Eof => write!(f, "end of input"),
        }
    }
}

/// Lexer for ansatz expressions
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
}

impl Lexer {
    /// Create a new lexer from input text
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> AnsatzResult<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();

            if self.pos >= self.input.len() {
                tokens.push(Token::new(TokenKind::Eof, "", self.col()));
                break;
            }

            let token = self.next_token()?;
            tokens.push(token);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> AnsatzResult<Token> {
        let ch = self.input[self.pos];
        let col = self.col();

        let single = |lexer: &mut Self, kind: TokenKind| -> AnsatzResult<Token> {
            lexer.advance();
            Ok(Token::new(kind, ch.to_string(), col))
        };

        match ch {
            '+' => single(self, TokenKind::Plus),
            '-' => single(self, TokenKind::Minus),
            '(' => single(self, TokenKind::OpenParen),
            ')' => single(self, TokenKind::CloseParen),
            ',' => single(self, TokenKind::Comma),
            '*' if self.peek_at(1) == Some('*') => {
                self.advance();
                self.advance();
                Ok(Token::new(TokenKind::DoubleStar, "**", col))
            }
            '*' => single(self, TokenKind::Star),
            '/' if self.peek_at(1) == Some('/') => Err(AnsatzError::grammar(
                col,
                "floor division '//' is not supported",
            )),
            '/' => single(self, TokenKind::Slash),
            c if c.is_ascii_digit() => self.read_number(),
            '.' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => self.read_number(),
            c if c.is_ascii_alphabetic() || c == '_' => Ok(self.read_identifier()),
            _ => Err(AnsatzError::grammar(
                col,
                format!("unexpected character '{}'", ch),
            )),
        }
    }

    /// Reads `digits[.digits][e[+-]digits]`, also `.5` and `1.`
    fn read_number(&mut self) -> AnsatzResult<Token> {
        let col = self.col();
        let start = self.pos;

        self.eat_digits();
        if self.peek_at(0) == Some('.') {
            self.advance();
            self.eat_digits();
        }

        if matches!(self.peek_at(0), Some('e' | 'E')) {
            let sign = usize::from(matches!(self.peek_at(1), Some('+' | '-')));
            if self.peek_at(1 + sign).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..=sign {
                    self.advance();
                }
                self.eat_digits();
            }
        }

        if let Some(c) = self.peek_at(0) {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                return Err(AnsatzError::grammar(
                    self.col(),
                    format!("invalid numeric literal near '{}'", c),
                ));
            }
        }

        let text: String = self.input[start..self.pos].iter().collect();
        Ok(Token::new(TokenKind::Number, text, col))
    }

    fn read_identifier(&mut self) -> Token {
        let col = self.col();
        let start = self.pos;

        while self
            .peek_at(0)
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }

        let text: String = self.input[start..self.pos].iter().collect();
        Token::new(TokenKind::Identifier, text, col)
    }

    fn eat_digits(&mut self) {
        while self.peek_at(0).is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_at(0).is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn advance(&mut self) {
        if self.pos < self.input.len() {
            self.pos += 1;
        }
    }

    fn col(&self) -> usize {
        self.pos + 1
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }
}
