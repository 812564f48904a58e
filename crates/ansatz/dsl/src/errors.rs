//! Ansatz error types

use std::fmt;

/// Which declared vocabulary a rejected name was checked against
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VocabularyKind {
    Variable,
    Function,
    Constant,
}

impl fmt::Display for VocabularyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable => write!(f, "variable"),
            Self::Function => write!(f, "function"),
            Self::Constant => write!(f, "constant"),
        }
    }
}

/// Errors raised while building an ansatz or preparing a parameter search.
///
/// All of these are fatal: they surface at construction time or at the
/// start of a search, before any objective is called.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum AnsatzError {
    #[error("Grammar error at column {col}: {message}")]
    Grammar { col: usize, message: String },

    #[error("Parameter numbering error: {0}")]
    ParameterNumbering(String),

    #[error("Undeclared {kind} '{name}'")]
    Vocabulary { kind: VocabularyKind, name: String },

    #[error("Invalid declaration: {0}")]
    InvalidDeclaration(String),

    #[error("Expected {expected} parameter ranges, found {found}")]
    Arity { expected: usize, found: usize },

    #[error("Invalid search configuration: {0}")]
    InvalidSearch(String),
}

impl AnsatzError {
    pub(crate) fn grammar(col: usize, message: impl Into<String>) -> Self {
        Self::Grammar {
            col,
            message: message.into(),
        }
    }

    pub(crate) fn undeclared(kind: VocabularyKind, name: impl Into<String>) -> Self {
        Self::Vocabulary {
            kind,
            name: name.into(),
        }
    }
}

/// Result type alias for ansatz operations
pub type AnsatzResult<T> = Result<T, AnsatzError>;
