//! Declared names an ansatz expression may refer to

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The declared variables, functions and constant whitelist of an ansatz.
///
/// Variables and functions keep their declaration order (the mutator draws
/// replacements from the function list in this order). Duplicates are
/// dropped, keeping the first occurrence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    variables: Vec<String>,
    functions: Vec<String>,
    #[serde(default)]
    constants: BTreeSet<String>,
}

impl Vocabulary {
    /// Create a vocabulary with an empty constant whitelist
    pub fn new<V, F>(variables: V, functions: F) -> Self
    where
        V: IntoIterator,
        V::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Self {
            variables: dedup(variables),
            functions: dedup(functions),
            constants: BTreeSet::new(),
        }
    }

    /// Replace the constant whitelist
    pub fn with_constants<C>(mut self, constants: C) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
    {
        self.constants = constants.into_iter().map(Into::into).collect();
        self
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn functions(&self) -> &[String] {
        &self.functions
    }

    pub fn constants(&self) -> &BTreeSet<String> {
        &self.constants
    }

    pub fn is_variable(&self, name: &str) -> bool {
        self.variables.iter().any(|v| v == name)
    }

    pub fn is_function(&self, name: &str) -> bool {
        self.functions.iter().any(|f| f == name)
    }

    /// Whether the exact literal text is whitelisted
    pub fn is_constant(&self, text: &str) -> bool {
        self.constants.contains(text)
    }

    /// Ordered union: names of `self` first, then unseen names of `other`
    pub fn union(&self, other: &Vocabulary) -> Vocabulary {
        let mut merged = self.clone();
        for var in &other.variables {
            if !merged.is_variable(var) {
                merged.variables.push(var.clone());
            }
        }
        for func in &other.functions {
            if !merged.is_function(func) {
                merged.functions.push(func.clone());
            }
        }
        merged.constants.extend(other.constants.iter().cloned());
        merged
    }
}

fn dedup<I>(names: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for name in names {
        let name: String = name.into();
        if seen.insert(name.clone()) {
            out.push(name);
        }
    }
    out
}
