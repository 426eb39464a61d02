//! Node classification produced by language analyzers.

use std::fmt;

/// Shape of the expression being called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callee {
    /// A bare name, e.g. `helper()`.
    Identifier(String),
    /// Member access, e.g. `self.save()` or `frappe.db.get_value()`.
    Attribute(String),
    /// Indexing, e.g. `handlers[kind]()`.
    Subscript(String),
    /// Anything else: calls on call results, lambdas, parenthesized expressions.
    Other(String),
}

impl Callee {
    /// The called name, if the callee is a bare identifier.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Callee::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Source text of the callee expression.
    pub fn text(&self) -> &str {
        match self {
            Callee::Identifier(t) | Callee::Attribute(t) | Callee::Subscript(t) | Callee::Other(t) => t,
        }
    }
}

impl fmt::Display for Callee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}

/// Kind of a visited syntax node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A function or method definition (`def`, `async def`).
    FunctionDef { name: String },
    /// A class definition.
    ClassDef { name: String },
    /// A call expression.
    Call { callee: Callee },
    /// Every other node.
    Other,
}
