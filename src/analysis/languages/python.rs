//! Python language analyzer using tree-sitter.

use tree_sitter::{Language, LanguageError, Node, Parser};

use crate::analysis::{Callee, DocumentOrder, LanguageAnalyzer, NodeKind, ParsedFile};
use crate::error::{Location, ParseError};

pub struct PythonAnalyzer {
    language: Language,
}

impl PythonAnalyzer {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
        }
    }

    fn create_parser(&self) -> Result<Parser, LanguageError> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    fn definition_name(parsed: &ParsedFile, node: Node) -> Option<String> {
        node.child_by_field_name("name")
            .map(|n| parsed.node_text(n).to_string())
            .filter(|name| !name.is_empty())
    }

    fn callee(parsed: &ParsedFile, call: Node) -> Callee {
        let Some(function) = call.child_by_field_name("function") else {
            return Callee::Other(String::new());
        };
        let text = parsed.node_text(function).to_string();
        match function.kind() {
            "identifier" => Callee::Identifier(text),
            "attribute" => Callee::Attribute(text),
            "subscript" => Callee::Subscript(text),
            _ => Callee::Other(text),
        }
    }
}

impl Default for PythonAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// First ERROR or MISSING node in document order.
fn first_error(root: Node) -> Node {
    DocumentOrder::from_node(root)
        .with_anonymous()
        .find(|n| n.is_error() || n.is_missing())
        .unwrap_or(root)
}

/// First construct the grammar accepts but the Python 3 parser rejects.
///
/// tree-sitter-python recovers an empty `block` for a `def` or `class`
/// whose body is not indented, and still parses Python 2 `print`/`exec`
/// statements.
fn first_rejected(root: Node) -> Option<(Node, &'static str)> {
    DocumentOrder::from_node(root).find_map(|n| match n.kind() {
        "block" if n.named_child_count() == 0 => Some((n, "expected an indented block")),
        "print_statement" => Some((n, "missing parentheses in call to 'print'")),
        "exec_statement" => Some((n, "missing parentheses in call to 'exec'")),
        _ => None,
    })
}

impl LanguageAnalyzer for PythonAnalyzer {
    fn language_id(&self) -> &'static str {
        "python"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn parse(&self, path: &str, source: &str) -> Result<ParsedFile, ParseError> {
        let fail = |location: Location, message: String| ParseError {
            file: path.to_string(),
            location,
            message,
        };

        let mut parser = self
            .create_parser()
            .map_err(|e| fail(Location::default(), e.to_string()))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| fail(Location::default(), "parser returned no tree".to_string()))?;

        let root = tree.root_node();
        if root.has_error() {
            let node = first_error(root);
            let message = if node.is_missing() {
                format!("missing `{}`", node.kind())
            } else {
                "invalid syntax".to_string()
            };
            return Err(fail(Location::from_node(node), message));
        }
        if let Some((node, message)) = first_rejected(root) {
            return Err(fail(Location::from_node(node), message.to_string()));
        }

        Ok(ParsedFile {
            tree,
            source: source.to_string(),
            path: path.to_string(),
        })
    }

    fn classify(&self, parsed: &ParsedFile, node: Node) -> NodeKind {
        match node.kind() {
            "function_definition" => match Self::definition_name(parsed, node) {
                Some(name) => NodeKind::FunctionDef { name },
                None => NodeKind::Other,
            },
            "class_definition" => match Self::definition_name(parsed, node) {
                Some(name) => NodeKind::ClassDef { name },
                None => NodeKind::Other,
            },
            "call" => NodeKind::Call {
                callee: Self::callee(parsed, node),
            },
            _ => NodeKind::Other,
        }
    }
}
