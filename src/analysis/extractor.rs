//! Turns classified nodes into function, class and call records.

use crate::error::Location;

use super::{
    AnalysisDataset, CallRecord, ClassRecord, DocumentOrder, FunctionRecord, LanguageAnalyzer,
    NodeKind, ParsedFile,
};

/// Traversal state scoped to one file.
///
/// The current-function slot holds the most recently visited function
/// definition. It is overwritten by every definition, nested or not, and is
/// never restored when a nested body ends, so calls that follow a nested
/// function are attributed to it even when they sit in the enclosing body.
#[derive(Debug, Default)]
pub struct FileContext {
    current_function: Option<String>,
}

impl FileContext {
    pub fn current_function(&self) -> Option<&str> {
        self.current_function.as_deref()
    }

    fn enter_function(&mut self, name: &str) {
        self.current_function = Some(name.to_string());
    }
}

/// Accumulates the records of a single file.
pub struct Extractor {
    file: String,
    context: FileContext,
    records: AnalysisDataset,
}

impl Extractor {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            context: FileContext::default(),
            records: AnalysisDataset::new(),
        }
    }

    pub fn context(&self) -> &FileContext {
        &self.context
    }

    /// Handle one node, in document order.
    pub fn visit(&mut self, kind: NodeKind, location: Location) {
        match kind {
            NodeKind::FunctionDef { name } => {
                self.context.enter_function(&name);
                self.records.push_function(FunctionRecord {
                    name,
                    file: self.file.clone(),
                    line: location.line,
                });
            }
            NodeKind::ClassDef { name } => {
                self.records.push_class(ClassRecord {
                    name,
                    file: self.file.clone(),
                    line: location.line,
                });
            }
            NodeKind::Call { callee } => {
                let (Some(caller), Some(name)) =
                    (self.context.current_function(), callee.identifier())
                else {
                    tracing::trace!(file = %self.file, line = location.line, callee = %callee, "call not recorded");
                    return;
                };
                self.records.push_call(CallRecord {
                    caller: caller.to_string(),
                    callee: name.to_string(),
                    file: self.file.clone(),
                });
            }
            NodeKind::Other => {}
        }
    }

    /// Finish the file and hand back its records.
    pub fn finish(self) -> AnalysisDataset {
        self.records
    }
}

/// Walk a parsed file and extract its records.
pub fn extract(analyzer: &dyn LanguageAnalyzer, parsed: &ParsedFile) -> AnalysisDataset {
    let mut extractor = Extractor::new(parsed.path.clone());
    for node in DocumentOrder::new(&parsed.tree) {
        let kind = analyzer.classify(parsed, node);
        extractor.visit(kind, Location::from_node(node));
    }
    extractor.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Callee, PythonAnalyzer};

    fn at(line: usize) -> Location {
        Location { line, column: 1 }
    }

    fn extract_python(source: &str) -> AnalysisDataset {
        let analyzer = PythonAnalyzer::new();
        let parsed = analyzer.parse("mod.py", source).unwrap();
        extract(&analyzer, &parsed)
    }

    fn call_pairs(dataset: &AnalysisDataset) -> Vec<(&str, &str)> {
        dataset
            .calls()
            .iter()
            .map(|c| (c.caller.as_str(), c.callee.as_str()))
            .collect()
    }

    #[test]
    fn test_slot_starts_empty_and_is_overwritten() {
        let mut ex = Extractor::new("a.py");
        assert_eq!(ex.context().current_function(), None);

        ex.visit(NodeKind::FunctionDef { name: "outer".into() }, at(1));
        assert_eq!(ex.context().current_function(), Some("outer"));

        ex.visit(NodeKind::ClassDef { name: "Inner".into() }, at(2));
        assert_eq!(ex.context().current_function(), Some("outer"));

        ex.visit(NodeKind::FunctionDef { name: "inner".into() }, at(3));
        assert_eq!(ex.context().current_function(), Some("inner"));
    }

    #[test]
    fn test_calls_without_slot_are_dropped() {
        let mut ex = Extractor::new("a.py");
        ex.visit(
            NodeKind::Call {
                callee: Callee::Identifier("setup".into()),
            },
            at(1),
        );
        assert!(ex.finish().calls().is_empty());
    }

    #[test]
    fn test_non_identifier_callees_are_dropped() {
        let mut ex = Extractor::new("a.py");
        ex.visit(NodeKind::FunctionDef { name: "f".into() }, at(1));
        ex.visit(
            NodeKind::Call {
                callee: Callee::Attribute("self.save".into()),
            },
            at(2),
        );
        ex.visit(
            NodeKind::Call {
                callee: Callee::Subscript("hooks[0]".into()),
            },
            at(3),
        );
        ex.visit(NodeKind::Other, at(4));
        let records = ex.finish();
        assert!(records.calls().is_empty());
        assert_eq!(records.functions().len(), 1);
    }

    #[test]
    fn test_simple_call_inside_function() {
        let records = extract_python("def foo():\n    bar()\n");

        assert_eq!(
            records.calls(),
            &[CallRecord {
                caller: "foo".to_string(),
                callee: "bar".to_string(),
                file: "mod.py".to_string(),
            }]
        );
        assert_eq!(records.functions()[0].line, 1);
    }

    #[test]
    fn test_module_level_call_before_definitions() {
        let source = r#"
setup_logging()

def main():
    run()
"#;
        let records = extract_python(source);
        assert_eq!(call_pairs(&records), vec![("main", "run")]);
    }

    #[test]
    fn test_nested_function_keeps_the_slot() {
        let source = r#"
def outer():
    def inner():
        pass
    helper()
"#;
        let records = extract_python(source);
        assert_eq!(call_pairs(&records), vec![("inner", "helper")]);
    }

    #[test]
    fn test_module_level_call_after_function_is_attributed() {
        let source = r#"
def build():
    pass

if __name__ == "__main__":
    build()
"#;
        let records = extract_python(source);
        assert_eq!(call_pairs(&records), vec![("build", "build")]);
    }

    #[test]
    fn test_methods_and_classes() {
        let source = r#"
class PurchaseInvoice(BuyingController):
    def validate(self):
        self.check_rate()
        validate_expense_account(self)

    def on_submit(self):
        make_gl_entries(self)
"#;
        let records = extract_python(source);

        let classes: Vec<_> = records.classes().iter().map(|c| (c.name.as_str(), c.line)).collect();
        assert_eq!(classes, vec![("PurchaseInvoice", 2)]);

        let functions: Vec<_> = records
            .functions()
            .iter()
            .map(|f| (f.name.as_str(), f.line))
            .collect();
        assert_eq!(functions, vec![("validate", 3), ("on_submit", 7)]);

        assert_eq!(
            call_pairs(&records),
            vec![
                ("validate", "validate_expense_account"),
                ("on_submit", "make_gl_entries")
            ]
        );
    }

    #[test]
    fn test_nested_calls_in_document_order() {
        let records = extract_python("def f():\n    outer(inner())\n");
        assert_eq!(call_pairs(&records), vec![("f", "outer"), ("f", "inner")]);
    }
}
