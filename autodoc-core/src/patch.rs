//! Splice generated documentation into a function body

use crate::ast::{DocumentationStatement, FunctionNode, Statement, StatementKind};

/// Prepend a docstring statement to `function`'s body
///
/// Existing statements keep their order. An existing docstring is not
/// detected, so applying twice yields two docstrings.
pub fn apply(function: &mut FunctionNode, text: impl Into<String>) {
    let mut docstring = Statement::new(StatementKind::Documentation(DocumentationStatement::new(
        text,
    )));
    if let Some(first) = function.body.statements.first_mut() {
        docstring.blank_lines_before = first.blank_lines_before;
        first.blank_lines_before = 0;
    }
    function.body.statements.insert(0, docstring);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::FunctionId;
    use crate::language::{unparse, PythonParser};

    #[test]
    fn test_apply_prepends_and_keeps_order() {
        let mut tree = PythonParser::new()
            .unwrap()
            .parse("def f(x):\n    y = x * 2\n    return y\n")
            .unwrap();
        let function = tree.function_mut(FunctionId(0)).unwrap();
        apply(function, "Double x.");

        let kinds: Vec<_> = function
            .body
            .statements
            .iter()
            .map(|stmt| stmt.kind.clone())
            .collect();
        assert_eq!(
            kinds,
            vec![
                StatementKind::Documentation(DocumentationStatement::new("Double x.")),
                StatementKind::Simple("y = x * 2".to_string()),
                StatementKind::Simple("return y".to_string()),
            ]
        );
        assert_eq!(
            unparse(&tree),
            "def f(x):\n    \"\"\"Double x.\"\"\"\n    y = x * 2\n    return y\n"
        );
    }

    #[test]
    fn test_apply_is_not_idempotent() {
        let mut tree = PythonParser::new()
            .unwrap()
            .parse("def f():\n    pass\n")
            .unwrap();
        let function = tree.function_mut(FunctionId(0)).unwrap();
        apply(function, "Do nothing.");
        apply(function, "Do nothing.");
        assert_eq!(function.docstring_count(), 2);
        assert_eq!(function.body.statements.len(), 3);
    }

    #[test]
    fn test_apply_to_nested_function_leaves_outer_alone() {
        let mut tree = PythonParser::new()
            .unwrap()
            .parse("def outer():\n    def inner():\n        return 1\n    return inner\n")
            .unwrap();
        apply(tree.function_mut(FunctionId(1)).unwrap(), "Inner.");

        assert_eq!(tree.function(FunctionId(0)).unwrap().docstring_count(), 0);
        assert_eq!(tree.function(FunctionId(1)).unwrap().docstring_count(), 1);
        assert_eq!(
            unparse(&tree),
            "def outer():\n    def inner():\n        \"\"\"Inner.\"\"\"\n        return 1\n    return inner\n"
        );
    }
}
