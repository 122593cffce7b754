//! Source span representation

/// Region of the parsed source text covered by a node
///
/// Offsets refer to the text the tree was parsed from (after line ending
/// normalization), so `&source[span.start..span.end]` is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceSpan {
    /// Byte offset of the start of the span (inclusive)
    pub start: usize,
    /// Byte offset of the end of the span (exclusive)
    pub end: usize,
    /// Line number of the start (1-indexed)
    pub start_line: u32,
}

impl From<tree_sitter::Node<'_>> for SourceSpan {
    fn from(node: tree_sitter::Node<'_>) -> Self {
        SourceSpan {
            start: node.start_byte(),
            end: node.end_byte(),
            start_line: node.start_position().row as u32 + 1, // tree-sitter rows are 0-indexed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tree_sitter_node() {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .unwrap();
        let source = "x = 1\n\ndef f():\n    pass\n";
        let tree = parser.parse(source, None).unwrap();
        let def = tree.root_node().named_child(1).unwrap();

        let span = SourceSpan::from(def);
        assert_eq!(source[span.start..span.end].trim_end(), "def f():\n    pass");
        assert_eq!(span.start_line, 3);
    }
}
