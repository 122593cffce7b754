//! Python language parser using tree-sitter
//!
//! The concrete syntax tree is lowered into the owned [`SyntaxTree`]: statements
//! without nested blocks keep their verbatim text, functions and compound
//! statements are split into headers and bodies so bodies can be edited.

use crate::ast::{
    Block, Clause, CompoundNode, FunctionId, FunctionNode, Statement, StatementKind, SyntaxTree,
};
use crate::language::tree_sitter_utils::{
    collect_owned_blocks, find_child_by_kind, find_first_error, find_first_of_kind,
};
use crate::language::SourceSpan;
use thiserror::Error;
use tree_sitter::{Node, Parser};

/// Indentation added for bodies written on their header's line (`def f(): pass`)
pub const INDENT_UNIT: &str = "    ";

/// Python 2 statements the grammar still accepts but Python 3 rejects
const PYTHON2_STATEMENTS: &[&str] = &["print_statement", "exec_statement"];

/// Blank lines kept between two statements
const MAX_BLANK_LINES: usize = 2;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid syntax at line {line}, column {column}")]
    Syntax { line: usize, column: usize },

    #[error("failed to load the Python grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    #[error("tree-sitter returned no tree")]
    NoTree,

    #[error("{kind} at line {line} has no {missing}")]
    Malformed {
        kind: String,
        line: usize,
        missing: &'static str,
    },
}

/// Python parser using tree-sitter
pub struct PythonParser;

impl PythonParser {
    /// Create a new Python parser
    pub fn new() -> Result<Self, ParseError> {
        // Just validate that we can create a parser
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_python::LANGUAGE.into())?;
        Ok(PythonParser)
    }

    /// Parse `source` into a syntax tree
    ///
    /// CRLF line endings are normalized to LF first; spans in the returned tree
    /// index into the normalized text stored in [`SyntaxTree::source`].
    pub fn parse(&self, source: &str) -> Result<SyntaxTree, ParseError> {
        let source = source.replace("\r\n", "\n");

        // tree-sitter parsers are stateful, so each parse gets its own
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_python::LANGUAGE.into())?;
        let tree = parser.parse(&source, None).ok_or(ParseError::NoTree)?;

        let root = tree.root_node();
        let invalid =
            find_first_error(root).or_else(|| find_first_of_kind(root, PYTHON2_STATEMENTS));
        if let Some(error) = invalid {
            let position = error.start_position();
            return Err(ParseError::Syntax {
                line: position.row + 1,
                column: position.column,
            });
        }

        let mut lowering = Lowering {
            source: &source,
            next_id: 0,
        };
        let body = lowering.lower_statements(root, String::new())?;

        Ok(SyntaxTree { source, body })
    }
}

struct Lowering<'s> {
    source: &'s str,
    next_id: usize,
}

impl<'s> Lowering<'s> {
    fn slice(&self, start: usize, end: usize) -> &'s str {
        self.source.get(start..end).unwrap_or("")
    }

    fn malformed(node: Node, missing: &'static str) -> ParseError {
        ParseError::Malformed {
            kind: node.kind().to_string(),
            line: node.start_position().row + 1,
            missing,
        }
    }

    /// Lower every named child of `container` (a module or a block)
    fn lower_statements(&mut self, container: Node, indent: String) -> Result<Block, ParseError> {
        let mut cursor = container.walk();
        let children: Vec<Node> = container.named_children(&mut cursor).collect();

        let mut statements: Vec<Statement> = Vec::with_capacity(children.len());
        let mut previous: Option<Node> = None;

        for child in children {
            if let Some(prev) = previous {
                // Trailing comment on the same line as a simple statement stays attached
                if child.kind() == "comment"
                    && prev.end_position().row == child.start_position().row
                {
                    if let Some(Statement {
                        kind: StatementKind::Simple(text),
                        ..
                    }) = statements.last_mut()
                    {
                        text.push_str(self.slice(prev.end_byte(), child.end_byte()));
                        previous = Some(child);
                        continue;
                    }
                }
            }

            let blank_lines_before = previous
                .map(|prev| self.blank_lines_between(prev.end_byte(), child.start_byte()))
                .unwrap_or(0);
            let kind = self.lower_statement(child, &indent)?;
            statements.push(Statement {
                blank_lines_before,
                kind,
            });
            previous = Some(child);
        }

        Ok(Block { indent, statements })
    }

    fn lower_block(&mut self, block: Node, parent_indent: &str) -> Result<Block, ParseError> {
        let indent = self.block_indent(block, parent_indent);
        self.lower_statements(block, indent)
    }

    /// Indentation of the first real statement, or one unit deeper than the
    /// parent when the body starts on the header line
    fn block_indent(&self, block: Node, parent_indent: &str) -> String {
        let mut cursor = block.walk();
        let first = block
            .named_children(&mut cursor)
            .find(|child| child.kind() != "comment");

        if let Some(first) = first {
            let start = first.start_byte();
            let line_start = self.source[..start].rfind('\n').map_or(0, |i| i + 1);
            let prefix = self.slice(line_start, start);
            if !prefix.is_empty() && prefix.chars().all(|c| c == ' ' || c == '\t') {
                return prefix.to_string();
            }
        }

        format!("{}{}", parent_indent, INDENT_UNIT)
    }

    fn blank_lines_between(&self, end: usize, start: usize) -> usize {
        let gap = self.slice(end, start);
        let lines: Vec<&str> = gap.split('\n').collect();
        if lines.len() < 3 {
            return 0;
        }
        lines[1..lines.len() - 1]
            .iter()
            .filter(|line| line.trim().is_empty())
            .count()
            .min(MAX_BLANK_LINES)
    }

    fn lower_statement(&mut self, node: Node, indent: &str) -> Result<StatementKind, ParseError> {
        match node.kind() {
            "function_definition" => Ok(StatementKind::Function(
                self.lower_function(node, node, indent)?,
            )),
            "decorated_definition" => match node.child_by_field_name("definition") {
                Some(def) if def.kind() == "function_definition" => Ok(StatementKind::Function(
                    self.lower_function(node, def, indent)?,
                )),
                _ => self.lower_compound(node, indent),
            },
            _ => self.lower_compound(node, indent),
        }
    }

    /// Lower a function; `outer` is the decorated definition when there is one
    fn lower_function(
        &mut self,
        outer: Node,
        def: Node,
        indent: &str,
    ) -> Result<FunctionNode, ParseError> {
        // Pre-order numbering: the parent gets its id before its nested functions
        let id = FunctionId(self.next_id);
        self.next_id += 1;

        let name_node = def
            .child_by_field_name("name")
            .ok_or_else(|| Self::malformed(def, "name"))?;
        let body_node = def
            .child_by_field_name("body")
            .ok_or_else(|| Self::malformed(def, "body"))?;

        let header = self
            .slice(outer.start_byte(), body_node.start_byte())
            .trim_end()
            .to_string();
        let body = self.lower_block(body_node, indent)?;

        Ok(FunctionNode {
            id,
            name: self.slice(name_node.start_byte(), name_node.end_byte()).to_string(),
            is_async: find_child_by_kind(def, "async").is_some(),
            span: SourceSpan::from(def),
            header,
            body,
        })
    }

    /// Split a statement into clauses at its blocks; statements without blocks
    /// stay verbatim
    fn lower_compound(&mut self, node: Node, indent: &str) -> Result<StatementKind, ParseError> {
        let mut blocks = Vec::new();
        collect_owned_blocks(node, &mut blocks);

        if blocks.is_empty() {
            let text = self.slice(node.start_byte(), node.end_byte()).trim_end();
            return Ok(StatementKind::Simple(text.to_string()));
        }

        let mut clauses = Vec::with_capacity(blocks.len());
        let mut cursor = node.start_byte();
        for block in blocks {
            let header = self.slice(cursor, block.start_byte()).trim().to_string();
            let body = self.lower_block(block, indent)?;
            clauses.push(Clause { header, body });
            cursor = block.end_byte();
        }

        let trailer = self.slice(cursor, node.end_byte()).trim();

        Ok(StatementKind::Compound(CompoundNode {
            kind: node.kind().to_string(),
            clauses,
            trailer: (!trailer.is_empty()).then(|| trailer.to_string()),
        }))
    }
}
