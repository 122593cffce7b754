//! Syntax tree for a parsed Python module
//!
//! Global invariants enforced:
//! - Traversal order is pre-order document order and is explicit
//! - Function ids are assigned once at parse time and never reused
//! - The tree is the single source of truth; serialization always renders the whole tree

use crate::language::SourceSpan;

/// Stable function identifier, the pre-order index of the function in its file
///
/// IDs survive mutation of the tree: inserting statements never renumbers functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FunctionId(pub usize);

/// Root of a parsed source file
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    /// Text the tree was parsed from; spans index into it
    pub source: String,
    /// Top-level statements
    pub body: Block,
}

/// Ordered statements sharing one indentation level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub indent: String,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Blank lines that preceded the statement in the input (at most 2)
    pub blank_lines_before: usize,
    pub kind: StatementKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementKind {
    /// Statement without a nested block, kept as verbatim source text
    Simple(String),
    Documentation(DocumentationStatement),
    Function(FunctionNode),
    Compound(CompoundNode),
}

/// A sync or async function definition, decorators included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionNode {
    pub id: FunctionId,
    pub name: String,
    pub is_async: bool,
    /// Span of the `def` statement itself, without decorators
    pub span: SourceSpan,
    /// Decorators and signature up to the colon
    pub header: String,
    pub body: Block,
}

/// Statement with one or more nested blocks (class, if/elif/else, try, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundNode {
    /// tree-sitter node kind, e.g. `class_definition`
    pub kind: String,
    pub clauses: Vec<Clause>,
    /// Text after the last block that still belongs to the statement
    pub trailer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub header: String,
    pub body: Block,
}

/// Synthetic docstring statement inserted by the patcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentationStatement {
    pub text: String,
}

impl DocumentationStatement {
    pub fn new(text: impl Into<String>) -> Self {
        DocumentationStatement { text: text.into() }
    }
}

impl Statement {
    pub fn new(kind: StatementKind) -> Self {
        Statement {
            blank_lines_before: 0,
            kind,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionNode> {
        match &self.kind {
            StatementKind::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_documentation(&self) -> Option<&DocumentationStatement> {
        match &self.kind {
            StatementKind::Documentation(doc) => Some(doc),
            _ => None,
        }
    }

    /// Blocks directly owned by this statement, in source order
    fn child_blocks(&self) -> Vec<&Block> {
        match &self.kind {
            StatementKind::Function(function) => vec![&function.body],
            StatementKind::Compound(compound) => {
                compound.clauses.iter().map(|clause| &clause.body).collect()
            }
            StatementKind::Simple(_) | StatementKind::Documentation(_) => Vec::new(),
        }
    }
}

impl FunctionNode {
    /// Number of leading documentation statements in the body
    pub fn docstring_count(&self) -> usize {
        self.body
            .statements
            .iter()
            .take_while(|stmt| stmt.as_documentation().is_some())
            .count()
    }
}

impl Block {
    pub fn new(indent: impl Into<String>) -> Self {
        Block {
            indent: indent.into(),
            statements: Vec::new(),
        }
    }

    fn function_mut(&mut self, id: FunctionId) -> Option<&mut FunctionNode> {
        for stmt in &mut self.statements {
            match &mut stmt.kind {
                StatementKind::Function(function) => {
                    if function.id == id {
                        return Some(function);
                    }
                    if let Some(found) = function.body.function_mut(id) {
                        return Some(found);
                    }
                }
                StatementKind::Compound(compound) => {
                    for clause in &mut compound.clauses {
                        if let Some(found) = clause.body.function_mut(id) {
                            return Some(found);
                        }
                    }
                }
                StatementKind::Simple(_) | StatementKind::Documentation(_) => {}
            }
        }
        None
    }
}

impl SyntaxTree {
    /// Pre-order traversal of every statement, nested ones included
    ///
    /// The traversal is lazy and can be restarted by calling `walk` again.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: self.body.statements.iter().rev().collect(),
        }
    }

    /// All function definitions in document order
    pub fn functions(&self) -> impl Iterator<Item = &FunctionNode> {
        self.walk().filter_map(Statement::as_function)
    }

    pub fn function(&self, id: FunctionId) -> Option<&FunctionNode> {
        self.functions().find(|function| function.id == id)
    }

    pub fn function_mut(&mut self, id: FunctionId) -> Option<&mut FunctionNode> {
        self.body.function_mut(id)
    }

    /// Verbatim text covered by `span`
    pub fn source_segment(&self, span: &SourceSpan) -> Option<&str> {
        self.source.get(span.start..span.end)
    }
}

/// Lazy pre-order iterator over the statements of a tree
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    stack: Vec<&'a Statement>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Statement;

    fn next(&mut self) -> Option<Self::Item> {
        let stmt = self.stack.pop()?;
        for block in stmt.child_blocks().into_iter().rev() {
            self.stack.extend(block.statements.iter().rev());
        }
        Some(stmt)
    }
}
