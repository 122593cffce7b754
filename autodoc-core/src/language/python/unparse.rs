//! Render a syntax tree back to Python source
//!
//! The output is canonical rather than byte-identical: simple statements keep
//! their original text, bodies written on the header line move to their own
//! lines, runs of blank lines are capped, and the file ends with a newline.

use crate::ast::{Block, Statement, StatementKind, SyntaxTree};

/// Serialize the whole tree
pub fn unparse(tree: &SyntaxTree) -> String {
    let mut out = String::with_capacity(tree.source.len() + 256);
    write_block(&tree.body, &mut out, true);
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn write_block(block: &Block, out: &mut String, at_file_start: bool) {
    for (index, stmt) in block.statements.iter().enumerate() {
        if index > 0 || !at_file_start {
            out.push('\n');
        }
        if index > 0 {
            for _ in 0..stmt.blank_lines_before {
                out.push('\n');
            }
        }
        out.push_str(&block.indent);
        write_statement(stmt, &block.indent, out);
    }
}

fn write_statement(stmt: &Statement, indent: &str, out: &mut String) {
    match &stmt.kind {
        StatementKind::Simple(text) => out.push_str(text),
        StatementKind::Documentation(doc) => out.push_str(&render_docstring(&doc.text)),
        StatementKind::Function(function) => {
            out.push_str(&function.header);
            write_block(&function.body, out, false);
        }
        StatementKind::Compound(compound) => {
            for (index, clause) in compound.clauses.iter().enumerate() {
                // elif/else/except/finally line up with the statement itself
                if index > 0 {
                    out.push('\n');
                    out.push_str(indent);
                }
                out.push_str(&clause.header);
                write_block(&clause.body, out, false);
            }
            if let Some(trailer) = &compound.trailer {
                out.push('\n');
                out.push_str(indent);
                out.push_str(trailer);
            }
        }
    }
}

/// Render `text` as a triple-quoted string literal
///
/// Backslashes are escaped, as is any quote that would otherwise close the
/// literal early (a third consecutive quote, or a quote at the very end).
pub fn render_docstring(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    out.push_str("\"\"\"");

    let mut chars = text.chars().peekable();
    let mut quote_run = 0;
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push_str("\\\\");
                quote_run = 0;
            }
            '"' if quote_run == 2 || chars.peek().is_none() => {
                out.push_str("\\\"");
                quote_run = 0;
            }
            '"' => {
                out.push('"');
                quote_run += 1;
            }
            _ => {
                out.push(c);
                quote_run = 0;
            }
        }
    }

    out.push_str("\"\"\"");
    out
}
