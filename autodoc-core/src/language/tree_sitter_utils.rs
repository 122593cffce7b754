//! Small helpers over tree-sitter nodes

use tree_sitter::Node;

/// First direct child of `node` with the given kind, anonymous tokens included
pub fn find_child_by_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let result = node
        .children(&mut cursor)
        .find(|child| child.kind() == kind);
    result
}

/// First ERROR or MISSING node in pre-order, if the tree has any
pub fn find_first_error(node: Node<'_>) -> Option<Node<'_>> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(node);
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = find_first_error(child) {
            return Some(found);
        }
    }

    // has_error() was set but no descendant is flagged; report the node itself
    Some(node)
}

/// First node in pre-order whose kind is one of `kinds`
pub fn find_first_of_kind<'a>(node: Node<'a>, kinds: &[&str]) -> Option<Node<'a>> {
    if kinds.contains(&node.kind()) {
        return Some(node);
    }

    let mut cursor = node.walk();
    let children: Vec<Node<'a>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .find_map(|child| find_first_of_kind(child, kinds))
}

/// Blocks that belong directly to `node`, in source order
///
/// Descends through clause nodes (`elif_clause`, `except_clause`, the
/// `definition` of a decorated class, ...) but never into a block, so nested
/// statements are left to the block that owns them.
pub fn collect_owned_blocks<'a>(node: Node<'a>, blocks: &mut Vec<Node<'a>>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "block" {
            blocks.push(child);
        } else {
            collect_owned_blocks(child, blocks);
        }
    }
}
