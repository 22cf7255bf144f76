//! Syntax queries shared by the rule and the fixers.

use visfix_syntax::{Node, Span, SyntaxTree};
use visfix_types::finding::ItemKind;

/// True when the item sits directly in a file or in an inline `mod { .. }` body.
///
/// Items nested in fn bodies, impl blocks, traits or extern blocks are not module scope.
pub(crate) fn is_module_scope(node: Node<'_>) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    match parent.kind() {
        "source_file" => true,
        "declaration_list" => parent.parent().is_some_and(|p| p.kind() == "mod_item"),
        _ => false,
    }
}

pub(crate) fn has_visibility(node: Node<'_>) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .any(|child| child.kind() == "visibility_modifier")
}

/// Span of the keyword token that introduces the item (`struct`, `fn`, ...).
pub(crate) fn keyword_span(node: Node<'_>, kind: ItemKind) -> Option<Span> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .find(|child| !child.is_named() && child.kind() == kind.keyword())
        .map(|child| Span::new(child.start_byte(), child.end_byte()))
}

pub(crate) fn item_name(tree: &SyntaxTree, node: Node<'_>) -> Option<String> {
    node.child_by_field_name("name")
        .map(|name| tree.node_text(name).to_string())
}

/// Walk up from the token at `keyword` to the item it introduces.
pub(crate) fn item_at_keyword<'t>(
    tree: &'t SyntaxTree,
    keyword: Span,
) -> Option<(Node<'t>, ItemKind)> {
    let mut node = tree.covering_node(keyword);
    while let Some(current) = node {
        if let Some(kind) = ItemKind::from_node_kind(current.kind())
            && keyword_span(current, kind) == Some(keyword)
        {
            return Some((current, kind));
        }
        node = current.parent();
    }
    None
}
