//! Small helpers over the tree-sitter Java syntax tree.

use tree_sitter::Node;

pub fn text<'a>(node: Node<'_>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or_default()
}

pub fn field_text(node: Node<'_>, field: &str, source: &[u8]) -> Option<String> {
    node.child_by_field_name(field)
        .map(|n| text(n, source).to_string())
        .filter(|s| !s.is_empty())
}

/// True when the declaration's `modifiers` child holds the given keyword.
pub fn has_modifier(node: Node<'_>, keyword: &str) -> bool {
    let mut cursor = node.walk();
    let modifiers = node
        .children(&mut cursor)
        .find(|child| child.kind() == "modifiers");

    match modifiers {
        Some(modifiers) => {
            let mut cursor = modifiers.walk();
            let found = modifiers
                .children(&mut cursor)
                .any(|child| child.kind() == keyword);
            found
        }
        None => false,
    }
}

/// Text of the first leaf token under `node`, in source order.
///
/// Declared types are kept as opaque display strings: `List<Foo>` yields
/// `List`, `String[]` yields `String`, `java.util.Date` yields `java`.
pub fn first_token(node: Node<'_>, source: &[u8]) -> Option<String> {
    if node.child_count() == 0 {
        let token = text(node, source).trim();
        return (!token.is_empty()).then(|| token.to_string());
    }

    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(|child| first_token(child, source))
}

/// The first identifier chain under `node`, joined with `.`.
///
/// `com.acme.Base` stays qualified while type arguments are dropped, so
/// `Base<T>` yields `Base`.
pub fn qualified_name(node: Node<'_>, source: &[u8]) -> Option<String> {
    match node.kind() {
        "type_identifier" | "identifier" => Some(text(node, source).to_string()),
        "scoped_type_identifier" | "scoped_identifier" => {
            let mut cursor = node.walk();
            let parts: Vec<String> = node
                .named_children(&mut cursor)
                .filter(|child| is_name_segment(child.kind()))
                .filter_map(|child| qualified_name(child, source))
                .collect();
            (!parts.is_empty()).then(|| parts.join("."))
        }
        "generic_type" => {
            let mut cursor = node.walk();
            let base = node
                .named_children(&mut cursor)
                .find(|child| is_name_segment(child.kind()));
            base.and_then(|child| qualified_name(child, source))
        }
        _ => {
            let mut cursor = node.walk();
            let children: Vec<_> = node.named_children(&mut cursor).collect();
            children
                .into_iter()
                .find_map(|child| qualified_name(child, source))
        }
    }
}

fn is_name_segment(kind: &str) -> bool {
    matches!(
        kind,
        "type_identifier" | "identifier" | "scoped_type_identifier" | "scoped_identifier"
    )
}

/// First `ERROR` or missing node, used to report why a file was rejected.
pub fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}
