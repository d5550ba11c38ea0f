//! @ai:module:intent Small helpers over roxmltree nodes shared by the document parsers
//! @ai:module:layer infrastructure
//! @ai:module:stateless true

use roxmltree::Node;

/// @ai:intent Child elements of parent with the given tag, in document order
/// @ai:effects pure
pub(crate) fn elements<'a, 'input: 'a>(
    parent: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    parent
        .children()
        .filter(move |n| n.is_element() && n.has_tag_name(tag))
}

/// @ai:intent Trimmed, non-empty texts of the child elements with the given tag
/// @ai:effects pure
pub(crate) fn texts(parent: Node, tag: &'static str) -> Vec<String> {
    elements(parent, tag)
        .filter_map(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
