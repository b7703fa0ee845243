use crate::node::{Mapping, SchemaNode};

/// Fold a `T | null` wrapper definition into `T` plus `nullable: true`.
///
/// Only the root node is inspected. A `type` sequence takes precedence over
/// `anyOf`: when `type` is a sequence, `anyOf` is not looked at even if the
/// `type` sequence carries no `null`.
pub fn fold_nullable(node: SchemaNode) -> SchemaNode {
    match node {
        SchemaNode::Mapping(mut m) => {
            if matches!(m.get("type"), Some(SchemaNode::Sequence(_))) {
                fold_type_union(&mut m);
            } else if matches!(m.get("anyOf"), Some(SchemaNode::Sequence(_))) {
                fold_any_of(&mut m);
            }
            SchemaNode::Mapping(m)
        }
        other => other,
    }
}

fn fold_type_union(m: &mut Mapping) {
    let Some(SchemaNode::Sequence(types)) = m.get_mut("type") else { return };
    let Some(index) = types.iter().position(|t| t.as_str() == Some("null")) else { return };
    types.remove(index);
    if types.len() == 1 {
        let only = types.remove(0);
        m.insert("type".to_string(), only);
    }
    m.insert("nullable".to_string(), SchemaNode::bool(true));
}

fn fold_any_of(m: &mut Mapping) {
    let Some(SchemaNode::Sequence(arms)) = m.get_mut("anyOf") else { return };
    let Some(index) = arms.iter().position(is_null_literal) else { return };
    arms.remove(index);
    let collapse = arms.len() == 1 && matches!(arms[0], SchemaNode::Mapping(_));
    m.insert("nullable".to_string(), SchemaNode::bool(true));

    if collapse {
        if let Some(SchemaNode::Sequence(mut arms)) = m.shift_remove("anyOf") {
            if let SchemaNode::Mapping(only) = arms.remove(0) {
                m.extend(only);
            }
        }
    }
}

/// Exactly `{type: 'null'}`.
fn is_null_literal(node: &SchemaNode) -> bool {
    node.as_mapping()
        .is_some_and(|m| m.len() == 1 && m.get("type").and_then(SchemaNode::as_str) == Some("null"))
}
