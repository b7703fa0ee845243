use indexmap::IndexSet;

use crate::node::{Mapping, SchemaNode};

/// Keys whose mapping values are keyed by user-chosen names, not keywords.
pub const NAME_KEYED: &[&str] = &["properties", "definitions", "$defs"];

/// Drop every keyword in `removal`, recursively.
///
/// Keys of the name-keyed maps in [`NAME_KEYED`] are names, so a property
/// called `id` survives; the schemas under them are still filtered.
/// Mappings emptied by filtering are kept; [`crate::prune`] removes them once
/// the whole document is assembled.
pub fn filter_keywords(node: SchemaNode, removal: &IndexSet<String>) -> SchemaNode {
    match node {
        SchemaNode::Mapping(m) => SchemaNode::Mapping(
            m.into_iter()
                .filter(|(k, _)| !removal.contains(k))
                .map(|(k, v)| {
                    let v = match v {
                        SchemaNode::Mapping(names) if is_name_keyed(&k) => {
                            SchemaNode::Mapping(filter_named(names, removal))
                        }
                        other => filter_keywords(other, removal),
                    };
                    (k, v)
                })
                .collect(),
        ),
        SchemaNode::Sequence(xs) => {
            SchemaNode::Sequence(xs.into_iter().map(|x| filter_keywords(x, removal)).collect())
        }
        scalar @ SchemaNode::Scalar(_) => scalar,
    }
}

fn filter_named(names: Mapping, removal: &IndexSet<String>) -> Mapping {
    names.into_iter().map(|(name, schema)| (name, filter_keywords(schema, removal))).collect()
}

pub fn is_name_keyed(key: &str) -> bool {
    NAME_KEYED.contains(&key)
}
