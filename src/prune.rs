use crate::node::SchemaNode;

/// Remove empty mappings, empty sequences and nulls, bottom-up.
///
/// Containers emptied by pruning their children go too. `None` means the
/// whole node pruned away.
pub fn prune(node: SchemaNode) -> Option<SchemaNode> {
    match node {
        SchemaNode::Mapping(m) => {
            let out: crate::node::Mapping = m
                .into_iter()
                .filter_map(|(k, v)| prune(v).map(|v| (k, v)))
                .collect();
            (!out.is_empty()).then_some(SchemaNode::Mapping(out))
        }
        SchemaNode::Sequence(xs) => {
            let out: Vec<SchemaNode> = xs.into_iter().filter_map(prune).collect();
            (!out.is_empty()).then_some(SchemaNode::Sequence(out))
        }
        scalar if scalar.is_null() => None,
        scalar @ SchemaNode::Scalar(_) => Some(scalar),
    }
}

/// Prune a whole document; an empty result is an empty mapping.
pub fn prune_document(document: SchemaNode) -> SchemaNode {
    prune(document).unwrap_or_else(SchemaNode::empty_mapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn pruned(v: Value) -> Option<Value> {
        prune(SchemaNode::from(v)).map(Value::from)
    }

    #[test]
    fn drops_empty_values_and_nulls() {
        assert_eq!(pruned(json!({"a": {}, "b": [], "c": null, "d": 1})), Some(json!({"d": 1})));
    }

    #[test]
    fn containers_emptied_by_pruning_are_dropped() {
        assert_eq!(
            pruned(json!({"x": {"y": {"z": []}}, "keep": {"k": false}})),
            Some(json!({"keep": {"k": false}}))
        );
    }

    #[test]
    fn sequence_elements_are_filtered() {
        assert_eq!(
            pruned(json!({"enum": ["a", null, "b"], "allOf": [{}, {"type": "string"}, {"p": null}]})),
            Some(json!({"enum": ["a", "b"], "allOf": [{"type": "string"}]}))
        );
    }

    #[test]
    fn falsy_scalars_survive() {
        let v = json!({"zero": 0, "no": false, "empty": ""});
        assert_eq!(pruned(v.clone()), Some(v));
    }

    #[test]
    fn fully_empty_document() {
        assert_eq!(pruned(json!({"components": {"schemas": {}}})), None);
        assert_eq!(Value::from(prune_document(SchemaNode::from(json!({"a": null})))), json!({}));
    }

    #[test]
    fn pruning_twice_changes_nothing() {
        let once = pruned(json!({"a": [{"b": {}}, 1], "c": {"d": [null]}})).unwrap();
        assert_eq!(pruned(once.clone()), Some(once));
    }
}
