use crate::node::{Mapping, SchemaNode};

/// Replace every array-valued `type` with an explicit `oneOf` union.
///
/// Unconditional on length: `{type: [string]}` still becomes a one-armed
/// `oneOf`. Sibling constraints stay on the parent and are not distributed
/// over the variants. Variants are appended to an existing `oneOf`.
pub fn flatten_type_arrays(node: SchemaNode) -> SchemaNode {
    match node {
        SchemaNode::Mapping(m) => SchemaNode::Mapping(flatten_mapping(m)),
        SchemaNode::Sequence(xs) => SchemaNode::Sequence(xs.into_iter().map(flatten_type_arrays).collect()),
        scalar @ SchemaNode::Scalar(_) => scalar,
    }
}

fn flatten_mapping(m: Mapping) -> Mapping {
    let mut out = Mapping::with_capacity(m.len());
    let mut variants: Option<(usize, Vec<SchemaNode>)> = None;

    for (k, v) in m {
        if k == "type" {
            if let Some(names) = type_names(&v) {
                let arms = names
                    .into_iter()
                    .map(|t| SchemaNode::Mapping(Mapping::from([("type".to_string(), SchemaNode::string(t))])))
                    .collect();
                variants = Some((out.len(), arms));
                continue;
            }
        }
        out.insert(k, flatten_type_arrays(v));
    }

    if let Some((index, arms)) = variants {
        match out.get_mut("oneOf") {
            Some(SchemaNode::Sequence(existing)) => existing.extend(arms),
            _ => {
                out.shift_insert(index, "oneOf".to_string(), SchemaNode::Sequence(arms));
            }
        }
    }
    out
}

/// `Some` only for a sequence made entirely of strings.
fn type_names(v: &SchemaNode) -> Option<Vec<String>> {
    v.as_sequence()?
        .iter()
        .map(|x| x.as_str().map(str::to_string))
        .collect()
}
