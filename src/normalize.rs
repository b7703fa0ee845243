//! Schema normalization engine.
//!
//! Rewrites a [`DefinitionTable`] into OpenAPI 3.0 component schemas. Per root
//! definition the passes run in this order:
//!
//! 1. keyword filter ([`filter`])
//! 2. nullable-wrapper fold, wrapper roots only ([`nullable`])
//! 3. type-array flattening ([`flatten`])
//! 4. reference rewrite / expansion ([`refs`]), once every root is prepared
//!
//! This is not the filter → flatten → fold order: the fold runs before
//! flattening, because flattening first would turn a `Maybe<T>` declared as
//! `type: [T, null]` into a `oneOf` and the `type`-sequence fold could never
//! apply.
//!
//! Every pass takes its input by value and returns a new tree; expansion clones
//! the target body so an inlined definition never aliases its source.
pub mod filter;
pub mod flatten;
pub mod nullable;
pub mod refs;

use indexmap::IndexSet;

use crate::config::Config;
use crate::definitions::DefinitionTable;
use crate::node::{Mapping, SchemaNode};

pub use filter::filter_keywords;
pub use flatten::flatten_type_arrays;
pub use nullable::fold_nullable;
pub use refs::{ExpansionMap, ExpansionStack, RefRewriter};

/// Output of one engine run: named component schemas in table order.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub schemas: Mapping,
    /// Expandable definitions dropped after inlining.
    pub dropped: Vec<String>,
    /// Expandable definitions kept because a cycle fell back to a reference.
    pub cycle_fallbacks: Vec<String>,
}

pub struct Normalizer<'a> {
    config: &'a Config,
    removal: IndexSet<String>,
}

impl<'a> Normalizer<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config, removal: config.removal_set() }
    }

    /// Filter, fold and flatten a single root definition.
    pub fn prepare(&self, name: &str, node: SchemaNode) -> SchemaNode {
        let node = filter_keywords(node, &self.removal);
        let node = if self.config.is_wrapper(name) { fold_nullable(node) } else { node };
        flatten_type_arrays(node)
    }

    pub fn run(&self, table: DefinitionTable) -> Normalized {
        let prepared: Vec<(String, SchemaNode)> = table
            .into_iter()
            .map(|(name, node)| {
                let node = self.prepare(&name, node);
                (name, node)
            })
            .collect();

        let mut expansions = ExpansionMap::default();
        for (name, node) in &prepared {
            if self.config.is_expandable(name) {
                expansions.insert(name, node.clone());
            }
        }
        if !expansions.is_empty() {
            tracing::debug!(count = expansions.len(), "expandable definitions");
        }

        let mut rewriter = RefRewriter::new(&self.removal, &expansions);
        let mut rewritten = Vec::with_capacity(prepared.len());
        for (name, node) in prepared {
            let expandable = self.config.is_expandable(&name);
            let mut stack = ExpansionStack::default();
            if expandable {
                // Rewritten as if mid-expansion so a kept cyclic body points
                // at itself rather than containing one copy of itself.
                stack.push(&name);
            }
            let node = rewriter.rewrite(node, &mut stack);
            rewritten.push((name, expandable, node));
        }
        let fallbacks = rewriter.into_cycle_fallbacks();

        let mut out = Normalized::default();
        for (name, expandable, node) in rewritten {
            if expandable && !fallbacks.contains(&name) {
                out.dropped.push(name);
                continue;
            }
            if expandable {
                out.cycle_fallbacks.push(name.clone());
            }
            out.schemas.insert(name, node);
        }
        out
    }
}

/// Convenience: run the engine once over `table`.
pub fn normalize_definitions(table: DefinitionTable, config: &Config) -> Normalized {
    Normalizer::new(config).run(table)
}
