//! Adjacency view over the calls dataset.
//!
//! Names are not resolved: two functions called `validate` in different
//! files share one node.

use std::collections::{BTreeMap, HashSet};

use crate::analysis::{CallRecord, FunctionRecord};

/// Caller name to callee names, in dataset order.
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    adjacency: BTreeMap<String, Vec<String>>,
}

impl CallGraph {
    pub fn from_calls(calls: &[CallRecord]) -> Self {
        let mut adjacency: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for call in calls {
            adjacency
                .entry(call.caller.clone())
                .or_default()
                .push(call.callee.clone());
        }
        Self { adjacency }
    }

    /// Callees of `caller`, duplicates included. Empty for unknown names.
    pub fn callees(&self, caller: &str) -> &[String] {
        self.adjacency
            .get(caller)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Names that make at least one call, sorted.
    pub fn callers(&self) -> impl Iterator<Item = &str> {
        self.adjacency.keys().map(String::as_str)
    }

    pub fn caller_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Defined functions that make no calls, in first-definition order.
    pub fn leaf_functions(&self, functions: &[FunctionRecord]) -> Vec<String> {
        let mut seen = HashSet::new();
        functions
            .iter()
            .filter(|f| !self.adjacency.contains_key(&f.name))
            .filter(|f| seen.insert(f.name.as_str()))
            .map(|f| f.name.clone())
            .collect()
    }
}
