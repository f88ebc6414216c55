//! Keyed data joins: which nodes enter, update or exit between two scenes.

use std::collections::HashSet;

use crate::scene::Node;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinPlan {
    /// Indices into the next nodes that have no bound counterpart.
    pub enter: Vec<usize>,
    /// Indices into the next nodes whose key is already bound.
    pub update: Vec<usize>,
    /// Bound keys absent from the next nodes.
    pub exit: Vec<String>,
}

impl JoinPlan {
    pub fn is_noop(&self) -> bool {
        self.enter.is_empty() && self.exit.is_empty()
    }
}

fn node_key(node: &Node, index: usize) -> String {
    node.key.clone().unwrap_or_else(|| format!("#{index}"))
}

/// Duplicate keys in `next` after the first occurrence are ignored.
pub fn plan(previous: &[String], next: &[Node]) -> JoinPlan {
    let bound: HashSet<&str> = previous.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    let mut result = JoinPlan::default();

    for (index, node) in next.iter().enumerate() {
        let key = node_key(node, index);
        if !seen.insert(key.clone()) {
            log::debug!("duplicate join key {key} ignored");
            continue;
        }
        if bound.contains(key.as_str()) {
            result.update.push(index);
        } else {
            result.enter.push(index);
        }
    }

    result.exit = previous
        .iter()
        .filter(|key| !seen.contains(key.as_str()))
        .cloned()
        .collect();
    result
}

/// The nodes currently bound to one keyed layer, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundLayer {
    nodes: Vec<(String, Node)>,
}

impl BoundLayer {
    pub fn keys(&self) -> Vec<String> {
        self.nodes.iter().map(|(key, _)| key.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|(bound, _)| bound == key)
            .map(|(_, node)| node)
    }

    /// Binds `next`, returning the plan the DOM must follow to match it.
    pub fn join(&mut self, next: &[Node]) -> JoinPlan {
        let plan = plan(&self.keys(), next);
        let mut bound = Vec::with_capacity(plan.enter.len() + plan.update.len());
        let mut kept: Vec<usize> = plan.enter.iter().chain(&plan.update).copied().collect();
        kept.sort_unstable();
        for index in kept {
            bound.push((node_key(&next[index], index), next[index].clone()));
        }
        self.nodes = bound;
        plan
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}
