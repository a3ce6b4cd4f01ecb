//! Evolution chain re-projection and stage grouping.
//!
//! The upstream chain is a recursive record where every node may evolve into
//! any number of successors. [`build_evolution_tree`] turns it into an
//! [`EvolutionTreeNode`] tree of the same shape, and [`collect_stages`] flattens
//! that tree into depth levels for linear "stage 1 -> stage 2" rendering.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::{EvolutionDataError, EvolutionDataResult};
use schema::EvolutionNode;

/// One species in an evolution tree, with its successors in upstream order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionTreeNode {
    pub name: String,
    #[serde(rename = "speciesUrl")]
    pub species_reference_url: String,
    pub evolves_to: Vec<EvolutionTreeNode>,
}

/// A species entry within one evolution stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageEntry {
    pub name: String,
    #[serde(rename = "speciesUrl")]
    pub species_reference_url: String,
}

impl EvolutionTreeNode {
    /// Species names in pre-order: the node itself, then each branch in turn.
    pub fn species_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.node_count());
        self.walk(0, &mut |node, _| names.push(node.name.clone()));
        names
    }

    pub fn node_count(&self) -> usize {
        1 + self
            .evolves_to
            .iter()
            .map(EvolutionTreeNode::node_count)
            .sum::<usize>()
    }

    /// Number of stages in the longest branch (a lone species has depth 1).
    pub fn depth(&self) -> usize {
        1 + self
            .evolves_to
            .iter()
            .map(EvolutionTreeNode::depth)
            .max()
            .unwrap_or(0)
    }

    fn walk<F>(&self, depth: usize, visit: &mut F)
    where
        F: FnMut(&EvolutionTreeNode, usize),
    {
        visit(self, depth);
        for child in &self.evolves_to {
            child.walk(depth + 1, visit);
        }
    }
}

/// Re-project an upstream evolution chain into an [`EvolutionTreeNode`] tree.
///
/// Child order and branching are preserved exactly, duplicates included. If
/// any node lacks a species name or URL the whole build fails.
pub fn build_evolution_tree(root: &EvolutionNode) -> EvolutionDataResult<EvolutionTreeNode> {
    build_node(root, "chain")
}

fn build_node(node: &EvolutionNode, path: &str) -> EvolutionDataResult<EvolutionTreeNode> {
    let species = node.species.as_ref().ok_or_else(|| malformed(path, "missing species"))?;
    if species.name.trim().is_empty() {
        return Err(malformed(path, "missing species name"));
    }
    if species.url.trim().is_empty() {
        return Err(malformed(path, "missing species url"));
    }

    let evolves_to = node
        .evolves_to
        .iter()
        .enumerate()
        .map(|(i, child)| build_node(child, &format!("{path}.evolves_to[{i}]")))
        .collect::<EvolutionDataResult<Vec<_>>>()?;

    Ok(EvolutionTreeNode {
        name: species.name.clone(),
        species_reference_url: species.url.clone(),
        evolves_to,
    })
}

fn malformed(path: &str, reason: &str) -> EvolutionDataError {
    EvolutionDataError::Malformed {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

/// Group a tree into stages by depth, deduplicated by species name.
///
/// Stage 0 holds the root. Within a stage, entries appear in the order a
/// pre-order walk from the root first reaches them.
pub fn collect_stages(tree: &EvolutionTreeNode) -> Vec<Vec<StageEntry>> {
    let mut stages: Vec<Vec<StageEntry>> = Vec::new();
    let mut seen: Vec<HashSet<String>> = Vec::new();

    tree.walk(0, &mut |node, depth| {
        if stages.len() <= depth {
            stages.push(Vec::new());
            seen.push(HashSet::new());
        }
        if seen[depth].insert(node.name.clone()) {
            stages[depth].push(StageEntry {
                name: node.name.clone(),
                species_reference_url: node.species_reference_url.clone(),
            });
        }
    });

    stages
}
