//! # Head Reconciliation
//!
//! Diffs the current head against the next document's head and applies the
//! smallest remove/append set that brings the current one up to date.
//!
//! ```text
//!  old:  meta A   link B   title "X"
//!  new:  meta A   title "Y"
//!          =       stale     stale
//!                  fresh: title "Y"
//! ```
//!
//! The diff is a single forward pass with one cursor per side. A node that
//! turns up later on the other side is pulled back out of the pending
//! buffer instead of being removed and re-added.

use log::debug;

use crate::dom::{Element, Node};

/// Result of [`partition_nodes`]: positions into the old and next sequences.
///
/// Indices rather than references keep the result unambiguous when a head
/// holds two structurally identical nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionedNodes {
    /// Indices into the old sequence of nodes to remove.
    pub stale: Vec<usize>,
    /// Indices into the next sequence of nodes to append.
    pub fresh: Vec<usize>,
}

impl PartitionedNodes {
    pub fn stale_nodes<'a, T>(&self, old: &'a [T]) -> Vec<&'a T> {
        self.stale.iter().map(|&i| &old[i]).collect()
    }

    pub fn fresh_nodes<'a, T>(&self, next: &'a [T]) -> Vec<&'a T> {
        self.fresh.iter().map(|&i| &next[i]).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.stale.is_empty() && self.fresh.is_empty()
    }
}

/// Splits two node sequences into stale (old only) and fresh (next only)
/// nodes under structural equality. Nodes present on both sides, in any
/// relative order, land in neither set.
pub fn partition_nodes<T: PartialEq>(old: &[T], next: &[T]) -> PartitionedNodes {
    let mut stale: Vec<usize> = Vec::new();
    let mut fresh: Vec<usize> = Vec::new();

    let mut old_mark = 0;
    let mut next_mark = 0;
    while old_mark < old.len() || next_mark < next.len() {
        let old_node = old.get(old_mark);
        let next_node = next.get(next_mark);

        if let (Some(o), Some(n)) = (old_node, next_node)
            && o == n
        {
            old_mark += 1;
            next_mark += 1;
            continue;
        }

        // Old node was already seen on the new side: it stays where it is.
        if let Some(o) = old_node
            && let Some(pos) = fresh.iter().position(|&i| next[i] == *o)
        {
            fresh.remove(pos);
            old_mark += 1;
            continue;
        }

        // New node was already seen on the old side: keep it instead.
        if let Some(n) = next_node
            && let Some(pos) = stale.iter().position(|&i| old[i] == *n)
        {
            stale.remove(pos);
            next_mark += 1;
            continue;
        }

        if old_node.is_some() {
            stale.push(old_mark);
        }
        if next_node.is_some() {
            fresh.push(next_mark);
        }
        old_mark += 1;
        next_mark += 1;
    }

    PartitionedNodes { stale, fresh }
}

/// Prefetch hints are router bookkeeping, not page content.
pub fn is_prefetch_hint(el: &Element) -> bool {
    el.is("link") && el.attr("rel") == Some("prefetch")
}

/// Head element children taking part in reconciliation, with their child
/// index in `head`.
fn head_nodes(head: &Element) -> Vec<(usize, &Element)> {
    head.children
        .iter()
        .enumerate()
        .filter_map(|(i, node)| node.as_element().map(|el| (i, el)))
        .filter(|(_, el)| !is_prefetch_hint(el))
        .collect()
}

/// Removes stale nodes from `current` and appends the fresh ones from `next`.
/// Returns the partition that was applied.
pub fn merge_head(current: &mut Element, next: &Element) -> PartitionedNodes {
    let (partition, mut doomed, additions) = {
        let old = head_nodes(current);
        let new = head_nodes(next);
        let old_els: Vec<&Element> = old.iter().map(|(_, el)| *el).collect();
        let new_els: Vec<&Element> = new.iter().map(|(_, el)| *el).collect();

        let partition = partition_nodes(&old_els, &new_els);
        let doomed: Vec<usize> = partition.stale.iter().map(|&i| old[i].0).collect();
        let additions: Vec<Element> = partition
            .fresh
            .iter()
            .map(|&i| new_els[i].clone())
            .collect();
        (partition, doomed, additions)
    };

    debug!(
        "Merging head: {} stale, {} fresh",
        partition.stale.len(),
        partition.fresh.len()
    );

    doomed.sort_unstable_by(|a, b| b.cmp(a));
    for index in doomed {
        current.children.remove(index);
    }
    current
        .children
        .extend(additions.into_iter().map(Node::Element));

    partition
}
