//! In-memory parent/child index over one degree's batch rows.
//!
//! All walks carry a visited set so corrupted parent pointers (a loop
//! written behind the service's back) terminate instead of spinning.

use std::collections::{HashMap, HashSet, VecDeque};

/// One edge of the batch forest: `id` hangs under `parent_id`.
#[derive(Debug, Clone)]
pub struct Edge {
    pub id: String,
    pub parent_id: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Default)]
pub struct Adjacency {
    parent: HashMap<String, Option<String>>,
    active: HashMap<String, bool>,
    children: HashMap<String, Vec<String>>,
}

impl Adjacency {
    /// Build the index. Children keep the order the edges arrive in.
    pub fn from_edges<I: IntoIterator<Item = Edge>>(edges: I) -> Self {
        let mut adj = Self::default();
        for edge in edges {
            if let Some(ref pid) = edge.parent_id {
                adj.children
                    .entry(pid.clone())
                    .or_default()
                    .push(edge.id.clone());
            }
            adj.active.insert(edge.id.clone(), edge.is_active);
            adj.parent.insert(edge.id, edge.parent_id);
        }
        adj
    }

    pub fn contains(&self, id: &str) -> bool {
        self.parent.contains_key(id)
    }

    fn is_active(&self, id: &str) -> bool {
        self.active.get(id).copied().unwrap_or(false)
    }

    /// Root plus all descendants, root first (breadth-first).
    ///
    /// Without `include_inactive`, an inactive node is dropped together
    /// with everything below it; an inactive root yields nothing.
    pub fn subtree(&self, root: &str, include_inactive: bool) -> Vec<String> {
        if !self.contains(root) || (!include_inactive && !self.is_active(root)) {
            return Vec::new();
        }

        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([root.to_string()]);
        seen.insert(root.to_string());

        while let Some(id) = queue.pop_front() {
            if let Some(kids) = self.children.get(&id) {
                for kid in kids {
                    if !include_inactive && !self.is_active(kid) {
                        continue;
                    }
                    if seen.insert(kid.clone()) {
                        queue.push_back(kid.clone());
                    }
                }
            }
            out.push(id);
        }
        out
    }

    /// Every descendant of `root` (active or not), excluding `root`,
    /// ordered so each node appears before its parent.
    pub fn descendants_leaf_first(&self, root: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(root.to_string());

        // (node, children already expanded)
        let mut stack: Vec<(String, bool)> = Vec::new();
        if let Some(kids) = self.children.get(root) {
            for kid in kids.iter().rev() {
                if seen.insert(kid.clone()) {
                    stack.push((kid.clone(), false));
                }
            }
        }

        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                out.push(id);
                continue;
            }
            stack.push((id.clone(), true));
            if let Some(kids) = self.children.get(&id) {
                for kid in kids.iter().rev() {
                    if seen.insert(kid.clone()) {
                        stack.push((kid.clone(), false));
                    }
                }
            }
        }
        out
    }
}

/// Walk parent pointers from `start` using `parent_of` for lookups.
///
/// Returns the ids visited after `start`, nearest first, stopping at a
/// root, a dangling parent, or a repeat.
pub fn walk_up<F, E>(start: &str, mut parent_of: F) -> Result<Vec<String>, E>
where
    F: FnMut(&str) -> Result<Option<String>, E>,
{
    let mut chain = Vec::new();
    let mut visited = HashSet::new();
    visited.insert(start.to_string());

    let mut current = start.to_string();
    while let Some(pid) = parent_of(&current)? {
        if !visited.insert(pid.clone()) {
            break;
        }
        chain.push(pid.clone());
        current = pid;
    }
    Ok(chain)
}

/// Whether hanging `batch_id` under `candidate_parent` would close a loop:
/// true when the candidate is the batch itself or sits below it.
pub fn would_cycle<F, E>(batch_id: &str, candidate_parent: &str, parent_of: F) -> Result<bool, E>
where
    F: FnMut(&str) -> Result<Option<String>, E>,
{
    if batch_id == candidate_parent {
        return Ok(true);
    }
    let chain = walk_up(candidate_parent, parent_of)?;
    Ok(chain.iter().any(|id| id == batch_id))
}
