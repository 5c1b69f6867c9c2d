use std::collections::{HashMap, HashSet};

use crate::model::{Batch, BatchTreeNode};

/// Assemble a flat list of batches into a nested tree rooted at `root_id`.
///
/// Children keep their relative order from `nodes`. Returns `None` when
/// `root_id` is not in the list. A node is attached at most once, so a
/// malformed list with a parent loop still terminates.
pub fn build_tree(nodes: Vec<Batch>, root_id: &str) -> Option<BatchTreeNode> {
    let mut children_of: HashMap<String, Vec<String>> = HashMap::new();
    for n in &nodes {
        if let Some(ref pid) = n.parent_id {
            children_of.entry(pid.clone()).or_default().push(n.id.clone());
        }
    }

    let mut by_id: HashMap<String, Batch> = HashMap::with_capacity(nodes.len());
    for n in nodes {
        by_id.entry(n.id.clone()).or_insert(n);
    }

    let mut placed = HashSet::from([root_id.to_string()]);
    let root = by_id.remove(root_id)?;

    // Depth-first with an explicit stack of open nodes, each paired with
    // the index of its next child to visit. A node is closed into its
    // parent once all of its children are placed.
    let mut stack: Vec<(BatchTreeNode, usize)> = vec![(BatchTreeNode::leaf(root), 0)];
    loop {
        let (node, next) = stack.last_mut()?;
        let kid = children_of
            .get(&node.batch.id)
            .and_then(|kids| kids.get(*next))
            .cloned();
        *next += 1;

        match kid {
            Some(kid) => {
                if placed.insert(kid.clone()) {
                    if let Some(batch) = by_id.remove(&kid) {
                        stack.push((BatchTreeNode::leaf(batch), 0));
                    }
                }
            }
            None => {
                let (done, _) = stack.pop()?;
                match stack.last_mut() {
                    Some((parent, _)) => parent.children.push(done),
                    None => return Some(done),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, parent: Option<&str>) -> Batch {
        Batch {
            id: id.into(),
            parent_id: parent.map(str::to_string),
            degree_id: "deg".into(),
            specialization_id: None,
            name: id.to_uppercase(),
            code: id.to_uppercase(),
            start_year: 2020,
            end_year: 2024,
            is_active: true,
            created_at: String::new(),
            updated_at: String::new(),
            deleted_at: None,
        }
    }

    fn child_ids(n: &BatchTreeNode) -> Vec<&str> {
        n.children.iter().map(|c| c.batch.id.as_str()).collect()
    }

    #[test]
    fn nests_children_in_input_order() {
        let tree = build_tree(
            vec![
                node("r", None),
                node("b", Some("r")),
                node("a", Some("r")),
                node("a1", Some("a")),
            ],
            "r",
        )
        .unwrap();

        assert_eq!(tree.batch.id, "r");
        assert_eq!(child_ids(&tree), vec!["b", "a"]);
        assert_eq!(child_ids(&tree.children[1]), vec!["a1"]);
        assert!(tree.children[0].children.is_empty());
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn absent_root_is_none() {
        assert!(build_tree(vec![node("a", None)], "r").is_none());
        assert!(build_tree(Vec::new(), "r").is_none());
    }

    #[test]
    fn rooted_below_the_top() {
        let tree = build_tree(
            vec![node("r", None), node("a", Some("r")), node("a1", Some("a"))],
            "a",
        )
        .unwrap();
        assert_eq!(tree.node_count(), 2);
    }

    #[test]
    fn parent_loop_terminates() {
        let tree = build_tree(vec![node("x", Some("y")), node("y", Some("x"))], "x").unwrap();
        assert_eq!(child_ids(&tree), vec!["y"]);
        assert!(tree.children[0].children.is_empty());
    }

    #[test]
    fn serializes_flat_fields_with_children() {
        let tree = build_tree(
            vec![node("r", None), node("a", Some("r")), node("b", Some("r"))],
            "r",
        )
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&tree.to_json().unwrap()).unwrap();
        assert_eq!(json["id"], "r");
        assert_eq!(json["children"][0]["code"], "A");
        assert_eq!(json["children"][1]["code"], "B");
        assert_eq!(json["children"][0]["children"], serde_json::json!([]));
        assert!(json.get("parent_id").is_none());
    }

    fn chain(depth: usize) -> Vec<Batch> {
        (0..depth)
            .map(|i| {
                let parent = (i > 0).then(|| format!("n{}", i - 1));
                node(&format!("n{}", i), parent.as_deref())
            })
            .collect()
    }

    #[test]
    fn deep_chain_builds_counts_and_drops() {
        let depth = 20_000;
        let tree = build_tree(chain(depth), "n0").unwrap();
        assert_eq!(tree.node_count(), depth);

        let mut deepest = &tree;
        while let Some(child) = deepest.children.first() {
            deepest = child;
        }
        assert_eq!(deepest.batch.id, format!("n{}", depth - 1));

        let json = tree.to_json().unwrap();
        assert!(json.starts_with("{\"id\":\"n0\""));
        assert_eq!(json.matches("\"children\":[").count(), depth);
        assert!(json.ends_with(&"]}".repeat(depth)));
        drop(tree);
    }

    #[test]
    fn deep_chain_keeps_sibling_order_at_every_level() {
        let mut nodes = chain(5_000);
        nodes.push(node("side", Some("n2500")));
        let tree = build_tree(nodes, "n0").unwrap();
        assert_eq!(tree.node_count(), 5_001);

        let mut at = &tree;
        for _ in 0..2500 {
            at = &at.children[0];
        }
        assert_eq!(child_ids(at), vec!["n2501", "side"]);
    }
}
