use serde::{Deserialize, Serialize};

/// A cohort node in a degree's batch tree.
///
/// Batches form a tree via `parent_id`. Every node of a tree carries the
/// root's `degree_id`. Deletion is soft: `is_active` goes false and
/// `deleted_at` is stamped; rows are never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Parent batch id (None = root of a degree tree).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    /// Degree this tree belongs to.
    pub degree_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization_id: Option<String>,

    /// Display name, e.g. "IT Class of 2025".
    pub name: String,

    /// Short code, unique across all batches including inactive ones.
    pub code: String,

    pub start_year: i32,
    pub end_year: i32,

    pub is_active: bool,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,

    /// RFC 3339 soft-deletion timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
}

impl Batch {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Input for creating a batch.
///
/// Roots need `degree_id`. Children inherit the parent's degree; an
/// explicit `degree_id` on a child must match it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBatch {
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub degree_id: Option<String>,
    #[serde(default)]
    pub specialization_id: Option<String>,
    pub name: String,
    pub code: String,
    pub start_year: i32,
    pub end_year: i32,
}

/// Partial update. Only supplied fields change; `parent_id` and
/// `degree_id` are fixed at creation and rejected here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateBatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub specialization_id: Option<String>,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
}

impl UpdateBatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.code.is_none()
            && self.specialization_id.is_none()
            && self.start_year.is_none()
            && self.end_year.is_none()
    }
}

/// A batch with its children nested, as returned by the tree endpoint.
///
/// Trees may be arbitrarily deep, so counting, dropping and JSON encoding
/// walk an explicit stack instead of recursing per level.
#[derive(Debug)]
pub struct BatchTreeNode {
    pub batch: Batch,
    pub children: Vec<BatchTreeNode>,
}

impl BatchTreeNode {
    pub fn leaf(batch: Batch) -> Self {
        Self {
            batch,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including self.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Encode as JSON: the batch's fields flattened alongside a nested
    /// `children` array.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        open_node(&mut out, &self.batch)?;
        let mut stack: Vec<(&BatchTreeNode, usize)> = vec![(self, 0)];

        while let Some(top) = stack.last_mut() {
            let (node, next) = (top.0, top.1);
            match node.children.get(next) {
                Some(child) => {
                    top.1 += 1;
                    if next > 0 {
                        out.push(',');
                    }
                    open_node(&mut out, &child.batch)?;
                    stack.push((child, 0));
                }
                None => {
                    out.push_str("]}");
                    stack.pop();
                }
            }
        }
        Ok(out)
    }
}

/// Write `{<batch fields>,"children":[` for one node.
fn open_node(out: &mut String, batch: &Batch) -> Result<(), serde_json::Error> {
    let flat = serde_json::to_string(batch)?;
    let fields = flat
        .strip_suffix('}')
        .ok_or_else(|| <serde_json::Error as serde::ser::Error>::custom("batch is not a JSON object"))?;
    out.push_str(fields);
    out.push_str(",\"children\":[");
    Ok(())
}

impl Drop for BatchTreeNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}
