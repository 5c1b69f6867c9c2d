//! Persistence for batches.

pub mod adjacency;
mod sql;

pub use sql::SqlBatchStore;

use crate::model::Batch;
use crate::service::AcademicsError;

/// Batch persistence and hierarchy traversal.
///
/// `find_by_id` with `include_inactive = false` treats inactive rows as
/// absent. Traversals stay inside the root's degree tree.
pub trait BatchStore: Send + Sync {
    /// Persist a new batch. An empty `id` is filled in; a duplicate code
    /// is a `Conflict`.
    fn insert(&self, batch: Batch) -> Result<Batch, AcademicsError>;

    fn find_by_id(&self, id: &str, include_inactive: bool) -> Result<Batch, AcademicsError>;

    /// Immediate children of `parent_id`, oldest first.
    fn find_direct_children(
        &self,
        parent_id: &str,
        include_inactive: bool,
    ) -> Result<Vec<Batch>, AcademicsError>;

    /// Root plus descendants, root first. Without `include_inactive`,
    /// inactive nodes prune their whole branch.
    fn find_subtree(
        &self,
        root_id: &str,
        include_inactive: bool,
    ) -> Result<Vec<Batch>, AcademicsError>;

    /// Overwrite the mutable fields of an existing batch.
    fn update(&self, batch: &Batch) -> Result<Batch, AcademicsError>;

    /// Mark inactive and stamp `deleted_at`. Re-deleting keeps the first
    /// `deleted_at`. Returns the row as stored.
    fn soft_delete(&self, id: &str) -> Result<Batch, AcademicsError>;

    /// True iff `candidate_parent_id` is `batch_id` or one of its
    /// descendants.
    fn has_cycle(&self, batch_id: &str, candidate_parent_id: &str) -> Result<bool, AcademicsError>;

    /// Strict ancestors of `batch_id`, nearest first, inactive included.
    fn ancestor_chain(&self, batch_id: &str) -> Result<Vec<Batch>, AcademicsError>;

    /// Ids of every descendant (inactive included, root excluded), each
    /// listed before its parent.
    fn all_descendant_ids(&self, root_id: &str) -> Result<Vec<String>, AcademicsError>;
}
