use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use campus_core::{new_id, now_rfc3339};
use campus_sql::{Row, SQLError, SQLStore, Value};

use crate::model::Batch;
use crate::service::{AcademicsError, schema};
use crate::store::BatchStore;
use crate::store::adjacency::{self, Adjacency, Edge};

const COLUMNS: &str = "id, parent_id, degree_id, specialization_id, name, code, \
                       start_year, end_year, is_active, created_at, updated_at, deleted_at";

/// BatchStore over the `batches` table.
///
/// Transitive walks load the adjacency of the root's degree in one query
/// and traverse it in memory.
pub struct SqlBatchStore {
    sql: Arc<dyn SQLStore>,
}

impl SqlBatchStore {
    pub fn new(sql: Arc<dyn SQLStore>) -> Result<Self, AcademicsError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Self { sql })
    }

    fn select(&self, tail: &str, params: &[Value]) -> Result<Vec<Batch>, AcademicsError> {
        let query = format!("SELECT {} FROM batches {}", COLUMNS, tail);
        let rows = self.sql.query(&query, params)?;
        rows.iter().map(batch_from_row).collect()
    }

    fn get(&self, id: &str) -> Result<Option<Batch>, AcademicsError> {
        Ok(self
            .select("WHERE id = ?1", &[Value::Text(id.to_string())])?
            .into_iter()
            .next())
    }

    /// Every batch of a degree, oldest first.
    fn degree_rows(&self, degree_id: &str) -> Result<Vec<Batch>, AcademicsError> {
        self.select(
            "WHERE degree_id = ?1 ORDER BY created_at, rowid",
            &[Value::Text(degree_id.to_string())],
        )
    }

    fn degree_edges(&self, degree_id: &str) -> Result<Vec<Edge>, AcademicsError> {
        let rows = self.sql.query(
            "SELECT id, parent_id, is_active FROM batches WHERE degree_id = ?1 ORDER BY created_at, rowid",
            &[Value::Text(degree_id.to_string())],
        )?;
        Ok(rows
            .iter()
            .filter_map(|row| {
                Some(Edge {
                    id: row.get_str("id")?.to_string(),
                    parent_id: row.get_str("parent_id").map(str::to_string),
                    is_active: row.get_bool("is_active").unwrap_or(false),
                })
            })
            .collect())
    }

    fn parent_of(&self, id: &str) -> Result<Option<String>, AcademicsError> {
        let rows = self.sql.query(
            "SELECT parent_id FROM batches WHERE id = ?1",
            &[Value::Text(id.to_string())],
        )?;
        Ok(rows
            .first()
            .and_then(|r| r.get_str("parent_id"))
            .filter(|pid| !pid.is_empty())
            .map(str::to_string))
    }
}

impl BatchStore for SqlBatchStore {
    fn insert(&self, mut batch: Batch) -> Result<Batch, AcademicsError> {
        if batch.id.is_empty() {
            batch.id = new_id();
        }
        if batch.created_at.is_empty() {
            let now = now_rfc3339();
            batch.created_at = now.clone();
            batch.updated_at = now;
        }

        let query = format!(
            "INSERT INTO batches ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            COLUMNS
        );
        self.sql
            .exec(
                &query,
                &[
                    Value::Text(batch.id.clone()),
                    batch.parent_id.clone().into(),
                    Value::Text(batch.degree_id.clone()),
                    batch.specialization_id.clone().into(),
                    Value::Text(batch.name.clone()),
                    Value::Text(batch.code.clone()),
                    Value::Integer(batch.start_year.into()),
                    Value::Integer(batch.end_year.into()),
                    batch.is_active.into(),
                    Value::Text(batch.created_at.clone()),
                    Value::Text(batch.updated_at.clone()),
                    batch.deleted_at.clone().into(),
                ],
            )
            .map_err(|e| write_error(e, &batch.code))?;

        debug!("batch {} inserted (code {})", batch.id, batch.code);
        Ok(batch)
    }

    fn find_by_id(&self, id: &str, include_inactive: bool) -> Result<Batch, AcademicsError> {
        match self.get(id)? {
            Some(b) if include_inactive || b.is_active => Ok(b),
            _ => Err(AcademicsError::NotFound(format!("batch '{}' not found", id))),
        }
    }

    fn find_direct_children(
        &self,
        parent_id: &str,
        include_inactive: bool,
    ) -> Result<Vec<Batch>, AcademicsError> {
        let tail = if include_inactive {
            "WHERE parent_id = ?1 ORDER BY created_at, rowid"
        } else {
            "WHERE parent_id = ?1 AND is_active = 1 ORDER BY created_at, rowid"
        };
        self.select(tail, &[Value::Text(parent_id.to_string())])
    }

    fn find_subtree(
        &self,
        root_id: &str,
        include_inactive: bool,
    ) -> Result<Vec<Batch>, AcademicsError> {
        let Some(root) = self.get(root_id)? else {
            return Ok(Vec::new());
        };

        let rows = self.degree_rows(&root.degree_id)?;
        let adj = Adjacency::from_edges(rows.iter().map(|b| Edge {
            id: b.id.clone(),
            parent_id: b.parent_id.clone(),
            is_active: b.is_active,
        }));

        let mut by_id: HashMap<String, Batch> =
            rows.into_iter().map(|b| (b.id.clone(), b)).collect();
        Ok(adj
            .subtree(root_id, include_inactive)
            .into_iter()
            .filter_map(|id| by_id.remove(&id))
            .collect())
    }

    fn update(&self, batch: &Batch) -> Result<Batch, AcademicsError> {
        let affected = self
            .sql
            .exec(
                "UPDATE batches SET name = ?1, code = ?2, specialization_id = ?3, \
                 start_year = ?4, end_year = ?5, updated_at = ?6 WHERE id = ?7",
                &[
                    Value::Text(batch.name.clone()),
                    Value::Text(batch.code.clone()),
                    batch.specialization_id.clone().into(),
                    Value::Integer(batch.start_year.into()),
                    Value::Integer(batch.end_year.into()),
                    Value::Text(batch.updated_at.clone()),
                    Value::Text(batch.id.clone()),
                ],
            )
            .map_err(|e| write_error(e, &batch.code))?;

        if affected == 0 {
            return Err(AcademicsError::NotFound(format!(
                "batch '{}' not found",
                batch.id
            )));
        }
        self.find_by_id(&batch.id, true)
    }

    fn soft_delete(&self, id: &str) -> Result<Batch, AcademicsError> {
        let now = now_rfc3339();
        let affected = self.sql.exec(
            "UPDATE batches SET is_active = 0, deleted_at = COALESCE(deleted_at, ?1), \
             updated_at = ?1 WHERE id = ?2",
            &[Value::Text(now), Value::Text(id.to_string())],
        )?;

        if affected == 0 {
            return Err(AcademicsError::NotFound(format!("batch '{}' not found", id)));
        }
        debug!("batch {} soft-deleted", id);
        self.find_by_id(id, true)
    }

    fn has_cycle(&self, batch_id: &str, candidate_parent_id: &str) -> Result<bool, AcademicsError> {
        adjacency::would_cycle(batch_id, candidate_parent_id, |id| self.parent_of(id))
    }

    fn ancestor_chain(&self, batch_id: &str) -> Result<Vec<Batch>, AcademicsError> {
        let batch = self.find_by_id(batch_id, true)?;
        if batch.is_root() {
            return Ok(Vec::new());
        }

        let mut by_id: HashMap<String, Batch> = self
            .degree_rows(&batch.degree_id)?
            .into_iter()
            .map(|b| (b.id.clone(), b))
            .collect();

        let ids = adjacency::walk_up(batch_id, |id| {
            Ok::<_, AcademicsError>(by_id.get(id).and_then(|b| b.parent_id.clone()))
        })?;
        Ok(ids.into_iter().filter_map(|id| by_id.remove(&id)).collect())
    }

    fn all_descendant_ids(&self, root_id: &str) -> Result<Vec<String>, AcademicsError> {
        let Some(root) = self.get(root_id)? else {
            return Ok(Vec::new());
        };
        let adj = Adjacency::from_edges(self.degree_edges(&root.degree_id)?);
        Ok(adj.descendants_leaf_first(root_id))
    }
}

fn batch_from_row(row: &Row) -> Result<Batch, AcademicsError> {
    let text = |col: &str| {
        row.get_str(col)
            .map(str::to_string)
            .ok_or_else(|| AcademicsError::Internal(format!("batches.{} is missing", col)))
    };
    let opt = |col: &str| row.get_str(col).map(str::to_string);
    let year = |col: &str| {
        row.get_i64(col)
            .and_then(|y| i32::try_from(y).ok())
            .ok_or_else(|| AcademicsError::Internal(format!("batches.{} is not a year", col)))
    };

    Ok(Batch {
        id: text("id")?,
        parent_id: opt("parent_id"),
        degree_id: text("degree_id")?,
        specialization_id: opt("specialization_id"),
        name: text("name")?,
        code: text("code")?,
        start_year: year("start_year")?,
        end_year: year("end_year")?,
        is_active: row.get_bool("is_active").unwrap_or(false),
        created_at: text("created_at")?,
        updated_at: text("updated_at")?,
        deleted_at: opt("deleted_at"),
    })
}

/// Unique-code violations become a readable conflict; other constraint
/// failures pass through as conflicts too.
fn write_error(e: SQLError, code: &str) -> AcademicsError {
    match e {
        SQLError::Constraint(msg) if msg.contains("batches.code") => {
            AcademicsError::Conflict(format!("batch code '{}' already exists", code))
        }
        SQLError::Constraint(msg) => AcademicsError::Conflict(msg),
        other => AcademicsError::Storage(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_sql::SqliteStore;

    fn store() -> SqlBatchStore {
        let sql: Arc<dyn SQLStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        SqlBatchStore::new(sql).unwrap()
    }

    fn batch(code: &str, parent: Option<&str>) -> Batch {
        Batch {
            id: String::new(),
            parent_id: parent.map(str::to_string),
            degree_id: "deg-it".into(),
            specialization_id: None,
            name: format!("Batch {}", code),
            code: code.into(),
            start_year: 2021,
            end_year: 2025,
            is_active: true,
            created_at: String::new(),
            updated_at: String::new(),
            deleted_at: None,
        }
    }

    fn ids(batches: &[Batch]) -> Vec<&str> {
        batches.iter().map(|b| b.code.as_str()).collect()
    }

    #[test]
    fn insert_assigns_id_and_timestamps() {
        let s = store();
        let b = s.insert(batch("IT25", None)).unwrap();
        assert_eq!(b.id.len(), 32);
        assert!(!b.created_at.is_empty());
        assert_eq!(b.created_at, b.updated_at);

        let fetched = s.find_by_id(&b.id, false).unwrap();
        assert_eq!(fetched, b);
    }

    #[test]
    fn duplicate_code_is_conflict_even_when_inactive() {
        let s = store();
        let b = s.insert(batch("IT25", None)).unwrap();
        s.soft_delete(&b.id).unwrap();

        let err = s.insert(batch("IT25", None)).unwrap_err();
        assert!(matches!(err, AcademicsError::Conflict(ref m) if m.contains("IT25")), "{err:?}");
    }

    #[test]
    fn inactive_rows_hidden_unless_requested() {
        let s = store();
        let root = s.insert(batch("R", None)).unwrap();
        let a = s.insert(batch("A", Some(&root.id))).unwrap();
        s.insert(batch("B", Some(&root.id))).unwrap();
        s.soft_delete(&a.id).unwrap();

        assert!(matches!(
            s.find_by_id(&a.id, false),
            Err(AcademicsError::NotFound(_))
        ));
        assert!(!s.find_by_id(&a.id, true).unwrap().is_active);

        assert_eq!(ids(&s.find_direct_children(&root.id, false).unwrap()), vec!["B"]);
        assert_eq!(
            ids(&s.find_direct_children(&root.id, true).unwrap()),
            vec!["A", "B"]
        );
    }

    #[test]
    fn subtree_stays_within_root() {
        let s = store();
        let root = s.insert(batch("R", None)).unwrap();
        let a = s.insert(batch("A", Some(&root.id))).unwrap();
        s.insert(batch("A1", Some(&a.id))).unwrap();
        s.insert(batch("B", Some(&root.id))).unwrap();
        s.insert(batch("OTHER", None)).unwrap();

        assert_eq!(ids(&s.find_subtree(&root.id, false).unwrap()), vec!["R", "A", "B", "A1"]);
        assert_eq!(ids(&s.find_subtree(&a.id, false).unwrap()), vec!["A", "A1"]);
        assert!(s.find_subtree("nope", true).unwrap().is_empty());
    }

    #[test]
    fn soft_delete_keeps_first_deleted_at() {
        let s = store();
        let b = s.insert(batch("X", None)).unwrap();
        let first = s.soft_delete(&b.id).unwrap();
        assert!(!first.is_active);
        let stamp = first.deleted_at.clone().unwrap();

        let again = s.soft_delete(&b.id).unwrap();
        assert_eq!(again.deleted_at.as_deref(), Some(stamp.as_str()));

        assert!(matches!(s.soft_delete("nope"), Err(AcademicsError::NotFound(_))));
    }

    #[test]
    fn update_changes_mutable_fields_only() {
        let s = store();
        let b = s.insert(batch("X", None)).unwrap();
        let mut changed = b.clone();
        changed.name = "Renamed".into();
        changed.end_year = 2026;
        changed.degree_id = "ignored".into();
        changed.updated_at = now_rfc3339();

        let stored = s.update(&changed).unwrap();
        assert_eq!(stored.name, "Renamed");
        assert_eq!(stored.end_year, 2026);
        assert_eq!(stored.degree_id, "deg-it");

        let mut missing = b.clone();
        missing.id = "nope".into();
        assert!(matches!(s.update(&missing), Err(AcademicsError::NotFound(_))));
    }

    #[test]
    fn update_to_taken_code_is_conflict() {
        let s = store();
        s.insert(batch("TAKEN", None)).unwrap();
        let mut b = s.insert(batch("MINE", None)).unwrap();
        b.code = "TAKEN".into();
        assert!(matches!(s.update(&b), Err(AcademicsError::Conflict(_))));
    }

    #[test]
    fn traversals() {
        let s = store();
        let root = s.insert(batch("R", None)).unwrap();
        let a = s.insert(batch("A", Some(&root.id))).unwrap();
        let a1 = s.insert(batch("A1", Some(&a.id))).unwrap();
        let b = s.insert(batch("B", Some(&root.id))).unwrap();
        s.soft_delete(&a.id).unwrap();

        let chain = s.ancestor_chain(&a1.id).unwrap();
        assert_eq!(ids(&chain), vec!["A", "R"]);
        assert!(s.ancestor_chain(&root.id).unwrap().is_empty());
        assert!(matches!(s.ancestor_chain("nope"), Err(AcademicsError::NotFound(_))));

        let desc = s.all_descendant_ids(&root.id).unwrap();
        assert_eq!(desc.len(), 3);
        let pos = |id: &str| desc.iter().position(|x| x == id).unwrap();
        assert!(pos(&a1.id) < pos(&a.id));
        assert!(desc.contains(&b.id));

        assert!(s.has_cycle(&a.id, &a1.id).unwrap());
        assert!(s.has_cycle(&a.id, &a.id).unwrap());
        assert!(!s.has_cycle(&a1.id, &b.id).unwrap());
        assert!(!s.has_cycle(&new_id(), &a1.id).unwrap());
    }
}
