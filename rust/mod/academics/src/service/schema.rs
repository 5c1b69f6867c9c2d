use campus_sql::SQLStore;

use crate::service::AcademicsError;

/// Initialize the SQLite schema for batches and their audit trail.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), AcademicsError> {
    let statements = [
        // Batches: one row per cohort node, soft-deleted in place
        "CREATE TABLE IF NOT EXISTS batches (
            id TEXT PRIMARY KEY,
            parent_id TEXT,
            degree_id TEXT NOT NULL,
            specialization_id TEXT,
            name TEXT NOT NULL,
            code TEXT NOT NULL,
            start_year INTEGER NOT NULL,
            end_year INTEGER NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted_at TEXT,
            FOREIGN KEY (parent_id) REFERENCES batches(id)
        )",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_batches_code ON batches(code)",
        "CREATE INDEX IF NOT EXISTS idx_batches_parent ON batches(parent_id)",
        "CREATE INDEX IF NOT EXISTS idx_batches_degree ON batches(degree_id)",
        "CREATE INDEX IF NOT EXISTS idx_batches_active ON batches(is_active)",

        // Audit log: append-only
        "CREATE TABLE IF NOT EXISTS audit_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            action TEXT NOT NULL,
            entity TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            actor_id TEXT,
            old_value TEXT,
            new_value TEXT,
            created_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_audit_logs_entity ON audit_logs(entity, entity_id)",
    ];

    for stmt in &statements {
        sql.exec(stmt, &[])
            .map_err(|e| AcademicsError::Storage(format!("schema init failed: {}", e)))?;
    }

    Ok(())
}
