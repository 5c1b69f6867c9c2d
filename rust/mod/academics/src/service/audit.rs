//! Audit sinks for batch mutations.

use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::info;

use campus_sql::{SQLStore, Value};

use crate::model::AuditEvent;
use crate::service::schema;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit storage: {0}")]
    Storage(String),

    #[error("audit serialization: {0}")]
    Serialization(String),
}

/// Destination for audit events.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError>;
}

/// Appends events to the `audit_logs` table.
pub struct SqlAuditSink {
    sql: Arc<dyn SQLStore>,
}

impl SqlAuditSink {
    pub fn new(sql: Arc<dyn SQLStore>) -> Result<Self, crate::service::AcademicsError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Self { sql })
    }
}

#[cfg(test)]
impl SqlAuditSink {
    /// Events recorded for one batch, oldest first.
    pub fn events_for(&self, entity_id: &str) -> Result<Vec<(String, Option<String>)>, AuditError> {
        let rows = self
            .sql
            .query(
                "SELECT action, actor_id FROM audit_logs WHERE entity = 'batch' AND entity_id = ?1 ORDER BY id",
                &[Value::Text(entity_id.to_string())],
            )
            .map_err(|e| AuditError::Storage(e.to_string()))?;
        Ok(rows
            .iter()
            .map(|r| {
                (
                    r.get_str("action").unwrap_or_default().to_string(),
                    r.get_str("actor_id").map(str::to_string),
                )
            })
            .collect())
    }
}

fn snapshot(v: &Option<serde_json::Value>) -> Result<Value, AuditError> {
    match v {
        Some(v) => serde_json::to_string(v)
            .map(Value::Text)
            .map_err(|e| AuditError::Serialization(e.to_string())),
        None => Ok(Value::Null),
    }
}

impl AuditSink for SqlAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        self.sql
            .exec(
                "INSERT INTO audit_logs (action, entity, entity_id, actor_id, old_value, new_value, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                &[
                    Value::Text(event.action.clone()),
                    Value::Text(event.entity.clone()),
                    Value::Text(event.entity_id.clone()),
                    event.actor_id.clone().into(),
                    snapshot(&event.old_value)?,
                    snapshot(&event.new_value)?,
                    Value::Text(event.created_at.clone()),
                ],
            )
            .map_err(|e| AuditError::Storage(e.to_string()))?;
        Ok(())
    }
}

/// Writes each event as a structured log line under the `audit` target.
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        info!(
            target: "audit",
            action = %event.action,
            entity = %event.entity,
            entity_id = %event.entity_id,
            actor_id = event.actor_id.as_deref().unwrap_or("-"),
            "audit event"
        );
        Ok(())
    }
}

/// Keeps events in memory.
#[derive(Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// `(action, entity_id)` pairs in emission order.
    pub fn actions(&self) -> Vec<(String, String)> {
        self.events()
            .into_iter()
            .map(|e| (e.action, e.entity_id))
            .collect()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        self.events
            .lock()
            .map_err(|e| AuditError::Storage(format!("audit buffer poisoned: {}", e)))?
            .push(event.clone());
        Ok(())
    }
}
