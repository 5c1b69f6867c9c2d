use serde::Serialize;
use tracing::warn;

pub const ACTION_CREATE: &str = "batch.create";
pub const ACTION_UPDATE: &str = "batch.update";
pub const ACTION_CASCADE_DELETE: &str = "batch.cascade_delete";
pub const ACTION_DELETE: &str = "batch.delete";

pub const ENTITY_BATCH: &str = "batch";

/// One audit record for a batch mutation.
///
/// Snapshots are full JSON renderings of the batch before and after the
/// change; creates carry only `new_value`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEvent {
    pub action: String,
    pub entity: String,
    pub entity_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<serde_json::Value>,
    pub created_at: String,
}

impl AuditEvent {
    pub fn batch(action: &str, entity_id: &str, actor_id: Option<&str>, at: String) -> Self {
        Self {
            action: action.to_string(),
            entity: ENTITY_BATCH.to_string(),
            entity_id: entity_id.to_string(),
            actor_id: actor_id.map(str::to_string),
            old_value: None,
            new_value: None,
            created_at: at,
        }
    }

    pub fn with_old<T: Serialize>(mut self, value: &T) -> Self {
        self.old_value = self.snapshot("old_value", value);
        self
    }

    pub fn with_new<T: Serialize>(mut self, value: &T) -> Self {
        self.new_value = self.snapshot("new_value", value);
        self
    }

    /// A snapshot that fails to encode is logged and left out; the event
    /// is still recorded.
    fn snapshot<T: Serialize>(&self, field: &str, value: &T) -> Option<serde_json::Value> {
        match serde_json::to_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(
                    action = %self.action,
                    entity_id = %self.entity_id,
                    "audit {} snapshot not encodable: {}",
                    field,
                    e
                );
                None
            }
        }
    }
}
