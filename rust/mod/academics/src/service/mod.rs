pub mod access;
pub mod audit;
pub mod batch;
pub mod directory;
pub mod schema;
pub mod tree;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use campus_core::ServiceError;
use campus_kv::KVError;
use campus_sql::SQLError;

use crate::model::AuditEvent;
use crate::service::access::AccessResolver;
use crate::service::audit::AuditSink;
use crate::service::directory::OrgDirectory;
use crate::store::BatchStore;

/// Academics service error type.
#[derive(Debug, Error)]
pub enum AcademicsError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<AcademicsError> for ServiceError {
    fn from(e: AcademicsError) -> Self {
        match e {
            AcademicsError::NotFound(m) => ServiceError::NotFound(m),
            AcademicsError::Conflict(m) => ServiceError::Conflict(m),
            AcademicsError::Validation(m) => ServiceError::Validation(m),
            AcademicsError::Forbidden(m) => ServiceError::Forbidden(m),
            AcademicsError::Storage(m) => ServiceError::Storage(m),
            AcademicsError::Internal(m) => ServiceError::Internal(m),
        }
    }
}

impl From<SQLError> for AcademicsError {
    fn from(e: SQLError) -> Self {
        AcademicsError::Storage(e.to_string())
    }
}

impl From<KVError> for AcademicsError {
    fn from(e: KVError) -> Self {
        AcademicsError::Storage(e.to_string())
    }
}

/// The batch service: hierarchy mutations, reads and the checks around
/// them. Every mutation takes the acting principal explicitly.
pub struct BatchService {
    pub(crate) store: Arc<dyn BatchStore>,
    pub(crate) directory: Arc<dyn OrgDirectory>,
    pub(crate) access: AccessResolver,
    pub(crate) audit: Arc<dyn AuditSink>,
}

impl BatchService {
    pub fn new(
        store: Arc<dyn BatchStore>,
        directory: Arc<dyn OrgDirectory>,
        audit: Arc<dyn AuditSink>,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            access: AccessResolver::new(directory.clone()),
            directory,
            audit,
        })
    }

    /// Record an audit event. Sink failures are logged and swallowed;
    /// the mutation they describe has already been committed.
    pub(crate) fn emit(&self, event: AuditEvent) {
        if let Err(e) = self.audit.record(&event) {
            warn!(
                action = %event.action,
                entity_id = %event.entity_id,
                "audit emission failed: {}",
                e
            );
        }
    }
}
