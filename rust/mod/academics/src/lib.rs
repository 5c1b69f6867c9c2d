//! Academics module: hierarchical batch (cohort) management.
//!
//! # Resources
//!
//! - **Batch**: a cohort node in a tree anchored to one degree programme.
//!   Trees are created, edited and soft-deleted (whole subtrees, leaf
//!   first); every mutation is access-checked against the org hierarchy
//!   and audited.
//! - **Org directory**: read-only faculties, departments, degrees and
//!   specializations the batches refer to.
//!
//! # Usage
//!
//! ```ignore
//! use academics::AcademicsModule;
//!
//! let module = AcademicsModule::new(sql, kv, audit, Arc::new(GatewayHeaders))?;
//! let router = module.routes(); // Mount under /academics
//! ```

pub mod api;
pub mod model;
pub mod service;
pub mod store;

use std::sync::Arc;

use axum::Router;

use campus_core::{Module, PrincipalResolver, ServiceError};
use campus_kv::KVStore;
use campus_sql::SQLStore;

use crate::service::BatchService;
use crate::service::audit::AuditSink;
use crate::service::directory::KvOrgDirectory;
use crate::store::SqlBatchStore;

/// Academics module implementing the Module trait.
pub struct AcademicsModule {
    service: Arc<BatchService>,
    directory: Arc<KvOrgDirectory>,
    principals: Arc<dyn PrincipalResolver>,
}

impl AcademicsModule {
    /// Wire the batch store (SQL), org directory (KV) and audit sink
    /// together, creating the schema if needed.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        kv: Arc<dyn KVStore>,
        audit: Arc<dyn AuditSink>,
        principals: Arc<dyn PrincipalResolver>,
    ) -> Result<Self, ServiceError> {
        let store = Arc::new(SqlBatchStore::new(sql)?);
        let directory = Arc::new(KvOrgDirectory::new(kv));
        let service = BatchService::new(store, directory.clone(), audit);
        Ok(Self {
            service,
            directory,
            principals,
        })
    }

    pub fn service(&self) -> &Arc<BatchService> {
        &self.service
    }

    /// The writable directory, for seeding.
    pub fn directory(&self) -> &Arc<KvOrgDirectory> {
        &self.directory
    }
}

impl Module for AcademicsModule {
    fn name(&self) -> &str {
        "academics"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone(), self.principals.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::{FixedPrincipal, Principal};
    use campus_kv::RedbStore;
    use campus_sql::SqliteStore;

    use crate::model::{CreateBatch, DirectorySeed};
    use crate::service::audit::SqlAuditSink;

    #[test]
    fn module_wires_sql_kv_and_audit() {
        let tmp = tempfile::tempdir().unwrap();
        let sql: Arc<dyn SQLStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        let kv: Arc<dyn KVStore> = Arc::new(RedbStore::open(&tmp.path().join("dir.redb")).unwrap());
        let audit = Arc::new(SqlAuditSink::new(sql.clone()).unwrap());
        let admin = Principal::new("root", &["super_admin"]);

        let module = AcademicsModule::new(
            sql,
            kv,
            audit.clone(),
            Arc::new(FixedPrincipal(admin.clone())),
        )
        .unwrap();
        assert_eq!(module.name(), "academics");

        let seed: DirectorySeed = serde_json::from_value(serde_json::json!({
            "faculties": [{"id": "f1"}],
            "departments": [{"id": "d1", "faculty_id": "f1"}],
            "degrees": [{"id": "deg1", "department_id": "d1"}]
        }))
        .unwrap();
        module.directory().seed(&seed).unwrap();

        let batch = module
            .service()
            .create_batch(
                &admin,
                CreateBatch {
                    degree_id: Some("deg1".into()),
                    name: "First".into(),
                    code: "F1".into(),
                    start_year: 2024,
                    end_year: 2028,
                    ..Default::default()
                },
            )
            .unwrap();

        let events = audit.events_for(&batch.id).unwrap();
        assert_eq!(events, vec![("batch.create".to_string(), Some("root".to_string()))]);
    }
}
