use std::collections::HashMap;
use std::sync::Arc;

use campus_core::Principal;
use campus_sql::{SQLStore, SqliteStore};

use crate::model::{CreateBatch, Degree, DegreeLevel, Department, Faculty, Specialization};
use crate::service::audit::MemoryAuditSink;
use crate::service::directory::OrgDirectory;
use crate::service::{AcademicsError, BatchService};
use crate::store::SqlBatchStore;

/// In-memory directory built up fluently.
#[derive(Default)]
pub struct TestDirectory {
    faculties: HashMap<String, Faculty>,
    departments: HashMap<String, Department>,
    degrees: HashMap<String, Degree>,
    specializations: HashMap<String, Specialization>,
}

impl TestDirectory {
    pub fn faculty(mut self, id: &str) -> Self {
        self.faculties.insert(
            id.into(),
            Faculty {
                id: id.into(),
                name: id.into(),
                code: id.into(),
                is_active: true,
            },
        );
        self
    }

    pub fn department(mut self, id: &str, faculty_id: &str) -> Self {
        self.departments.insert(
            id.into(),
            Department {
                id: id.into(),
                faculty_id: faculty_id.into(),
                name: id.into(),
                code: id.into(),
                is_active: true,
            },
        );
        self
    }

    pub fn degree(self, id: &str, department_id: &str) -> Self {
        self.degree_with(id, department_id, true)
    }

    pub fn inactive_degree(self, id: &str, department_id: &str) -> Self {
        self.degree_with(id, department_id, false)
    }

    fn degree_with(mut self, id: &str, department_id: &str, is_active: bool) -> Self {
        self.degrees.insert(
            id.into(),
            Degree {
                id: id.into(),
                department_id: department_id.into(),
                name: id.into(),
                code: id.into(),
                level: DegreeLevel::Undergraduate,
                is_active,
            },
        );
        self
    }

    pub fn specialization(self, id: &str, degree_id: &str) -> Self {
        self.specialization_with(id, degree_id, true)
    }

    pub fn inactive_specialization(self, id: &str, degree_id: &str) -> Self {
        self.specialization_with(id, degree_id, false)
    }

    fn specialization_with(mut self, id: &str, degree_id: &str, is_active: bool) -> Self {
        self.specializations.insert(
            id.into(),
            Specialization {
                id: id.into(),
                degree_id: degree_id.into(),
                name: id.into(),
                code: id.into(),
                is_active,
            },
        );
        self
    }
}

impl OrgDirectory for TestDirectory {
    fn degree(&self, id: &str) -> Result<Option<Degree>, AcademicsError> {
        Ok(self.degrees.get(id).cloned())
    }

    fn department(&self, id: &str) -> Result<Option<Department>, AcademicsError> {
        Ok(self.departments.get(id).cloned())
    }

    fn specialization(&self, id: &str) -> Result<Option<Specialization>, AcademicsError> {
        Ok(self.specializations.get(id).cloned())
    }

    fn faculty(&self, id: &str) -> Result<Option<Faculty>, AcademicsError> {
        Ok(self.faculties.get(id).cloned())
    }
}

/// Org layout shared by service tests:
///
/// ```text
/// f-eng ─ dep-it ─ deg-it (spec-se, spec-net, spec-old inactive)
///                └ deg-cs
///       └ deg-retired (inactive)
/// f-sci ─ dep-bio ─ deg-bio (spec-gen)
/// ```
pub fn org() -> TestDirectory {
    TestDirectory::default()
        .faculty("f-eng")
        .faculty("f-sci")
        .department("dep-it", "f-eng")
        .department("dep-bio", "f-sci")
        .degree("deg-it", "dep-it")
        .degree("deg-cs", "dep-it")
        .inactive_degree("deg-retired", "dep-it")
        .degree("deg-bio", "dep-bio")
        .specialization("spec-se", "deg-it")
        .specialization("spec-net", "deg-it")
        .inactive_specialization("spec-old", "deg-it")
        .specialization("spec-gen", "deg-bio")
}

pub struct Fixture {
    pub svc: Arc<BatchService>,
    pub audit: Arc<MemoryAuditSink>,
    pub store: Arc<SqlBatchStore>,
    pub sql: Arc<dyn SQLStore>,
}

pub fn fixture() -> Fixture {
    let sql: Arc<dyn SQLStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
    let store = Arc::new(SqlBatchStore::new(sql.clone()).unwrap());
    let audit = Arc::new(MemoryAuditSink::new());
    let svc = BatchService::new(store.clone(), Arc::new(org()), audit.clone());
    Fixture {
        svc,
        audit,
        store,
        sql,
    }
}

pub fn super_admin() -> Principal {
    Principal::new("admin-1", &["super_admin"])
}

pub fn root_input(code: &str, degree_id: &str) -> CreateBatch {
    CreateBatch {
        degree_id: Some(degree_id.into()),
        name: format!("{} cohort", code),
        code: code.into(),
        start_year: 2021,
        end_year: 2025,
        ..Default::default()
    }
}

pub fn child_input(code: &str, parent_id: &str) -> CreateBatch {
    CreateBatch {
        parent_id: Some(parent_id.into()),
        name: format!("{} group", code),
        code: code.into(),
        start_year: 2021,
        end_year: 2025,
        ..Default::default()
    }
}
