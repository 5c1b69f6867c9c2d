//! Role checks for batch mutations.
//!
//! A principal may touch a batch if it is a super admin, or an admin of the
//! faculty or department that owns the batch's degree. Ownership is always
//! resolved from the directory; scope claims on the principal are only
//! compared against it.

use std::sync::Arc;

use tracing::debug;

use campus_core::Principal;

use crate::service::AcademicsError;
use crate::service::directory::OrgDirectory;

pub const ROLE_SUPER_ADMIN: &str = "super_admin";
pub const ROLE_FACULTY_ADMIN: &str = "faculty_admin";
pub const ROLE_DEPARTMENT_ADMIN: &str = "department_admin";

/// Why access was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    SuperAdmin,
    FacultyAdmin,
    DepartmentAdmin,
}

/// Org scope that owns a degree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ownership {
    pub degree_id: String,
    pub department_id: String,
    pub faculty_id: String,
}

pub struct AccessResolver {
    directory: Arc<dyn OrgDirectory>,
}

impl AccessResolver {
    pub fn new(directory: Arc<dyn OrgDirectory>) -> Self {
        Self { directory }
    }

    /// Walk degree -> department, reading the faculty off the department.
    /// Activeness is not checked here.
    pub fn ownership(&self, degree_id: &str) -> Result<Ownership, AcademicsError> {
        let degree = self
            .directory
            .degree(degree_id)?
            .ok_or_else(|| AcademicsError::NotFound(format!("degree '{}' not found", degree_id)))?;
        let department = self.directory.department(&degree.department_id)?.ok_or_else(|| {
            AcademicsError::NotFound(format!("department '{}' not found", degree.department_id))
        })?;

        Ok(Ownership {
            degree_id: degree.id,
            department_id: department.id,
            faculty_id: department.faculty_id,
        })
    }

    /// Decide whether `principal` may mutate batches under `degree_id`.
    pub fn authorize(&self, principal: &Principal, degree_id: &str) -> Result<Grant, AcademicsError> {
        if principal.has_role(ROLE_SUPER_ADMIN) {
            return Ok(Grant::SuperAdmin);
        }

        let owner = self.ownership(degree_id)?;

        if principal.has_role(ROLE_FACULTY_ADMIN)
            && principal.faculty_id.as_deref() == Some(owner.faculty_id.as_str())
        {
            return Ok(Grant::FacultyAdmin);
        }

        if principal.has_role(ROLE_DEPARTMENT_ADMIN)
            && principal.department_id.as_deref() == Some(owner.department_id.as_str())
        {
            return Ok(Grant::DepartmentAdmin);
        }

        debug!(
            "access denied: actor {:?} roles {:?} on degree {} (department {}, faculty {})",
            principal.actor_id, principal.roles, owner.degree_id, owner.department_id, owner.faculty_id
        );
        Err(AcademicsError::Forbidden(
            "insufficient permissions to manage batches for this degree".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::TestDirectory;

    fn resolver() -> AccessResolver {
        let dir = TestDirectory::default()
            .faculty("f1")
            .faculty("f2")
            .department("dep1", "f1")
            .department("dep2", "f2")
            .degree("deg1", "dep1")
            .degree("orphan", "dep-gone");
        AccessResolver::new(Arc::new(dir))
    }

    #[test]
    fn super_admin_skips_lookups() {
        let p = Principal::new("u", &[ROLE_SUPER_ADMIN]);
        assert_eq!(resolver().authorize(&p, "anything").unwrap(), Grant::SuperAdmin);
    }

    #[test]
    fn faculty_admin_needs_matching_faculty() {
        let r = resolver();
        let ok = Principal::new("u", &[ROLE_FACULTY_ADMIN]).with_faculty("f1");
        assert_eq!(r.authorize(&ok, "deg1").unwrap(), Grant::FacultyAdmin);

        let other = Principal::new("u", &[ROLE_FACULTY_ADMIN]).with_faculty("f2");
        assert!(matches!(r.authorize(&other, "deg1"), Err(AcademicsError::Forbidden(_))));

        let unscoped = Principal::new("u", &[ROLE_FACULTY_ADMIN]);
        assert!(matches!(r.authorize(&unscoped, "deg1"), Err(AcademicsError::Forbidden(_))));
    }

    #[test]
    fn department_hint_is_cross_checked() {
        let r = resolver();
        let ok = Principal::new("u", &[ROLE_DEPARTMENT_ADMIN]).with_department("dep1");
        assert_eq!(r.authorize(&ok, "deg1").unwrap(), Grant::DepartmentAdmin);

        let wrong = Principal::new("u", &[ROLE_DEPARTMENT_ADMIN]).with_department("dep2");
        assert!(matches!(r.authorize(&wrong, "deg1"), Err(AcademicsError::Forbidden(_))));
    }

    #[test]
    fn scope_without_role_is_denied() {
        let p = Principal::new("u", &["lecturer"])
            .with_faculty("f1")
            .with_department("dep1");
        assert!(matches!(resolver().authorize(&p, "deg1"), Err(AcademicsError::Forbidden(_))));
    }

    #[test]
    fn missing_org_records_are_not_found() {
        let r = resolver();
        let p = Principal::new("u", &[ROLE_FACULTY_ADMIN]).with_faculty("f1");
        assert!(matches!(r.authorize(&p, "nope"), Err(AcademicsError::NotFound(_))));
        assert!(matches!(r.authorize(&p, "orphan"), Err(AcademicsError::NotFound(_))));
    }
}
