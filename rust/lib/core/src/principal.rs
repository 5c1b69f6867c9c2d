//! Authenticated principal and its extraction at the HTTP boundary.
//!
//! Token validation happens upstream (the gateway). By the time a request
//! reaches a module, identity arrives as plain headers. A module resolves
//! the principal once per request and passes it explicitly into its
//! service layer; nothing below the handlers reads request state.

use std::collections::BTreeSet;

use axum::http::HeaderMap;

use crate::ServiceError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLES_HEADER: &str = "x-user-roles";
pub const FACULTY_ID_HEADER: &str = "x-faculty-id";
pub const DEPARTMENT_ID_HEADER: &str = "x-department-id";

/// An authenticated actor: its roles and the org scope it is bound to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    /// User id recorded as the audit actor.
    pub actor_id: Option<String>,
    pub roles: BTreeSet<String>,
    /// Faculty a `faculty_admin` is bound to.
    pub faculty_id: Option<String>,
    /// Department scoping hint. Only honoured after cross-checking
    /// against the resolved department of the target.
    pub department_id: Option<String>,
}

impl Principal {
    /// Build a principal with the given actor and roles and no scope.
    pub fn new(actor_id: impl Into<String>, roles: &[&str]) -> Self {
        Self {
            actor_id: Some(actor_id.into()),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            faculty_id: None,
            department_id: None,
        }
    }

    pub fn with_faculty(mut self, faculty_id: impl Into<String>) -> Self {
        self.faculty_id = Some(faculty_id.into());
        self
    }

    pub fn with_department(mut self, department_id: impl Into<String>) -> Self {
        self.department_id = Some(department_id.into());
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// Turns request headers into a [`Principal`].
///
/// Implementations return `ServiceError::Unauthorized` when no identity is
/// present.
pub trait PrincipalResolver: Send + Sync + 'static {
    fn resolve(&self, headers: &HeaderMap) -> Result<Principal, ServiceError>;
}

/// Reads the identity headers forwarded by the gateway.
///
/// `X-User-Roles` is a comma separated list; blank entries are dropped.
pub struct GatewayHeaders;

impl PrincipalResolver for GatewayHeaders {
    fn resolve(&self, headers: &HeaderMap) -> Result<Principal, ServiceError> {
        let actor_id = header_str(headers, USER_ID_HEADER)
            .ok_or_else(|| ServiceError::Unauthorized("missing authenticated user".into()))?;

        let roles = header_str(headers, USER_ROLES_HEADER)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Principal {
            actor_id: Some(actor_id.to_string()),
            roles,
            faculty_id: header_str(headers, FACULTY_ID_HEADER).map(str::to_string),
            department_id: header_str(headers, DEPARTMENT_ID_HEADER).map(str::to_string),
        })
    }
}

/// Always resolves to the same principal. Used for tests and single-user
/// tooling.
pub struct FixedPrincipal(pub Principal);

impl PrincipalResolver for FixedPrincipal {
    fn resolve(&self, _headers: &HeaderMap) -> Result<Principal, ServiceError> {
        Ok(self.0.clone())
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn gateway_headers_parse_roles_and_scope() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("u1"));
        headers.insert("x-user-roles", HeaderValue::from_static("faculty_admin, ,lecturer"));
        headers.insert("x-faculty-id", HeaderValue::from_static("f1"));

        let p = GatewayHeaders.resolve(&headers).unwrap();
        assert_eq!(p.actor_id.as_deref(), Some("u1"));
        assert!(p.has_role("faculty_admin"));
        assert!(p.has_role("lecturer"));
        assert_eq!(p.roles.len(), 2);
        assert_eq!(p.faculty_id.as_deref(), Some("f1"));
        assert!(p.department_id.is_none());
    }

    #[test]
    fn gateway_headers_require_user() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-roles", HeaderValue::from_static("super_admin"));
        let err = GatewayHeaders.resolve(&headers).unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[test]
    fn builder_sets_scope() {
        let p = Principal::new("u2", &["department_admin"]).with_department("d1");
        assert!(p.has_role("department_admin"));
        assert!(!p.has_role("super_admin"));
        assert_eq!(p.department_id.as_deref(), Some("d1"));
    }
}
