use tracing::{debug, info};

use campus_core::{Principal, new_id, now_rfc3339};

use crate::model::{
    ACTION_CASCADE_DELETE, ACTION_CREATE, ACTION_DELETE, ACTION_UPDATE, AuditEvent, Batch,
    BatchTreeNode, CreateBatch, UpdateBatch,
};
use crate::service::{AcademicsError, BatchService, tree};

const NAME_MAX_LEN: usize = 255;
const CODE_MAX_LEN: usize = 50;
const YEAR_MIN: i32 = 1900;
const YEAR_MAX: i32 = 2100;

impl BatchService {
    /// Create a root batch under a degree, or a child under an active
    /// parent batch.
    pub fn create_batch(
        &self,
        principal: &Principal,
        input: CreateBatch,
    ) -> Result<Batch, AcademicsError> {
        let name = input.name.trim().to_string();
        let code = input.code.trim().to_string();
        validate_name(&name)?;
        validate_code(&code)?;
        validate_years(input.start_year, input.end_year)?;

        let id = new_id();
        let parent_id = non_blank(input.parent_id);
        let requested_degree = non_blank(input.degree_id);
        let specialization_id = non_blank(input.specialization_id);

        let degree_id = match parent_id.as_deref() {
            None => {
                let degree_id = requested_degree.ok_or_else(|| {
                    AcademicsError::Validation("degree_id is required for root batches".into())
                })?;
                self.require_active_degree(&degree_id)?;
                degree_id
            }
            Some(pid) => {
                let parent = self.store.find_by_id(pid, false).map_err(|e| match e {
                    AcademicsError::NotFound(_) => {
                        AcademicsError::NotFound(format!("active parent batch '{}' not found", pid))
                    }
                    other => other,
                })?;

                if let Some(ref requested) = requested_degree {
                    if *requested != parent.degree_id {
                        return Err(AcademicsError::Validation(format!(
                            "cross-degree nesting: parent batch belongs to degree '{}', not '{}'",
                            parent.degree_id, requested
                        )));
                    }
                }
                self.require_active_degree(&parent.degree_id)?;

                if self.store.has_cycle(&id, &parent.id)? {
                    return Err(AcademicsError::Validation(
                        "creating this batch would create a cycle in the hierarchy".into(),
                    ));
                }
                parent.degree_id
            }
        };

        if let Some(ref sid) = specialization_id {
            self.check_specialization(sid, &degree_id)?;
        }

        let grant = self.access.authorize(principal, &degree_id)?;

        let now = now_rfc3339();
        let batch = self.store.insert(Batch {
            id,
            parent_id,
            degree_id,
            specialization_id,
            name,
            code,
            start_year: input.start_year,
            end_year: input.end_year,
            is_active: true,
            created_at: now.clone(),
            updated_at: now.clone(),
            deleted_at: None,
        })?;

        self.emit(
            AuditEvent::batch(ACTION_CREATE, &batch.id, principal.actor_id.as_deref(), now)
                .with_new(&batch),
        );
        info!(
            "batch {} ({}) created under degree {} ({:?})",
            batch.id, batch.code, batch.degree_id, grant
        );
        Ok(batch)
    }

    /// Apply a partial update. `parent_id` and `degree_id` never change.
    pub fn update_batch(
        &self,
        principal: &Principal,
        id: &str,
        patch: UpdateBatch,
    ) -> Result<Batch, AcademicsError> {
        let before = self.store.find_by_id(id, true)?;
        self.access.authorize(principal, &before.degree_id)?;

        if patch.is_empty() {
            return Err(AcademicsError::Validation("no fields to update".into()));
        }

        let mut batch = before.clone();
        if let Some(name) = patch.name {
            let name = name.trim().to_string();
            validate_name(&name)?;
            batch.name = name;
        }
        if let Some(code) = patch.code {
            let code = code.trim().to_string();
            validate_code(&code)?;
            batch.code = code;
        }
        if let Some(start) = patch.start_year {
            batch.start_year = start;
        }
        if let Some(end) = patch.end_year {
            batch.end_year = end;
        }
        validate_years(batch.start_year, batch.end_year)?;

        if let Some(sid) = patch.specialization_id {
            match non_blank(Some(sid)) {
                Some(sid) => {
                    self.check_specialization(&sid, &batch.degree_id)?;
                    batch.specialization_id = Some(sid);
                }
                None => batch.specialization_id = None,
            }
        }

        let now = now_rfc3339();
        batch.updated_at = now.clone();
        let updated = self.store.update(&batch)?;

        self.emit(
            AuditEvent::batch(ACTION_UPDATE, &updated.id, principal.actor_id.as_deref(), now)
                .with_old(&before)
                .with_new(&updated),
        );
        info!("batch {} updated", updated.id);
        Ok(updated)
    }

    /// Soft-delete a batch and its whole subtree, deepest nodes first.
    ///
    /// Descendants that are missing or already inactive are skipped, so a
    /// retry after a partial failure finishes the job without duplicating
    /// audit events.
    pub fn delete_batch(&self, principal: &Principal, id: &str) -> Result<(), AcademicsError> {
        let target = self.store.find_by_id(id, true)?;
        self.access.authorize(principal, &target.degree_id)?;
        let actor = principal.actor_id.as_deref();

        let descendants = self.store.all_descendant_ids(id).map_err(|e| {
            AcademicsError::Internal(format!("failed to enumerate descendants of '{}': {}", id, e))
        })?;

        let mut cascaded = 0usize;
        for did in &descendants {
            let node = match self.store.find_by_id(did, true) {
                Ok(node) => node,
                Err(AcademicsError::NotFound(_)) => continue,
                Err(e) => {
                    return Err(AcademicsError::Internal(format!(
                        "failed to load descendant batch '{}': {}",
                        did, e
                    )))
                }
            };
            if !node.is_active {
                debug!("descendant batch {} already inactive, skipping", did);
                continue;
            }

            let after = self.store.soft_delete(did).map_err(|e| {
                AcademicsError::Internal(format!("failed to delete descendant batch '{}': {}", did, e))
            })?;
            self.emit(
                AuditEvent::batch(ACTION_CASCADE_DELETE, did, actor, after.updated_at.clone())
                    .with_old(&node)
                    .with_new(&after),
            );
            cascaded += 1;
        }

        let after = self.store.soft_delete(id).map_err(|e| match e {
            AcademicsError::NotFound(m) => AcademicsError::NotFound(m),
            other => AcademicsError::Internal(format!("failed to delete batch '{}': {}", id, other)),
        })?;
        self.emit(
            AuditEvent::batch(ACTION_DELETE, id, actor, after.updated_at.clone())
                .with_old(&target)
                .with_new(&after),
        );

        info!("batch {} deleted ({} descendants cascaded)", id, cascaded);
        Ok(())
    }

    // ── Reads ──

    pub fn get_batch(&self, id: &str, include_inactive: bool) -> Result<Batch, AcademicsError> {
        self.store.find_by_id(id, include_inactive)
    }

    pub fn get_direct_children(
        &self,
        id: &str,
        include_inactive: bool,
    ) -> Result<Vec<Batch>, AcademicsError> {
        self.store.find_by_id(id, true)?;
        self.store.find_direct_children(id, include_inactive)
    }

    /// Root plus descendants as a flat list, root first.
    pub fn get_subtree(
        &self,
        id: &str,
        include_inactive: bool,
    ) -> Result<Vec<Batch>, AcademicsError> {
        self.store.find_by_id(id, true)?;
        self.store.find_subtree(id, include_inactive)
    }

    /// Subtree nested under its root. An inactive root with
    /// `include_inactive = false` has no visible tree and is `NotFound`.
    pub fn get_tree(
        &self,
        root_id: &str,
        include_inactive: bool,
    ) -> Result<BatchTreeNode, AcademicsError> {
        let nodes = self.get_subtree(root_id, include_inactive)?;
        tree::build_tree(nodes, root_id)
            .ok_or_else(|| AcademicsError::NotFound(format!("batch tree '{}' not found", root_id)))
    }

    /// Ancestors from the immediate parent up to the root.
    pub fn get_ancestors(&self, id: &str) -> Result<Vec<Batch>, AcademicsError> {
        self.store.ancestor_chain(id)
    }

    // ── Checks ──

    fn require_active_degree(&self, degree_id: &str) -> Result<(), AcademicsError> {
        match self.directory.degree(degree_id)? {
            Some(d) if d.is_active => Ok(()),
            _ => Err(AcademicsError::NotFound(format!(
                "active degree '{}' not found",
                degree_id
            ))),
        }
    }

    fn check_specialization(
        &self,
        specialization_id: &str,
        degree_id: &str,
    ) -> Result<(), AcademicsError> {
        match self.directory.specialization(specialization_id)? {
            Some(s) if s.is_active && s.degree_id == degree_id => Ok(()),
            Some(s) if s.is_active => Err(AcademicsError::Validation(format!(
                "specialization '{}' belongs to degree '{}', not '{}'",
                specialization_id, s.degree_id, degree_id
            ))),
            _ => Err(AcademicsError::Validation(format!(
                "specialization '{}' not found or inactive",
                specialization_id
            ))),
        }
    }
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn validate_name(name: &str) -> Result<(), AcademicsError> {
    let len = name.chars().count();
    if len == 0 || len > NAME_MAX_LEN {
        return Err(AcademicsError::Validation(format!(
            "name must be 1 to {} characters",
            NAME_MAX_LEN
        )));
    }
    Ok(())
}

fn validate_code(code: &str) -> Result<(), AcademicsError> {
    let len = code.chars().count();
    if len == 0 || len > CODE_MAX_LEN {
        return Err(AcademicsError::Validation(format!(
            "code must be 1 to {} characters",
            CODE_MAX_LEN
        )));
    }
    Ok(())
}

fn validate_years(start_year: i32, end_year: i32) -> Result<(), AcademicsError> {
    for (field, year) in [("start_year", start_year), ("end_year", end_year)] {
        if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
            return Err(AcademicsError::Validation(format!(
                "{} must be between {} and {}",
                field, YEAR_MIN, YEAR_MAX
            )));
        }
    }
    if end_year <= start_year {
        return Err(AcademicsError::Validation(
            "end_year must be greater than start_year".into(),
        ));
    }
    Ok(())
}
