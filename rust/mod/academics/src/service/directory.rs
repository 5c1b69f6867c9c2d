//! Read access to the org records batches hang off: faculties,
//! departments, degrees and specializations.
//!
//! These records are owned elsewhere; this module only looks them up.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use campus_kv::{KVStore, encode_json, get_json};

use crate::model::{Degree, Department, DirectorySeed, Faculty, Specialization};
use crate::service::AcademicsError;

/// Lookup of org records by id. Absent records are `Ok(None)`; inactive
/// ones are returned with `is_active = false`.
pub trait OrgDirectory: Send + Sync {
    fn degree(&self, id: &str) -> Result<Option<Degree>, AcademicsError>;
    fn department(&self, id: &str) -> Result<Option<Department>, AcademicsError>;
    fn specialization(&self, id: &str) -> Result<Option<Specialization>, AcademicsError>;
    fn faculty(&self, id: &str) -> Result<Option<Faculty>, AcademicsError>;
}

const DEGREE_PREFIX: &str = "academics:degree:";
const DEPARTMENT_PREFIX: &str = "academics:department:";
const SPECIALIZATION_PREFIX: &str = "academics:specialization:";
const FACULTY_PREFIX: &str = "academics:faculty:";

/// OrgDirectory over a KVStore, one JSON record per key.
pub struct KvOrgDirectory {
    kv: Arc<dyn KVStore>,
}

impl KvOrgDirectory {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self { kv }
    }

    /// Write every record of a seed in one transaction. Existing records
    /// with the same ids are replaced.
    pub fn seed(&self, seed: &DirectorySeed) -> Result<(), AcademicsError> {
        let mut entries: Vec<(String, Vec<u8>)> = Vec::new();
        for f in &seed.faculties {
            entries.push(entry(FACULTY_PREFIX, &f.id, f)?);
        }
        for d in &seed.departments {
            entries.push(entry(DEPARTMENT_PREFIX, &d.id, d)?);
        }
        for d in &seed.degrees {
            entries.push(entry(DEGREE_PREFIX, &d.id, d)?);
        }
        for s in &seed.specializations {
            entries.push(entry(SPECIALIZATION_PREFIX, &s.id, s)?);
        }

        let refs: Vec<(&str, &[u8])> = entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
            .collect();
        self.kv.batch_set(&refs)?;

        info!(
            "directory seeded: {} faculties, {} departments, {} degrees, {} specializations",
            seed.faculties.len(),
            seed.departments.len(),
            seed.degrees.len(),
            seed.specializations.len()
        );
        Ok(())
    }
}

fn entry<T: Serialize>(prefix: &str, id: &str, record: &T) -> Result<(String, Vec<u8>), AcademicsError> {
    let key = format!("{}{}", prefix, id);
    let bytes = encode_json(&key, record)?;
    Ok((key, bytes))
}

impl OrgDirectory for KvOrgDirectory {
    fn degree(&self, id: &str) -> Result<Option<Degree>, AcademicsError> {
        Ok(get_json(self.kv.as_ref(), &format!("{}{}", DEGREE_PREFIX, id))?)
    }

    fn department(&self, id: &str) -> Result<Option<Department>, AcademicsError> {
        Ok(get_json(self.kv.as_ref(), &format!("{}{}", DEPARTMENT_PREFIX, id))?)
    }

    fn specialization(&self, id: &str) -> Result<Option<Specialization>, AcademicsError> {
        Ok(get_json(
            self.kv.as_ref(),
            &format!("{}{}", SPECIALIZATION_PREFIX, id),
        )?)
    }

    fn faculty(&self, id: &str) -> Result<Option<Faculty>, AcademicsError> {
        Ok(get_json(self.kv.as_ref(), &format!("{}{}", FACULTY_PREFIX, id))?)
    }
}
