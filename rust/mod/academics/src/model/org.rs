use serde::{Deserialize, Serialize};

/// A faculty: the top of the org hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// A department belongs to exactly one faculty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    pub faculty_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Degree programme level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegreeLevel {
    #[default]
    Undergraduate,
    Postgraduate,
}

/// A degree programme, owned by one department. Batch trees hang off it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Degree {
    pub id: String,
    pub department_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub level: DegreeLevel,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// A specialization track within one degree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specialization {
    pub id: String,
    pub degree_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Bulk directory contents, as loaded from a seed file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectorySeed {
    #[serde(default)]
    pub faculties: Vec<Faculty>,
    #[serde(default)]
    pub departments: Vec<Department>,
    #[serde(default)]
    pub degrees: Vec<Degree>,
    #[serde(default)]
    pub specializations: Vec<Specialization>,
}

fn default_active() -> bool {
    true
}
