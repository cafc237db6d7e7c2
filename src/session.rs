use crate::error::{GradeError, GradeResult};
use serde::{Deserialize, Serialize};

/// Externally supplied role flag. Nothing here verifies identity; the role
/// only decides which methods are exposed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    #[default]
    Student,
    Teacher,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
        }
    }

    /// Unknown or missing values fall back to the student view.
    pub fn parse_lenient(raw: Option<&str>) -> Role {
        match raw.map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "teacher" => Role::Teacher,
            _ => Role::Student,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ViewGrades,
    EditGrades,
    ImportGrades,
}

#[derive(Debug, Clone, Default)]
pub struct RoleSession {
    role: Role,
}

impl RoleSession {
    pub fn new(role: Role) -> Self {
        Self { role }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::ViewGrades => true,
            Capability::EditGrades | Capability::ImportGrades => self.role == Role::Teacher,
        }
    }

    pub fn require(&self, capability: Capability, method: &str) -> GradeResult<()> {
        if self.allows(capability) {
            Ok(())
        } else {
            Err(GradeError::NotPermitted {
                method: method.to_string(),
                role: self.role.as_str(),
            })
        }
    }
}
