use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse role carried by every principal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Employee => "employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One authenticable principal from the credential table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,                   // stable opaque id, e.g. "admin-001"
    pub email: String,                // unique key, case-sensitive
    pub name: String,                 // display name
    pub role: Role,
    #[serde(default)]
    pub permissions: BTreeSet<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,        // Argon2 PHC string, not exposed in JSON
}

/// Plaintext seed entry, hashed once when the store is built.
#[derive(Debug, Clone, Copy)]
pub struct SeedUser {
    pub id: &'static str,
    pub email: &'static str,
    pub name: &'static str,
    pub role: Role,
    pub permissions: &'static [&'static str],
    pub password: &'static str,
}
