use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use lazy_static::lazy_static;
use rand::{distributions::Alphanumeric, Rng};
use regex::Regex;
use tracing::{debug, info};

use crate::auth::{
    errors::StoreError,
    password::{hash_password, hash_password_like, is_valid_hash},
    repo_types::{Role, SeedUser, UserRecord},
};

/// Demo principals shipped with the service; used when no `USERS_FILE` is configured.
pub const DEMO_USERS: &[SeedUser] = &[
    SeedUser {
        id: "admin-001",
        email: "admin@test.com",
        name: "System Administrator",
        role: Role::Admin,
        permissions: &["all"],
        password: "AdminPassword123!",
    },
    SeedUser {
        id: "manager-001",
        email: "manager@test.com",
        name: "Department Manager",
        role: Role::Manager,
        permissions: &["read", "write", "manage_team"],
        password: "ManagerPassword123!",
    },
    SeedUser {
        id: "employee-001",
        email: "john.doe@test.com",
        name: "John Doe",
        role: Role::Employee,
        permissions: &["read", "write_own"],
        password: "TestPassword123!",
    },
];

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Read-only credential table, keyed by email.
///
/// Built once at startup and shared behind an `Arc`; there is no way to
/// mutate it afterwards.
#[derive(Debug)]
pub struct CredentialStore {
    records: Vec<UserRecord>,
    by_email: HashMap<String, usize>,
    decoy_hash: String,
}

impl CredentialStore {
    /// Builds the store from already-hashed records.
    pub fn from_records(records: Vec<UserRecord>) -> Result<Self, StoreError> {
        let mut by_email = HashMap::with_capacity(records.len());
        for (idx, rec) in records.iter().enumerate() {
            if rec.id.trim().is_empty() {
                return Err(StoreError::MissingId(rec.email.clone()));
            }
            if !is_valid_email(&rec.email) {
                return Err(StoreError::InvalidEmail(rec.email.clone()));
            }
            if !is_valid_hash(&rec.password_hash) {
                return Err(StoreError::InvalidHash(rec.email.clone()));
            }
            if by_email.insert(rec.email.clone(), idx).is_some() {
                return Err(StoreError::DuplicateEmail(rec.email.clone()));
            }
        }

        // Unknown emails are verified against this so a miss costs the same as a
        // wrong password; it carries the table's own argon2 parameters.
        let secret: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let decoy_hash = match records.first() {
            Some(rec) => hash_password_like(&secret, &rec.password_hash),
            None => hash_password(&secret),
        }
        .map_err(StoreError::Hash)?;

        debug!(users = records.len(), "credential store built");
        Ok(Self {
            records,
            by_email,
            decoy_hash,
        })
    }

    /// Hashes plaintext seed passwords and builds the store.
    pub fn from_seed(seed: &[SeedUser]) -> Result<Self, StoreError> {
        let records = seed
            .iter()
            .map(|s| -> Result<UserRecord, StoreError> {
                Ok(UserRecord {
                    id: s.id.to_string(),
                    email: s.email.to_string(),
                    name: s.name.to_string(),
                    role: s.role,
                    permissions: s.permissions.iter().map(|p| p.to_string()).collect::<BTreeSet<_>>(),
                    password_hash: hash_password(s.password).map_err(StoreError::Hash)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_records(records)
    }

    pub fn demo() -> Result<Self, StoreError> {
        Self::from_seed(DEMO_USERS)
    }

    /// Loads a JSON array of `UserRecord`s (with `password_hash`) from disk.
    pub fn from_json_file(path: &Path) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let records: Vec<UserRecord> = serde_json::from_str(&raw)?;
        info!(path = %path.display(), users = records.len(), "loaded credential table");
        Self::from_records(records)
    }

    /// Exact, case-sensitive lookup.
    pub fn find_by_email(&self, email: &str) -> Option<&UserRecord> {
        self.by_email.get(email).map(|&idx| &self.records[idx])
    }

    pub fn records(&self) -> impl Iterator<Item = &UserRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn decoy_hash(&self) -> &str {
        &self.decoy_hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::{hash_with, verify_password};
    use argon2::{password_hash::PasswordHash, Algorithm, Argon2, Params, Version};
    use std::io::Write;

    fn record(id: &str, email: &str) -> UserRecord {
        UserRecord {
            id: id.into(),
            email: email.into(),
            name: "Someone".into(),
            role: Role::Employee,
            permissions: BTreeSet::new(),
            password_hash: hash_password("pw").unwrap(),
        }
    }

    #[test]
    fn demo_store_finds_seeded_users() {
        let store = CredentialStore::demo().expect("demo store");
        assert_eq!(store.len(), 3);

        let admin = store.find_by_email("admin@test.com").expect("admin present");
        assert_eq!(admin.id, "admin-001");
        assert_eq!(admin.role, Role::Admin);
        assert!(admin.permissions.contains("all"));
        assert!(verify_password("AdminPassword123!", &admin.password_hash).unwrap());
        assert!(!admin.password_hash.contains("AdminPassword123!"));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let store = CredentialStore::demo().unwrap();
        assert!(store.find_by_email("Admin@Test.com").is_none());
        assert!(store.find_by_email("nobody@test.com").is_none());
    }

    #[test]
    fn records_keep_table_order() {
        let store = CredentialStore::demo().unwrap();
        let ids: Vec<_> = store.records().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["admin-001", "manager-001", "employee-001"]);
    }

    #[test]
    fn rejects_duplicate_email() {
        let err = CredentialStore::from_records(vec![
            record("a", "dup@test.com"),
            record("b", "dup@test.com"),
        ])
        .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(e) if e == "dup@test.com"));
    }

    #[test]
    fn rejects_bad_email_and_plaintext_hash() {
        let err = CredentialStore::from_records(vec![record("a", "not-an-email")]).unwrap_err();
        assert!(matches!(err, StoreError::InvalidEmail(_)));

        let mut plain = record("a", "a@test.com");
        plain.password_hash = "hunter2".into();
        let err = CredentialStore::from_records(vec![plain]).unwrap_err();
        assert!(matches!(err, StoreError::InvalidHash(_)));
    }

    #[test]
    fn rejects_blank_id() {
        let err = CredentialStore::from_records(vec![record("  ", "a@test.com")]).unwrap_err();
        assert!(matches!(err, StoreError::MissingId(_)));
    }

    #[test]
    fn decoy_uses_table_argon2_params() {
        let argon2 = Argon2::new(
            Algorithm::Argon2id,
            Version::V0x13,
            Params::new(65536, 3, 1, None).unwrap(),
        );
        let mut rec = record("a", "a@test.com");
        rec.password_hash = hash_with(&argon2, "pw").unwrap();
        let store = CredentialStore::from_records(vec![rec]).unwrap();

        let decoy = PasswordHash::new(store.decoy_hash()).unwrap();
        let params = Params::try_from(&decoy).unwrap();
        assert_eq!(decoy.algorithm, Algorithm::Argon2id.ident());
        assert_eq!((params.m_cost(), params.t_cost(), params.p_cost()), (65536, 3, 1));
    }

    #[test]
    fn empty_table_still_has_decoy() {
        let store = CredentialStore::from_records(Vec::new()).unwrap();
        assert_eq!(store.len(), 0);
        assert!(is_valid_hash(store.decoy_hash()));
        assert!(store.find_by_email("admin@test.com").is_none());
    }

    #[test]
    fn serialized_record_omits_hash() {
        let rec = record("a", "a@test.com");
        let json = serde_json::to_string(&rec).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("$argon2"));
    }

    #[test]
    fn loads_table_from_json_file() {
        let hash = hash_password("FilePassword1!").unwrap();
        let body = serde_json::json!([{
            "id": "ops-007",
            "email": "ops@test.com",
            "name": "Ops",
            "role": "manager",
            "permissions": ["read"],
            "password_hash": hash,
        }]);

        let path = std::env::temp_dir().join(format!("hudur-users-{}.json", std::process::id()));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.to_string().as_bytes()).unwrap();
        drop(f);

        let store = CredentialStore::from_json_file(&path).expect("load");
        std::fs::remove_file(&path).ok();

        let ops = store.find_by_email("ops@test.com").unwrap();
        assert_eq!(ops.role, Role::Manager);
        assert!(verify_password("FilePassword1!", &ops.password_hash).unwrap());
    }

    #[test]
    fn json_file_with_unknown_role_is_rejected() {
        let body = r#"[{"id":"x","email":"x@test.com","name":"X","role":"root","password_hash":"$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaA"}]"#;
        let path = std::env::temp_dir().join(format!("hudur-badrole-{}.json", std::process::id()));
        std::fs::write(&path, body).unwrap();
        let err = CredentialStore::from_json_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, StoreError::Parse(_)));
    }
}
