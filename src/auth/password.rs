use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    hash_with(&Argon2::default(), plain)
}

/// Hashes `plain` with the algorithm, version and cost parameters of an
/// existing PHC hash, so verifying against it costs the same.
pub fn hash_password_like(plain: &str, reference: &str) -> anyhow::Result<String> {
    let parsed = parse(reference)?;
    let algorithm = Algorithm::try_from(parsed.algorithm).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let version = match parsed.version {
        Some(v) => Version::try_from(v).map_err(|e| anyhow::anyhow!(e.to_string()))?,
        None => Version::default(),
    };
    let params = Params::try_from(&parsed).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    hash_with(&Argon2::new(algorithm, version, params), plain)
}

pub(crate) fn hash_with(argon2: &Argon2<'_>, plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Checks `plain` against a PHC hash string. Cost parameters come from the
/// hash itself and the comparison is constant time; a mismatch is
/// `Ok(false)`, only an unparsable hash is an error.
pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = parse(hash)?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

pub fn is_valid_hash(hash: &str) -> bool {
    PasswordHash::new(hash).is_ok()
}

fn parse(hash: &str) -> anyhow::Result<PasswordHash<'_>> {
    PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("AdminPassword123!").unwrap();
        let b = hash_password("AdminPassword123!").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn hash_like_copies_reference_parameters() {
        let custom = Argon2::new(
            Algorithm::Argon2i,
            Version::V0x13,
            Params::new(8 * 1024, 3, 1, None).unwrap(),
        );
        let reference = hash_with(&custom, "stored").unwrap();
        let decoy = hash_password_like("random", &reference).unwrap();

        let (r, d) = (PasswordHash::new(&reference).unwrap(), PasswordHash::new(&decoy).unwrap());
        assert_eq!(d.algorithm, r.algorithm);
        assert_eq!(d.version, r.version);
        let (rp, dp) = (Params::try_from(&r).unwrap(), Params::try_from(&d).unwrap());
        assert_eq!((dp.m_cost(), dp.t_cost(), dp.p_cost()), (8 * 1024, 3, 1));
        assert_eq!((dp.m_cost(), dp.t_cost(), dp.p_cost()), (rp.m_cost(), rp.t_cost(), rp.p_cost()));
        assert!(verify_password("random", &decoy).unwrap());
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
        assert!(!is_valid_hash("not-a-valid-hash"));
    }
}
