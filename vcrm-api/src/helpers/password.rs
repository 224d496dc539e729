use pbkdf2::pbkdf2_hmac;
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::Sha256;

pub const DEFAULT_ITERATIONS: u32 = 200_000;

const SCHEME: &str = "pbkdf2_sha256";

pub fn generate_salt() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

fn derive_key(password: &str, salt: &str, iterations: u32) -> String {
    let mut key = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut key);
    key.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Stored as `pbkdf2_sha256$<iterations>$<hex key>` so the cost can be raised
/// without invalidating existing hashes
pub fn hash_password_with(password: &str, salt: &str, iterations: u32) -> String {
    let iterations = iterations.max(1);
    format!("{}${}${}", SCHEME, iterations, derive_key(password, salt, iterations))
}

pub fn hash_password(password: &str, salt: &str) -> String {
    hash_password_with(password, salt, DEFAULT_ITERATIONS)
}

pub fn verify_password(password: &str, salt: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(SCHEME), Some(iterations), Some(expected)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    if iterations == 0 {
        return false;
    }

    constant_time_eq(&derive_key(password, salt, iterations), expected)
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_depends_on_salt() {
        let salt = generate_salt();
        assert_eq!(salt.len(), 16);

        let hash = hash_password_with("hunter2", &salt, 1_000);
        assert!(verify_password("hunter2", &salt, &hash));
        assert!(!verify_password("hunter3", &salt, &hash));
        assert_ne!(hash, hash_password_with("hunter2", "other-salt", 1_000));
    }

    #[test]
    fn test_stored_hash_carries_its_cost() {
        let hash = hash_password("hunter2", "salt");
        assert!(hash.starts_with("pbkdf2_sha256$200000$"));
        assert_eq!(hash.rsplit('$').next().map(str::len), Some(64));
        assert!(verify_password("hunter2", "salt", &hash));

        // a different iteration count yields a different key for the same input
        let cheap = hash_password_with("hunter2", "salt", 1_000);
        assert_ne!(cheap.rsplit('$').next(), hash.rsplit('$').next());
        assert!(verify_password("hunter2", "salt", &cheap));
    }

    #[test]
    fn test_plain_sha256_hashes_are_rejected() {
        let legacy = "e5e9fa1ba31ecd1ae84f75caaa474f3a663f05f4e55c1f1bb5c1d1d5e8d6e1b0";
        assert!(!verify_password("hunter2", "salt", legacy));
        assert!(!verify_password("hunter2", "salt", "pbkdf2_sha256$0$00"));
        assert!(!verify_password("hunter2", "salt", "pbkdf2_sha256$abc$00"));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "abcd"));
    }
}
