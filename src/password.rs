use serde_json::Value;

/// Literal placeholder rendered into the password field; submitting it
/// unchanged leaves the stored password alone.
pub const PASSWORD_HOLDER: &str = "**********";

/// Validation policy applied to newly chosen passwords.
#[derive(Clone, Debug)]
pub struct PasswordPolicy {
    pub minimum_length: usize,
    /// How many previous password hashes to retain and refuse.
    pub history_depth: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            minimum_length: 6,
            history_depth: 4,
        }
    }
}

impl PasswordPolicy {
    /// Check a candidate password against the policy and the user's
    /// recent password hashes. Returns a user-visible message on
    /// rejection.
    pub fn validate_new_password(
        &self,
        candidate: &str,
        previous_hashes: &[String],
    ) -> Result<(), String> {
        if candidate == PASSWORD_HOLDER {
            return Err("Invalid password".to_string());
        }
        if candidate.len() < self.minimum_length {
            return Err(format!(
                "Password must be at least {} characters",
                self.minimum_length
            ));
        }
        for hash in previous_hashes.iter().take(self.history_depth) {
            if verify_password(candidate, hash) {
                return Err("Password was used recently, choose another".to_string());
            }
        }
        Ok(())
    }
}

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

/// Verify a password against a stored hash. An empty hash means the
/// login is disabled and never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    if hash.is_empty() {
        return false;
    }
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Decode the stored JSON array of previous password hashes.
pub fn decode_password_history(raw: &str) -> Vec<String> {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|v| {
            v.as_array().map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(|s| s.to_string()))
                    .collect()
            })
        })
        .unwrap_or_default()
}

/// Encode the history with the newest hash first, trimmed to the policy
/// depth.
pub fn push_password_history(history: &[String], new_hash: &str, depth: usize) -> String {
    let mut updated = Vec::with_capacity(depth);
    updated.push(new_hash.to_string());
    updated.extend(history.iter().take(depth.saturating_sub(1)).cloned());
    serde_json::to_string(&updated).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_rejected() {
        let policy = PasswordPolicy::default();
        assert!(policy.validate_new_password(PASSWORD_HOLDER, &[]).is_err());
    }

    #[test]
    fn short_password_is_rejected() {
        let policy = PasswordPolicy::default();
        assert!(policy.validate_new_password("abc", &[]).is_err());
        assert!(policy.validate_new_password("abcdef", &[]).is_ok());
    }

    #[test]
    fn reused_password_is_rejected() {
        let policy = PasswordPolicy::default();
        let old = hash_password("summer2024").unwrap();
        assert!(policy
            .validate_new_password("summer2024", &[old.clone()])
            .is_err());
        assert!(policy.validate_new_password("winter2025", &[old]).is_ok());
    }

    #[test]
    fn empty_hash_never_verifies() {
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn history_round_trip() {
        let encoded = push_password_history(&["b".into(), "c".into(), "d".into()], "a", 3);
        let decoded = decode_password_history(&encoded);
        assert_eq!(decoded, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
    }

    #[test]
    fn malformed_history_decodes_empty() {
        assert!(decode_password_history("not json").is_empty());
        assert!(decode_password_history("{\"a\":1}").is_empty());
    }
}
