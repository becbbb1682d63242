//! Caller identity and capability checks.
//!
//! Server callers present `Authorization: Bearer <token>`. The token is
//! hashed with SHA-256 and matched against the `token_sha256` values in
//! `[[auth.users]]`. Unknown or missing tokens resolve to the anonymous
//! caller, which holds no capabilities.

use sha2::{Digest, Sha256};
use std::collections::HashSet;

use crate::config::AuthConfig;

#[derive(Debug, Clone)]
pub struct Caller {
    pub name: String,
    capabilities: HashSet<String>,
    privileged: bool,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self {
            name: "anonymous".to_string(),
            capabilities: HashSet::new(),
            privileged: false,
        }
    }

    /// Local operator (the CLI): every capability check passes.
    pub fn privileged(name: &str) -> Self {
        Self {
            name: name.to_string(),
            capabilities: HashSet::new(),
            privileged: true,
        }
    }

    pub fn with_capabilities<I, S>(name: &str, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            capabilities: capabilities.into_iter().map(Into::into).collect(),
            privileged: false,
        }
    }

    pub fn has(&self, capability: &str) -> bool {
        self.privileged || self.capabilities.contains(capability)
    }
}

/// Permission predicate shared by every ability registration.
pub fn caller_can(caller: &Caller, capability: &str) -> bool {
    caller.has(capability)
}

pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Extract the token from an `Authorization` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Map a bearer token to the configured caller it belongs to.
pub fn resolve_caller(auth: &AuthConfig, token: Option<&str>) -> Caller {
    let Some(token) = token else {
        return Caller::anonymous();
    };
    let digest = hash_token(token);
    auth.users
        .iter()
        .find(|u| u.token_sha256.eq_ignore_ascii_case(&digest))
        .map(|u| Caller::with_capabilities(&u.name, u.capabilities.iter().cloned()))
        .unwrap_or_else(Caller::anonymous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiUser;

    fn auth() -> AuthConfig {
        AuthConfig {
            capability: "edit_posts".to_string(),
            users: vec![ApiUser {
                name: "editor-bot".to_string(),
                token_sha256: hash_token("s3cret").to_uppercase(),
                capabilities: vec!["edit_posts".to_string()],
            }],
        }
    }

    #[test]
    fn test_hash_token_is_hex_sha256() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer  abc "), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
    }

    #[test]
    fn test_resolve_caller() {
        let auth = auth();
        let caller = resolve_caller(&auth, Some("s3cret"));
        assert_eq!(caller.name, "editor-bot");
        assert!(caller_can(&caller, "edit_posts"));
        assert!(!caller_can(&caller, "manage_options"));

        let stranger = resolve_caller(&auth, Some("wrong"));
        assert!(!caller_can(&stranger, "edit_posts"));
        assert!(!caller_can(&resolve_caller(&auth, None), "edit_posts"));
    }

    #[test]
    fn test_privileged_caller_passes_every_check() {
        assert!(caller_can(&Caller::privileged("cli"), "anything"));
    }
}
