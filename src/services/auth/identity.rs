use std::fmt;

use serde::{Deserialize, Serialize};

const ROLE_PREFIX: &str = "ROLE_";

/// Single-role model: every account carries exactly one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    /// Accepts `"ADMIN"`, `"admin"` and `"ROLE_ADMIN"` alike.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let bare = raw.strip_prefix(ROLE_PREFIX).unwrap_or(raw);
        match bare.to_ascii_uppercase().as_str() {
            "USER" => Some(Role::User),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn authority(&self) -> String {
        authority_for(self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `"X"` and `"ROLE_X"` both map to `"ROLE_X"`.
pub fn authority_for(role: &str) -> String {
    let role = role.trim();
    let bare = role.strip_prefix(ROLE_PREFIX).unwrap_or(role);
    format!("{ROLE_PREFIX}{bare}")
}

/// Who a token is issued for. `subject` is always the lowercased email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub role: Role,
}

impl Identity {
    pub fn new(subject: &str, role: Role) -> Self {
        Self {
            subject: normalize_email(subject),
            role,
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authority_is_prefixed_once() {
        assert_eq!(authority_for("ADMIN"), "ROLE_ADMIN");
        assert_eq!(authority_for("ROLE_ADMIN"), "ROLE_ADMIN");
        assert_eq!(authority_for(" USER "), "ROLE_USER");
    }

    #[test]
    fn role_parse_accepts_prefixed_and_lowercase() {
        assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::parse("ROLE_USER"), Some(Role::User));
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("root"), None);
    }

    #[test]
    fn identity_lowercases_subject() {
        let id = Identity::new("  A@X.com ", Role::User);
        assert_eq!(id.subject, "a@x.com");
    }

    #[test]
    fn role_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
    }
}
