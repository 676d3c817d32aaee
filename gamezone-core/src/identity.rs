//! Identity types for GameZone principals and resources.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declare a string-backed identifier newtype.
///
/// Backend identifiers are opaque strings (document ids), so the newtypes
/// only exist to keep a `GameId` from being passed where a `MemberId` is
/// expected.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// True when the id is empty or whitespace. Reads keyed by a
            /// blank id are never issued.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Identifier of a catalog game.
    GameId
);
string_id!(
    /// Identifier of a member account.
    MemberId
);
string_id!(
    /// Identifier of a merchandise product.
    ProductId
);
string_id!(
    /// Identifier of an admin account.
    AdminId
);
string_id!(RechargeId);
string_id!(TransactionId);

/// Role of the authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// Route a freshly authenticated principal lands on.
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::User => "/user/dashboard",
        }
    }
}

/// The authenticated principal held by the session store.
///
/// Serialized as-is into durable storage, so field names follow the
/// backend's camelCase convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<MemberId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// A well-formed identity has a non-blank id and name. Anything else
    /// read back from storage is discarded.
    pub fn is_well_formed(&self) -> bool {
        !self.id.trim().is_empty() && !self.name.trim().is_empty()
    }
}

/// Login credentials. The caller (login tab) decides which flow runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Credentials {
    Admin { username: String },
    Member { email: String },
}

impl Credentials {
    pub fn admin(username: impl Into<String>) -> Self {
        Self::Admin {
            username: username.into(),
        }
    }

    pub fn member(email: impl Into<String>) -> Self {
        Self::Member {
            email: email.into(),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Credentials::Admin { .. } => Role::Admin,
            Credentials::Member { .. } => Role::User,
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Credentials::Admin { username } => username.trim().is_empty(),
            Credentials::Member { email } => email.trim().is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"USER\"");
    }

    #[test]
    fn test_identity_skips_absent_optionals() {
        let identity = Identity {
            id: "a-1".into(),
            name: "Ada".into(),
            email: "ada@gamezone.test".into(),
            role: Role::Admin,
            member_id: None,
            phone_number: None,
            token: None,
        };
        let json = serde_json::to_value(&identity).unwrap();
        assert!(json.get("memberId").is_none());
        assert_eq!(json["role"], "ADMIN");
    }

    #[test]
    fn test_blank_ids() {
        assert!(GameId::new("  ").is_blank());
        assert!(!GameId::new("g1").is_blank());
    }

    #[test]
    fn test_credentials_role() {
        assert_eq!(Credentials::admin("root").role(), Role::Admin);
        assert_eq!(Credentials::member("a@b.c").role(), Role::User);
        assert!(Credentials::member("").is_blank());
    }

    #[test]
    fn test_malformed_identity_detected() {
        let identity: Identity = serde_json::from_value(serde_json::json!({
            "id": "",
            "name": "x",
            "email": "x@y.z",
            "role": "USER"
        }))
        .unwrap();
        assert!(!identity.is_well_formed());
    }
}
