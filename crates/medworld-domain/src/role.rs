//! User role types.

use serde::{Deserialize, Serialize};

/// Account role stored in the `users.type` column.
///
/// Wire format: lowercase string (`"superadmin"`, `"admin"`, `"doctor"`,
/// `"assistant"`, `"patient"`). Roles form a flat set; route access is
/// defined by explicit per-route role lists, not a privilege ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Superadmin,
    Admin,
    Doctor,
    Assistant,
    Patient,
}

impl Role {
    /// Every declared role, in declaration order.
    pub const ALL: [Role; 5] = [
        Role::Superadmin,
        Role::Admin,
        Role::Doctor,
        Role::Assistant,
        Role::Patient,
    ];

    /// Parse from the wire/database string. Returns `None` for unknown values.
    pub fn parse(v: &str) -> Option<Self> {
        match v {
            "superadmin" => Some(Self::Superadmin),
            "admin" => Some(Self::Admin),
            "doctor" => Some(Self::Doctor),
            "assistant" => Some(Self::Assistant),
            "patient" => Some(Self::Patient),
            _ => None,
        }
    }

    /// Convert to the wire/database string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Superadmin => "superadmin",
            Self::Admin => "admin",
            Self::Doctor => "doctor",
            Self::Assistant => "assistant",
            Self::Patient => "patient",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_known_role_strings() {
        assert_eq!(Role::parse("superadmin"), Some(Role::Superadmin));
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("doctor"), Some(Role::Doctor));
        assert_eq!(Role::parse("assistant"), Some(Role::Assistant));
        assert_eq!(Role::parse("patient"), Some(Role::Patient));
        assert_eq!(Role::parse("root"), None);
        assert_eq!(Role::parse("Admin"), None);
    }

    #[test]
    fn should_round_trip_every_role_through_as_str() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn should_serialize_roles_as_lowercase_strings() {
        assert_eq!(
            serde_json::to_string(&Role::Superadmin).unwrap(),
            "\"superadmin\""
        );
        assert_eq!(serde_json::to_string(&Role::Patient).unwrap(), "\"patient\"");
    }

    #[test]
    fn should_deserialize_roles_from_lowercase_strings() {
        let role: Role = serde_json::from_str("\"doctor\"").unwrap();
        assert_eq!(role, Role::Doctor);
        assert!(serde_json::from_str::<Role>("\"Doctor\"").is_err());
    }

    #[test]
    fn should_display_as_wire_string() {
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }
}
