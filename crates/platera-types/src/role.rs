//! Account roles as reported by the backend `user_type` field.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Role of an authenticated account.
///
/// The backend sends upper-case names (`"ADMIN"`), but values cached by older
/// clients are lower-case, so parsing is case-insensitive. Anything
/// unrecognized decodes to [`Role::Unknown`] instead of failing the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    Admin,
    Manager,
    Staff,
    Customer,
    #[default]
    Unknown,
}

impl Role {
    /// Returns the roles that can sign in to the management client.
    pub fn all() -> &'static [Role] {
        &[Role::Admin, Role::Manager, Role::Staff]
    }

    /// Returns the wire identifier (`"ADMIN"`, `"STAFF"`, ...).
    pub fn id(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Staff => "STAFF",
            Role::Customer => "CUSTOMER",
            Role::Unknown => "UNKNOWN",
        }
    }

    /// Parses a role identifier, ignoring case and surrounding whitespace.
    pub fn from_id(id: &str) -> Role {
        match id.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Role::Admin,
            "MANAGER" => Role::Manager,
            "STAFF" => Role::Staff,
            "CUSTOMER" => Role::Customer,
            _ => Role::Unknown,
        }
    }

    /// Returns the human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::Staff => "Staff",
            Role::Customer => "Customer",
            Role::Unknown => "Unknown",
        }
    }

    /// True for roles with access to the management screens.
    pub fn is_manager(&self) -> bool {
        matches!(self, Role::Manager | Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map_or(Role::Unknown, Role::from_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_id_is_case_insensitive() {
        assert_eq!(Role::from_id("ADMIN"), Role::Admin);
        assert_eq!(Role::from_id("manager"), Role::Manager);
        assert_eq!(Role::from_id(" Staff "), Role::Staff);
        assert_eq!(Role::from_id("waiter"), Role::Unknown);
    }

    #[test]
    fn test_deserialize_tolerates_null_and_unknown() {
        let role: Role = serde_json::from_str("null").unwrap();
        assert_eq!(role, Role::Unknown);
        let role: Role = serde_json::from_str("\"chef\"").unwrap();
        assert_eq!(role, Role::Unknown);
        let role: Role = serde_json::from_str("\"customer\"").unwrap();
        assert_eq!(role, Role::Customer);
    }

    #[test]
    fn test_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&Role::Staff).unwrap(), "\"STAFF\"");
    }

    #[test]
    fn test_manager_flags() {
        assert!(Role::Admin.is_manager());
        assert!(Role::Manager.is_manager());
        assert!(!Role::Staff.is_manager());
        assert!(Role::Admin.is_admin());
        assert!(!Role::Manager.is_admin());
    }
}
