//! Access-decision types and the role-intersection rule.

/// Role name that bypasses role intersection everywhere.
pub const SUPERUSER: &str = "superuser";

/// Role name granted to lab staff.
pub const STAFF: &str = "staff";

/// Outcome of one authorization attempt.
///
/// Deployed door controllers parse the legacy string rendering (see
/// [`AccessDecision::to_legacy_string`]); everything inside the service works
/// with this tagged type instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Authorized { username: String },
    Unauthorized,
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Authorized { .. })
    }

    /// Render the wire format expected by ESP32 door-controller firmware:
    /// `"Authorized?first_name=<username>"` or `"Unauthorized"`.
    pub fn to_legacy_string(&self) -> String {
        match self {
            Self::Authorized { username } => format!("Authorized?first_name={username}"),
            Self::Unauthorized => "Unauthorized".to_owned(),
        }
    }
}

/// Authorization rule shared by card and PIN decisions: granted when at least
/// one role name is assigned to both the device and the user.
pub fn roles_intersect(device_roles: &[String], user_roles: &[String]) -> bool {
    device_roles.iter().any(|r| user_roles.contains(r))
}

/// True when the role set contains [`SUPERUSER`].
pub fn is_superuser(roles: &[String]) -> bool {
    roles.iter().any(|r| r == SUPERUSER)
}
