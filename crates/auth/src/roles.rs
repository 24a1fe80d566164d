use serde::{Deserialize, Serialize};

/// Role of an account.
///
/// Travels as an integer tag (`0` collaborator, `1` admin) in tokens and
/// storage. Any tag that is not exactly `1` decodes as [`Role::Collaborator`]:
/// unknown input never grants admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Role {
    #[default]
    Collaborator = 0,
    Admin = 1,
}

impl Role {
    pub const fn tag(self) -> i64 {
        self as i64
    }

    /// Least-privilege decoding of a role tag.
    pub const fn from_tag(tag: i64) -> Self {
        match tag {
            1 => Role::Admin,
            _ => Role::Collaborator,
        }
    }

    pub const fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl From<i64> for Role {
    fn from(value: i64) -> Self {
        Role::from_tag(value)
    }
}

impl From<Role> for i64 {
    fn from(value: Role) -> Self {
        value.tag()
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Role::Collaborator => "collaborator",
            Role::Admin => "admin",
        })
    }
}
