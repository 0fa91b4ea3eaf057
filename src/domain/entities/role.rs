use serde::{Deserialize, Serialize};

/// Coarse-grained principal classification gating entire route prefixes.
///
/// The numeric identifiers are persisted by older data and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Moderator,
    Writer,
    User,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Moderator, Role::Writer, Role::User];

    pub fn id(self) -> i64 {
        match self {
            Role::Admin => 1,
            Role::Moderator => 2,
            Role::Writer => 3,
            Role::User => 4,
        }
    }

    pub fn from_id(id: i64) -> Option<Role> {
        Role::ALL.into_iter().find(|role| role.id() == id)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::Writer => "writer",
            Role::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "moderator" => Ok(Role::Moderator),
            "writer" => Ok(Role::Writer),
            "user" => Ok(Role::User),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// One row of the role table: identity, permissions and where the role lands after login.
#[derive(Debug, Clone, Serialize)]
pub struct RoleDefinition {
    pub role: Role,
    pub id: i64,
    pub name: &'static str,
    pub permissions: Vec<&'static str>,
    pub landing_path: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub id: i64,
    pub name: String,
    pub permissions: Vec<String>,
    pub landing_path: String,
}

impl From<&RoleDefinition> for RoleResponse {
    fn from(def: &RoleDefinition) -> Self {
        Self {
            id: def.id,
            name: def.name.to_string(),
            permissions: def.permissions.iter().map(|p| p.to_string()).collect(),
            landing_path: def.landing_path.to_string(),
        }
    }
}
