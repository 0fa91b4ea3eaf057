use crate::domain::entities::{Role, RoleDefinition};
use std::collections::HashMap;

/// Immutable role table built once at startup and shared behind an `Arc`.
///
/// Enforcement elsewhere is by role identity; the permission lists are informational
/// (rendered on dashboards and returned by `/admin/roles`).
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    definitions: HashMap<Role, RoleDefinition>,
}

impl RoleRegistry {
    pub fn new(definitions: Vec<RoleDefinition>) -> Self {
        let definitions = definitions.into_iter().map(|d| (d.role, d)).collect();
        Self { definitions }
    }

    pub fn definition(&self, role: Role) -> Option<&RoleDefinition> {
        self.definitions.get(&role)
    }

    /// All definitions ordered by role id.
    pub fn definitions(&self) -> Vec<&RoleDefinition> {
        let mut defs: Vec<_> = self.definitions.values().collect();
        defs.sort_by_key(|d| d.id);
        defs
    }

    /// Resolve a stored or submitted role name.
    ///
    /// Unknown names fall back to `Role::User`, the lowest privilege, instead of failing.
    pub fn resolve(&self, name: &str) -> Role {
        match name.parse::<Role>() {
            Ok(role) if self.definitions.contains_key(&role) => role,
            _ => {
                tracing::warn!("Unknown role '{}', falling back to 'user'", name);
                Role::User
            }
        }
    }

    pub fn permissions(&self, role: Role) -> &[&'static str] {
        self.definitions
            .get(&role)
            .map(|d| d.permissions.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_permission(&self, role: Role, permission: &str) -> bool {
        self.permissions(role).iter().any(|p| *p == permission)
    }

    /// Where a principal with this role is sent after login or after hitting another role's area.
    pub fn landing_path(&self, role: Role) -> &'static str {
        self.definitions
            .get(&role)
            .map(|d| d.landing_path)
            .unwrap_or("/dashboard")
    }
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::new(vec![
            RoleDefinition {
                role: Role::Admin,
                id: Role::Admin.id(),
                name: "admin",
                permissions: vec![
                    "manage_users",
                    "manage_courses",
                    "manage_certificates",
                    "manage_settings",
                    "view_dashboard",
                ],
                landing_path: "/admin/dashboard",
            },
            RoleDefinition {
                role: Role::Moderator,
                id: Role::Moderator.id(),
                name: "moderator",
                permissions: vec!["manage_courses", "moderate_content", "view_dashboard"],
                landing_path: "/moderator/dashboard",
            },
            RoleDefinition {
                role: Role::Writer,
                id: Role::Writer.id(),
                name: "writer",
                permissions: vec!["write_content", "view_dashboard"],
                landing_path: "/writer/dashboard",
            },
            RoleDefinition {
                role: Role::User,
                id: Role::User.id(),
                name: "user",
                permissions: vec!["view_certificates"],
                landing_path: "/dashboard",
            },
        ])
    }
}
