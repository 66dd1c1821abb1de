//! Role definitions and effective-permission resolution.
//!
//! A role owns an ordered list of grants and may name base roles it inherits
//! from. Resolution walks the base-role graph iteratively (post-order with an
//! explicit stack) so arbitrarily deep chains never recurse, and reports
//! cycles as errors instead of looping.

use std::collections::{BTreeMap, HashMap, HashSet};

use clinic_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::Permission;

/// Maximum length accepted for a role name.
pub const ROLE_NAME_MAX_LENGTH: usize = 64;

/// One grant or revocation of a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// Permission being granted or revoked.
    pub permission: Permission,
    /// `false` revokes a grant inherited from a base role.
    pub granted: bool,
}

impl PermissionGrant {
    /// Creates an allowing grant.
    #[must_use]
    pub fn allow(permission: Permission) -> Self {
        Self {
            permission,
            granted: true,
        }
    }

    /// Creates a revoking grant.
    #[must_use]
    pub fn revoke(permission: Permission) -> Self {
        Self {
            permission,
            granted: false,
        }
    }
}

/// Validates a role name: lower-case ASCII letters, digits and underscores,
/// starting with a letter.
pub fn validate_role_name(name: &str) -> AppResult<()> {
    let mut chars = name.chars();
    let starts_with_letter = chars.next().is_some_and(|value| value.is_ascii_lowercase());
    let rest_is_valid = chars.all(|value| {
        value.is_ascii_lowercase() || value.is_ascii_digit() || value == '_'
    });

    if !starts_with_letter || !rest_is_valid || name.len() > ROLE_NAME_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "role name '{name}' must be snake_case, start with a letter and be at most \
             {ROLE_NAME_MAX_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Named role with grants, inheritance and conflict priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    name: String,
    display_name: String,
    grants: Vec<PermissionGrant>,
    priority: i32,
    is_system: bool,
    is_active: bool,
    base_roles: Vec<String>,
}

impl RoleDefinition {
    /// Creates an active role definition.
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        grants: Vec<PermissionGrant>,
        priority: i32,
        base_roles: Vec<String>,
    ) -> AppResult<Self> {
        let name = name.into();
        validate_role_name(name.as_str())?;

        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "role '{name}' requires a display name"
            )));
        }

        for base_role in &base_roles {
            validate_role_name(base_role.as_str())?;
            if base_role == &name {
                return Err(AppError::Validation(format!(
                    "role '{name}' cannot inherit from itself"
                )));
            }
        }

        Ok(Self {
            name,
            display_name: display_name.trim().to_owned(),
            grants,
            priority,
            is_system: false,
            is_active: true,
            base_roles,
        })
    }

    /// Marks the role as a protected built-in.
    #[must_use]
    pub fn into_system(mut self) -> Self {
        self.is_system = true;
        self
    }

    /// Sets the active flag.
    #[must_use]
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Replaces the whole grant list with allowing grants for exactly `permissions`.
    ///
    /// Duplicates collapse; order follows first occurrence.
    #[must_use]
    pub fn with_granted_permissions(mut self, permissions: &[Permission]) -> Self {
        let mut seen = HashSet::new();
        self.grants = permissions
            .iter()
            .filter(|permission| seen.insert(**permission))
            .map(|permission| PermissionGrant::allow(*permission))
            .collect();
        self
    }

    /// Returns the unique role name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the human-readable name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the role's own grants in declaration order.
    #[must_use]
    pub fn grants(&self) -> &[PermissionGrant] {
        &self.grants
    }

    /// Returns the conflict priority.
    #[must_use]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Returns whether this is a protected built-in role.
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.is_system
    }

    /// Returns whether the role currently grants anything.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the names of roles this role inherits from.
    #[must_use]
    pub fn base_roles(&self) -> &[String] {
        &self.base_roles
    }
}

/// Resolved allow/deny decision per permission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectivePermissions {
    decisions: BTreeMap<Permission, bool>,
}

impl EffectivePermissions {
    /// Returns whether the permission is present and granted.
    #[must_use]
    pub fn allows(&self, permission: Permission) -> bool {
        self.decisions.get(&permission).copied().unwrap_or(false)
    }

    /// Applies grants in order; later entries win.
    pub fn apply(&mut self, grants: &[PermissionGrant]) {
        for grant in grants {
            self.decisions.insert(grant.permission, grant.granted);
        }
    }

    /// Returns granted permissions in catalog order.
    #[must_use]
    pub fn granted_permissions(&self) -> Vec<Permission> {
        self.decisions
            .iter()
            .filter_map(|(permission, granted)| granted.then_some(*permission))
            .collect()
    }
}

/// Lookup view over a set of roles used for inheritance resolution.
#[derive(Debug)]
pub struct RoleGraph<'a> {
    roles: HashMap<&'a str, &'a RoleDefinition>,
}

impl<'a> RoleGraph<'a> {
    /// Indexes roles by name.
    #[must_use]
    pub fn new(roles: &'a [RoleDefinition]) -> Self {
        Self {
            roles: roles.iter().map(|role| (role.name(), role)).collect(),
        }
    }

    /// Returns a role by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&'a RoleDefinition> {
        self.roles.get(name).copied()
    }

    /// Computes the effective permissions of a role.
    ///
    /// Base roles are merged first; when two bases disagree on a permission
    /// the base with the higher priority wins, and on equal priority the
    /// revocation wins. The role's own grants are applied last. Inactive or
    /// missing base roles contribute nothing; an inactive role resolves to an
    /// empty set.
    pub fn effective_permissions(&self, role_name: &str) -> AppResult<EffectivePermissions> {
        if !self.roles.contains_key(role_name) {
            return Err(AppError::NotFound(format!("role '{role_name}' was not found")));
        }

        let mut resolved: HashMap<&str, EffectivePermissions> = HashMap::new();
        let mut visiting: HashSet<&str> = HashSet::new();
        let mut stack: Vec<(&str, bool)> = vec![(role_name, false)];

        while let Some((name, children_resolved)) = stack.pop() {
            if resolved.contains_key(name) {
                continue;
            }

            let Some(role) = self.find(name) else {
                resolved.insert(name, EffectivePermissions::default());
                continue;
            };

            if children_resolved {
                visiting.remove(name);
                let merged = self.merge_role(role, &resolved);
                resolved.insert(role.name(), merged);
                continue;
            }

            if !visiting.insert(role.name()) {
                return Err(cycle_error(role.name()));
            }

            stack.push((role.name(), true));
            for base_role in role.base_roles() {
                if visiting.contains(base_role.as_str()) {
                    return Err(cycle_error(base_role.as_str()));
                }
                if !resolved.contains_key(base_role.as_str()) {
                    stack.push((base_role.as_str(), false));
                }
            }
        }

        resolved
            .remove(role_name)
            .ok_or_else(|| AppError::Internal(format!("role '{role_name}' was not resolved")))
    }

    /// Validates that `candidate` can be stored next to the indexed roles:
    /// every base role exists and the inheritance graph stays acyclic.
    pub fn validate_candidate(&self, candidate: &RoleDefinition) -> AppResult<()> {
        for base_role in candidate.base_roles() {
            if base_role != candidate.name() && self.find(base_role).is_none() {
                return Err(AppError::Validation(format!(
                    "base role '{base_role}' of role '{}' does not exist",
                    candidate.name()
                )));
            }
        }

        let mut roles = self
            .roles
            .values()
            .filter(|role| role.name() != candidate.name())
            .map(|role| (*role).clone())
            .collect::<Vec<_>>();
        roles.push(candidate.clone());

        RoleGraph::new(&roles)
            .effective_permissions(candidate.name())
            .map(|_| ())
            .map_err(|error| match error {
                AppError::Internal(message) => AppError::Validation(message),
                other => other,
            })
    }

    /// Returns names of roles that list `role_name` as a base role.
    #[must_use]
    pub fn dependents_of(&self, role_name: &str) -> Vec<&'a str> {
        let mut dependents = self
            .roles
            .values()
            .filter(|role| role.base_roles().iter().any(|base| base == role_name))
            .map(|role| role.name())
            .collect::<Vec<_>>();
        dependents.sort_unstable();
        dependents
    }

    fn merge_role(
        &self,
        role: &RoleDefinition,
        resolved: &HashMap<&str, EffectivePermissions>,
    ) -> EffectivePermissions {
        if !role.is_active() {
            return EffectivePermissions::default();
        }

        let mut inherited: BTreeMap<Permission, (bool, i32)> = BTreeMap::new();
        for base_name in role.base_roles() {
            let Some(base_role) = self.find(base_name) else {
                continue;
            };
            let Some(base_permissions) = resolved.get(base_name.as_str()) else {
                continue;
            };

            for (permission, granted) in &base_permissions.decisions {
                let candidate = (*granted, base_role.priority());
                inherited
                    .entry(*permission)
                    .and_modify(|current| {
                        let higher_priority = candidate.1 > current.1;
                        let tie_revokes = candidate.1 == current.1 && !candidate.0;
                        if higher_priority || tie_revokes {
                            *current = candidate;
                        }
                    })
                    .or_insert(candidate);
            }
        }

        let mut effective = EffectivePermissions {
            decisions: inherited
                .into_iter()
                .map(|(permission, (granted, _))| (permission, granted))
                .collect(),
        };
        effective.apply(role.grants());
        effective
    }
}

fn cycle_error(role_name: &str) -> AppError {
    AppError::Internal(format!(
        "role inheritance cycle detected at role '{role_name}'"
    ))
}

#[cfg(test)]
mod tests;
