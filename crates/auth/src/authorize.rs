use std::collections::BTreeSet;

use thiserror::Error;

use storefront_core::UserId;

use crate::{Permission, Role};

/// A resolved caller for authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub roles: Vec<Role>,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(Permission),
}

/// Union of the permissions granted by each role.
pub fn permissions_for_roles(roles: &[Role]) -> BTreeSet<Permission> {
    roles
        .iter()
        .flat_map(|role| role.permissions().iter().copied())
        .collect()
}

/// Authorize a principal for one permission. Pure; no IO.
pub fn authorize(principal: &Principal, required: Permission) -> Result<(), AuthzError> {
    if permissions_for_roles(&principal.roles).contains(&required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required))
    }
}
