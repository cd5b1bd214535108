//! API-side authorization guard for catalog writes.
//!
//! Checked in the handler before any store call, keeping the domain and infra
//! crates auth-agnostic.

use storefront_auth::{authorize, AuthzError, Permission, Principal};

use crate::context::PrincipalContext;

/// Check that the current caller holds `required`.
pub fn authorize_request(
    principal: &PrincipalContext,
    required: Permission,
) -> Result<(), AuthzError> {
    let principal = Principal {
        user_id: principal.user_id(),
        roles: principal.roles().to_vec(),
    };
    authorize(&principal, required)
}
