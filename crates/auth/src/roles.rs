use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Permission;

/// Role name as carried in the token's `roles` claim.
///
/// Unknown names are kept (a token may carry roles other services care
/// about) and simply grant nothing here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const ADMIN: Role = Role(Cow::Borrowed("admin"));
    pub const VENDOR: Role = Role(Cow::Borrowed("vendor"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Catalog permissions granted by this role.
    pub fn permissions(&self) -> &'static [Permission] {
        match self.as_str() {
            "admin" => Permission::ALL,
            "vendor" => &[
                Permission::ProductsCreate,
                Permission::ProductsUpdate,
                Permission::ProductsDelete,
            ],
            _ => &[],
        }
    }
}
