use serde::{Deserialize, Serialize};

/// Catalog write permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "products.create")]
    ProductsCreate,
    #[serde(rename = "products.update")]
    ProductsUpdate,
    #[serde(rename = "products.delete")]
    ProductsDelete,
}

impl Permission {
    pub const ALL: &'static [Permission] = &[
        Permission::ProductsCreate,
        Permission::ProductsUpdate,
        Permission::ProductsDelete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ProductsCreate => "products.create",
            Permission::ProductsUpdate => "products.update",
            Permission::ProductsDelete => "products.delete",
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
