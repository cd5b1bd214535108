//! Runtime configuration read from the environment.

use std::net::SocketAddr;

use anyhow::bail;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEV_JWT_SECRET: &str = "dev-secret";

/// Where catalog records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    InMemory,
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub storage: StorageConfig,
}

impl ApiConfig {
    /// Load from process environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (used by tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let default_addr: SocketAddr = DEFAULT_BIND_ADDR.parse()?;
        let bind_addr = match lookup("BIND_ADDR") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!("BIND_ADDR '{raw}' is not a socket address; using {DEFAULT_BIND_ADDR}");
                default_addr
            }),
            None => default_addr,
        };

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let use_persistent = lookup("USE_PERSISTENT_STORES")
            .map(|raw| {
                raw.parse::<bool>().unwrap_or_else(|_| {
                    tracing::warn!("USE_PERSISTENT_STORES '{raw}' is not a boolean; using false");
                    false
                })
            })
            .unwrap_or(false);

        let storage = if use_persistent {
            let Some(database_url) = lookup("DATABASE_URL") else {
                bail!("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");
            };
            let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
                .map(|raw| {
                    raw.parse::<u32>()
                        .ok()
                        .filter(|n| *n > 0)
                        .unwrap_or_else(|| {
                            tracing::warn!(
                                "DATABASE_MAX_CONNECTIONS '{raw}' is invalid; using {DEFAULT_MAX_CONNECTIONS}"
                            );
                            DEFAULT_MAX_CONNECTIONS
                        })
                })
                .unwrap_or(DEFAULT_MAX_CONNECTIONS);
            StorageConfig::Postgres {
                database_url,
                max_connections,
            }
        } else {
            StorageConfig::InMemory
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            storage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<ApiConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_to_in_memory_on_8080() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
        assert_eq!(cfg.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(cfg.storage, StorageConfig::InMemory);
    }

    #[test]
    fn persistent_storage_requires_database_url() {
        assert!(load(&[("USE_PERSISTENT_STORES", "true")]).is_err());

        let cfg = load(&[
            ("USE_PERSISTENT_STORES", "true"),
            ("DATABASE_URL", "postgres://localhost/catalog"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
        ])
        .unwrap();
        assert_eq!(
            cfg.storage,
            StorageConfig::Postgres {
                database_url: "postgres://localhost/catalog".to_string(),
                max_connections: 12,
            }
        );
    }

    #[test]
    fn unparseable_values_fall_back_to_defaults() {
        let cfg = load(&[
            ("BIND_ADDR", "not-an-addr"),
            ("USE_PERSISTENT_STORES", "yes please"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
        assert_eq!(cfg.storage, StorageConfig::InMemory);

        let cfg = load(&[
            ("USE_PERSISTENT_STORES", "true"),
            ("DATABASE_URL", "postgres://db"),
            ("DATABASE_MAX_CONNECTIONS", "0"),
        ])
        .unwrap();
        assert!(matches!(
            cfg.storage,
            StorageConfig::Postgres { max_connections: DEFAULT_MAX_CONNECTIONS, .. }
        ));
    }

    #[test]
    fn explicit_values_are_used() {
        let cfg = load(&[("BIND_ADDR", "127.0.0.1:3000"), ("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(cfg.bind_addr.port(), 3000);
        assert_eq!(cfg.jwt_secret, "s3cret");
    }
}
