//! Runtime configuration read from the environment.
//!
//! - `PRESS_CATALOG_DIR`: directory holding the catalog JSON files
//!   (default `catalog`).
//! - `PRESS_BIND_ADDR`: socket address the HTTP server binds to
//!   (default `127.0.0.1:3000`).
//!
//! Log filtering is controlled separately through `RUST_LOG`.

use crate::error::{EstimatorError, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const CATALOG_DIR_VAR: &str = "PRESS_CATALOG_DIR";
pub const BIND_ADDR_VAR: &str = "PRESS_BIND_ADDR";
pub const DEFAULT_CATALOG_DIR: &str = "catalog";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub catalog_dir: PathBuf,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_values(
            std::env::var(CATALOG_DIR_VAR).ok(),
            std::env::var(BIND_ADDR_VAR).ok(),
        )
    }

    /// Build a configuration from optional raw values, applying the
    /// defaults for anything unset or blank.
    pub fn from_values(catalog_dir: Option<String>, bind_addr: Option<String>) -> Result<Self> {
        let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        let catalog_dir = non_blank(catalog_dir).unwrap_or_else(|| DEFAULT_CATALOG_DIR.to_string());
        let addr = non_blank(bind_addr).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let parsed = addr.trim().parse::<SocketAddr>();
        let bind_addr = parsed.map_err(|source| EstimatorError::BindAddr { addr, source })?;
        Ok(Self {
            catalog_dir: PathBuf::from(catalog_dir),
            bind_addr,
        })
    }
}
