//! Runtime server configuration.
//!
//! Read from an optional TOML file, then overridden by `MISSIVE_*`
//! environment variables (e.g. `MISSIVE_TABLE_NAME`). Every key has a
//! default, so the server starts with no configuration at all.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, Source};
use missive_store_sqlite::DEFAULT_TABLE;
use serde::Deserialize;

pub const ENV_PREFIX: &str = "MISSIVE";

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:           String,
  #[serde(default = "default_port")]
  pub port:           u16,
  #[serde(default = "default_store_path")]
  pub store_path:     PathBuf,
  /// Table the submissions are written to.
  #[serde(default = "default_table_name")]
  pub table_name:     String,
  /// Larger POST bodies are refused without being parsed.
  #[serde(default = "default_max_body_bytes")]
  pub max_body_bytes: usize,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("missive.sqlite3") }

fn default_table_name() -> String { DEFAULT_TABLE.to_string() }

fn default_max_body_bytes() -> usize { 1024 * 1024 }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:           default_host(),
      port:           default_port(),
      store_path:     default_store_path(),
      table_name:     default_table_name(),
      max_body_bytes: default_max_body_bytes(),
    }
  }
}

impl ServerConfig {
  /// Load from `path` (if it exists) layered under the process environment.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::from_sources(
      File::from(path).required(false),
      Environment::with_prefix(ENV_PREFIX),
    )
  }

  pub fn from_sources<F>(file: F, env: Environment) -> Result<Self, ConfigError>
  where
    F: Source + Send + Sync + 'static,
  {
    Config::builder()
      .add_source(file)
      .add_source(env)
      .build()?
      .try_deserialize()
  }
}
