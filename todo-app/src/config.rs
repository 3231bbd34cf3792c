use crate::store::{FileStorage, StoreFormat};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    #[serde(default)]
    pub store_format: StoreFormat,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Config {
    /// Loads configuration from `TODO_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_source(config::Environment::with_prefix("TODO"))
    }

    pub fn from_source<T>(source: T) -> anyhow::Result<Self>
    where
        T: config::Source + Send + Sync + 'static,
    {
        let settings = config::Config::builder().add_source(source).build()?;
        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }

    pub fn storage(&self) -> FileStorage {
        FileStorage::new(&self.store_path, self.store_format)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            store_format: StoreFormat::default(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("todos.json")
}

fn default_port() -> u16 {
    8080
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("web/static")
}
