use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE: &str = "todos.db";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_STATIC_DIR: &str = "./frontend";

/// Values read from `todolist.toml`. Every key is optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TodoConfig {
    pub port: Option<u16>,
    pub db: Option<PathBuf>,
    pub log_level: Option<String>,
    pub static_dir: Option<PathBuf>,
}

/// Fully resolved settings the server starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub port: u16,
    pub db: PathBuf,
    pub log_level: String,
    pub static_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            db: PathBuf::from(DEFAULT_DATABASE),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl Settings {
    /// Layer explicit overrides (CLI flags) over the config file over the
    /// built-in defaults.
    pub fn resolve(file: Option<TodoConfig>, overrides: TodoConfig) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();
        Self {
            port: overrides.port.or(file.port).unwrap_or(defaults.port),
            db: overrides.db.or(file.db).unwrap_or(defaults.db),
            log_level: overrides.log_level.or(file.log_level).unwrap_or(defaults.log_level),
            static_dir: overrides.static_dir.or(file.static_dir).unwrap_or(defaults.static_dir),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("todolist.toml")
}

pub fn load_config(path: Option<&Path>) -> crate::Result<Option<TodoConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: TodoConfig = toml::from_str(&contents)
        .map_err(|e| crate::Error::Config(format!("{}: {}", path.display(), e)))?;
    Ok(Some(config))
}

pub fn ensure_db_dir(db_path: &Path) -> crate::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
