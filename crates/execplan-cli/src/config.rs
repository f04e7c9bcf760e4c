//! Configuration file management for execplan.
//!
//! Provides a TOML config file at `~/.config/execplan/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use execplan_core::generation::GenerationConfig;
use execplan_db::config::DbConfig;

/// Env vars consulted for the API key, in priority order.
pub const API_KEY_VARS: [&str; 2] = ["EXECPLAN_API_KEY", "GEMINI_API_KEY"];

/// Env var overriding the generation base URL.
pub const BASE_URL_VAR: &str = "EXECPLAN_BASE_URL";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    #[serde(default)]
    pub generation: GenerationSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerationSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the execplan config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/execplan` or
/// `~/.config/execplan`, also on macOS.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("execplan");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("execplan")
}

/// Return the path to the execplan config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse a config file.
pub fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write a config file, creating parent dirs as needed.
/// The file holds an API key, so it is made owner-only (0600) on Unix.
pub fn save_config_to(config: &ConfigFile, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct ExecplanConfig {
    pub db_config: DbConfig,
    /// `None` when no API key was found anywhere.
    pub generation: Option<GenerationConfig>,
}

impl ExecplanConfig {
    /// Resolve configuration from the default config file location.
    pub fn resolve(cli_db_url: Option<&str>) -> Result<Self> {
        let path = config_path();
        let file_config = if path.exists() {
            Some(load_config_from(&path)?)
        } else {
            None
        };
        Ok(Self::resolve_with(cli_db_url, file_config.as_ref()))
    }

    /// Apply the resolution chain to an already-loaded config file.
    ///
    /// - DB URL: `cli_db_url` > `EXECPLAN_DATABASE_URL` > `database.url` > default
    /// - API key: `EXECPLAN_API_KEY` > `GEMINI_API_KEY` > `generation.api_key`
    /// - Base URL: `EXECPLAN_BASE_URL` > `generation.base_url` > default
    pub fn resolve_with(cli_db_url: Option<&str>, file_config: Option<&ConfigFile>) -> Self {
        let db_url = if let Some(url) = cli_db_url {
            url.to_string()
        } else if let Ok(url) = std::env::var(DbConfig::ENV_VAR) {
            url
        } else if let Some(cfg) = file_config {
            cfg.database.url.clone()
        } else {
            DbConfig::DEFAULT_URL.to_string()
        };

        let file_gen = file_config.map(|c| &c.generation);

        let api_key = API_KEY_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
            .or_else(|| file_gen.and_then(|g| g.api_key.clone()));

        let generation = api_key.map(|key| {
            let mut config = GenerationConfig::new(key);
            if let Some(url) = std::env::var(BASE_URL_VAR)
                .ok()
                .or_else(|| file_gen.and_then(|g| g.base_url.clone()))
            {
                config = config.with_base_url(url);
            }
            if let Some(secs) = file_gen.and_then(|g| g.timeout_secs) {
                config = config.with_timeout(Duration::from_secs(secs));
            }
            config
        });

        Self {
            db_config: DbConfig::new(db_url),
            generation,
        }
    }

    /// The generation config, or an error explaining how to provide a key.
    pub fn require_generation(&self) -> Result<&GenerationConfig> {
        self.generation.as_ref().with_context(|| {
            format!(
                "API key not found; set {} (or {}) or add `api_key` under [generation] in {}",
                API_KEY_VARS[0],
                API_KEY_VARS[1],
                config_path().display()
            )
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    fn clear_env() {
        for var in [DbConfig::ENV_VAR, API_KEY_VARS[0], API_KEY_VARS[1], BASE_URL_VAR] {
            unsafe { std::env::remove_var(var) };
        }
    }

    fn file_config() -> ConfigFile {
        ConfigFile {
            database: DatabaseSection {
                url: "postgresql://filehost:5432/filedb".to_string(),
            },
            generation: GenerationSection {
                api_key: Some("file-key".to_string()),
                base_url: Some("http://proxy.local/v1".to_string()),
                timeout_secs: Some(30),
            },
        }
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("execplan").join("config.toml");

        let original = file_config();
        save_config_to(&original, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded.database.url, original.database.url);
        assert_eq!(loaded.generation.api_key.as_deref(), Some("file-key"));
        assert_eq!(loaded.generation.timeout_secs, Some(30));
    }

    #[cfg(unix)]
    #[test]
    fn save_config_sets_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        save_config_to(&file_config(), &path).unwrap();

        let meta = std::fs::metadata(&path).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn generation_section_is_optional() {
        let parsed: ConfigFile =
            toml::from_str("[database]\nurl = \"postgresql://h:5432/d\"\n").unwrap();
        assert!(parsed.generation.api_key.is_none());
    }

    #[test]
    fn cli_flag_overrides_everything() {
        let _lock = lock_env();
        clear_env();
        unsafe { std::env::set_var(DbConfig::ENV_VAR, "postgresql://env:5432/envdb") };

        let cfg = ExecplanConfig::resolve_with(Some("postgresql://cli:5432/clidb"), Some(&file_config()));
        assert_eq!(cfg.db_config.database_url, "postgresql://cli:5432/clidb");

        clear_env();
    }

    #[test]
    fn env_overrides_config_file() {
        let _lock = lock_env();
        clear_env();
        unsafe { std::env::set_var(DbConfig::ENV_VAR, "postgresql://env:5432/envdb") };
        unsafe { std::env::set_var("GEMINI_API_KEY", "gemini-key") };
        unsafe { std::env::set_var(BASE_URL_VAR, "http://env.local") };

        let cfg = ExecplanConfig::resolve_with(None, Some(&file_config()));
        assert_eq!(cfg.db_config.database_url, "postgresql://env:5432/envdb");
        let generation = cfg.generation.expect("api key should resolve");
        assert_eq!(generation.api_key, "gemini-key");
        assert_eq!(generation.base_url, "http://env.local");
        assert_eq!(generation.timeout, Duration::from_secs(30));

        clear_env();
    }

    #[test]
    fn execplan_key_wins_over_gemini_key() {
        let _lock = lock_env();
        clear_env();
        unsafe { std::env::set_var("EXECPLAN_API_KEY", "primary") };
        unsafe { std::env::set_var("GEMINI_API_KEY", "secondary") };

        let cfg = ExecplanConfig::resolve_with(None, None);
        assert_eq!(cfg.generation.unwrap().api_key, "primary");

        clear_env();
    }

    #[test]
    fn file_values_used_when_env_unset() {
        let _lock = lock_env();
        clear_env();

        let cfg = ExecplanConfig::resolve_with(None, Some(&file_config()));
        assert_eq!(cfg.db_config.database_url, "postgresql://filehost:5432/filedb");
        let generation = cfg.generation.unwrap();
        assert_eq!(generation.api_key, "file-key");
        assert_eq!(generation.completions_url(), "http://proxy.local/v1/chat/completions");
    }

    #[test]
    fn defaults_when_nothing_set() {
        let _lock = lock_env();
        clear_env();

        let cfg = ExecplanConfig::resolve_with(None, None);
        assert_eq!(cfg.db_config.database_url, DbConfig::DEFAULT_URL);
        assert!(cfg.generation.is_none());
        let err = cfg.require_generation().unwrap_err();
        assert!(err.to_string().contains("API key not found"), "unexpected: {err}");
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("execplan/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
