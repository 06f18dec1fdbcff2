//! Configuration file management for contacts.
//!
//! Provides a TOML-based config file at `~/.config/contacts/config.toml` and
//! a resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use contacts_core::api::ApiConfig;
use contacts_core::templates::TemplateSources;

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "CONTACTS_API_URL";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub templates: TemplatesSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiSection {
    pub base_url: String,
    /// Per-request timeout in seconds. Unset means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: ApiConfig::DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TemplatesSection {
    /// Directory holding `contacts.j2` and/or `contact.j2` overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the contacts config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/contacts` or `~/.config/contacts`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("contacts");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("contacts")
}

/// Return the path to the contacts config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file, or `None` if it does not exist.
pub fn load_config() -> Result<Option<ConfigFile>> {
    let path = config_path();
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config = parse_config(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(Some(config))
}

fn parse_config(contents: &str) -> Result<ConfigFile> {
    Ok(toml::from_str(contents)?)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct ContactsConfig {
    pub api: ApiConfig,
    pub template_dir: Option<PathBuf>,
}

impl ContactsConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - API URL: `cli_api_url` > `CONTACTS_API_URL` env > `api.base_url` > `ApiConfig::DEFAULT_BASE_URL`
    /// - Timeout and template dir come from the config file only.
    pub fn resolve(cli_api_url: Option<&str>) -> Result<Self> {
        let file_config = load_config()?.unwrap_or_default();

        let base_url = if let Some(url) = cli_api_url {
            url.to_string()
        } else if let Ok(url) = std::env::var(API_URL_ENV) {
            url
        } else {
            file_config.api.base_url.clone()
        };

        let mut api = ApiConfig::new(base_url);
        if let Some(secs) = file_config.api.timeout_secs {
            api = api.with_timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            api,
            template_dir: file_config.templates.dir,
        })
    }

    /// Template sources: builtin, overridden from the configured directory.
    pub fn template_sources(&self) -> Result<TemplateSources> {
        match &self.template_dir {
            Some(dir) => TemplateSources::from_dir(dir)
                .with_context(|| format!("failed to read templates from {}", dir.display())),
            None => Ok(TemplateSources::builtin()),
        }
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

    #[test]
    fn parse_partial_config_uses_defaults() {
        let config = parse_config("[templates]\ndir = \"/tmp/tpl\"\n").unwrap();
        assert_eq!(config.api.base_url, ApiConfig::DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout_secs, None);
        assert_eq!(config.templates.dir, Some(PathBuf::from("/tmp/tpl")));
    }

    #[test]
    fn parse_rejects_malformed_toml() {
        assert!(parse_config("[api\nbase_url = 1").is_err());
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();
        let _xdg = crate::test_util::EnvGuard::set("XDG_CONFIG_HOME", tmp.path());

        let original = ConfigFile {
            api: ApiSection {
                base_url: "http://contacts.test:8080".to_string(),
                timeout_secs: Some(15),
            },
            templates: TemplatesSection::default(),
        };
        save_config(&original).unwrap();

        assert!(config_path().starts_with(tmp.path()));
        let loaded = load_config().unwrap().expect("config should exist");
        assert_eq!(loaded.api.base_url, original.api.base_url);
        assert_eq!(loaded.api.timeout_secs, Some(15));
        assert_eq!(loaded.templates.dir, None);
    }

    #[cfg(unix)]
    #[test]
    fn save_config_sets_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();
        let _xdg = crate::test_util::EnvGuard::set("XDG_CONFIG_HOME", tmp.path());

        save_config(&ConfigFile::default()).unwrap();

        let meta = std::fs::metadata(config_path()).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn resolve_with_cli_flag_overrides_all() {
        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();
        let _xdg = crate::test_util::EnvGuard::set("XDG_CONFIG_HOME", tmp.path());
        let _url = crate::test_util::EnvGuard::set(API_URL_ENV, "http://env:3000");

        let config = ContactsConfig::resolve(Some("http://cli:3000")).unwrap();
        assert_eq!(config.api.base_url, "http://cli:3000");
    }

    #[test]
    fn resolve_with_env_var_overrides_config_file() {
        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();
        let _xdg = crate::test_util::EnvGuard::set("XDG_CONFIG_HOME", tmp.path());
        save_config(&ConfigFile {
            api: ApiSection {
                base_url: "http://file:3000".to_string(),
                timeout_secs: Some(3),
            },
            templates: TemplatesSection::default(),
        })
        .unwrap();
        let _url = crate::test_util::EnvGuard::set(API_URL_ENV, "http://env:3000");

        let config = ContactsConfig::resolve(None).unwrap();
        assert_eq!(config.api.base_url, "http://env:3000");
        assert_eq!(config.api.timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn resolve_falls_back_to_config_file_then_default() {
        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();
        let _xdg = crate::test_util::EnvGuard::set("XDG_CONFIG_HOME", tmp.path());
        let _url = crate::test_util::EnvGuard::unset(API_URL_ENV);

        let config = ContactsConfig::resolve(None).unwrap();
        assert_eq!(config.api.base_url, ApiConfig::DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout, None);

        save_config(&ConfigFile {
            api: ApiSection {
                base_url: "http://file:3000".to_string(),
                timeout_secs: None,
            },
            templates: TemplatesSection::default(),
        })
        .unwrap();
        let config = ContactsConfig::resolve(None).unwrap();
        assert_eq!(config.api.base_url, "http://file:3000");
    }

    #[test]
    fn resolve_errors_on_malformed_config_file() {
        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();
        let _xdg = crate::test_util::EnvGuard::set("XDG_CONFIG_HOME", tmp.path());
        std::fs::create_dir_all(config_dir()).unwrap();
        std::fs::write(config_path(), "not = [valid").unwrap();

        let err = ContactsConfig::resolve(Some("http://cli:3000")).unwrap_err();
        assert!(
            format!("{err:#}").contains("failed to parse config file"),
            "unexpected error: {err:#}"
        );
    }

    #[test]
    fn template_sources_from_configured_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("contact.j2"), "{{ contact.full_name }}!").unwrap();
        let config = ContactsConfig {
            api: ApiConfig::default(),
            template_dir: Some(tmp.path().to_path_buf()),
        };
        assert_eq!(config.template_sources().unwrap().row, "{{ contact.full_name }}!");
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("contacts/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
