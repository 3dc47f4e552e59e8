//! Layered configuration
//!
//! Defaults, then `<config dir>/jjsp/config.toml`, then `<workspace>/.jjsp.toml`,
//! then command-line overrides. Later layers win key by key.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Repository-level config filename
pub const REPO_CONFIG_FILE: &str = ".jjsp.toml";

/// Directory name under the user config dir
const USER_CONFIG_DIR: &str = "jjsp";

/// User-level config filename
const USER_CONFIG_FILE: &str = "config.toml";

/// Which forge backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForgeBackend {
    /// The `gh` command line
    #[default]
    Gh,
    /// GitHub REST/GraphQL API via a token
    Api,
}

/// Forge settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForgeConfig {
    /// Backend used for PR operations
    pub backend: ForgeBackend,
}

/// Auto-bookmark settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutoBookmarkConfig {
    /// Create `auto/jjsp-*` bookmarks for unbookmarked changes
    pub enabled: bool,
    /// Delete stale `auto/jjsp-*` bookmarks
    pub cleanup: bool,
    /// Run cleanup even when auto-bookmarking is disabled
    pub force_cleanup: bool,
}

impl Default for AutoBookmarkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cleanup: true,
            force_cleanup: false,
        }
    }
}

/// Stack detection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StackConfig {
    /// Include descendants of `@` in the lineage window
    pub include_descendants: bool,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            include_descendants: true,
        }
    }
}

/// Submission settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubmitConfig {
    /// Create new PRs as drafts
    pub draft: bool,
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Primary remote; `name@<remote>` refs are trackable, other remotes are ignored
    pub remote: String,
    /// Explicit base branch (skips detection)
    pub base_branch: Option<String>,
    /// Base branch used when detection finds nothing
    pub base_branch_fallback: String,
    /// Forge settings
    pub forge: ForgeConfig,
    /// Auto-bookmark settings
    pub auto_bookmark: AutoBookmarkConfig,
    /// Stack detection settings
    pub stack: StackConfig,
    /// Submission settings
    pub submit: SubmitConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            base_branch: None,
            base_branch_fallback: "main".to_string(),
            forge: ForgeConfig::default(),
            auto_bookmark: AutoBookmarkConfig::default(),
            stack: StackConfig::default(),
            submit: SubmitConfig::default(),
        }
    }
}

/// Command-line values that take precedence over config files
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--remote`
    pub remote: Option<String>,
    /// `--base`
    pub base_branch: Option<String>,
    /// `--no-auto-bookmark`
    pub no_auto_bookmark: bool,
    /// `--skip-cleanup`
    pub skip_cleanup: bool,
    /// `--force-cleanup`
    pub force_cleanup: bool,
    /// `--draft`
    pub draft: bool,
}

impl Config {
    /// Load defaults, the user config file and the repository config file
    pub fn load(workspace_root: &Path) -> Result<Self> {
        let user = user_config_path();
        let repo = workspace_root.join(REPO_CONFIG_FILE);
        Self::load_from(user.as_deref(), &repo)
    }

    /// Load from explicit file locations; missing files are skipped
    pub fn load_from(user_file: Option<&Path>, repo_file: &Path) -> Result<Self> {
        let mut merged = toml::Table::new();
        for path in user_file.into_iter().chain(std::iter::once(repo_file)) {
            if let Some(table) = read_table(path)? {
                debug!(path = %path.display(), "loaded config layer");
                merge_tables(&mut merged, table);
            }
        }

        toml::Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| Error::Config(e.to_string()))
    }

    /// Apply command-line overrides
    #[must_use]
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(remote) = &overrides.remote {
            self.remote.clone_from(remote);
        }
        if let Some(base) = &overrides.base_branch {
            self.base_branch = Some(base.clone());
        }
        if overrides.no_auto_bookmark {
            self.auto_bookmark.enabled = false;
        }
        if overrides.skip_cleanup {
            self.auto_bookmark.cleanup = false;
        }
        if overrides.force_cleanup {
            self.auto_bookmark.cleanup = true;
            self.auto_bookmark.force_cleanup = true;
        }
        if overrides.draft {
            self.submit.draft = true;
        }
        self
    }

    /// Whether the auto-bookmark cleanup passes should run
    pub const fn should_cleanup(&self) -> bool {
        self.auto_bookmark.cleanup
            && (self.auto_bookmark.enabled || self.auto_bookmark.force_cleanup)
    }
}

/// Path of the user-level config file, if a config dir exists
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE))
}

fn read_table(path: &Path) -> Result<Option<toml::Table>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
    let table: toml::Table = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;
    Ok(Some(table))
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_no_files() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(None, &temp.path().join(REPO_CONFIG_FILE)).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.remote, "origin");
        assert_eq!(config.base_branch_fallback, "main");
        assert!(config.auto_bookmark.enabled);
        assert!(config.stack.include_descendants);
        assert_eq!(config.forge.backend, ForgeBackend::Gh);
    }

    #[test]
    fn test_repo_file_overrides_user_file_per_key() {
        let temp = TempDir::new().unwrap();
        let user = temp.path().join("user.toml");
        let repo = temp.path().join(REPO_CONFIG_FILE);
        fs::write(
            &user,
            "remote = \"upstream\"\n[auto_bookmark]\nenabled = false\ncleanup = false\n",
        )
        .unwrap();
        fs::write(&repo, "[auto_bookmark]\ncleanup = true\n[forge]\nbackend = \"api\"\n").unwrap();

        let config = Config::load_from(Some(&user), &repo).unwrap();
        assert_eq!(config.remote, "upstream");
        assert!(!config.auto_bookmark.enabled);
        assert!(config.auto_bookmark.cleanup);
        assert_eq!(config.forge.backend, ForgeBackend::Api);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join(REPO_CONFIG_FILE);
        fs::write(&repo, "remoet = \"origin\"\n").unwrap();

        let result = Config::load_from(None, &repo);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_malformed_file_names_path() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join(REPO_CONFIG_FILE);
        fs::write(&repo, "remote = ").unwrap();

        let err = Config::load_from(None, &repo).unwrap_err();
        assert!(err.to_string().contains(".jjsp.toml"), "{err}");
    }

    #[test]
    fn test_overrides() {
        let config = Config::default().with_overrides(&Overrides {
            remote: Some("fork".to_string()),
            base_branch: Some("develop".to_string()),
            no_auto_bookmark: true,
            draft: true,
            ..Overrides::default()
        });
        assert_eq!(config.remote, "fork");
        assert_eq!(config.base_branch.as_deref(), Some("develop"));
        assert!(!config.auto_bookmark.enabled);
        assert!(config.submit.draft);
        assert!(!config.should_cleanup());
    }

    #[test]
    fn test_force_cleanup_runs_without_auto_bookmark() {
        let config = Config::default().with_overrides(&Overrides {
            no_auto_bookmark: true,
            force_cleanup: true,
            ..Overrides::default()
        });
        assert!(config.should_cleanup());
    }

    #[test]
    fn test_skip_cleanup() {
        let config = Config::default().with_overrides(&Overrides {
            skip_cleanup: true,
            ..Overrides::default()
        });
        assert!(!config.should_cleanup());
    }
}
