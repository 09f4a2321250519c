//! YAML configuration: settings plus an ordered list of groups.
pub mod group;
pub mod validation;
pub mod value;

use anyhow::{Context as _, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub use group::{CheckBinary, Group, MappingPair, PostInstallCommand, SyncMappings};
pub use value::ConfigValue;

use crate::error::ConfigError;
use crate::exec::Executor;
use crate::platform::Platform;

/// Config file used when neither `--config` nor `$CONFIT_CONFIG` is given.
pub const DEFAULT_CONFIG_FILE: &str = ".conf.it";

/// Environment variable naming the default config file.
pub const CONFIG_ENV: &str = "CONFIT_CONFIG";

/// Value of `settings.copy_tool`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyToolSetting {
    /// `rsync`, else `cp`, else the built-in copy.
    #[default]
    Auto,
    /// Require `rsync`.
    Rsync,
    /// Require `cp`.
    Cp,
    /// Always use the built-in copy.
    Native,
}

/// Global settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Shell command the diff is piped into; `None` prints it raw.
    pub pager: Option<String>,
    /// Copy strategy.
    pub copy_tool: CopyToolSetting,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSettings {
    #[serde(default)]
    pager: Option<String>,
    #[serde(default)]
    copy_tool: Option<CopyToolSetting>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    settings: RawSettings,
    #[serde(default)]
    groups: serde_yaml::Mapping,
}

/// Everything loaded from the config files.
#[derive(Debug, Default)]
pub struct Config {
    /// Merged settings; a later file overrides keys it sets.
    pub settings: Settings,
    /// Groups applicable to this host, in file then definition order.
    pub groups: Vec<Group>,
}

impl Config {
    /// Load and merge `paths` in order.
    ///
    /// Groups restricted to other hosts are dropped before duplicate
    /// names are checked, so the same group may be defined per host in
    /// different files.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a file is missing or malformed, a
    /// substitution fails, a group is invalid, two groups share a name, or a
    /// mapping pair's sides differ in kind.
    pub fn load(paths: &[PathBuf], executor: &dyn Executor, platform: &Platform) -> Result<Self> {
        let home = std::env::var_os("HOME").map(PathBuf::from);
        let mut config = Self::default();
        for path in paths {
            config
                .load_file(path, executor, platform, home.as_deref())
                .with_context(|| format!("loading {}", path.display()))?;
        }
        validation::check_unique_names(&config.groups)?;
        for group in &config.groups {
            validation::check_kind_parity(group)?;
        }
        Ok(config)
    }

    fn load_file(
        &mut self,
        path: &Path,
        executor: &dyn Executor,
        platform: &Platform,
        home: Option<&Path>,
    ) -> Result<()> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()).into());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw = parse(path, &content)?;

        if let Some(pager) = raw.settings.pager {
            self.settings.pager = Some(pager);
        }
        if let Some(tool) = raw.settings.copy_tool {
            self.settings.copy_tool = tool;
        }

        let file = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let base = file.parent().unwrap_or_else(|| Path::new("/"));
        let resolver = group::Resolver {
            base,
            file: &file,
            executor,
            home,
        };

        for (key, value) in raw.groups {
            let name = key.as_str().ok_or_else(|| ConfigError::InvalidSyntax {
                file: path.to_path_buf(),
                message: format!("group name {key:?} is not a string"),
            })?;
            let raw_group: group::RawGroup =
                serde_yaml::from_value(value).map_err(|e| ConfigError::InvalidGroup {
                    group: name.to_string(),
                    reason: e.to_string(),
                })?;
            // Groups for other hosts are skipped unresolved.
            if !platform.matches_any(&raw_group.hosts()) {
                continue;
            }
            self.groups.push(resolver.group(name, raw_group)?);
        }
        Ok(())
    }

    /// Look up a group by name.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Groups named in `names`, in the order given; all groups when empty.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownGroup`] for the first unknown name.
    pub fn select(&self, names: &[String]) -> Result<Vec<&Group>, ConfigError> {
        if names.is_empty() {
            return Ok(self.groups.iter().collect());
        }
        names
            .iter()
            .map(|n| self.group(n).ok_or_else(|| ConfigError::UnknownGroup(n.clone())))
            .collect()
    }
}

fn parse(path: &Path, content: &str) -> Result<RawConfig, ConfigError> {
    let invalid = |e: serde_yaml::Error| ConfigError::InvalidSyntax {
        file: path.to_path_buf(),
        message: e.to_string(),
    };
    let value: serde_yaml::Value = serde_yaml::from_str(content).map_err(invalid)?;
    if value.is_null() {
        return Ok(RawConfig::default());
    }
    serde_yaml::from_value(value).map_err(invalid)
}

/// Config files to load when none are given on the command line.
#[must_use]
pub fn default_paths() -> Vec<PathBuf> {
    vec![
        std::env::var_os(CONFIG_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from),
    ]
}
