//! Group definitions: raw YAML shape and the resolved, immutable model.
use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::value::ConfigValue;
use crate::error::ConfigError;
use crate::exec::Executor;

/// Retention used when a group does not set `max_backups`.
pub const DEFAULT_MAX_BACKUPS: usize = 5;

/// One `(source, destination)` copy pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingPair {
    /// Path in the configuration repository.
    pub source: PathBuf,
    /// Installed path (group destination joined with the relative path).
    pub destination: PathBuf,
}

/// Which pairs `apply`, `sync` and `diff` operate on.
///
/// Unset and explicitly empty are distinct: unset falls back to the
/// install pairs, empty means nothing is synchronized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncMappings {
    /// Same as the install pairs.
    Default,
    /// An explicit list, possibly empty.
    Explicit(Vec<MappingPair>),
}

/// A shell command run after install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostInstallCommand {
    /// Command line passed to `sh -c`.
    pub command: String,
    /// Working directory (group destination joined with the relative dir).
    pub directory: PathBuf,
}

/// A program expected on `PATH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckBinary {
    /// Executable name.
    pub name: String,
    /// What it is for; may be empty.
    pub description: String,
}

/// A fully resolved group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Unique name.
    pub name: String,
    /// Absolute base directory for installed paths.
    pub destination: PathBuf,
    /// Pairs copied by `install`.
    pub install: Vec<MappingPair>,
    /// Pairs used by `apply`, `sync` and `diff`.
    pub sync: SyncMappings,
    /// Commands run by `post-install`.
    pub post_install: Vec<PostInstallCommand>,
    /// Programs verified by `check`.
    pub check_binaries: Vec<CheckBinary>,
    /// Number of backups kept per destination.
    pub max_backups: usize,
    /// Hosts this group is restricted to; empty means all.
    pub hosts: Vec<String>,
    /// Config file the group came from.
    pub origin: PathBuf,
}

impl Group {
    /// Effective sync pairs after applying the fallback.
    #[must_use]
    pub fn sync_mappings(&self) -> &[MappingPair] {
        match &self.sync {
            SyncMappings::Default => &self.install,
            SyncMappings::Explicit(pairs) => pairs,
        }
    }
}

/// `host:` accepts one name or a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HostSpec {
    One(String),
    Many(Vec<String>),
}

/// Post-install entries are `[command, dir]` or a bare command run in the
/// destination itself.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCommand {
    WithDir(String, String),
    Bare(String),
}

/// Check entries are `[name, description]` or a bare name.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBinary {
    Described(String, String),
    Bare(String),
}

/// A group as written in YAML.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RawGroup {
    dest: ConfigValue,
    #[serde(default)]
    host: Option<HostSpec>,
    #[serde(default, alias = "files")]
    install_files: Vec<(ConfigValue, ConfigValue)>,
    #[serde(default)]
    sync_files: Option<Vec<(ConfigValue, ConfigValue)>>,
    #[serde(default)]
    post_install_cmds: Vec<RawCommand>,
    #[serde(default)]
    check_binaries: Vec<RawBinary>,
    #[serde(default = "default_max_backups")]
    max_backups: usize,
}

impl RawGroup {
    /// Hosts named by `host:`; empty means every host.
    pub(super) fn hosts(&self) -> Vec<String> {
        match &self.host {
            None => Vec::new(),
            Some(HostSpec::One(h)) => vec![h.clone()],
            Some(HostSpec::Many(hs)) => hs.clone(),
        }
    }
}

const fn default_max_backups() -> usize {
    DEFAULT_MAX_BACKUPS
}

/// Inputs shared by every value resolved for one config file.
pub(super) struct Resolver<'a> {
    /// Directory of the config file; relative sources hang off it.
    pub base: &'a Path,
    /// The file itself, for error messages and [`Group::origin`].
    pub file: &'a Path,
    /// Runs `{{ command }}` substitutions.
    pub executor: &'a dyn Executor,
    /// Value of `$HOME` used for `~`, if set.
    pub home: Option<&'a Path>,
}

impl Resolver<'_> {
    fn string(&self, value: &ConfigValue) -> Result<String> {
        value.resolve(self.executor, self.base)
    }

    fn expand(&self, group: &str, raw: &str) -> Result<PathBuf> {
        let rest = if raw == "~" {
            Some("")
        } else {
            raw.strip_prefix("~/")
        };
        match rest {
            None => Ok(PathBuf::from(raw)),
            Some(rest) => {
                let home = self.home.ok_or_else(|| ConfigError::InvalidGroup {
                    group: group.to_string(),
                    reason: format!("cannot expand '{raw}': HOME is not set"),
                })?;
                Ok(if rest.is_empty() {
                    home.to_path_buf()
                } else {
                    home.join(rest)
                })
            }
        }
    }

    fn pairs(
        &self,
        group: &str,
        destination: &Path,
        raw: &[(ConfigValue, ConfigValue)],
    ) -> Result<Vec<MappingPair>> {
        raw.iter()
            .map(|(src, dst)| {
                let source = self.expand(group, &self.string(src)?)?;
                Ok(MappingPair {
                    source: self.base.join(source),
                    destination: destination.join(self.string(dst)?),
                })
            })
            .collect()
    }

    /// Turn a raw group into a [`Group`], running substitutions.
    pub(super) fn group(&self, name: &str, raw: RawGroup) -> Result<Group> {
        let hosts = raw.hosts();
        let dest = self.expand(name, &self.string(&raw.dest)?)?;
        if !dest.is_absolute() {
            return Err(ConfigError::InvalidGroup {
                group: name.to_string(),
                reason: format!("dest '{}' is not an absolute path", dest.display()),
            }
            .into());
        }
        if raw.max_backups == 0 {
            return Err(ConfigError::InvalidGroup {
                group: name.to_string(),
                reason: "max_backups must be at least 1".to_string(),
            }
            .into());
        }

        let install = self.pairs(name, &dest, &raw.install_files)?;
        let sync = match &raw.sync_files {
            None => SyncMappings::Default,
            Some(list) => SyncMappings::Explicit(self.pairs(name, &dest, list)?),
        };
        let post_install = raw
            .post_install_cmds
            .into_iter()
            .map(|c| match c {
                RawCommand::WithDir(command, dir) => PostInstallCommand {
                    command,
                    directory: dest.join(dir),
                },
                RawCommand::Bare(command) => PostInstallCommand {
                    command,
                    directory: dest.clone(),
                },
            })
            .collect();
        let check_binaries = raw
            .check_binaries
            .into_iter()
            .map(|b| match b {
                RawBinary::Described(name, description) => CheckBinary { name, description },
                RawBinary::Bare(name) => CheckBinary {
                    name,
                    description: String::new(),
                },
            })
            .collect();

        Ok(Group {
            name: name.to_string(),
            destination: dest,
            install,
            sync,
            post_install,
            check_binaries,
            max_backups: raw.max_backups,
            hosts,
            origin: self.file.to_path_buf(),
        })
    }
}
