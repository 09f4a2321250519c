//! String values that may be computed by a shell command.
use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;
use crate::exec::Executor;

/// A configuration string, either used as written or produced by a command.
///
/// `"{{ echo $HOME }}"` deserializes to
/// [`CommandSubstitution`](Self::CommandSubstitution) holding `echo $HOME`;
/// anything else is a [`Literal`](Self::Literal).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ConfigValue {
    /// Used verbatim.
    Literal(String),
    /// Replaced by the trimmed standard output of `sh -c <command>`.
    CommandSubstitution(String),
}

impl From<String> for ConfigValue {
    fn from(raw: String) -> Self {
        let trimmed = raw.trim();
        match trimmed
            .strip_prefix("{{")
            .and_then(|rest| rest.strip_suffix("}}"))
        {
            Some(command) => Self::CommandSubstitution(command.trim().to_string()),
            None => Self::Literal(raw),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl ConfigValue {
    /// Produce the final string, running the command in `dir` if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Substitution`] if the command cannot be run or
    /// exits non-zero.
    pub fn resolve(&self, executor: &dyn Executor, dir: &Path) -> Result<String> {
        match self {
            Self::Literal(s) => Ok(s.clone()),
            Self::CommandSubstitution(command) => {
                let result = executor.run_in(dir, "sh", &["-c", command]).map_err(|e| {
                    ConfigError::Substitution {
                        command: command.clone(),
                        reason: e.to_string(),
                    }
                })?;
                Ok(result.stdout.trim().to_string())
            }
        }
    }
}
