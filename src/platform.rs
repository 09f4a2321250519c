//! Host identification used to filter groups by `host:`.
use std::fmt;

/// Information about the machine confit is running on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Short host name (everything before the first `.`).
    pub hostname: String,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hostname)
    }
}

impl Platform {
    /// Detect the current host.
    ///
    /// Falls back to an empty host name when the OS refuses to tell, which
    /// makes every host-restricted group inapplicable.
    #[must_use]
    pub fn detect() -> Self {
        let hostname = hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(&hostname)
    }

    /// Create a platform with an explicit host name.
    #[must_use]
    pub fn new(hostname: &str) -> Self {
        let short = hostname.split('.').next().unwrap_or(hostname);
        Self {
            hostname: short.to_string(),
        }
    }

    /// Whether a group restricted to `hosts` applies here.
    ///
    /// An empty list means "every host". Entries are compared
    /// case-insensitively against the short host name.
    #[must_use]
    pub fn matches_any(&self, hosts: &[String]) -> bool {
        hosts.is_empty()
            || hosts.iter().any(|h| {
                let short = h.split('.').next().unwrap_or(h);
                short.eq_ignore_ascii_case(&self.hostname)
            })
    }
}
