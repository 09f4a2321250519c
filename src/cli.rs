use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI entry point for confit.
#[derive(Parser, Debug)]
#[command(
    name = "confit",
    about = "Install, back up, diff and sync grouped configuration files",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Config file to load (repeatable; default: $CONFIT_CONFIG or ./.conf.it)
    #[arg(short, long = "config", value_name = "FILE", global = true)]
    pub config: Vec<PathBuf>,

    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,
}

impl GlobalOpts {
    /// Config files to load, falling back to the default location.
    #[must_use]
    pub fn config_paths(&self) -> Vec<PathBuf> {
        if self.config.is_empty() {
            crate::config::default_paths()
        } else {
            self.config.clone()
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Copy install files into place
    Install(InstallOpts),
    /// Copy sync files into place
    Apply(ApplyOpts),
    /// Copy installed files back into the repository
    Sync(GroupArgs),
    /// Show differences between the repository and installed files
    Diff(DiffOpts),
    /// Move installed files aside with a timestamp
    Backup(BackupOpts),
    /// Verify that required programs are on PATH
    Check(GroupArgs),
    /// Run post-install commands
    PostInstall(GroupArgs),
    /// List groups, or show one
    Groups(GroupsOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Install(_) => "install",
            Self::Apply(_) => "apply",
            Self::Sync(_) => "sync",
            Self::Diff(_) => "diff",
            Self::Backup(_) => "backup",
            Self::Check(_) => "check",
            Self::PostInstall(_) => "post-install",
            Self::Groups(_) => "groups",
            Self::Version => "version",
        }
    }
}

/// Group selection shared by most subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct GroupArgs {
    /// Groups to operate on (default: all)
    #[arg(value_name = "GROUP")]
    pub groups: Vec<String>,
}

/// Options for the `install` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct InstallOpts {
    #[command(flatten)]
    pub selection: GroupArgs,

    /// Back up existing destinations first
    #[arg(short, long)]
    pub backup: bool,

    /// Overwrite existing destinations without a backup
    #[arg(short, long, visible_alias = "no-backup", conflicts_with = "backup")]
    pub force: bool,
}

/// Options for the `apply` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct ApplyOpts {
    #[command(flatten)]
    pub selection: GroupArgs,

    /// Back up existing destinations first
    #[arg(short, long)]
    pub backup: bool,

    /// Overwrite existing destinations without a backup
    #[arg(short, long, conflicts_with = "backup")]
    pub force: bool,
}

/// Options for the `diff` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct DiffOpts {
    #[command(flatten)]
    pub selection: GroupArgs,

    /// Print raw diffs instead of using the configured pager
    #[arg(long)]
    pub no_pager: bool,
}

/// Options for the `backup` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct BackupOpts {
    #[command(flatten)]
    pub selection: GroupArgs,

    /// Back up sync destinations instead of install destinations
    #[arg(short, long)]
    pub sync: bool,
}

/// Options for the `groups` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GroupsOpts {
    /// Group to show in detail
    pub group: Option<String>,
}
