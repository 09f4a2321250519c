#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing,
    clippy::panic
)]
//! Integration tests for the group subcommands, driven through the same
//! entry points `main` uses, against real temporary directories.

mod common;

use common::*;
use confit::cli::{ApplyOpts, BackupOpts, DiffOpts, GroupArgs, GroupsOpts, InstallOpts};
use confit::commands::{self, RunStatus};
use confit::error::ConfigError;
use confit::engine::GroupEngine;
use confit::logging::GroupStatus;
use confit::resources::diff::Finding;

const VIM: &str = "
groups:
  vim:
    dest: {home}
    install_files:
      - [vim/vimrc, .vimrc]
      - [vim/colors, .vim/colors]
";

fn select(names: &[&str]) -> GroupArgs {
    GroupArgs {
        groups: names.iter().map(ToString::to_string).collect(),
    }
}

// ---------------------------------------------------------------------------
// install
// ---------------------------------------------------------------------------

#[test]
fn install_copies_into_home() {
    let ctx = TestContextBuilder::new()
        .with_repo_file("vim/vimrc", "set nu\n")
        .with_repo_file("vim/colors/dark.vim", "hi Normal\n")
        .with_config(VIM)
        .build();
    let log = test_logger();
    let setup = ctx.setup(false, &log).unwrap();

    let status = commands::install::run(&setup, &InstallOpts::default(), &log).unwrap();

    assert_eq!(status, RunStatus::Clean);
    assert_eq!(ctx.read_home(".vimrc"), "set nu\n");
    assert_eq!(ctx.read_home(".vim/colors/dark.vim"), "hi Normal\n");
    assert_eq!(entry(&log.group_entries(), "vim").status, GroupStatus::Ok);
}

#[test]
fn second_install_fails_until_backed_up() {
    let ctx = TestContextBuilder::new()
        .with_repo_file("vim/vimrc", "set nu\n")
        .with_repo_file("vim/colors/dark.vim", "hi Normal\n")
        .with_config(VIM)
        .build();

    let log = test_logger();
    let setup = ctx.setup(false, &log).unwrap();
    commands::install::run(&setup, &InstallOpts::default(), &log).unwrap();

    let log = test_logger();
    let err = commands::install::run(&setup, &InstallOpts::default(), &log).unwrap_err();
    assert!(err.to_string().contains("1 group(s) failed"));
    let failed = entry(&log.group_entries(), "vim").clone();
    assert_eq!(failed.status, GroupStatus::Failed);
    assert!(
        failed
            .message
            .as_deref()
            .is_some_and(|m| m.contains("back it up first"))
    );

    let log = test_logger();
    let opts = InstallOpts {
        backup: true,
        ..InstallOpts::default()
    };
    assert_eq!(
        commands::install::run(&setup, &opts, &log).unwrap(),
        RunStatus::Clean
    );
    assert_eq!(ctx.backups_of(".vimrc").len(), 1);
    assert_eq!(ctx.backups_of(".vim/colors").len(), 1);
    assert_eq!(ctx.read_home(".vimrc"), "set nu\n");
}

#[test]
fn force_overwrites_without_backup() {
    let ctx = TestContextBuilder::new()
        .with_repo_file("vim/vimrc", "set nu\n")
        .with_repo_file("vim/colors/dark.vim", "hi Normal\n")
        .with_home_file(".vimrc", "old\n")
        .with_home_file(".vim/colors/mine.vim", "keep\n")
        .with_config(VIM)
        .build();
    let log = test_logger();
    let setup = ctx.setup(false, &log).unwrap();
    let opts = InstallOpts {
        force: true,
        ..InstallOpts::default()
    };

    commands::install::run(&setup, &opts, &log).unwrap();

    assert_eq!(ctx.read_home(".vimrc"), "set nu\n");
    assert_eq!(ctx.read_home(".vim/colors/mine.vim"), "keep\n");
    assert!(ctx.backups_of(".vimrc").is_empty());
}

#[test]
fn failing_group_does_not_stop_others() {
    let ctx = TestContextBuilder::new()
        .with_repo_file("git/gitconfig", "[user]\n")
        .with_config(
            "
groups:
  broken:
    dest: {home}
    files: [[missing, .missing]]
  git:
    dest: {home}
    files: [[git/gitconfig, .gitconfig]]
",
        )
        .build();
    let log = test_logger();
    let setup = ctx.setup(false, &log).unwrap();

    assert!(commands::install::run(&setup, &InstallOpts::default(), &log).is_err());

    let entries = log.group_entries();
    assert_eq!(entry(&entries, "broken").status, GroupStatus::Failed);
    assert_eq!(entry(&entries, "git").status, GroupStatus::Ok);
    assert_eq!(ctx.read_home(".gitconfig"), "[user]\n");
}

#[test]
fn dry_run_install_with_backup_touches_nothing() {
    let ctx = TestContextBuilder::new()
        .with_repo_file("vim/vimrc", "set nu\n")
        .with_repo_file("vim/colors/dark.vim", "hi Normal\n")
        .with_home_file(".vimrc", "old\n")
        .with_config(VIM)
        .build();
    let log = test_logger();
    let setup = ctx.setup(true, &log).unwrap();
    let opts = InstallOpts {
        backup: true,
        ..InstallOpts::default()
    };

    commands::install::run(&setup, &opts, &log).unwrap();

    assert_eq!(entry(&log.group_entries(), "vim").status, GroupStatus::DryRun);
    assert_eq!(ctx.read_home(".vimrc"), "old\n");
    assert!(ctx.backups_of(".vimrc").is_empty());
    assert!(!ctx.home().join(".vim").exists());
}

#[test]
fn unknown_group_is_a_hard_failure() {
    let ctx = TestContextBuilder::new().with_config(VIM).build();
    let log = test_logger();
    let setup = ctx.setup(false, &log).unwrap();
    let opts = InstallOpts {
        selection: select(&["emacs"]),
        ..InstallOpts::default()
    };

    let err = commands::install::run(&setup, &opts, &log).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::UnknownGroup(name)) if name == "emacs"
    ));
    assert!(log.group_entries().is_empty());
}

// ---------------------------------------------------------------------------
// apply / sync
// ---------------------------------------------------------------------------

#[test]
fn explicitly_empty_sync_files_do_nothing() {
    let ctx = TestContextBuilder::new()
        .with_repo_file("zsh/zshrc", "repo\n")
        .with_home_file(".zshrc", "home\n")
        .with_config(
            "
groups:
  zsh:
    dest: {home}
    install_files: [[zsh/zshrc, .zshrc]]
    sync_files: []
",
        )
        .build();
    let log = test_logger();
    let setup = ctx.setup(false, &log).unwrap();

    commands::apply::run(&setup, &ApplyOpts::default(), &log).unwrap();
    commands::sync::run(&setup, &GroupArgs::default(), &log).unwrap();
    let diff = DiffOpts {
        no_pager: true,
        ..DiffOpts::default()
    };
    assert_eq!(
        commands::diff::run(&setup, &diff, &log).unwrap(),
        RunStatus::Clean
    );

    let entries = log.group_entries();
    assert_eq!(entries[0].status, GroupStatus::NothingToDo);
    assert_eq!(entries[1].status, GroupStatus::NothingToDo);
    assert_eq!(ctx.read_repo("zsh/zshrc"), "repo\n");
    assert_eq!(ctx.read_home(".zshrc"), "home\n");
}

#[test]
fn sync_pulls_installed_edits_back() {
    let ctx = TestContextBuilder::new()
        .with_repo_file("tmux/tmux.conf", "set -g mouse off\n")
        .with_home_file(".tmux.conf", "set -g mouse on\n")
        .with_config(
            "
groups:
  tmux:
    dest: {home}
    files:
      - [tmux/tmux.conf, .tmux.conf]
      - [tmux/extra.conf, .tmux.extra]
",
        )
        .build();
    let log = test_logger();
    let setup = ctx.setup(false, &log).unwrap();

    commands::sync::run(&setup, &GroupArgs::default(), &log).unwrap();

    assert_eq!(ctx.read_repo("tmux/tmux.conf"), "set -g mouse on\n");
    assert!(!ctx.repo().join("tmux/extra.conf").exists());
}

#[test]
fn apply_with_backup_moves_existing_aside() {
    let ctx = TestContextBuilder::new()
        .with_repo_file("git/gitconfig", "new\n")
        .with_home_file(".gitconfig", "old\n")
        .with_config(
            "
groups:
  git:
    dest: {home}
    files: [[git/gitconfig, .gitconfig]]
",
        )
        .build();
    let log = test_logger();
    let setup = ctx.setup(false, &log).unwrap();
    let opts = ApplyOpts {
        backup: true,
        ..ApplyOpts::default()
    };

    commands::apply::run(&setup, &opts, &log).unwrap();

    assert_eq!(ctx.read_home(".gitconfig"), "new\n");
    let backups = ctx.backups_of(".gitconfig");
    assert_eq!(backups.len(), 1);
    assert_eq!(
        std::fs::read_to_string(ctx.home().join(&backups[0])).unwrap(),
        "old\n"
    );
}

// ---------------------------------------------------------------------------
// diff
// ---------------------------------------------------------------------------

#[test]
fn diff_is_clean_right_after_install() {
    let ctx = TestContextBuilder::new()
        .with_repo_file("vim/vimrc", "set nu\n")
        .with_repo_file("vim/colors/dark.vim", "hi Normal\n")
        .with_config(VIM)
        .build();
    let log = test_logger();
    let setup = ctx.setup(false, &log).unwrap();
    let diff = DiffOpts {
        no_pager: true,
        ..DiffOpts::default()
    };

    assert_eq!(
        commands::diff::run(&setup, &diff, &log).unwrap(),
        RunStatus::Attention,
        "nothing installed yet"
    );
    commands::install::run(&setup, &InstallOpts::default(), &log).unwrap();

    let log = test_logger();
    assert_eq!(
        commands::diff::run(&setup, &diff, &log).unwrap(),
        RunStatus::Clean
    );
}

#[test]
fn diff_detects_one_sided_entries() {
    let ctx = TestContextBuilder::new()
        .with_repo_file("cfg/x", "x\n")
        .with_home_file(".cfg/y", "y\n")
        .with_config(
            "
groups:
  cfg:
    dest: {home}
    files: [[cfg, .cfg]]
",
        )
        .build();
    let log = test_logger();
    let setup = ctx.setup(false, &log).unwrap();
    let engine_ctx = setup.context(&log);
    let group = setup.config.group("cfg").unwrap();

    let report = GroupEngine::new(group, &engine_ctx).diff_report();

    assert_eq!(
        report.findings,
        vec![
            Finding::SourceOnly(ctx.repo().join("cfg/x")),
            Finding::DestinationOnly(ctx.home().join(".cfg/y")),
        ]
    );
}

#[test]
fn diff_uses_pager_unless_disabled() {
    let ctx = TestContextBuilder::new()
        .with_repo_file("rc", "a\n")
        .with_home_file(".rc", "b\n")
        .with_config(
            "
settings:
  copy_tool: native
  pager: cat > {home}/pager-output
groups:
  rc:
    dest: {home}
    files: [[rc, .rc]]
",
        )
        .build();
    let log = test_logger();
    let setup = ctx.setup(false, &log).unwrap();

    let status = commands::diff::run(&setup, &DiffOpts::default(), &log).unwrap();

    assert_eq!(status, RunStatus::Attention);
    assert_eq!(entry(&log.group_entries(), "rc").status, GroupStatus::Differs);
    assert!(ctx.read_home("pager-output").contains("-a\n+b\n"));
}

// ---------------------------------------------------------------------------
// backup
// ---------------------------------------------------------------------------

#[test]
fn backup_command_respects_max_backups() {
    let ctx = TestContextBuilder::new()
        .with_config(
            "
groups:
  rc:
    dest: {home}
    max_backups: 2
    files: [[rc, .rc]]
",
        )
        .build();
    let log = test_logger();
    let setup = ctx.setup(false, &log).unwrap();
    let target = ctx.home().join(".rc");

    for (i, secs) in [1_600_000_000, 1_600_000_060, 1_600_000_120].iter().enumerate() {
        std::fs::write(&target, format!("v{i}")).unwrap();
        filetime::set_file_mtime(&target, filetime::FileTime::from_unix_time(*secs, 0)).unwrap();
        commands::backup::run(&setup, &BackupOpts::default(), &log).unwrap();
    }

    let remaining = confit::resources::backup::list_backups(&target).unwrap();
    assert_eq!(remaining.len(), 2);
    assert_eq!(std::fs::read_to_string(&remaining[0]).unwrap(), "v1");
    assert_eq!(std::fs::read_to_string(&remaining[1]).unwrap(), "v2");
}

// ---------------------------------------------------------------------------
// check / post-install / groups
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[test]
fn check_reports_missing_binaries() {
    let ctx = TestContextBuilder::new()
        .with_config(
            "
groups:
  shell:
    dest: {home}
    check_binaries:
      - [sh, posix shell]
  exotic:
    dest: {home}
    check_binaries:
      - [this-binary-does-not-exist-4242, nothing]
",
        )
        .build();
    let log = test_logger();
    let setup = ctx.setup(false, &log).unwrap();

    assert_eq!(
        commands::check::run(&setup, &select(&["shell"]), &log).unwrap(),
        RunStatus::Clean
    );
    let log = test_logger();
    assert_eq!(
        commands::check::run(&setup, &GroupArgs::default(), &log).unwrap(),
        RunStatus::Attention
    );
    assert_eq!(
        entry(&log.group_entries(), "exotic").status,
        GroupStatus::Differs
    );
}

#[cfg(unix)]
#[test]
fn post_install_runs_in_destination_subdir() {
    let ctx = TestContextBuilder::new()
        .with_home_file("plugins/.keep", "")
        .with_config(
            "
groups:
  vim:
    dest: {home}
    post_install_cmds:
      - [touch installed-marker, plugins]
",
        )
        .build();
    let log = test_logger();
    let setup = ctx.setup(false, &log).unwrap();

    commands::post_install::run(&setup, &GroupArgs::default(), &log).unwrap();

    assert!(ctx.home().join("plugins/installed-marker").exists());
}

#[cfg(unix)]
#[test]
fn post_install_failure_is_recorded() {
    let ctx = TestContextBuilder::new()
        .with_config(
            "
groups:
  vim:
    dest: {home}
    post_install_cmds:
      - [exit 4, .]
",
        )
        .build();
    let log = test_logger();
    let setup = ctx.setup(false, &log).unwrap();

    assert!(commands::post_install::run(&setup, &GroupArgs::default(), &log).is_err());
    assert_eq!(entry(&log.group_entries(), "vim").status, GroupStatus::Failed);
}

#[test]
fn groups_command_reports_unknown_name() {
    let ctx = TestContextBuilder::new().with_config(VIM).build();
    let log = test_logger();
    let setup = ctx.setup(false, &log).unwrap();

    assert_eq!(
        commands::groups::run(&setup, &GroupsOpts { group: None }, &log),
        RunStatus::Clean
    );
    assert_eq!(
        commands::groups::run(
            &setup,
            &GroupsOpts {
                group: Some("vim".to_string())
            },
            &log
        ),
        RunStatus::Clean
    );
    assert_eq!(
        commands::groups::run(
            &setup,
            &GroupsOpts {
                group: Some("nope".to_string())
            },
            &log
        ),
        RunStatus::Attention
    );
}
