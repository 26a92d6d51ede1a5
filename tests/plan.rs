//! End-to-end tests for plan building and invocation assembly.
//!
//! These run the whole planning pipeline (tool defaults, option
//! application, argument rewriting, path scanning, assembly) without a
//! container runtime, and pin down the exact token vectors the runtime
//! would receive.

use std::fs::{self, File};
use std::path::Path;

use tempfile::TempDir;

use pkgbox::sandbox::{
    CACHE_VOLUMES, NetworkMode, SandboxConfig, ToolKind, assemble, assemble_with_home,
};

fn strings(raw: &[&str]) -> Vec<String> {
    raw.iter().map(ToString::to_string).collect()
}

fn bind_mounts_of(args: &[String], source: &Path) -> Vec<String> {
    let prefix = format!("--mount=type=bind,source={},target=", source.display());
    args.iter()
        .filter(|a| a.starts_with(&prefix))
        .cloned()
        .collect()
}

/// Exec-variant JS invocation: one RW working-dir mount, host networking,
/// the exec kind's image, and the raw args passed through untouched.
#[test]
fn test_js_exec_invocation_shape() {
    let home = TempDir::new().expect("failed to create temp home");
    let config = SandboxConfig::for_tool(ToolKind::NpxExec)
        .with_working_dir("/home/u/proj")
        .with_args(&strings(&["--version"]))
        .with_network(NetworkMode::Host)
        .with_mount_working_dir_read_write(true);

    let args =
        assemble_with_home(&config, false, Some(home.path())).expect("assemble failed");

    let wd_mounts = bind_mounts_of(&args, Path::new("/home/u/proj"));
    assert_eq!(
        wd_mounts,
        vec!["--mount=type=bind,source=/home/u/proj,target=/home/u/proj".to_string()],
        "expected exactly one read-write working-directory mount"
    );
    assert!(args.contains(&"--net=host".to_string()));
    assert!(args.contains(&ToolKind::NpxExec.image().to_string()));
    assert_eq!(args.last().unwrap(), "--version");
    assert_eq!(
        args[args.len() - 2],
        ToolKind::NpxExec.image(),
        "exec args should follow the image with no launcher token"
    );
}

/// An argument naming an existing file outside the working directory gets
/// its own bind mount, distinct from the working-directory mount.
#[test]
fn test_referenced_path_gets_second_mount() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let workdir = temp.path().join("proj");
    fs::create_dir(&workdir).expect("failed to create workdir");
    let cert = temp.path().join("ca.pem");
    File::create(&cert).expect("failed to create cert file");

    let config = SandboxConfig::for_tool(ToolKind::Gem)
        .with_working_dir(&workdir)
        .with_args(&strings(&["install", "--cert", cert.to_str().unwrap()]))
        .with_mount_referenced_paths_read_write(true);

    let args = assemble(&config, false).expect("assemble failed");

    assert_eq!(bind_mounts_of(&args, &workdir).len(), 1);
    assert_eq!(
        bind_mounts_of(&args, &cert),
        vec![format!(
            "--mount=type=bind,source={0},target={0}",
            cert.display()
        )]
    );
}

/// Without a referenced-path mount mode, external paths are not mounted
/// even when they exist.
#[test]
fn test_referenced_paths_need_a_mode() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let workdir = temp.path().join("proj");
    fs::create_dir(&workdir).expect("failed to create workdir");
    let cert = temp.path().join("ca.pem");
    File::create(&cert).expect("failed to create cert file");

    let config = SandboxConfig::for_tool(ToolKind::Gem)
        .with_working_dir(&workdir)
        .with_args(&strings(&["install", "--cert", cert.to_str().unwrap()]));

    let args = assemble(&config, false).expect("assemble failed");
    assert!(bind_mounts_of(&args, &cert).is_empty());
}

/// Read-only policy marks both mount domains with the readonly suffix.
#[test]
fn test_read_only_policy_marks_all_bind_mounts() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let workdir = temp.path().join("proj");
    fs::create_dir(&workdir).expect("failed to create workdir");
    let data = temp.path().join("data");
    fs::create_dir(&data).expect("failed to create data dir");

    let config = SandboxConfig::for_tool(ToolKind::Cargo)
        .with_working_dir(&workdir)
        .with_args(&strings(&["run", data.to_str().unwrap()]))
        .with_mount_working_dir_read_only(true)
        .with_mount_referenced_paths_read_only(true);

    let args = assemble(&config, false).expect("assemble failed");
    for mount in args.iter().filter(|a| a.starts_with("--mount=type=bind,")) {
        assert!(
            mount.ends_with(",readonly"),
            "expected readonly suffix on {mount}"
        );
    }
}

/// Identical plans assemble to byte-identical vectors.
#[test]
fn test_assembly_is_deterministic() {
    let config = SandboxConfig::for_tool(ToolKind::Uv)
        .with_working_dir("/home/u/proj")
        .with_args(&strings(&["sync", "--frozen"]))
        .with_network(NetworkMode::Bridge)
        .with_load_env(true);

    let first = assemble(&config, true).expect("assemble failed").join("\u{0}");
    let second = assemble(&config, true).expect("assemble failed").join("\u{0}");
    assert_eq!(first, second);
}

/// The full cache-volume battery rides along on every kind, so switching
/// tools on one host keeps previously warmed caches.
#[test]
fn test_every_kind_carries_all_cache_volumes() {
    let home = TempDir::new().expect("failed to create temp home");
    for kind in [
        ToolKind::Npm,
        ToolKind::Npx,
        ToolKind::NpxExec,
        ToolKind::Yarn,
        ToolKind::Bun,
        ToolKind::Cargo,
        ToolKind::CargoExec,
        ToolKind::Gem,
        ToolKind::GemExec,
        ToolKind::Pip,
        ToolKind::PipExec,
        ToolKind::Uv,
        ToolKind::Uvx,
        ToolKind::Poetry,
    ] {
        let config = SandboxConfig::for_tool(kind).with_working_dir("/home/u/proj");
        let args = assemble_with_home(&config, false, Some(home.path()))
            .expect("assemble failed");
        let volumes = args
            .iter()
            .filter(|a| a.starts_with("--mount=type=volume,"))
            .count();
        assert_eq!(volumes, CACHE_VOLUMES.len(), "wrong volume count for {kind}");
    }
}

/// Agent-CLI kinds mount the per-user config dirs and credential file;
/// other kinds do not touch the home directory.
#[test]
fn test_agent_mounts_only_for_agent_kinds() {
    let home = TempDir::new().expect("failed to create temp home");

    let npx = SandboxConfig::for_tool(ToolKind::Npx).with_working_dir("/home/u/proj");
    let args = assemble_with_home(&npx, false, Some(home.path())).expect("assemble failed");
    let claude = home.path().join(".claude");
    assert_eq!(
        bind_mounts_of(&args, &claude),
        vec![format!(
            "--mount=type=bind,source={},target=/root/.claude",
            claude.display()
        )]
    );
    assert!(home.path().join(".claude.json").is_file());

    let cargo = SandboxConfig::for_tool(ToolKind::Cargo).with_working_dir("/home/u/proj");
    let args = assemble_with_home(&cargo, false, None).expect("assemble failed");
    assert!(
        !args.iter().any(|a| a.contains(".claude")),
        "non-agent kinds must not mount agent state"
    );
}

/// Mutual exclusion holds through assembly for both option orderings.
#[test]
fn test_mount_mode_exclusion_reaches_the_vector() {
    let ro_last = SandboxConfig::for_tool(ToolKind::Pip)
        .with_working_dir("/home/u/proj")
        .with_mount_working_dir_read_write(true)
        .with_mount_working_dir_read_only(true);
    let args = assemble(&ro_last, false).expect("assemble failed");
    assert!(args.contains(
        &"--mount=type=bind,source=/home/u/proj,target=/home/u/proj,readonly".to_string()
    ));

    let rw_last = SandboxConfig::for_tool(ToolKind::Pip)
        .with_working_dir("/home/u/proj")
        .with_mount_working_dir_read_only(true)
        .with_mount_working_dir_read_write(true);
    let args = assemble(&rw_last, false).expect("assemble failed");
    assert!(args.contains(
        &"--mount=type=bind,source=/home/u/proj,target=/home/u/proj".to_string()
    ));
}
