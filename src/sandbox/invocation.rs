//! Translation of an execution plan into container-runtime arguments.
//!
//! [`assemble`] is deterministic: the same plan and interactivity flag always
//! produce the same token vector. Emission order is fixed and matters twice
//! over: later flags win in the runtime's parser, and the cache volumes must
//! come after the explicit bind mounts so they can never shadow one.
//!
//! The full cache-volume battery is attached to every invocation, whatever
//! the tool kind. Selecting only the active ecosystem's volumes would save a
//! few mount entries per run at the cost of a selection step and a stateful
//! assembler; unused volumes are simply empty.

use std::path::Path;

use tracing::trace;

use super::agent;
use super::config::SandboxConfig;
use super::paths::referenced_paths;
use crate::error::InvocationError;

/// Named cache volumes and their fixed in-container locations, one or more
/// per package-manager ecosystem.
///
/// Without explicit names the runtime would create anonymous volumes and
/// delete them with the container, losing the cache on every run.
pub const CACHE_VOLUMES: &[(&str, &str)] = &[
    ("npm1", "/.npm"),
    ("npm2", "/root/.npm"),
    ("bun1", "/root/.bun/install/cache"),
    ("yarn1", "/usr/local/share/.cache/yarn"),
    ("ruby1", "/usr/local/bundle/"),
    ("ruby2", "/root/.gem/ruby/"),
    ("ruby3", "/usr/local/lib/ruby/gems/"),
    ("ruby4", "/root/.cache/gem/specs"),
    ("ruby5", "/root/.rbenv/"),
    ("cargo1", "/usr/local/cargo"),
    ("python1", "/root/.cache/pip"),
    ("python2", "/root/.cache/uv"),
    ("python3", "/root/.cache/pypoetry"),
];

/// Assembles the runtime argument vector for one invocation.
///
/// The vector starts at the runtime's `run` subcommand; the caller prepends
/// the runtime program itself. `interactive` reflects whether the caller's
/// stdin is a terminal and controls the `--interactive --tty` pair, so batch
/// and CI runs never block waiting for input.
///
/// # Errors
///
/// Fails only when the plan's tool kind needs agent credential mounts and
/// the host home directory cannot be resolved, or a host-side agent path
/// cannot be created.
pub fn assemble(config: &SandboxConfig, interactive: bool) -> Result<Vec<String>, InvocationError> {
    let home = if config.tool().uses_agent_clis() {
        Some(dirs::home_dir().ok_or(InvocationError::HomeDirUnresolved)?)
    } else {
        None
    };
    assemble_with_home(config, interactive, home.as_deref())
}

/// [`assemble`] with the home directory supplied by the caller.
///
/// Split out so tests can exercise agent-kind invocations against a
/// temporary home. `home` must be `Some` for agent-CLI kinds.
pub fn assemble_with_home(
    config: &SandboxConfig,
    interactive: bool,
    home: Option<&Path>,
) -> Result<Vec<String>, InvocationError> {
    let mut args: Vec<String> = vec!["run".into(), "--rm".into(), "--init".into()];
    if interactive {
        args.push("--interactive".into());
        args.push("--tty".into());
    }

    let working_dir = config.working_dir();

    // Working-directory mount; omitted entirely with --no-disk-access.
    if config.mount_working_dir_rw() {
        args.push(bind_mount(working_dir, working_dir, false));
    } else if config.mount_working_dir_ro() {
        args.push(bind_mount(working_dir, working_dir, true));
    }

    // Paths named in the arguments but outside the working directory. The
    // scan runs here, not at plan build time, so building stays free of I/O.
    if config.mount_referenced_rw() || config.mount_referenced_ro() {
        let readonly = config.mount_referenced_ro();
        for path in referenced_paths(config.args(), working_dir) {
            args.push(bind_mount(&path, &path, readonly));
        }
    }

    if config.load_env() {
        args.push(format!(
            "--env-file={}",
            working_dir.join(".env").display()
        ));
    }

    if config.tool().uses_agent_clis() {
        let home = home.ok_or(InvocationError::HomeDirUnresolved)?;
        for mount in agent::agent_mounts(home)? {
            args.push(bind_mount(&mount.source, &mount.target, false));
        }
    }

    for (name, target) in CACHE_VOLUMES {
        args.push(format!("--mount=type=volume,src={name},target={target}"));
    }

    args.push(format!("--net={}", config.network().as_str()));
    args.push(format!("--workdir={}", working_dir.display()));
    args.push(config.image().to_string());
    args.extend(config.args().iter().cloned());

    trace!(tokens = args.len(), "Assembled invocation vector");
    Ok(args)
}

fn bind_mount(source: &Path, target: &Path, readonly: bool) -> String {
    let mut spec = format!(
        "--mount=type=bind,source={},target={}",
        source.display(),
        target.display()
    );
    if readonly {
        spec.push_str(",readonly");
    }
    spec
}
