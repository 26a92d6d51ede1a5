//! Configuration for sandboxed tool invocations.
//!
//! [`SandboxConfig`] is the execution plan: everything the assembler and the
//! runner need to know about one invocation, resolved up front. A plan starts
//! from per-tool defaults and is refined through chained `with_*` options.
//! Options apply strictly in call order, so a later option overwrites an
//! earlier one; the two mount-mode pairs additionally clear their counterpart
//! when set, keeping read-write and read-only mutually exclusive no matter
//! the order the options arrive in.
//!
//! Building a plan performs no I/O. Path scanning and host checks happen
//! later, when the invocation is assembled.

use std::path::{Path, PathBuf};

use super::tool::ToolKind;

/// Network namespace mode for the container.
///
/// Ref: <https://docs.docker.com/engine/network/>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkMode {
    Host,
    None,
    Bridge,
}

impl NetworkMode {
    /// Token value for the runtime's `--net=` flag.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::None => "none",
            Self::Bridge => "bridge",
        }
    }
}

/// The resolved plan for one sandboxed invocation.
///
/// # Example
///
/// ```
/// use pkgbox::sandbox::{NetworkMode, SandboxConfig, ToolKind};
///
/// let config = SandboxConfig::for_tool(ToolKind::Npm)
///     .with_working_dir("/home/u/proj")
///     .with_args(&["install".to_string()])
///     .with_mount_working_dir_read_only(true)
///     .with_network(NetworkMode::None);
///
/// assert_eq!(config.args(), ["npm", "install"]);
/// assert!(!config.mount_working_dir_rw());
/// ```
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    tool: ToolKind,
    image: &'static str,
    working_dir: PathBuf,
    args: Vec<String>,

    // At most one of each RW/RO pair is true.
    mount_working_dir_rw: bool,
    mount_working_dir_ro: bool,
    mount_referenced_rw: bool,
    mount_referenced_ro: bool,

    run_as_non_root: bool,
    network: NetworkMode,
    load_env: bool,
}

impl SandboxConfig {
    /// Creates a plan seeded with the defaults for `tool`.
    ///
    /// Defaults: working directory `.`, no arguments, working directory
    /// mounted read-write, referenced paths not mounted, run as non-root,
    /// host networking, no `.env` loading.
    #[must_use]
    pub fn for_tool(tool: ToolKind) -> Self {
        Self {
            tool,
            image: tool.image(),
            working_dir: PathBuf::from("."),
            args: Vec::new(),
            mount_working_dir_rw: true,
            mount_working_dir_ro: false,
            mount_referenced_rw: false,
            mount_referenced_ro: false,
            run_as_non_root: true,
            network: NetworkMode::Host,
            load_env: false,
        }
    }

    /// Sets the working directory the tool runs in (and mounts, per policy).
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Sets the tool arguments.
    ///
    /// The registry rewrite for this plan's tool kind is applied here, so
    /// every later consumer sees only the final vector.
    #[must_use]
    pub fn with_args(mut self, raw: &[String]) -> Self {
        self.args = self.tool.rewrite_args(raw);
        self
    }

    /// Mounts the working directory read-write.
    ///
    /// Setting this clears a previously requested read-only mount.
    #[must_use]
    pub fn with_mount_working_dir_read_write(mut self, rw: bool) -> Self {
        if rw {
            self.mount_working_dir_ro = false;
        }
        self.mount_working_dir_rw = rw;
        self
    }

    /// Mounts the working directory read-only.
    ///
    /// Setting this clears a previously requested read-write mount.
    #[must_use]
    pub fn with_mount_working_dir_read_only(mut self, ro: bool) -> Self {
        if ro {
            self.mount_working_dir_rw = false;
        }
        self.mount_working_dir_ro = ro;
        self
    }

    /// Mounts paths referenced by the arguments read-write.
    #[must_use]
    pub fn with_mount_referenced_paths_read_write(mut self, rw: bool) -> Self {
        if rw {
            self.mount_referenced_ro = false;
        }
        self.mount_referenced_rw = rw;
        self
    }

    /// Mounts paths referenced by the arguments read-only.
    #[must_use]
    pub fn with_mount_referenced_paths_read_only(mut self, ro: bool) -> Self {
        if ro {
            self.mount_referenced_rw = false;
        }
        self.mount_referenced_ro = ro;
        self
    }

    /// Sets the container network mode.
    #[must_use]
    pub fn with_network(mut self, network: NetworkMode) -> Self {
        self.network = network;
        self
    }

    /// Sets whether the container should run as a non-root user.
    #[must_use]
    pub fn with_run_as_non_root(mut self, non_root: bool) -> Self {
        self.run_as_non_root = non_root;
        self
    }

    /// Sets whether a `.env` file in the working directory is loaded into the
    /// container environment.
    #[must_use]
    pub fn with_load_env(mut self, load_env: bool) -> Self {
        self.load_env = load_env;
        self
    }

    #[must_use]
    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    #[must_use]
    pub fn image(&self) -> &'static str {
        self.image
    }

    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn mount_working_dir_rw(&self) -> bool {
        self.mount_working_dir_rw
    }

    #[must_use]
    pub fn mount_working_dir_ro(&self) -> bool {
        self.mount_working_dir_ro
    }

    #[must_use]
    pub fn mount_referenced_rw(&self) -> bool {
        self.mount_referenced_rw
    }

    #[must_use]
    pub fn mount_referenced_ro(&self) -> bool {
        self.mount_referenced_ro
    }

    #[must_use]
    pub fn run_as_non_root(&self) -> bool {
        self.run_as_non_root
    }

    #[must_use]
    pub fn network(&self) -> NetworkMode {
        self.network
    }

    #[must_use]
    pub fn load_env(&self) -> bool {
        self.load_env
    }
}
