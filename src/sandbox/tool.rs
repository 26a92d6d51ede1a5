//! The catalog of supported tools.
//!
//! Each [`ToolKind`] pins down two things: which base image the sandbox runs
//! on, and how the raw command-line arguments are rewritten into the final
//! vector handed to the container entrypoint. The set of kinds is closed and
//! compiled in; adding a tool is an edit here, not a change to the planning
//! or execution logic.

/// A supported package-manager or build-tool integration.
///
/// "Exec" variants run a binary that is assumed to be already installed
/// inside the sandbox image, so their arguments pass through without a
/// launcher prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Npm,
    Npx,
    /// Run a JS-based binary already installed inside the sandbox.
    NpxExec,
    Yarn,
    Bun,
    Cargo,
    /// Run a Rust-based binary already installed inside the sandbox.
    CargoExec,
    Gem,
    /// Run a gem binary already installed inside the sandbox.
    GemExec,
    Pip,
    /// Run a Python-based binary already installed inside the sandbox.
    PipExec,
    Uv,
    Uvx,
    Poetry,
}

const NODE_IMAGE: &str = "node:25-bookworm-slim";
const BUN_IMAGE: &str = "oven/bun:1";
const RUST_IMAGE: &str = "rust:1-bookworm";
const RUBY_IMAGE: &str = "ruby:3-bookworm";
const PYTHON_IMAGE: &str = "python:3-bookworm";
const UV_IMAGE: &str = "ghcr.io/astral-sh/uv:bookworm-slim";

impl ToolKind {
    /// Base image the sandbox for this tool runs on.
    #[must_use]
    pub fn image(&self) -> &'static str {
        match self {
            Self::Npm | Self::Npx | Self::NpxExec | Self::Yarn => NODE_IMAGE,
            Self::Bun => BUN_IMAGE,
            Self::Cargo | Self::CargoExec => RUST_IMAGE,
            Self::Gem | Self::GemExec => RUBY_IMAGE,
            Self::Pip | Self::PipExec | Self::Poetry => PYTHON_IMAGE,
            Self::Uv | Self::Uvx => UV_IMAGE,
        }
    }

    /// Launcher token prepended to the raw arguments, if any.
    ///
    /// Exec variants return `None`: the target binary is the entrypoint and
    /// the arguments travel unchanged.
    #[must_use]
    pub fn launcher(&self) -> Option<&'static str> {
        match self {
            Self::Npm => Some("npm"),
            Self::Npx => Some("npx"),
            Self::Yarn => Some("yarn"),
            Self::Bun => Some("bun"),
            Self::Cargo => Some("cargo"),
            Self::Gem => Some("gem"),
            Self::Pip => Some("pip"),
            Self::Uv => Some("uv"),
            Self::Uvx => Some("uvx"),
            Self::Poetry => Some("poetry"),
            Self::NpxExec | Self::CargoExec | Self::GemExec | Self::PipExec => None,
        }
    }

    /// Returns `true` for kinds whose target binary is pre-installed in the image.
    #[must_use]
    pub fn is_exec(&self) -> bool {
        self.launcher().is_none()
    }

    /// Whether invocations of this kind may run external AI/agent CLIs and
    /// therefore get the per-user agent configuration mounts.
    #[must_use]
    pub fn uses_agent_clis(&self) -> bool {
        matches!(
            self,
            Self::Npm | Self::Npx | Self::NpxExec | Self::Yarn | Self::Bun
        )
    }

    /// Rewrites the raw argument vector into the final one.
    ///
    /// Most kinds prepend their launcher token. Exec kinds pass arguments
    /// through unchanged. `gem install` additionally gets `--conservative`
    /// injected right after the subcommand, so an install never silently
    /// upgrades gems that are already present in the cache volume.
    #[must_use]
    pub fn rewrite_args(&self, raw: &[String]) -> Vec<String> {
        if *self == Self::Gem && raw.first().is_some_and(|a| a == "install") {
            let mut args = vec!["gem".to_string(), "install".to_string(), "--conservative".to_string()];
            args.extend(raw[1..].iter().cloned());
            return args;
        }

        match self.launcher() {
            Some(launcher) => {
                let mut args = Vec::with_capacity(raw.len() + 1);
                args.push(launcher.to_string());
                args.extend(raw.iter().cloned());
                args
            }
            None => raw.to_vec(),
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Npm => "npm",
            Self::Npx => "npx",
            Self::NpxExec => "npx-exec",
            Self::Yarn => "yarn",
            Self::Bun => "bun",
            Self::Cargo => "cargo",
            Self::CargoExec => "cargo-exec",
            Self::Gem => "gem",
            Self::GemExec => "gem-exec",
            Self::Pip => "pip",
            Self::PipExec => "pip-exec",
            Self::Uv => "uv",
            Self::Uvx => "uvx",
            Self::Poetry => "poetry",
        };
        f.write_str(name)
    }
}
