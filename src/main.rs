//! pkgbox - Entry Point
//!
//! Parses the command line, builds the execution plan for the chosen tool,
//! and maps the run outcome onto this process's exit status.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use tracing::{Level, debug};
use tracing_subscriber::{EnvFilter, fmt};

use pkgbox::sandbox::{CommandRunner, NetworkMode, RunOutcome, SandboxConfig, ToolKind};

/// pkgbox runs package-manager and build tools inside container sandboxes.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Working directory for this command (default: current directory)
    #[arg(short = 'd', long, global = true, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Disable network access inside the sandbox
    #[arg(short = 'n', long, global = true)]
    no_network: bool,

    /// Mount the working directory and referenced paths as read-only
    #[arg(short = 'r', long, global = true)]
    read_only: bool,

    /// Disable disk access inside the sandbox
    #[arg(short = 'x', long, global = true)]
    no_disk_access: bool,

    /// Load a .env file from the working directory into the sandbox
    #[arg(
        short = 'e',
        long,
        global = true,
        value_name = "BOOL",
        default_value_t = true,
        default_missing_value = "true",
        num_args = 0..=1,
        action = clap::ArgAction::Set
    )]
    load_env: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    tool: Tool,
}

/// One subcommand per supported tool integration.
#[derive(Subcommand, Debug)]
enum Tool {
    /// Run an npm command
    Npm(ToolArgs),
    /// Run an npx command
    Npx(ToolArgs),
    /// Run a JS-based binary already installed inside the sandbox
    NpxExec(ToolArgs),
    /// Run a yarn command
    Yarn(ToolArgs),
    /// Run a bun command
    Bun(ToolArgs),
    /// Run a cargo command
    Cargo(ToolArgs),
    /// Run a Rust-based binary already installed inside the sandbox
    CargoExec(ToolArgs),
    /// Run a Ruby gem command
    Gem(ToolArgs),
    /// Run a gem binary already installed inside the sandbox
    GemExec(ToolArgs),
    /// Run a pip command
    Pip(ToolArgs),
    /// Run a Python-based binary already installed inside the sandbox
    PipExec(ToolArgs),
    /// Run a uv command
    Uv(ToolArgs),
    /// Run a Python-based tool through uvx
    Uvx(ToolArgs),
    /// Run a poetry command
    Poetry(ToolArgs),
}

#[derive(Args, Debug)]
struct ToolArgs {
    /// Arguments passed through to the tool
    #[arg(
        value_name = "ARG",
        trailing_var_arg = true,
        allow_hyphen_values = true,
        num_args = 0..
    )]
    args: Vec<String>,
}

impl Tool {
    fn into_parts(self) -> (ToolKind, Vec<String>) {
        match self {
            Self::Npm(a) => (ToolKind::Npm, a.args),
            Self::Npx(a) => (ToolKind::Npx, a.args),
            Self::NpxExec(a) => (ToolKind::NpxExec, a.args),
            Self::Yarn(a) => (ToolKind::Yarn, a.args),
            Self::Bun(a) => (ToolKind::Bun, a.args),
            Self::Cargo(a) => (ToolKind::Cargo, a.args),
            Self::CargoExec(a) => (ToolKind::CargoExec, a.args),
            Self::Gem(a) => (ToolKind::Gem, a.args),
            Self::GemExec(a) => (ToolKind::GemExec, a.args),
            Self::Pip(a) => (ToolKind::Pip, a.args),
            Self::PipExec(a) => (ToolKind::PipExec, a.args),
            Self::Uv(a) => (ToolKind::Uv, a.args),
            Self::Uvx(a) => (ToolKind::Uvx, a.args),
            Self::Poetry(a) => (ToolKind::Poetry, a.args),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cwd = std::env::current_dir().into_diagnostic()?;
    let directory = match cli.directory {
        Some(dir) if dir.is_absolute() => dir,
        Some(dir) => cwd.join(dir),
        None => cwd,
    };

    // The flag only takes effect when the file is actually there; the sandbox
    // consumes it via --env-file, which fails hard on a missing file.
    let env_file = directory.join(".env");
    let load_env = cli.load_env && env_file.is_file();
    if load_env {
        debug!(env_file = %env_file.display(), ".env file found, will be loaded inside the sandbox");
    }

    let (kind, raw_args) = cli.tool.into_parts();
    debug!(tool = %kind, directory = %directory.display(), args = ?raw_args, "Running command");

    let mut config = SandboxConfig::for_tool(kind)
        .with_working_dir(&directory)
        .with_args(&raw_args)
        .with_run_as_non_root(true)
        .with_load_env(load_env);

    config = if cli.read_only {
        config
            .with_mount_working_dir_read_only(true)
            .with_mount_referenced_paths_read_only(true)
    } else {
        config
            .with_mount_working_dir_read_write(true)
            .with_mount_referenced_paths_read_write(true)
    };

    if cli.no_disk_access {
        config = config
            .with_mount_working_dir_read_write(false)
            .with_mount_working_dir_read_only(false)
            .with_mount_referenced_paths_read_write(false)
            .with_mount_referenced_paths_read_only(false);
    }

    config = config.with_network(if cli.no_network {
        NetworkMode::None
    } else {
        NetworkMode::Host
    });

    let runner = CommandRunner::detect()?;
    match runner.execute(&config)? {
        RunOutcome::Success => Ok(()),
        RunOutcome::ChildExited(code) => {
            debug!(code = code, "Relaying tool exit code");
            std::process::exit(code);
        }
    }
}
