//! Error types for pkgbox.
//!
//! Uses thiserror for deriving std::error::Error and miette for rich diagnostics.
//!
//! The taxonomy follows how failures reach the user: pre-flight problems
//! (runtime missing, image pull, home directory) are wrapped and reported,
//! invocation-assembly problems are wrapped and reported, and a non-zero exit
//! from the sandboxed tool is *not* an error at all: it travels back as a
//! [`crate::sandbox::RunOutcome`] and becomes this process's own exit status.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the application.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Pre-flight check failed before the container was started
    #[error("Pre-flight check failed")]
    #[diagnostic(code(pkgbox::preflight))]
    Preflight(#[from] PreflightError),

    /// Invocation vector could not be assembled
    #[error("Failed to assemble the container invocation")]
    #[diagnostic(code(pkgbox::invocation))]
    Invocation(#[from] InvocationError),

    /// Container execution failed for a reason other than the tool's own exit code
    #[error("Container execution failed")]
    #[diagnostic(code(pkgbox::execution))]
    Execution(#[from] ExecutionError),

    /// I/O error
    #[error("I/O error: {0}")]
    #[diagnostic(code(pkgbox::io))]
    Io(#[from] std::io::Error),
}

/// Errors detected before the container is started.
///
/// These are environment problems the user has to fix; they are never retried.
#[derive(Error, Debug, Diagnostic)]
pub enum PreflightError {
    /// No container runtime binary on PATH
    #[error("No container runtime found (tried: {candidates})")]
    #[diagnostic(
        code(pkgbox::preflight::runtime_not_found),
        help("Install docker or podman, or point PKGBOX_RUNTIME at a compatible binary")
    )]
    RuntimeNotFound { candidates: String },

    /// Runtime binary exists but the daemon did not answer
    #[error("Container runtime {runtime} is not responding")]
    #[diagnostic(
        code(pkgbox::preflight::runtime_unreachable),
        help("Check that the container daemon is running, e.g. with `{runtime} version`")
    )]
    RuntimeUnreachable { runtime: String, details: String },

    /// Image pull failed
    #[error("Failed to pull image {image}")]
    #[diagnostic(
        code(pkgbox::preflight::image_pull),
        help("Check network access to the image registry and the image name")
    )]
    ImagePull { image: String, details: String },
}

/// Errors while turning an execution plan into runtime arguments.
#[derive(Error, Debug, Diagnostic)]
pub enum InvocationError {
    /// Home directory could not be resolved for agent credential mounts
    #[error("Cannot determine the host home directory")]
    #[diagnostic(
        code(pkgbox::invocation::home_dir),
        help("Agent CLI credential mounts need a resolvable home directory; set HOME")
    )]
    HomeDirUnresolved,

    /// Host-side agent config path could not be prepared
    #[error("Failed to prepare host path {path}: {details}")]
    #[diagnostic(code(pkgbox::invocation::host_path))]
    HostPath { path: String, details: String },
}

/// Errors while the container is (or should be) running.
#[derive(Error, Debug, Diagnostic)]
pub enum ExecutionError {
    /// Runtime process could not be spawned
    #[error("Failed to start {runtime}: {details}")]
    #[diagnostic(code(pkgbox::execution::spawn))]
    Spawn { runtime: String, details: String },

    /// Runtime process ended without an exit code (killed by a signal)
    #[error("{runtime} was terminated by a signal")]
    #[diagnostic(code(pkgbox::execution::signal))]
    Signalled { runtime: String },

    /// Waiting on the runtime process failed
    #[error("Failed to wait for {runtime}: {details}")]
    #[diagnostic(code(pkgbox::execution::wait))]
    Wait { runtime: String, details: String },
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
