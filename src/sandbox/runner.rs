//! Container runtime driver.
//!
//! Runs one execution plan to completion, in a fixed sequence: check the
//! runtime daemon is reachable, make sure the base image is present locally
//! (pulling it if not), then hand the assembled invocation to the runtime and
//! block until the tool exits.
//!
//! A non-zero exit from the sandboxed tool is not an error here. It comes
//! back as [`RunOutcome::ChildExited`] and the entrypoint terminates the
//! whole process with that exact code, so scripts composing pkgbox observe
//! the underlying tool's real exit status.

use std::io::{BufRead, BufReader, IsTerminal};
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, error, info, instrument, trace};

use super::config::SandboxConfig;
use super::invocation;
use crate::error::{ExecutionError, PreflightError, Result};
use crate::system::{self, ContainerBackend};

/// How a sandboxed run ended, when it ran at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The tool exited with status 0.
    Success,
    /// The tool exited with the given non-zero status.
    ChildExited(i32),
}

impl RunOutcome {
    /// Returns `true` if the tool exited successfully.
    #[must_use]
    pub fn success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Drives the container runtime for one invocation at a time.
pub struct CommandRunner {
    backend: ContainerBackend,
    interactive: bool,
}

impl CommandRunner {
    /// Resolves the runtime backend and probes the caller's terminal.
    ///
    /// # Errors
    ///
    /// Returns a pre-flight error when no runtime binary can be found.
    pub fn detect() -> Result<Self> {
        let backend = system::detect_backend().map_err(crate::error::Error::Preflight)?;
        Ok(Self::new(backend, std::io::stdin().is_terminal()))
    }

    /// Creates a runner with an explicit backend and interactivity flag.
    ///
    /// The terminal capability is injected rather than re-probed internally,
    /// which keeps execution testable without a real terminal.
    #[must_use]
    pub fn new(backend: ContainerBackend, interactive: bool) -> Self {
        Self {
            backend,
            interactive,
        }
    }

    /// Runs the plan to completion.
    ///
    /// # Errors
    ///
    /// Pre-flight failures (daemon unreachable, pull failure), assembly
    /// failures, and abnormal execution (runtime died, child killed by a
    /// signal) are returned as errors. The tool's own non-zero exit is not
    /// an error; see [`RunOutcome`].
    #[instrument(skip(self, config), fields(tool = %config.tool(), image = %config.image()))]
    pub fn execute(&self, config: &SandboxConfig) -> Result<RunOutcome> {
        let version = system::check_daemon(&self.backend).map_err(crate::error::Error::Preflight)?;
        trace!(version = %version, "Runtime check passed");

        self.ensure_image(config.image())?;

        self.run_container(config)
    }

    /// Makes sure `image` is available locally, pulling it when absent.
    ///
    /// The pull is attempted only when local inspection misses; its progress
    /// streams straight to the caller's terminal.
    fn ensure_image(&self, image: &str) -> Result<()> {
        if self.image_exists(image) {
            debug!(image = %image, "Image found locally");
            return Ok(());
        }

        info!(image = %image, "Image not found locally, pulling from registry");
        let status = Command::new(&self.backend.program)
            .args(["pull", image])
            .status()
            .map_err(|e| PreflightError::ImagePull {
                image: image.to_string(),
                details: e.to_string(),
            })?;

        if !status.success() {
            return Err(PreflightError::ImagePull {
                image: image.to_string(),
                details: format!("{} pull exited with {status}", self.backend.name()),
            }
            .into());
        }

        info!(image = %image, "Successfully pulled image");
        Ok(())
    }

    fn image_exists(&self, image: &str) -> bool {
        Command::new(&self.backend.program)
            .args(["image", "inspect", image])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Hands the assembled invocation to the runtime and waits for it.
    ///
    /// Interactive terminals get the child's stdio wired straight through.
    /// Otherwise stdin stays detached so batch runs never block on input,
    /// and the child's output is relayed through the log instead.
    fn run_container(&self, config: &SandboxConfig) -> Result<RunOutcome> {
        let args = invocation::assemble(config, self.interactive)?;
        debug!(runtime = %self.backend.name(), args = ?args, "Running container");

        let mut command = Command::new(&self.backend.program);
        command.args(&args);

        let status = if self.interactive {
            command
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .map_err(|e| self.spawn_error(e))?
        } else {
            command
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());

            let mut child = command.spawn().map_err(|e| self.spawn_error(e))?;

            // Drain both streams off-thread so a chatty tool can't deadlock
            // on a full pipe while we wait for it.
            let stdout = child.stdout.take();
            let stdout_join = thread::spawn(move || {
                if let Some(out) = stdout {
                    for line in BufReader::new(out).lines().map_while(|l| l.ok()) {
                        info!(target: "pkgbox::tool", "{line}");
                    }
                }
            });
            let stderr = child.stderr.take();
            let stderr_join = thread::spawn(move || {
                if let Some(err) = stderr {
                    for line in BufReader::new(err).lines().map_while(|l| l.ok()) {
                        error!(target: "pkgbox::tool", "{line}");
                    }
                }
            });

            let status = child.wait().map_err(|e| ExecutionError::Wait {
                runtime: self.backend.name(),
                details: e.to_string(),
            })?;
            let _ = stdout_join.join();
            let _ = stderr_join.join();
            status
        };

        match status.code() {
            Some(0) => {
                debug!("Container ran successfully");
                Ok(RunOutcome::Success)
            }
            Some(code) => {
                debug!(code = code, "Tool exited with non-zero status");
                Ok(RunOutcome::ChildExited(code))
            }
            None => Err(ExecutionError::Signalled {
                runtime: self.backend.name(),
            }
            .into()),
        }
    }

    fn spawn_error(&self, e: std::io::Error) -> crate::error::Error {
        ExecutionError::Spawn {
            runtime: self.backend.name(),
            details: e.to_string(),
        }
        .into()
    }
}

impl std::fmt::Debug for CommandRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRunner")
            .field("backend", &self.backend)
            .field("interactive", &self.interactive)
            .finish()
    }
}
